use x509_cert::name::Name;

use crate::cert::X509Certificate;

/// Represents an entity capable of issuing certificates.
///
/// The backend reads the issuer's name and key identifier from here when it
/// signs a template. A self-signed certificate has no separate issuer: its
/// issuer name is its own subject, and it carries no authority key identifier.
pub trait Issuer {
    /// Returns the distinguished name of the issuer, or `None` when the
    /// certificate being created issues itself.
    fn issuer_name(&self) -> Option<&Name>;

    /// Returns the issuer's subject key identifier, copied into the new
    /// certificate's authority key identifier.
    fn authority_key_identifier(&self) -> Option<&[u8]>;

    /// Whether the certificate being created is its own issuer.
    fn issues_itself(&self) -> bool {
        self.issuer_name().is_none()
    }
}

/// Marker issuer for root certificates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfSigned;

impl Issuer for SelfSigned {
    fn issuer_name(&self) -> Option<&Name> {
        None
    }

    fn authority_key_identifier(&self) -> Option<&[u8]> {
        None
    }
}

impl Issuer for X509Certificate {
    fn issuer_name(&self) -> Option<&Name> {
        Some(self.subject_name())
    }

    fn authority_key_identifier(&self) -> Option<&[u8]> {
        self.subject_key_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_signed_marker() {
        let issuer = SelfSigned;
        assert!(issuer.issues_itself());
        assert!(issuer.issuer_name().is_none());
        assert!(issuer.authority_key_identifier().is_none());
    }
}
