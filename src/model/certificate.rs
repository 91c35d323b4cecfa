use x509_cert::name::Name;

use crate::cert::X509Certificate;
use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::issuer::Issuer;
use crate::serial::SerialNumber;

/// A certificate issued for an organization.
///
/// `signed_by` is the serial number of the issuing certificate; a root
/// certificate points at its own serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    organization: String,
    signed_by: SerialNumber,
    certificate: X509Certificate,
}

impl Certificate {
    pub fn new(
        organization: impl Into<String>,
        signed_by: SerialNumber,
        certificate: X509Certificate,
    ) -> Self {
        Self {
            organization: organization.into(),
            signed_by,
            certificate,
        }
    }

    /// Identifier of the owning organization.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn signed_by(&self) -> &SerialNumber {
        &self.signed_by
    }

    pub fn serial_number(&self) -> &SerialNumber {
        self.certificate.serial_number()
    }

    pub fn certificate(&self) -> &X509Certificate {
        &self.certificate
    }

    pub fn is_ca(&self) -> bool {
        self.certificate.is_ca()
    }

    pub fn common_name(&self) -> String {
        self.certificate.common_name()
    }

    /// First organization name in the subject, or an empty string.
    pub fn organization_name(&self) -> String {
        self.certificate
            .organization()
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    pub fn dns_names(&self) -> &[String] {
        self.certificate.dns_names()
    }

    pub fn is_self_signed(&self) -> bool {
        self.certificate.is_self_signed()
    }

    pub fn is_root_certificate(&self) -> bool {
        self.certificate.basic_constraints_valid() && self.is_ca() && self.is_self_signed()
    }

    pub fn is_intermediate_certificate(&self) -> bool {
        self.certificate.basic_constraints_valid() && self.is_ca() && !self.is_self_signed()
    }

    pub fn is_server_certificate(&self) -> bool {
        self.certificate
            .extended_key_usage()
            .contains(&ExtendedKeyUsageOption::ServerAuth)
    }

    pub fn is_client_certificate(&self) -> bool {
        self.certificate
            .extended_key_usage()
            .contains(&ExtendedKeyUsageOption::ClientAuth)
    }

    pub fn to_pem(&self) -> String {
        self.certificate.to_pem()
    }
}

impl Issuer for Certificate {
    fn issuer_name(&self) -> Option<&Name> {
        Issuer::issuer_name(&self.certificate)
    }

    fn authority_key_identifier(&self) -> Option<&[u8]> {
        Issuer::authority_key_identifier(&self.certificate)
    }
}
