use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{Any, PrintableStringRef, SetOfVec, Utf8StringRef};
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
pub use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::cert::extensions::KeyUsage;
use crate::error::CertCenterError;
use crate::serial::SerialNumber;

/// Everything the signer needs to know about a certificate before it exists.
///
/// The backend turns a template into signed DER bytes; the fields here are the
/// ones the chain-building controller decides per certificate class.
///
/// # Fields
/// * `serial_number` - Serial number of the new certificate.
/// * `subject` - The distinguished name of the certificate subject.
/// * `validity` - The `notBefore`..`notAfter` window.
/// * `key_usage` - Key usage bits; omitted from the certificate when empty.
/// * `extended_key_usage` - Extended key usages; omitted when empty.
/// * `basic_constraints_valid` - Whether to emit the basic constraints extension.
/// * `is_ca` - The CA flag of the basic constraints extension.
/// * `max_path_len` - Path length constraint; `None` leaves it unconstrained.
/// * `dns_names` - DNS subject alternative names; omitted when empty.
/// * `extensions` - Additional X.509 extensions appended verbatim.
#[derive(Clone, Debug, Builder)]
pub struct CertificateTemplate {
    pub serial_number: SerialNumber,
    pub subject: DistinguishedName,
    pub validity: Validity,
    #[builder(default)]
    pub key_usage: KeyUsage,
    #[builder(default)]
    pub extended_key_usage: Vec<ExtendedKeyUsageOption>,
    #[builder(default)]
    pub basic_constraints_valid: bool,
    #[builder(default)]
    pub is_ca: bool,
    pub max_path_len: Option<u8>,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub extensions: Vec<ExtensionParam>,
}

/// Distinguished name of a certificate subject or issuer.
///
/// Only the attributes this crate issues are modelled: every organization
/// name (`O`) in order, followed by the common name (`CN`).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(default)]
    pub organization: Vec<String>,
    #[builder(default)]
    pub common_name: String,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<Name, CertCenterError> {
        let organization_oid = const_oid::db::rfc4519::O;
        let common_name_oid = const_oid::db::rfc4519::CN;

        let mut rdns = Vec::with_capacity(self.organization.len() + 1);
        for organization in &self.organization {
            rdns.push(single_attribute_rdn(organization_oid, organization)?);
        }
        if !self.common_name.is_empty() {
            rdns.push(single_attribute_rdn(common_name_oid, &self.common_name)?);
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attributes other than `O` and `CN` are ignored, as are values that are
    /// not UTF8String or PrintableString encoded.
    pub fn from_x509_name(x509dn: &Name) -> Self {
        let mut organization = Vec::new();
        let mut common_name = String::new();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let Some(value) = attribute_string(&attr.value) else {
                    continue;
                };
                if attr.oid == const_oid::db::rfc4519::O {
                    organization.push(value);
                } else if attr.oid == const_oid::db::rfc4519::CN {
                    common_name = value;
                }
            }
        }

        DistinguishedName {
            organization,
            common_name,
        }
    }
}

fn single_attribute_rdn(
    oid: ObjectIdentifier,
    value: &str,
) -> Result<RelativeDistinguishedName, CertCenterError> {
    let value = Any::encode_from(&Utf8StringRef::new(value)?)?;
    let attribute = AttributeTypeAndValue { oid, value };
    let set = SetOfVec::try_from(vec![attribute])?;
    Ok(RelativeDistinguishedName(set))
}

fn attribute_string(value: &Any) -> Option<String> {
    if let Ok(s) = value.decode_as::<Utf8StringRef<'_>>() {
        return Some(s.as_str().to_string());
    }
    value
        .decode_as::<PrintableStringRef<'_>>()
        .ok()
        .map(|s| s.as_str().to_string())
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now and lasting `expiration`.
    ///
    /// Fails with [`CertCenterError::InvalidInput`] when the end of the period
    /// is not representable.
    pub fn starting_now(expiration: Duration) -> Result<Self, CertCenterError> {
        let now = OffsetDateTime::now_utc();
        let not_after = now.checked_add(expiration).ok_or_else(|| {
            CertCenterError::InvalidInput(format!("expiration {expiration} is out of range"))
        })?;
        Ok(Self {
            not_before: now,
            not_after,
        })
    }

    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Result<Self, CertCenterError> {
        Self::starting_now(Duration::days(days))
    }
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and value of an extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: &E,
        critical: bool,
    ) -> Result<Self, CertCenterError> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, CertCenterError> {
        E::from_x509_extension_value(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinguished_name_round_trip() {
        let dn = DistinguishedName::builder()
            .organization(vec!["Example Corp".to_string(), "Platform".to_string()])
            .common_name("Example Root CA".to_string())
            .build();

        let name = dn.as_x509_name().unwrap();
        assert_eq!(name.0.len(), 3);
        assert_eq!(DistinguishedName::from_x509_name(&name), dn);
    }

    #[test]
    fn test_distinguished_name_from_rfc4514_string() {
        use core::str::FromStr;
        let name = RdnSequence::from_str("CN=server.example.com,O=Example Corp").unwrap();
        let dn = DistinguishedName::from_x509_name(&name);
        assert_eq!(dn.common_name, "server.example.com");
        assert_eq!(dn.organization, vec!["Example Corp".to_string()]);
    }

    #[test]
    fn test_validity_window() {
        let validity = Validity::starting_now(Duration::hours(24)).unwrap();
        assert_eq!(validity.not_after - validity.not_before, Duration::hours(24));
    }

    #[test]
    fn test_validity_rejects_unrepresentable_end() {
        assert!(matches!(
            Validity::starting_now(Duration::days(4_000_000)),
            Err(CertCenterError::InvalidInput(_))
        ));
        assert!(Validity::starting_now(Duration::MAX).is_err());
    }
}
