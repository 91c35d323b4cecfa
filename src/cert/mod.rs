pub mod extensions;
pub mod params;

use der::{Decode, Encode};
use extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage,
    SubjectAltName, SubjectKeyIdentifier, ToAndFromX509Extension,
};
use params::{DistinguishedName, ExtensionParam};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;

use crate::error::{CertCenterError, Result};
use crate::key::{KeyType, PublicKey};
use crate::pem_utils;
use crate::serial::SerialNumber;
use crate::tbs_certificate::TbsCertificate;

/// Represents the supported signature algorithms for certificates.
///
/// Each key type signs with exactly one algorithm; see [`SignatureAlgorithm::for_key_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRsa,
    /// ECDSA with SHA-224, used by P-224 keys.
    EcdsaWithSha224,
    /// ECDSA with SHA-256, used by P-256 keys.
    EcdsaWithSha256,
    /// ECDSA with SHA-384, used by P-384 keys.
    EcdsaWithSha384,
    /// ECDSA with SHA-512, used by P-521 keys.
    EcdsaWithSha512,
    /// Pure Ed25519.
    Ed25519,
}

impl SignatureAlgorithm {
    pub fn for_key_type(key_type: KeyType) -> Self {
        match key_type {
            KeyType::Rsa => SignatureAlgorithm::Sha256WithRsa,
            KeyType::EcdsaP224 => SignatureAlgorithm::EcdsaWithSha224,
            KeyType::EcdsaP256 => SignatureAlgorithm::EcdsaWithSha256,
            KeyType::EcdsaP384 => SignatureAlgorithm::EcdsaWithSha384,
            KeyType::EcdsaP521 => SignatureAlgorithm::EcdsaWithSha512,
            KeyType::Ed25519 => SignatureAlgorithm::Ed25519,
        }
    }

    pub fn oid(&self) -> const_oid::ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha256WithRsa => const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::EcdsaWithSha224 => const_oid::db::rfc5912::ECDSA_WITH_SHA_224,
            SignatureAlgorithm::EcdsaWithSha256 => const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
            SignatureAlgorithm::EcdsaWithSha384 => const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
            SignatureAlgorithm::EcdsaWithSha512 => const_oid::db::rfc5912::ECDSA_WITH_SHA_512,
            SignatureAlgorithm::Ed25519 => const_oid::db::rfc8410::ID_ED_25519,
        }
    }

    pub fn from_oid(oid: const_oid::ObjectIdentifier) -> Result<Self> {
        [
            SignatureAlgorithm::Sha256WithRsa,
            SignatureAlgorithm::EcdsaWithSha224,
            SignatureAlgorithm::EcdsaWithSha256,
            SignatureAlgorithm::EcdsaWithSha384,
            SignatureAlgorithm::EcdsaWithSha512,
            SignatureAlgorithm::Ed25519,
        ]
        .into_iter()
        .find(|algorithm| algorithm.oid() == oid)
        .ok_or_else(|| CertCenterError::DecodingError(format!("Unsupported signature algorithm {oid}")))
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// RSA carries an explicit NULL parameter; ECDSA and Ed25519 carry none
    /// (RFC 4055, RFC 5758, RFC 8410).
    fn from(value: SignatureAlgorithm) -> Self {
        let parameters = match value {
            SignatureAlgorithm::Sha256WithRsa => Some(der::asn1::AnyRef::NULL.into()),
            _ => None,
        };
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters,
        }
    }
}

/// A signed X.509 certificate together with its decoded fields.
///
/// Instances only come from parsing DER bytes, so every accessor reflects
/// what was actually signed.
#[derive(Debug, Clone)]
pub struct X509Certificate {
    /// The inner representation of the certificate.
    inner: CertificateInner,
    der: Vec<u8>,
    tbs: TbsCertificate,
    basic_constraints: Option<BasicConstraints>,
    key_usage: KeyUsage,
    extended_key_usage: Vec<ExtendedKeyUsageOption>,
    dns_names: Vec<String>,
    subject_key_id: Option<Vec<u8>>,
    authority_key_id: Option<Vec<u8>>,
}

impl X509Certificate {
    /// Parses a DER-encoded certificate and decodes the extensions this crate
    /// understands. A malformed known extension fails the whole parse.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)?;
        let tbs = TbsCertificate::from_tbs_certificate_inner(&inner.tbs_certificate)?;

        let basic_constraints = find_extension::<BasicConstraints>(&tbs.extensions)?;
        let key_usage = find_extension::<KeyUsage>(&tbs.extensions)?.unwrap_or_default();
        let extended_key_usage = find_extension::<ExtendedKeyUsage>(&tbs.extensions)?
            .map(|eku| eku.usage)
            .unwrap_or_default();
        let dns_names = find_extension::<SubjectAltName>(&tbs.extensions)?
            .map(|san| san.names)
            .unwrap_or_default();
        let subject_key_id =
            find_extension::<SubjectKeyIdentifier>(&tbs.extensions)?.map(|ski| ski.0);
        let authority_key_id = find_extension::<AuthorityKeyIdentifier>(&tbs.extensions)?
            .map(|aki| aki.key_identifier)
            .filter(|id| !id.is_empty());

        Ok(Self {
            inner,
            der: der.to_vec(),
            tbs,
            basic_constraints,
            key_usage,
            extended_key_usage,
            dns_names,
            subject_key_id,
            authority_key_id,
        })
    }

    /// Parses a PEM-encoded certificate.
    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der_with_label(
            pem,
            pem_utils::CERTIFICATE_LABEL,
        )?)
    }

    /// The DER bytes this certificate was parsed from.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> String {
        pem_utils::der_to_pem(&self.der, pem_utils::CERTIFICATE_LABEL)
    }

    pub fn inner(&self) -> &CertificateInner {
        &self.inner
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.tbs.serial_number
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.tbs.signature_algorithm
    }

    pub fn subject_name(&self) -> &Name {
        &self.tbs.subject
    }

    pub fn issuer_name(&self) -> &Name {
        &self.tbs.issuer
    }

    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.tbs.subject)
    }

    pub fn issuer(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.tbs.issuer)
    }

    pub fn common_name(&self) -> String {
        self.subject().common_name
    }

    pub fn organization(&self) -> Vec<String> {
        self.subject().organization
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.tbs.subject_public_key
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.tbs.validity.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.tbs.validity.not_after
    }

    pub fn basic_constraints_valid(&self) -> bool {
        self.basic_constraints.is_some()
    }

    pub fn is_ca(&self) -> bool {
        self.basic_constraints.is_some_and(|bc| bc.is_ca)
    }

    /// The encoded path length constraint; `None` when absent.
    pub fn max_path_len(&self) -> Option<u8> {
        self.basic_constraints.and_then(|bc| bc.max_path_length)
    }

    pub fn key_usage(&self) -> KeyUsage {
        self.key_usage
    }

    pub fn extended_key_usage(&self) -> &[ExtendedKeyUsageOption] {
        &self.extended_key_usage
    }

    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    pub fn subject_key_id(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    pub fn authority_key_id(&self) -> Option<&[u8]> {
        self.authority_key_id.as_deref()
    }

    pub fn extensions(&self) -> &[ExtensionParam] {
        &self.tbs.extensions
    }

    /// Self-signed when the authority key id matches the subject key id, or,
    /// lacking either, when issuer and subject names are identical.
    pub fn is_self_signed(&self) -> bool {
        match (self.authority_key_id(), self.subject_key_id()) {
            (Some(authority), Some(subject)) => authority == subject,
            _ => self.tbs.issuer == self.tbs.subject,
        }
    }

    /// Re-encodes the certificate from its decoded structure.
    pub fn reencode(&self) -> Result<Vec<u8>> {
        Ok(self.inner.to_der()?)
    }
}

impl PartialEq for X509Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for X509Certificate {}

fn find_extension<E: ToAndFromX509Extension>(extensions: &[ExtensionParam]) -> Result<Option<E>> {
    extensions
        .iter()
        .find(|ext| ext.oid == E::OID)
        .map(|ext| ext.to_extension::<E>())
        .transpose()
}
