//! The seam between certificate policy and X.509 encoding.
//!
//! [`CertificateBackend`] is what the chain controller signs through. The
//! default [`X509Backend`] encodes with the RustCrypto `x509-cert` stack; tests
//! substitute their own implementation to inject failures.

use std::sync::Arc;

use der::Encode;
use sha1::{Digest, Sha1};
use tracing::trace;
use x509_cert::certificate::CertificateInner;

use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, SubjectAltName,
    SubjectKeyIdentifier,
};
use crate::cert::params::{CertificateTemplate, ExtensionParam};
use crate::cert::{SignatureAlgorithm, X509Certificate};
use crate::error::Result;
use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::random::{OsRandomSource, RandomSource};
use crate::tbs_certificate::TbsCertificate;

/// Builds, signs and parses certificates.
pub trait CertificateBackend: Send + Sync {
    /// The random source used for serial numbers.
    fn random_source(&self) -> &dyn RandomSource;

    /// Signs `template` for `public_key` with `private_key` on behalf of
    /// `issuer`, returning the DER encoding of the certificate.
    fn create_certificate(
        &self,
        template: &CertificateTemplate,
        issuer: &dyn Issuer,
        public_key: &PublicKey,
        private_key: &KeyPair,
    ) -> Result<Vec<u8>>;

    /// Parses DER bytes produced by [`CertificateBackend::create_certificate`].
    fn parse_certificate(&self, der: &[u8]) -> Result<X509Certificate>;
}

/// Backend on top of `x509-cert`, signing with the key's native algorithm.
#[derive(Clone)]
pub struct X509Backend {
    random: Arc<dyn RandomSource>,
}

impl X509Backend {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }
}

impl Default for X509Backend {
    fn default() -> Self {
        Self::new(Arc::new(OsRandomSource::new()))
    }
}

impl std::fmt::Debug for X509Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X509Backend").finish_non_exhaustive()
    }
}

impl CertificateBackend for X509Backend {
    fn random_source(&self) -> &dyn RandomSource {
        self.random.as_ref()
    }

    fn create_certificate(
        &self,
        template: &CertificateTemplate,
        issuer: &dyn Issuer,
        public_key: &PublicKey,
        private_key: &KeyPair,
    ) -> Result<Vec<u8>> {
        let subject = template.subject.as_x509_name()?;
        let issuer_name = match issuer.issuer_name() {
            Some(name) => name.clone(),
            None => subject.clone(),
        };

        let subject_key_id = subject_key_identifier(public_key)?;
        let authority_key_id = if issuer.issues_itself() {
            None
        } else {
            issuer.authority_key_identifier().map(<[u8]>::to_vec)
        };

        let extensions = certificate_extensions(template, subject_key_id, authority_key_id)?;

        let signature_algorithm = SignatureAlgorithm::for_key_type(private_key.key_type());
        let tbs = TbsCertificate {
            serial_number: template.serial_number.clone(),
            signature_algorithm,
            issuer: issuer_name,
            validity: template.validity.clone(),
            subject,
            subject_public_key: public_key.clone(),
            extensions,
        };

        let tbs_inner = tbs.to_tbs_certificate_inner()?;
        let signature = private_key.sign_data(&tbs_inner.to_der()?)?;

        let certificate = CertificateInner {
            tbs_certificate: tbs_inner,
            signature_algorithm: signature_algorithm.into(),
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        let der = certificate.to_der()?;
        trace!(
            serial = %template.serial_number,
            len = der.len(),
            "signed certificate"
        );
        Ok(der)
    }

    fn parse_certificate(&self, der: &[u8]) -> Result<X509Certificate> {
        X509Certificate::from_der(der)
    }
}

/// SHA-1 over the subject public key bit string (RFC 5280, 4.2.1.2, method 1).
fn subject_key_identifier(public_key: &PublicKey) -> Result<Vec<u8>> {
    let spki = public_key.to_spki()?;
    Ok(Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec())
}

fn certificate_extensions(
    template: &CertificateTemplate,
    subject_key_id: Vec<u8>,
    authority_key_id: Option<Vec<u8>>,
) -> Result<Vec<ExtensionParam>> {
    let mut extensions = Vec::new();

    if template.basic_constraints_valid {
        let basic_constraints = BasicConstraints {
            is_ca: template.is_ca,
            max_path_length: template.max_path_len,
        };
        extensions.push(ExtensionParam::from_extension(&basic_constraints, true)?);
    }

    if !template.key_usage.is_empty() {
        extensions.push(ExtensionParam::from_extension(&template.key_usage, true)?);
    }

    if !template.extended_key_usage.is_empty() {
        let extended_key_usage = ExtendedKeyUsage {
            usage: template.extended_key_usage.clone(),
        };
        extensions.push(ExtensionParam::from_extension(&extended_key_usage, false)?);
    }

    if !template.dns_names.is_empty() {
        let subject_alt_name = SubjectAltName {
            names: template.dns_names.clone(),
        };
        extensions.push(ExtensionParam::from_extension(&subject_alt_name, false)?);
    }

    extensions.push(ExtensionParam::from_extension(
        &SubjectKeyIdentifier(subject_key_id),
        false,
    )?);

    if let Some(key_identifier) = authority_key_id {
        extensions.push(ExtensionParam::from_extension(
            &AuthorityKeyIdentifier { key_identifier },
            false,
        )?);
    }

    extensions.extend(template.extensions.iter().cloned());
    Ok(extensions)
}
