//! Chain building: root, intermediate and leaf certificates for an organization.

use std::sync::Arc;

use time::Duration;
use tracing::{debug, info};

use crate::backend::CertificateBackend;
use crate::cert::X509Certificate;
use crate::cert::extensions::{ExtendedKeyUsageOption, FlagSet, KeyUsage, KeyUsages};
use crate::cert::params::{CertificateTemplate, DistinguishedName, Validity};
use crate::error::{CertCenterError, Result};
use crate::issuer::{Issuer, SelfSigned};
use crate::key::{PrivateKey, PublicKey};
use crate::model::{Certificate, Organization};
use crate::serial::{SerialNumber, generate_serial_number};
use crate::validation::{validate_ca_common_name, validate_client_common_name, validate_dns_names};

/// Issues the certificates of an organization's chain through a backend.
///
/// The controller holds no mutable state and can be shared across threads.
#[derive(Clone)]
pub struct ChainController {
    backend: Arc<dyn CertificateBackend>,
}

impl ChainController {
    pub fn new(backend: Arc<dyn CertificateBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn CertificateBackend {
        self.backend.as_ref()
    }

    /// Draws a fresh positive serial number from the backend's random source.
    pub fn new_serial_number(&self) -> Result<SerialNumber> {
        generate_serial_number(self.backend.random_source())
    }

    /// Creates a self-signed root CA certificate.
    ///
    /// The serial number and the subject public key come from `private_key`.
    pub fn new_root_certificate(
        &self,
        organization: &Organization,
        common_name: &str,
        private_key: &PrivateKey,
        expiration: Duration,
    ) -> Result<Certificate> {
        debug!(
            organization = organization.id(),
            serial = %private_key.serial_number(),
            common_name,
            "creating root certificate"
        );

        validate_ca_common_name(common_name)?;
        let public_key = private_key.public_key().ok_or_else(|| missing_key_data(private_key))?;
        let template = ca_template(
            private_key.serial_number().clone(),
            organization,
            common_name,
            expiration,
            None,
        )?;

        let certificate = self.sign(private_key, &template, &public_key, &SelfSigned)?;
        let certificate = Certificate::new(
            organization.id(),
            private_key.serial_number().clone(),
            certificate,
        );

        info!(
            organization = organization.id(),
            serial = %certificate.serial_number(),
            "created root certificate"
        );
        Ok(certificate)
    }

    /// Creates an intermediate CA certificate signed by `parent`.
    ///
    /// Intermediates may not sign further CA certificates (path length 0).
    #[allow(clippy::too_many_arguments)]
    pub fn new_intermediate_certificate(
        &self,
        organization: &Organization,
        common_name: &str,
        serial_number: SerialNumber,
        public_key: &PublicKey,
        parent: &Certificate,
        parent_key: &PrivateKey,
        expiration: Duration,
    ) -> Result<Certificate> {
        debug!(
            organization = organization.id(),
            serial = %serial_number,
            parent = %parent.serial_number(),
            common_name,
            "creating intermediate certificate"
        );

        validate_ca_common_name(common_name)?;
        let template = ca_template(serial_number, organization, common_name, expiration, Some(0))?;
        let certificate = self.issue(organization, template, public_key, parent, parent_key)?;

        info!(
            organization = organization.id(),
            serial = %certificate.serial_number(),
            "created intermediate certificate"
        );
        Ok(certificate)
    }

    /// Creates a TLS server certificate for `dns_names`.
    ///
    /// The first DNS name becomes the common name; all of them go into the
    /// subject alternative name extension.
    #[allow(clippy::too_many_arguments)]
    pub fn new_server_certificate(
        &self,
        organization: &Organization,
        serial_number: SerialNumber,
        public_key: &PublicKey,
        parent: &Certificate,
        parent_key: &PrivateKey,
        dns_names: &[String],
        expiration: Duration,
    ) -> Result<Certificate> {
        debug!(
            organization = organization.id(),
            serial = %serial_number,
            parent = %parent.serial_number(),
            ?dns_names,
            "creating server certificate"
        );

        let common_name = dns_names.first().ok_or_else(|| {
            CertCenterError::InvalidInput(
                "server certificate needs at least one DNS name".to_string(),
            )
        })?;
        validate_dns_names(dns_names)?;

        let template = CertificateTemplate::builder()
            .serial_number(serial_number)
            .subject(subject(organization, common_name))
            .validity(Validity::starting_now(expiration)?)
            .key_usage(leaf_key_usage())
            .extended_key_usage(vec![ExtendedKeyUsageOption::ServerAuth])
            .dns_names(dns_names.to_vec())
            .basic_constraints_valid(true)
            .build();
        let certificate = self.issue(organization, template, public_key, parent, parent_key)?;

        info!(
            organization = organization.id(),
            serial = %certificate.serial_number(),
            "created server certificate"
        );
        Ok(certificate)
    }

    /// Creates a TLS client certificate.
    #[allow(clippy::too_many_arguments)]
    pub fn new_client_certificate(
        &self,
        organization: &Organization,
        common_name: &str,
        serial_number: SerialNumber,
        public_key: &PublicKey,
        parent: &Certificate,
        parent_key: &PrivateKey,
        expiration: Duration,
    ) -> Result<Certificate> {
        debug!(
            organization = organization.id(),
            serial = %serial_number,
            parent = %parent.serial_number(),
            common_name,
            "creating client certificate"
        );

        validate_client_common_name(common_name)?;

        let template = CertificateTemplate::builder()
            .serial_number(serial_number)
            .subject(subject(organization, common_name))
            .validity(Validity::starting_now(expiration)?)
            .key_usage(leaf_key_usage())
            .extended_key_usage(vec![ExtendedKeyUsageOption::ClientAuth])
            .basic_constraints_valid(true)
            .build();
        let certificate = self.issue(organization, template, public_key, parent, parent_key)?;

        info!(
            organization = organization.id(),
            serial = %certificate.serial_number(),
            "created client certificate"
        );
        Ok(certificate)
    }

    fn issue(
        &self,
        organization: &Organization,
        template: CertificateTemplate,
        public_key: &PublicKey,
        parent: &Certificate,
        parent_key: &PrivateKey,
    ) -> Result<Certificate> {
        let parent_public_key = parent_key
            .public_key()
            .ok_or_else(|| missing_key_data(parent_key))?;
        if &parent_public_key != parent.certificate().public_key() {
            return Err(CertCenterError::InvalidInput(format!(
                "private key {} does not match the public key of certificate {}",
                parent_key.serial_number(),
                parent.serial_number()
            )));
        }

        let certificate = self.sign(parent_key, &template, public_key, parent)?;
        Ok(Certificate::new(
            organization.id(),
            parent.serial_number().clone(),
            certificate,
        ))
    }

    fn sign(
        &self,
        signing_key: &PrivateKey,
        template: &CertificateTemplate,
        public_key: &PublicKey,
        issuer: &dyn Issuer,
    ) -> Result<X509Certificate> {
        if signing_key.key_pair().is_none() {
            return Err(missing_key_data(signing_key));
        }
        signing_key.create_certificate(self.backend.as_ref(), template, public_key, issuer)
    }
}

fn missing_key_data(key: &PrivateKey) -> CertCenterError {
    CertCenterError::InvalidInput(format!(
        "private key {} has no key data",
        key.serial_number()
    ))
}

fn subject(organization: &Organization, common_name: &str) -> DistinguishedName {
    DistinguishedName::builder()
        .organization(organization.names().to_vec())
        .common_name(common_name.to_string())
        .build()
}

fn ca_template(
    serial_number: SerialNumber,
    organization: &Organization,
    common_name: &str,
    expiration: Duration,
    max_path_len: Option<u8>,
) -> Result<CertificateTemplate> {
    Ok(CertificateTemplate::builder()
        .serial_number(serial_number)
        .subject(subject(organization, common_name))
        .validity(Validity::starting_now(expiration)?)
        .key_usage(KeyUsage(
            FlagSet::from(KeyUsages::DigitalSignature) | KeyUsages::KeyCertSign,
        ))
        .extended_key_usage(vec![
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth,
        ])
        .basic_constraints_valid(true)
        .is_ca(true)
        .maybe_max_path_len(max_path_len)
        .build())
}

fn leaf_key_usage() -> KeyUsage {
    KeyUsage(FlagSet::from(KeyUsages::DigitalSignature) | KeyUsages::KeyEncipherment)
}
