//! In-memory stores, mostly for tests and short-lived tools.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{CertificateStore, OrganizationStore, PrivateKeyStore, storable_key_data};
use crate::error::{CertCenterError, Result};
use crate::key::PrivateKey;
use crate::model::{Certificate, Organization};
use crate::serial::SerialNumber;

fn poisoned<T>(_: PoisonError<T>) -> CertCenterError {
    CertCenterError::Storage("store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct MemoryOrganizationStore {
    organizations: RwLock<HashMap<String, Organization>>,
}

impl OrganizationStore for MemoryOrganizationStore {
    fn get_existing(&self, id: &str) -> Result<Organization> {
        self.organizations
            .read()
            .map_err(poisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| CertCenterError::NotFound(format!("organization {id}")))
    }

    fn create(&self, organization: Organization) -> Result<Organization> {
        self.organizations
            .write()
            .map_err(poisoned)?
            .insert(organization.id().to_string(), organization.clone());
        Ok(organization)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCertificateStore {
    certificates: RwLock<HashMap<SerialNumber, Certificate>>,
}

impl CertificateStore for MemoryCertificateStore {
    fn get_existing(&self, serial_number: &SerialNumber) -> Result<Certificate> {
        self.certificates
            .read()
            .map_err(poisoned)?
            .get(serial_number)
            .cloned()
            .ok_or_else(|| CertCenterError::NotFound(format!("certificate {serial_number}")))
    }

    fn create(&self, certificate: Certificate) -> Result<Certificate> {
        self.certificates
            .write()
            .map_err(poisoned)?
            .insert(certificate.serial_number().clone(), certificate.clone());
        Ok(certificate)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPrivateKeyStore {
    keys: RwLock<HashMap<SerialNumber, PrivateKey>>,
}

impl PrivateKeyStore for MemoryPrivateKeyStore {
    fn get_existing(&self, serial_number: &SerialNumber) -> Result<PrivateKey> {
        self.keys
            .read()
            .map_err(poisoned)?
            .get(serial_number)
            .cloned()
            .ok_or_else(|| CertCenterError::NotFound(format!("private key {serial_number}")))
    }

    fn create(&self, private_key: PrivateKey) -> Result<PrivateKey> {
        storable_key_data(&private_key)?;
        self.keys
            .write()
            .map_err(poisoned)?
            .insert(private_key.serial_number().clone(), private_key.clone());
        Ok(private_key)
    }
}
