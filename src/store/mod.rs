//! Persistence contracts for organizations, certificates and private keys.
//!
//! Each entity has one store trait. Lookups that find nothing return
//! [`CertCenterError::NotFound`](crate::error::CertCenterError::NotFound);
//! `create` returns the value as stored. Private key stores only accept keys
//! that carry key data.

pub mod file;
pub mod memory;

use std::sync::Arc;

use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{CertCenterError, Result};
use crate::key::{KeyPair, PrivateKey};
use crate::model::{Certificate, Organization};
use crate::serial::SerialNumber;

pub trait OrganizationStore: Send + Sync {
    fn get_existing(&self, id: &str) -> Result<Organization>;
    fn create(&self, organization: Organization) -> Result<Organization>;
}

pub trait CertificateStore: Send + Sync {
    fn get_existing(&self, serial_number: &SerialNumber) -> Result<Certificate>;
    fn create(&self, certificate: Certificate) -> Result<Certificate>;
}

pub trait PrivateKeyStore: Send + Sync {
    fn get_existing(&self, serial_number: &SerialNumber) -> Result<PrivateKey>;
    fn create(&self, private_key: PrivateKey) -> Result<PrivateKey>;
}

/// Returns the key data of a key about to be stored.
fn storable_key_data(private_key: &PrivateKey) -> Result<&KeyPair> {
    private_key.key_pair().ok_or_else(|| {
        CertCenterError::InvalidInput(format!(
            "private key {} has no key data to store",
            private_key.serial_number()
        ))
    })
}

/// The three stores of one storage backend.
#[derive(Clone)]
pub struct Stores {
    pub organizations: Arc<dyn OrganizationStore>,
    pub certificates: Arc<dyn CertificateStore>,
    pub private_keys: Arc<dyn PrivateKeyStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            organizations: Arc::new(memory::MemoryOrganizationStore::default()),
            certificates: Arc::new(memory::MemoryCertificateStore::default()),
            private_keys: Arc::new(memory::MemoryPrivateKeyStore::default()),
        }
    }

    pub fn file(root: impl Into<std::path::PathBuf>) -> Result<Self> {
        let root = root.into();
        Ok(Self {
            organizations: Arc::new(file::FileOrganizationStore::new(&root)?),
            certificates: Arc::new(file::FileCertificateStore::new(&root)?),
            private_keys: Arc::new(file::FilePrivateKeyStore::new(&root)?),
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        match config {
            StorageConfig::Memory => {
                debug!("using in-memory storage");
                Ok(Self::memory())
            }
            StorageConfig::File { path } => {
                debug!(path = %path.display(), "using file storage");
                Self::file(path.clone())
            }
        }
    }
}
