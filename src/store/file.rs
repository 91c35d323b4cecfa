//! Stores that keep one directory per record under a root directory.
//!
//! ```text
//! <root>/organizations/<id>/organization.json
//! <root>/certificates/<serial>/certificate.json
//! <root>/keys/<serial>/private.pem
//! ```
//!
//! Records are written to a uniquely named temporary file in the record's
//! directory and renamed into place, so readers never see a partially written
//! record and concurrent writers never share a temporary file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{CertificateStore, OrganizationStore, PrivateKeyStore, storable_key_data};
use crate::cert::X509Certificate;
use crate::error::{CertCenterError, Result};
use crate::key::{KeyPair, PrivateKey};
use crate::model::{Certificate, Organization};
use crate::serial::SerialNumber;

const ORGANIZATIONS_DIR: &str = "organizations";
const CERTIFICATES_DIR: &str = "certificates";
const KEYS_DIR: &str = "keys";
const ORGANIZATION_FILE: &str = "organization.json";
const CERTIFICATE_FILE: &str = "certificate.json";
const PRIVATE_KEY_FILE: &str = "private.pem";

static PATH_COMPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+$").expect("path component pattern is valid")
});

/// Rejects identifiers that could escape their directory.
fn validate_component(kind: &str, value: &str) -> Result<()> {
    if value == "." || value == ".." || !PATH_COMPONENT.is_match(value) {
        return Err(CertCenterError::InvalidInput(format!(
            "{kind} {value:?} must contain only alphanumerics, '-', '_' and '.'"
        )));
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        CertCenterError::Storage(format!("failed to create {}: {e}", path.display()))
    })
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        CertCenterError::Storage(format!("{} has no parent directory", path.display()))
    })?;
    create_dir(parent)?;

    let write_error =
        |e: std::io::Error| CertCenterError::Storage(format!("failed to write {}: {e}", path.display()));
    let mut tmp = NamedTempFile::new_in(parent).map_err(write_error)?;
    tmp.write_all(contents).map_err(write_error)?;
    tmp.as_file().sync_all().map_err(write_error)?;
    tmp.persist(path).map_err(|e| {
        CertCenterError::Storage(format!(
            "failed to move {} into place: {}",
            path.display(),
            e.error
        ))
    })?;
    debug!(path = %path.display(), "wrote record");
    Ok(())
}

fn read_record(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CertCenterError::NotFound(what.to_string()),
        _ => CertCenterError::Storage(format!("failed to read {}: {e}", path.display())),
    })
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationRecord {
    id: String,
    name: String,
    all_names: Vec<String>,
}

#[derive(Debug)]
pub struct FileOrganizationStore {
    base_dir: PathBuf,
}

impl FileOrganizationStore {
    pub fn new(root: &Path) -> Result<Self> {
        let base_dir = root.join(ORGANIZATIONS_DIR);
        create_dir(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, id: &str) -> Result<PathBuf> {
        validate_component("organization id", id)?;
        Ok(self.base_dir.join(id).join(ORGANIZATION_FILE))
    }
}

impl OrganizationStore for FileOrganizationStore {
    fn get_existing(&self, id: &str) -> Result<Organization> {
        let path = self.record_path(id)?;
        let json = read_record(&path, &format!("organization {id}"))?;
        let record: OrganizationRecord = serde_json::from_str(&json)?;
        Organization::new(record.id, record.all_names)
    }

    fn create(&self, organization: Organization) -> Result<Organization> {
        let path = self.record_path(organization.id())?;
        let record = OrganizationRecord {
            id: organization.id().to_string(),
            name: organization.name().to_string(),
            all_names: organization.names().to_vec(),
        };
        write_atomic(&path, serde_json::to_string_pretty(&record)?.as_bytes())?;
        Ok(organization)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateRecord {
    organization: String,
    signed_by: String,
    serial_number: String,
    certificate: String,
}

#[derive(Debug)]
pub struct FileCertificateStore {
    base_dir: PathBuf,
}

impl FileCertificateStore {
    pub fn new(root: &Path) -> Result<Self> {
        let base_dir = root.join(CERTIFICATES_DIR);
        create_dir(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, serial_number: &SerialNumber) -> PathBuf {
        self.base_dir
            .join(serial_number.to_string())
            .join(CERTIFICATE_FILE)
    }
}

impl CertificateStore for FileCertificateStore {
    fn get_existing(&self, serial_number: &SerialNumber) -> Result<Certificate> {
        let path = self.record_path(serial_number);
        let json = read_record(&path, &format!("certificate {serial_number}"))?;
        let record: CertificateRecord = serde_json::from_str(&json)?;

        let signed_by: SerialNumber = record.signed_by.parse()?;
        let certificate = X509Certificate::from_pem(&record.certificate)?;
        if certificate.serial_number() != serial_number {
            return Err(CertCenterError::Storage(format!(
                "record {} holds certificate {}",
                path.display(),
                certificate.serial_number()
            )));
        }
        Ok(Certificate::new(record.organization, signed_by, certificate))
    }

    fn create(&self, certificate: Certificate) -> Result<Certificate> {
        validate_component("organization id", certificate.organization())?;
        let path = self.record_path(certificate.serial_number());
        let record = CertificateRecord {
            organization: certificate.organization().to_string(),
            signed_by: certificate.signed_by().to_string(),
            serial_number: certificate.serial_number().to_string(),
            certificate: certificate.to_pem(),
        };
        write_atomic(&path, serde_json::to_string_pretty(&record)?.as_bytes())?;
        Ok(certificate)
    }
}

#[derive(Debug)]
pub struct FilePrivateKeyStore {
    base_dir: PathBuf,
}

impl FilePrivateKeyStore {
    pub fn new(root: &Path) -> Result<Self> {
        let base_dir = root.join(KEYS_DIR);
        create_dir(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, serial_number: &SerialNumber) -> PathBuf {
        self.base_dir
            .join(serial_number.to_string())
            .join(PRIVATE_KEY_FILE)
    }
}

impl PrivateKeyStore for FilePrivateKeyStore {
    fn get_existing(&self, serial_number: &SerialNumber) -> Result<PrivateKey> {
        let path = self.record_path(serial_number);
        let pem = read_record(&path, &format!("private key {serial_number}"))?;
        let key_pair = KeyPair::from_pkcs8_pem(&pem)?;
        Ok(PrivateKey::from_key_pair(serial_number.clone(), key_pair))
    }

    fn create(&self, private_key: PrivateKey) -> Result<PrivateKey> {
        let key_pair = storable_key_data(&private_key)?;
        let path = self.record_path(private_key.serial_number());
        write_atomic(&path, key_pair.to_pkcs8_pem()?.as_bytes())?;
        Ok(private_key)
    }
}
