//! The error type shared by every module.

use thiserror::Error;

/// Represents errors that can occur while issuing and storing certificates.
///
/// Every failure carries enough context (operation and wrapped cause) for a
/// caller to log it or map it to a user facing response.
#[derive(Debug, Error, Clone)]
pub enum CertCenterError {
    /// A storage lookup found nothing under the requested identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested key algorithm is not one of the supported key types.
    #[error("keyType is unsupported: {0}")]
    UnsupportedKeyType(String),

    /// The certificate backend failed to build and sign a certificate.
    #[error("failed to create certificate: {0}")]
    CertificateCreation(Box<CertCenterError>),

    /// The certificate backend signed a certificate but could not read it back.
    #[error("failed to parse certificate after creating it: {0}")]
    CertificateParseAfterCreate(Box<CertCenterError>),

    /// The random source could not produce a value.
    #[error("Entropy source failed: {0}")]
    EntropyExhausted(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Error from a storage backend (filesystem, serialization, lock state).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error while loading configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CertCenterError>;

impl From<der::Error> for CertCenterError {
    /// Converts a `der::Error` into a `CertCenterError`.
    fn from(err: der::Error) -> Self {
        CertCenterError::DecodingError(err.to_string())
    }
}

impl From<rsa::Error> for CertCenterError {
    fn from(err: rsa::Error) -> Self {
        CertCenterError::KeyGeneration(err.to_string())
    }
}

impl From<pkcs8::Error> for CertCenterError {
    fn from(err: pkcs8::Error) -> Self {
        CertCenterError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CertCenterError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CertCenterError::EncodingError(err.to_string())
    }
}

impl From<std::io::Error> for CertCenterError {
    fn from(err: std::io::Error) -> Self {
        CertCenterError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CertCenterError {
    fn from(err: serde_json::Error) -> Self {
        CertCenterError::Storage(err.to_string())
    }
}
