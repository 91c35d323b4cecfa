//! # CertCenter - Private Certificate Authority Core
//!
//! CertCenter issues and keeps the certificate chains of organizations: a
//! self-signed root, intermediate CAs below it and TLS server and client
//! certificates at the leaves. Everything is built on the RustCrypto crates;
//! OpenSSL is only used to cross-check the output in tests.
//!
//! ## Supported Key Types
//!
//! - **RSA** with a configurable modulus size, signing with SHA-256
//! - **ECDSA** on P-224, P-256, P-384 and P-521, with the matching SHA-2 hash
//! - **Ed25519**
//!
//! ## Issuing a Chain
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use certcenter::backend::X509Backend;
//! use certcenter::controller::ChainController;
//! use certcenter::key::{KeyType, generate_private_key};
//! use certcenter::model::Organization;
//! use time::Duration;
//!
//! # fn main() -> Result<(), certcenter::error::CertCenterError> {
//! let controller = ChainController::new(Arc::new(X509Backend::default()));
//! let org = Organization::new("acme", vec!["Acme Inc".to_string()])?;
//!
//! let root_key = generate_private_key(controller.new_serial_number()?, KeyType::EcdsaP384, 0)?;
//! let root = controller.new_root_certificate(&org, "Acme Root CA", &root_key, Duration::days(3650))?;
//!
//! let server_key = generate_private_key(controller.new_serial_number()?, KeyType::EcdsaP256, 0)?;
//! let server = controller.new_server_certificate(
//!     &org,
//!     server_key.serial_number().clone(),
//!     &server_key.public_key().expect("generated keys carry key data"),
//!     &root,
//!     &root_key,
//!     &["example.com".to_string(), "www.example.com".to_string()],
//!     Duration::days(365),
//! )?;
//!
//! println!("{}", server.to_pem());
//! # Ok(())
//! # }
//! ```
//!
//! ## Persisting
//!
//! ```rust
//! use certcenter::config::StorageConfig;
//! use certcenter::model::Organization;
//! use certcenter::store::Stores;
//!
//! # fn main() -> Result<(), certcenter::error::CertCenterError> {
//! let stores = Stores::from_config(&StorageConfig::Memory)?;
//! let org = Organization::new("acme", vec!["Acme Inc".to_string()])?;
//! stores.organizations.create(org.clone())?;
//! assert_eq!(stores.organizations.get_existing("acme")?, org);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`controller`]: root, intermediate, server and client certificate policy
//! - [`backend`]: template to signed DER, and DER back to [`cert::X509Certificate`]
//! - [`key`]: key types, generation, signing and PKCS#8
//! - [`serial`] / [`random`]: serial numbers from a secure random source
//! - [`cert`] / [`tbs_certificate`]: X.509 structures and extensions
//! - [`model`]: organizations and issued certificates
//! - [`store`]: memory and file persistence
//! - [`config`]: JSON configuration
//! - [`validation`]: rules for organization ids, names and common names
//! - [`error`]: the crate error type

pub mod backend;
pub mod cert;
pub mod config;
pub mod controller;
pub mod error;
pub mod issuer;
pub mod key;
pub mod model;
pub mod pem_utils;
pub mod random;
pub mod serial;
pub mod store;
pub mod tbs_certificate;
pub mod validation;

pub use error::{CertCenterError, Result};
