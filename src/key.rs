//! Key types, key generation and signing.
//!
//! [`KeyType`] is the single source of truth for the supported algorithms.
//! Generation, public key extraction, signing and PKCS#8 handling all match
//! on the same set of variants.

use std::fmt;
use std::str::FromStr;

use const_oid::AssociatedOid;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use ed25519_dalek::VerifyingKey as Ed25519VerifyingKey;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, LineEnding};
use rand_core::OsRng;
use rsa::pkcs1v15::SigningKey as RsaSigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::debug;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::backend::CertificateBackend;
use crate::cert::X509Certificate;
use crate::cert::params::CertificateTemplate;
use crate::error::{CertCenterError, Result};
use crate::issuer::Issuer;
use crate::pem_utils;
use crate::serial::SerialNumber;

/// Supported private key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa,
    EcdsaP224,
    EcdsaP256,
    EcdsaP384,
    EcdsaP521,
    Ed25519,
}

impl KeyType {
    pub const ALL: [KeyType; 6] = [
        KeyType::Rsa,
        KeyType::EcdsaP224,
        KeyType::EcdsaP256,
        KeyType::EcdsaP384,
        KeyType::EcdsaP521,
        KeyType::Ed25519,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Rsa => "RSA",
            KeyType::EcdsaP224 => "ECDSA_P224",
            KeyType::EcdsaP256 => "ECDSA_P256",
            KeyType::EcdsaP384 => "ECDSA_P384",
            KeyType::EcdsaP521 => "ECDSA_P521",
            KeyType::Ed25519 => "Ed25519",
        }
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self, KeyType::Rsa)
    }

    pub fn is_ecdsa(&self) -> bool {
        matches!(
            self,
            KeyType::EcdsaP224 | KeyType::EcdsaP256 | KeyType::EcdsaP384 | KeyType::EcdsaP521
        )
    }

    pub fn is_ed25519(&self) -> bool {
        matches!(self, KeyType::Ed25519)
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = CertCenterError;

    fn from_str(s: &str) -> Result<Self> {
        KeyType::ALL
            .into_iter()
            .find(|key_type| key_type.as_str() == s)
            .ok_or_else(|| CertCenterError::UnsupportedKeyType(s.to_string()))
    }
}

impl TryFrom<i32> for KeyType {
    type Error = CertCenterError;

    /// Maps the numeric tags used by persisted records (`0` = RSA … `5` = Ed25519).
    fn try_from(tag: i32) -> Result<Self> {
        usize::try_from(tag)
            .ok()
            .and_then(|index| KeyType::ALL.get(index).copied())
            .ok_or_else(|| CertCenterError::UnsupportedKeyType(format!("KeyType({tag})")))
    }
}

impl TryFrom<String> for KeyType {
    type Error = CertCenterError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KeyType> for String {
    fn from(value: KeyType) -> Self {
        value.as_str().to_string()
    }
}

/// Native key material for every supported algorithm.
#[derive(Clone)]
pub enum KeyPair {
    Rsa(Box<RsaPrivateKey>),
    EcdsaP224(p224::SecretKey),
    EcdsaP256(p256::SecretKey),
    EcdsaP384(p384::SecretKey),
    EcdsaP521(p521::SecretKey),
    Ed25519(Ed25519SigningKey),
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({})", self.key_type())
    }
}

impl KeyPair {
    /// Generate a key pair of the given type. `rsa_bits` only applies to RSA.
    pub fn generate(key_type: KeyType, rsa_bits: usize) -> Result<Self> {
        let mut rng = OsRng;
        Ok(match key_type {
            KeyType::Rsa => KeyPair::Rsa(Box::new(RsaPrivateKey::new(&mut rng, rsa_bits)?)),
            KeyType::EcdsaP224 => KeyPair::EcdsaP224(p224::SecretKey::random(&mut rng)),
            KeyType::EcdsaP256 => KeyPair::EcdsaP256(p256::SecretKey::random(&mut rng)),
            KeyType::EcdsaP384 => KeyPair::EcdsaP384(p384::SecretKey::random(&mut rng)),
            KeyType::EcdsaP521 => KeyPair::EcdsaP521(p521::SecretKey::random(&mut rng)),
            KeyType::Ed25519 => KeyPair::Ed25519(Ed25519SigningKey::generate(&mut rng)),
        })
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            KeyPair::Rsa(_) => KeyType::Rsa,
            KeyPair::EcdsaP224(_) => KeyType::EcdsaP224,
            KeyPair::EcdsaP256(_) => KeyType::EcdsaP256,
            KeyPair::EcdsaP384(_) => KeyType::EcdsaP384,
            KeyPair::EcdsaP521(_) => KeyType::EcdsaP521,
            KeyPair::Ed25519(_) => KeyType::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Rsa(private) => PublicKey::Rsa(RsaPublicKey::from(private.as_ref())),
            KeyPair::EcdsaP224(secret) => PublicKey::EcdsaP224(secret.public_key()),
            KeyPair::EcdsaP256(secret) => PublicKey::EcdsaP256(secret.public_key()),
            KeyPair::EcdsaP384(secret) => PublicKey::EcdsaP384(secret.public_key()),
            KeyPair::EcdsaP521(secret) => PublicKey::EcdsaP521(secret.public_key()),
            KeyPair::Ed25519(signing_key) => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }

    /// Signs `data` with the hash and scheme implied by the key type.
    ///
    /// ECDSA signatures are returned DER encoded, as X.509 requires.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signature = match self {
            KeyPair::Rsa(private) => {
                let signing_key = RsaSigningKey::<Sha256>::new(private.as_ref().clone());
                signing_key.try_sign(data).map_err(signing_error)?.to_vec()
            }
            KeyPair::EcdsaP224(secret) => {
                let signing_key = p224::ecdsa::SigningKey::from(secret);
                let signature: p224::ecdsa::Signature =
                    signing_key.try_sign(data).map_err(signing_error)?;
                signature.to_der().as_bytes().to_vec()
            }
            KeyPair::EcdsaP256(secret) => {
                let signing_key = p256::ecdsa::SigningKey::from(secret);
                let signature: p256::ecdsa::Signature =
                    signing_key.try_sign(data).map_err(signing_error)?;
                signature.to_der().as_bytes().to_vec()
            }
            KeyPair::EcdsaP384(secret) => {
                let signing_key = p384::ecdsa::SigningKey::from(secret);
                let signature: p384::ecdsa::Signature =
                    signing_key.try_sign(data).map_err(signing_error)?;
                signature.to_der().as_bytes().to_vec()
            }
            KeyPair::EcdsaP521(secret) => {
                let signing_key =
                    p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes()).map_err(signing_error)?;
                let signature: p521::ecdsa::Signature =
                    signing_key.try_sign(data).map_err(signing_error)?;
                signature.to_der().as_bytes().to_vec()
            }
            KeyPair::Ed25519(signing_key) => signing_key
                .try_sign(data)
                .map_err(signing_error)?
                .to_bytes()
                .to_vec(),
        };
        Ok(signature)
    }

    /// Exports the key as an unencrypted PKCS#8 PEM document.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        let pem = match self {
            KeyPair::Rsa(private) => private.to_pkcs8_pem(LineEnding::LF),
            KeyPair::EcdsaP224(secret) => secret.to_pkcs8_pem(LineEnding::LF),
            KeyPair::EcdsaP256(secret) => secret.to_pkcs8_pem(LineEnding::LF),
            KeyPair::EcdsaP384(secret) => secret.to_pkcs8_pem(LineEnding::LF),
            KeyPair::EcdsaP521(secret) => secret.to_pkcs8_pem(LineEnding::LF),
            KeyPair::Ed25519(signing_key) => signing_key.to_pkcs8_pem(LineEnding::LF),
        }
        .map_err(|e| CertCenterError::EncodingError(e.to_string()))?;
        Ok(pem.to_string())
    }

    /// Imports a PKCS#8 PEM private key, detecting the key type from its
    /// algorithm identifier.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem)?;
        Self::from_pkcs8_der(&der)
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = pkcs8::PrivateKeyInfo::try_from(der)?;
        let algorithm = info.algorithm.oid;

        let key_pair = if algorithm == const_oid::db::rfc5912::RSA_ENCRYPTION {
            KeyPair::Rsa(Box::new(RsaPrivateKey::from_pkcs8_der(der)?))
        } else if algorithm == const_oid::db::rfc5912::ID_EC_PUBLIC_KEY {
            let curve = info.algorithm.parameters_oid()?;
            if curve == p224::NistP224::OID {
                KeyPair::EcdsaP224(p224::SecretKey::from_pkcs8_der(der)?)
            } else if curve == p256::NistP256::OID {
                KeyPair::EcdsaP256(p256::SecretKey::from_pkcs8_der(der)?)
            } else if curve == p384::NistP384::OID {
                KeyPair::EcdsaP384(p384::SecretKey::from_pkcs8_der(der)?)
            } else if curve == p521::NistP521::OID {
                KeyPair::EcdsaP521(p521::SecretKey::from_pkcs8_der(der)?)
            } else {
                return Err(CertCenterError::UnsupportedKeyType(format!(
                    "ECDSA curve {curve}"
                )));
            }
        } else if algorithm == const_oid::db::rfc8410::ID_ED_25519 {
            KeyPair::Ed25519(Ed25519SigningKey::from_pkcs8_der(der)?)
        } else {
            return Err(CertCenterError::UnsupportedKeyType(algorithm.to_string()));
        };
        Ok(key_pair)
    }
}

fn signing_error(err: rsa::signature::Error) -> CertCenterError {
    CertCenterError::EncodingError(format!("signing failed: {err}"))
}

/// Public half of a [`KeyPair`].
#[derive(Clone, Debug, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP224(p224::PublicKey),
    EcdsaP256(p256::PublicKey),
    EcdsaP384(p384::PublicKey),
    EcdsaP521(p521::PublicKey),
    Ed25519(Ed25519VerifyingKey),
}

impl PublicKey {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        key_pair.public_key()
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::Rsa(_) => KeyType::Rsa,
            PublicKey::EcdsaP224(_) => KeyType::EcdsaP224,
            PublicKey::EcdsaP256(_) => KeyType::EcdsaP256,
            PublicKey::EcdsaP384(_) => KeyType::EcdsaP384,
            PublicKey::EcdsaP521(_) => KeyType::EcdsaP521,
            PublicKey::Ed25519(_) => KeyType::Ed25519,
        }
    }

    /// Encodes the key as an X.509 `SubjectPublicKeyInfo`.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone()),
            PublicKey::EcdsaP224(public) => SubjectPublicKeyInfoOwned::from_key(*public),
            PublicKey::EcdsaP256(public) => SubjectPublicKeyInfoOwned::from_key(*public),
            PublicKey::EcdsaP384(public) => SubjectPublicKeyInfoOwned::from_key(*public),
            PublicKey::EcdsaP521(public) => SubjectPublicKeyInfoOwned::from_key(*public),
            PublicKey::Ed25519(public) => SubjectPublicKeyInfoOwned::from_key(*public),
        }?;
        Ok(spki)
    }

    /// Decodes a `SubjectPublicKeyInfo` taken from a certificate.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        use der::Encode;

        let der = spki.to_der()?;
        let algorithm = spki.algorithm.oid;

        let public_key = if algorithm == const_oid::db::rfc5912::RSA_ENCRYPTION {
            PublicKey::Rsa(RsaPublicKey::from_public_key_der(&der)?)
        } else if algorithm == const_oid::db::rfc5912::ID_EC_PUBLIC_KEY {
            let curve = spki
                .algorithm
                .parameters
                .as_ref()
                .ok_or_else(|| {
                    CertCenterError::DecodingError("EC public key without curve".to_string())
                })?
                .decode_as::<const_oid::ObjectIdentifier>()?;
            if curve == p224::NistP224::OID {
                PublicKey::EcdsaP224(p224::PublicKey::from_public_key_der(&der)?)
            } else if curve == p256::NistP256::OID {
                PublicKey::EcdsaP256(p256::PublicKey::from_public_key_der(&der)?)
            } else if curve == p384::NistP384::OID {
                PublicKey::EcdsaP384(p384::PublicKey::from_public_key_der(&der)?)
            } else if curve == p521::NistP521::OID {
                PublicKey::EcdsaP521(p521::PublicKey::from_public_key_der(&der)?)
            } else {
                return Err(CertCenterError::UnsupportedKeyType(format!(
                    "ECDSA curve {curve}"
                )));
            }
        } else if algorithm == const_oid::db::rfc8410::ID_ED_25519 {
            PublicKey::Ed25519(Ed25519VerifyingKey::from_public_key_der(&der)?)
        } else {
            return Err(CertCenterError::UnsupportedKeyType(algorithm.to_string()));
        };
        Ok(public_key)
    }
}

/// A private key bound to the serial number of the certificate it belongs to.
///
/// `data` is `None` for placeholder keys that carry only metadata, e.g. a
/// record listed from storage without its secret. Such keys have no public
/// key and cannot sign.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    serial_number: SerialNumber,
    key_type: KeyType,
    data: Option<KeyPair>,
}

impl PrivateKey {
    /// When `data` is present its algorithm decides the key type and
    /// `key_type` only applies to stub keys.
    pub fn new(serial_number: SerialNumber, key_type: KeyType, data: Option<KeyPair>) -> Self {
        let key_type = data.as_ref().map_or(key_type, KeyPair::key_type);
        Self {
            serial_number,
            key_type,
            data,
        }
    }

    pub fn from_key_pair(serial_number: SerialNumber, key_pair: KeyPair) -> Self {
        Self::new(serial_number, key_pair.key_type(), Some(key_pair))
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn key_pair(&self) -> Option<&KeyPair> {
        self.data.as_ref()
    }

    /// Returns the public key, or `None` when there is no key data.
    pub fn public_key(&self) -> Option<PublicKey> {
        self.data.as_ref().map(KeyPair::public_key)
    }

    pub(crate) fn signing_key(&self) -> Result<&KeyPair> {
        self.data.as_ref().ok_or_else(|| {
            CertCenterError::InvalidInput(format!(
                "private key {} has no key data to sign with",
                self.serial_number
            ))
        })
    }

    /// Signs `template` for `subject_key` and reads the result back.
    ///
    /// The returned certificate is the backend's parsed view of the signed
    /// bytes, not the template that was requested.
    pub fn create_certificate(
        &self,
        backend: &dyn CertificateBackend,
        template: &CertificateTemplate,
        subject_key: &PublicKey,
        issuer: &dyn Issuer,
    ) -> Result<X509Certificate> {
        let signing_key = self
            .signing_key()
            .map_err(|e| CertCenterError::CertificateCreation(Box::new(e)))?;

        let der = backend
            .create_certificate(template, issuer, subject_key, signing_key)
            .map_err(|e| CertCenterError::CertificateCreation(Box::new(e)))?;

        backend
            .parse_certificate(&der)
            .map_err(|e| CertCenterError::CertificateParseAfterCreate(Box::new(e)))
    }
}

/// Generates a new private key of `key_type` for the certificate `serial_number`.
pub fn generate_private_key(
    serial_number: SerialNumber,
    key_type: KeyType,
    rsa_bits: usize,
) -> Result<PrivateKey> {
    debug!(serial = %serial_number, %key_type, "generating private key");
    let key_pair = KeyPair::generate(key_type, rsa_bits)?;
    Ok(PrivateKey::new(serial_number, key_type, Some(key_pair)))
}

pub fn generate_rsa_private_key(serial_number: SerialNumber, rsa_bits: usize) -> Result<PrivateKey> {
    generate_private_key(serial_number, KeyType::Rsa, rsa_bits)
}

pub fn generate_ecdsa_private_key(
    serial_number: SerialNumber,
    key_type: KeyType,
) -> Result<PrivateKey> {
    if !key_type.is_ecdsa() {
        return Err(CertCenterError::UnsupportedKeyType(format!(
            "{key_type} is not an ECDSA key type"
        )));
    }
    generate_private_key(serial_number, key_type, 0)
}

pub fn generate_ed25519_private_key(serial_number: SerialNumber) -> Result<PrivateKey> {
    generate_private_key(serial_number, KeyType::Ed25519, 0)
}
