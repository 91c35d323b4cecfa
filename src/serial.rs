//! Certificate serial numbers.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use tracing::warn;

use crate::error::{CertCenterError, Result};
use crate::random::RandomSource;

/// Number of random bits in a generated serial number.
pub const SERIAL_NUMBER_BITS: u32 = 128;

/// How many times a zero draw is retried before giving up.
pub const MAX_SERIAL_DRAWS: usize = 8;

/// An immutable, arbitrary precision, non-negative certificate serial number.
///
/// Serial numbers compare by value and render as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SerialNumber(BigUint);

impl SerialNumber {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Parses a serial number written in the given radix.
    pub fn parse(value: &str, radix: u32) -> Result<Self> {
        if value.is_empty() {
            return Err(CertCenterError::InvalidInput(
                "no serial number value provided".to_string(),
            ));
        }
        if !(2..=36).contains(&radix) {
            return Err(CertCenterError::InvalidInput(format!(
                "invalid radix: {radix}"
            )));
        }
        BigUint::parse_bytes(value.as_bytes(), radix)
            .map(Self)
            .ok_or_else(|| {
                CertCenterError::InvalidInput(format!("failed to parse serial number: {value}"))
            })
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    /// Returns `true` when the serial number is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0.bits() > 0
    }

    /// Big-endian magnitude bytes, as used in the X.509 encoding.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }

    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// Converts into the X.509 serial number field.
    pub fn to_x509(&self) -> Result<x509_cert::serial_number::SerialNumber> {
        x509_cert::serial_number::SerialNumber::new(&self.to_bytes_be())
            .map_err(|e| CertCenterError::EncodingError(format!("serial number {self}: {e}")))
    }

    pub fn from_x509(serial: &x509_cert::serial_number::SerialNumber) -> Self {
        Self::from_bytes_be(serial.as_bytes())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SerialNumber {
    type Err = CertCenterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, 10)
    }
}

impl From<BigUint> for SerialNumber {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

/// Draws a fresh serial number in `[1, 2^128)`.
///
/// Uniqueness is statistical. A zero draw is discarded and drawn again; a
/// source that keeps returning zero is treated as a broken entropy source.
pub fn generate_serial_number(random: &dyn RandomSource) -> Result<SerialNumber> {
    let max = BigUint::from(1u32) << SERIAL_NUMBER_BITS;
    for _ in 0..MAX_SERIAL_DRAWS {
        let value = random.create_big_int(&max)?;
        if value.bits() > 0 {
            return Ok(SerialNumber(value));
        }
        warn!("random source produced a zero serial number, drawing again");
    }
    Err(CertCenterError::EntropyExhausted(format!(
        "random source returned zero {MAX_SERIAL_DRAWS} times in a row"
    )))
}
