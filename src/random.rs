//! Cryptographically secure random integers.

use num_bigint::BigUint;
use rand_core::{OsRng, RngCore};

use crate::error::{CertCenterError, Result};

/// Supplies uniformly distributed integers from a secure entropy source.
///
/// Implementations must be safe to call from many threads at once.
pub trait RandomSource: Send + Sync {
    /// Returns a uniformly distributed integer in `[0, max)`.
    fn create_big_int(&self, max: &BigUint) -> Result<BigUint>;
}

/// Random source backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl OsRandomSource {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandomSource {
    fn create_big_int(&self, max: &BigUint) -> Result<BigUint> {
        if max.bits() == 0 {
            return Err(CertCenterError::InvalidInput(
                "random upper bound must be greater than zero".to_string(),
            ));
        }

        // Draw exactly as many bits as `max - 1` needs and reject anything out
        // of range, so every value below `max` is equally likely.
        let limit = max - 1u32;
        let bits = limit.bits();
        if bits == 0 {
            return Ok(BigUint::default());
        }
        let len = bits.div_ceil(8) as usize;
        let excess_bits = (len as u64 * 8 - bits) as u32;
        let mut bytes = vec![0u8; len];

        loop {
            OsRng
                .try_fill_bytes(&mut bytes)
                .map_err(|e| CertCenterError::EntropyExhausted(e.to_string()))?;
            bytes[0] &= 0xffu8 >> excess_bits;
            let candidate = BigUint::from_bytes_be(&bytes);
            if candidate < *max {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_create_big_int_stays_below_max() {
        let source = OsRandomSource::new();
        let mut rng = rand::rng();

        for _ in 0..200 {
            let max = BigUint::from(rng.random_range(1u128..=u128::MAX));
            let value = source.create_big_int(&max).unwrap();
            assert!(value < max, "{value} is not below {max}");
        }
    }

    #[test]
    fn test_create_big_int_small_bounds() {
        let source = OsRandomSource::new();

        assert_eq!(
            source.create_big_int(&BigUint::from(1u32)).unwrap(),
            BigUint::default()
        );

        let max = BigUint::from(3u32);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let value = source.create_big_int(&max).unwrap();
            let index = value.to_u32_digits().first().copied().unwrap_or(0) as usize;
            seen[index] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_create_big_int_wide_bound() {
        let source = OsRandomSource::new();
        let max = BigUint::from(1u32) << 200u32;
        let value = source.create_big_int(&max).unwrap();
        assert!(value < max);
    }

    #[test]
    fn test_create_big_int_rejects_zero_bound() {
        let source = OsRandomSource::new();
        let err = source.create_big_int(&BigUint::default()).unwrap_err();
        assert!(matches!(err, CertCenterError::InvalidInput(_)));
    }
}
