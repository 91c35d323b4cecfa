use crate::error::{CertCenterError, Result};

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF))
}

/// Convert a PEM‑encoded string to DER‑encoded bytes.
pub fn pem_to_der(pem_str: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str).map_err(|e| CertCenterError::DecodingError(e.to_string()))?;
    Ok(pem.contents().to_vec())
}

/// Like [`pem_to_der`], but insists on a specific label.
pub fn pem_to_der_with_label(pem_str: &str, label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str).map_err(|e| CertCenterError::DecodingError(e.to_string()))?;
    if pem.tag() != label {
        return Err(CertCenterError::DecodingError(format!(
            "expected a {label} PEM block, found {}",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_round_trip_keeps_label_and_bytes() {
        let encoded = der_to_pem(&[1, 2, 3, 4], CERTIFICATE_LABEL);
        assert!(encoded.starts_with("-----BEGIN CERTIFICATE-----\n"));
        assert_eq!(
            pem_to_der_with_label(&encoded, CERTIFICATE_LABEL).unwrap(),
            vec![1, 2, 3, 4]
        );
        assert!(pem_to_der_with_label(&encoded, "PRIVATE KEY").is_err());
    }

    #[test]
    fn test_pem_to_der_rejects_garbage() {
        assert!(matches!(
            pem_to_der("not a pem document").unwrap_err(),
            CertCenterError::DecodingError(_)
        ));
    }
}
