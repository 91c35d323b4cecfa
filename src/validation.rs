//! Input rules for organization identifiers, organization names and
//! certificate common names.
//!
//! Every check returns [`CertCenterError::InvalidInput`] naming the field and
//! the rule that failed.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CertCenterError, Result};

static ALL_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern is valid"));

static CA_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-. ]+$").expect("CA name pattern is valid"));

static CLIENT_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-. @]+$").expect("client name pattern is valid"));

static DNS_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-.]+$").expect("DNS name pattern is valid"));

static SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-.]+$").expect("slug pattern is valid"));

fn invalid(field: &str, value: &str, rule: &str) -> CertCenterError {
    CertCenterError::InvalidInput(format!("{field} {value:?}: {rule}"))
}

/// Shared rules for human readable names: not empty, single inner spaces and
/// no surrounding spaces.
fn check_spacing(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "cannot be empty"));
    }
    if value.starts_with(' ') || value.ends_with(' ') {
        return Err(invalid(field, value, "cannot start or end with a space"));
    }
    if value.contains("  ") {
        return Err(invalid(field, value, "should not have repeating spaces"));
    }
    Ok(())
}

/// Common name of a root or intermediate CA certificate.
pub fn validate_ca_common_name(common_name: &str) -> Result<()> {
    const FIELD: &str = "CA common name";
    check_spacing(FIELD, common_name)?;
    if ALL_DIGITS.is_match(common_name) {
        return Err(invalid(FIELD, common_name, "should not be full numbers"));
    }
    if !CA_NAME_CHARS.is_match(common_name) {
        return Err(invalid(FIELD, common_name, "contains invalid characters"));
    }
    Ok(())
}

/// Common name of a client certificate. Allows `@` for user style names.
pub fn validate_client_common_name(common_name: &str) -> Result<()> {
    const FIELD: &str = "client common name";
    check_spacing(FIELD, common_name)?;
    if !CLIENT_NAME_CHARS.is_match(common_name) {
        return Err(invalid(FIELD, common_name, "contains invalid characters"));
    }
    Ok(())
}

/// A lower case DNS name, optionally with a leading `*.` wildcard label.
pub fn validate_dns_name(dns_name: &str) -> Result<()> {
    const FIELD: &str = "DNS name";
    let name = dns_name.strip_prefix("*.").unwrap_or(dns_name);
    if name.is_empty() {
        return Err(invalid(FIELD, dns_name, "cannot be empty"));
    }
    if name.starts_with(['-', '.']) || name.ends_with(['-', '.']) {
        return Err(invalid(FIELD, dns_name, "cannot start or end with '-' or '.'"));
    }
    if name.contains("..") {
        return Err(invalid(FIELD, dns_name, "cannot have repeating '.'"));
    }
    if !DNS_NAME_CHARS.is_match(name) {
        return Err(invalid(FIELD, dns_name, "contains invalid characters"));
    }
    let tld = name.rsplit('.').next().unwrap_or(name);
    if tld.len() < 2 {
        return Err(invalid(
            FIELD,
            dns_name,
            "last label must be at least two characters",
        ));
    }
    Ok(())
}

pub fn validate_dns_names(dns_names: &[String]) -> Result<()> {
    dns_names.iter().try_for_each(|name| validate_dns_name(name))
}

/// Organization identifier: lower case letters, digits, `-` and `.`.
pub fn validate_organization_id(id: &str) -> Result<()> {
    const FIELD: &str = "organization id";
    if id.len() < 2 {
        return Err(invalid(FIELD, id, "must be at least two characters long"));
    }
    if id.parse::<i64>().is_ok() {
        return Err(invalid(FIELD, id, "should not be full numbers"));
    }
    if id.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid(FIELD, id, "contains uppercase characters"));
    }
    if !SLUG_CHARS.is_match(id) || id.trim_matches([' ', '-', '.']) != id {
        return Err(invalid(
            FIELD,
            id,
            "contains invalid characters, or starts or ends with '-' or '.'",
        ));
    }
    Ok(())
}

/// Display name of an organization.
pub fn validate_organization_name(name: &str) -> Result<()> {
    const FIELD: &str = "organization name";
    if name.trim().len() < 2 {
        return Err(invalid(FIELD, name, "must be at least two characters long"));
    }
    check_spacing(FIELD, name)?;
    if name.parse::<i64>().is_ok() {
        return Err(invalid(FIELD, name, "should not be full numbers"));
    }
    if !CA_NAME_CHARS.is_match(name) {
        return Err(invalid(FIELD, name, "contains invalid characters"));
    }
    Ok(())
}

pub fn validate_organization_names(names: &[String]) -> Result<()> {
    names
        .iter()
        .try_for_each(|name| validate_organization_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(result: Result<()>) -> bool {
        matches!(result, Err(CertCenterError::InvalidInput(_)))
    }

    #[test]
    fn test_ca_common_name() {
        for good in ["Root", "MyCA Root CA", "intermediate.myca.local", "ca_01-x"] {
            assert!(validate_ca_common_name(good).is_ok(), "{good:?}");
        }
        for bad in ["", " Root", "Root ", "My  CA", "12345", "Root/CA", "CA@home", "Jürgen"] {
            assert!(rejects(validate_ca_common_name(bad)), "{bad:?}");
        }
    }

    #[test]
    fn test_client_common_name() {
        for good in ["client", "alice@example.com", "Build Agent 7", "1234"] {
            assert!(validate_client_common_name(good).is_ok(), "{good:?}");
        }
        for bad in ["", " alice", "alice ", "a  b", "alice/bob", "alice:1"] {
            assert!(rejects(validate_client_common_name(bad)), "{bad:?}");
        }
    }

    #[test]
    fn test_dns_name() {
        for good in ["example.com", "www.example.com", "*.example.com", "a-b.example.io", "localhost"] {
            assert!(validate_dns_name(good).is_ok(), "{good:?}");
        }
        for bad in [
            "",
            "*.",
            "-bad..name",
            "-example.com",
            "example.com.",
            "example..com",
            "Example.com",
            "exa mple.com",
            "example.c",
            "*.*.example.com",
        ] {
            assert!(rejects(validate_dns_name(bad)), "{bad:?}");
        }
    }

    #[test]
    fn test_dns_names_stop_at_first_invalid() {
        let names = vec!["example.com".to_string(), "bad_name.com".to_string()];
        let err = validate_dns_names(&names).unwrap_err();
        assert!(err.to_string().contains("bad_name.com"));
        assert!(validate_dns_names(&[]).is_ok());
    }

    #[test]
    fn test_organization_id() {
        for good in ["acme", "myca", "acme-01", "example.org", "a1"] {
            assert!(validate_organization_id(good).is_ok(), "{good:?}");
        }
        for bad in ["", "a", "123", "Acme", "acme_corp", "-acme", "acme.", "..", "../escape", "a b"] {
            assert!(rejects(validate_organization_id(bad)), "{bad:?}");
        }
    }

    #[test]
    fn test_organization_name() {
        for good in ["Acme Inc", "MyCA Ltd", "R2", "Acme-Labs_2.0"] {
            assert!(validate_organization_name(good).is_ok(), "{good:?}");
        }
        for bad in ["", "A", "  ", " Acme", "Acme ", "Acme  Inc", "2024", "Acme & Co"] {
            assert!(rejects(validate_organization_name(bad)), "{bad:?}");
        }
    }

    #[test]
    fn test_organization_names_checks_each_entry() {
        let names = vec!["Acme Inc".to_string(), "x".to_string()];
        assert!(rejects(validate_organization_names(&names)));
    }
}
