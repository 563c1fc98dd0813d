//! Typed environment variable lookups
//!
//! Unset variables fall back to the caller's default; set-but-unparsable
//! variables are reported instead of silently ignored.

use crate::error::{Result, TaxalignError};
use std::str::FromStr;

/// Read `key` and parse it, or return `None` when unset or blank
pub fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| TaxalignError::invalid_value(key, raw)),
        Err(_) => Ok(None),
    }
}

/// Read `key` and parse it, falling back to `default` when unset
pub fn parse_var_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    Ok(parse_var(key)?.unwrap_or(default))
}

/// Read `key` as a string, or `None` when unset or blank
pub fn string_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_parse_var_unset() {
        std::env::remove_var("TAXALIGN_TEST_NUMBER");
        let value: Option<u32> = parse_var("TAXALIGN_TEST_NUMBER").unwrap();
        assert_eq!(value, None);
        assert_eq!(parse_var_or("TAXALIGN_TEST_NUMBER", 7u32).unwrap(), 7);
    }

    #[test]
    #[serial]
    fn test_parse_var_invalid() {
        std::env::set_var("TAXALIGN_TEST_NUMBER", "seven");
        let result: Result<Option<u32>> = parse_var("TAXALIGN_TEST_NUMBER");
        assert!(matches!(result, Err(TaxalignError::InvalidValue { .. })));
        std::env::remove_var("TAXALIGN_TEST_NUMBER");
    }

    #[test]
    #[serial]
    fn test_string_var_trims_and_drops_blank() {
        std::env::set_var("TAXALIGN_TEST_STRING", "  ");
        assert_eq!(string_var("TAXALIGN_TEST_STRING"), None);
        std::env::set_var("TAXALIGN_TEST_STRING", " iucn ");
        assert_eq!(string_var("TAXALIGN_TEST_STRING").as_deref(), Some("iucn"));
        std::env::remove_var("TAXALIGN_TEST_STRING");
    }
}
