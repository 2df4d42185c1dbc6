//! Path and query parameter checks. Everything here runs before the first
//! indexer call.

use std::fmt;

use crate::api::error::ApiError;
use crate::eth::{is_hex_of_len, normalize_hex, TokenStandard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Number(u64),
    Hash(String),
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockId::Number(number) => write!(f, "{number}"),
            BlockId::Hash(hash) => f.write_str(hash),
        }
    }
}

/// `0x` followed by 40 hex characters, any case. Returns the lowercase form.
pub fn validate_address(raw: &str) -> Result<String, ApiError> {
    if is_hex_of_len(raw, 40) {
        Ok(normalize_hex(raw))
    } else {
        Err(ApiError::InvalidAddress(raw.to_string()))
    }
}

/// `0x` followed by 64 hex characters. Returns the lowercase form.
pub fn validate_hash(raw: &str) -> Result<String, ApiError> {
    if is_hex_of_len(raw, 64) {
        Ok(normalize_hex(raw))
    } else {
        Err(ApiError::InvalidHash(raw.to_string()))
    }
}

pub fn parse_block_id(raw: &str) -> Result<BlockId, ApiError> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<u64>()
            .map(BlockId::Number)
            .map_err(|_| ApiError::InvalidHash(raw.to_string()));
    }
    validate_hash(raw).map(BlockId::Hash)
}

pub fn parse_token_type(raw: Option<&str>) -> Result<Option<TokenStandard>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => TokenStandard::parse(value)
            .map(Some)
            .ok_or_else(|| ApiError::invalid_parameter("type", value)),
    }
}

/// `true`/`1`/`yes` enable the flag; anything else leaves it off.
pub fn parse_bool_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxDirection {
    In,
    Out,
    SelfTransfer,
    All,
}

pub fn parse_tx_direction(raw: Option<&str>) -> Result<TxDirection, ApiError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("all") => Ok(TxDirection::All),
        Some("in") => Ok(TxDirection::In),
        Some("out") => Ok(TxDirection::Out),
        Some("self") => Ok(TxDirection::SelfTransfer),
        Some(other) => Err(ApiError::invalid_parameter("filter", other)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorStatus {
    Active,
    Inactive,
    All,
}

pub fn parse_validator_status(raw: Option<&str>) -> Result<ValidatorStatus, ApiError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("all") => Ok(ValidatorStatus::All),
        Some("active") => Ok(ValidatorStatus::Active),
        Some("inactive") => Ok(ValidatorStatus::Inactive),
        Some(other) => Err(ApiError::invalid_parameter("status", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_lowercased() {
        assert_eq!(
            validate_address("0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e").unwrap(),
            "0x742d35cc6435c9c1c72c5e7b18bab7e1db7a5d6e"
        );
        assert!(validate_address("0X742D35CC6435C9C1C72C5E7B18BAB7E1DB7A5D6E").is_ok());
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for raw in [
            "",
            "0x123",
            "742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e",
            "0xgg2d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e",
            "0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e00",
        ] {
            assert!(
                matches!(validate_address(raw), Err(ApiError::InvalidAddress(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn block_id_disambiguation() {
        assert_eq!(parse_block_id("123").unwrap(), BlockId::Number(123));
        let hash = format!("0x{}", "AB".repeat(32));
        assert_eq!(
            parse_block_id(&hash).unwrap(),
            BlockId::Hash(hash.to_lowercase())
        );
        assert_eq!(parse_block_id(&hash).unwrap().to_string(), hash.to_lowercase());
        assert_eq!(parse_block_id("0042").unwrap().to_string(), "42");
        for raw in ["latest-ish", "0x1234", "12a", "-1", "99999999999999999999999"] {
            assert!(
                matches!(parse_block_id(raw), Err(ApiError::InvalidHash(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn query_enums() {
        assert_eq!(parse_tx_direction(Some("IN")).unwrap(), TxDirection::In);
        assert_eq!(parse_tx_direction(None).unwrap(), TxDirection::All);
        assert!(parse_tx_direction(Some("sideways")).is_err());
        assert_eq!(
            parse_validator_status(Some("inactive")).unwrap(),
            ValidatorStatus::Inactive
        );
        assert_eq!(
            parse_token_type(Some("erc721")).unwrap(),
            Some(TokenStandard::Erc721)
        );
        assert!(parse_token_type(Some("erc777")).is_err());
        assert!(parse_bool_flag(Some("TRUE")));
        assert!(!parse_bool_flag(Some("no")));
        assert!(!parse_bool_flag(None));
    }
}
