use ethers_core::types::U256;
use serde::Serialize;

use crate::indexer::types::LogRow;

/// topic0 of `Transfer(address,address,uint256)`, shared by ERC20 and ERC721.
pub const TRANSFER_EVENT_SIGNATURE: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenStandard {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC1155")]
    Erc1155,
}

impl TokenStandard {
    /// Maps the indexer's free-form token type onto a known standard,
    /// treating anything unrecognized as ERC20.
    pub fn from_indexer(raw: Option<&str>) -> Self {
        let normalized = raw
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase()
            .replace(['-', '_'], "");
        match normalized.as_str() {
            "ERC721" => TokenStandard::Erc721,
            "ERC1155" => TokenStandard::Erc1155,
            _ => TokenStandard::Erc20,
        }
    }

    /// Strict parse for user-supplied filters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ERC20" => Some(TokenStandard::Erc20),
            "ERC721" => Some(TokenStandard::Erc721),
            "ERC1155" => Some(TokenStandard::Erc1155),
            _ => None,
        }
    }

    pub fn is_nft(self) -> bool {
        matches!(self, TokenStandard::Erc721 | TokenStandard::Erc1155)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    pub transaction_hash: String,
    pub log_index: u64,
    pub block_number: u64,
    pub timestamp: Option<u64>,
    pub token_address: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub token_id: Option<String>,
    #[serde(rename = "type")]
    pub token_type: TokenStandard,
}

pub fn is_hex_of_len(raw: &str, hex_len: usize) -> bool {
    let Some(body) = strip_hex_prefix(raw) else {
        return false;
    };
    body.len() == hex_len && body.chars().all(|c| c.is_ascii_hexdigit())
}

fn strip_hex_prefix(raw: &str) -> Option<&str> {
    raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))
}

/// Lowercases an address or hash for output.
pub fn normalize_hex(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Parses an unsigned quantity the indexer may send as `0x`-hex or decimal.
pub fn parse_quantity(raw: &str) -> Option<U256> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match strip_hex_prefix(raw) {
        Some("") => Some(U256::zero()),
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(raw).ok(),
    }
}

/// Decimal rendering of a quantity; malformed or empty input becomes `"0"`.
pub fn quantity_to_decimal(raw: &str) -> String {
    parse_quantity(raw).unwrap_or_default().to_string()
}

pub fn is_zero_quantity(raw: &str) -> bool {
    parse_quantity(raw).map(|v| v.is_zero()).unwrap_or(true)
}

/// Low 20 bytes of a 32-byte topic, as a lowercase address.
pub fn topic_to_address(topic: &str) -> Option<String> {
    if !is_hex_of_len(topic, 64) {
        return None;
    }
    let low = topic.get(topic.len() - 40..)?;
    Some(format!("0x{}", low.to_ascii_lowercase()))
}

/// First four bytes of calldata, `None` when the input is too short to
/// carry a selector.
pub fn method_selector(input: &str) -> Option<String> {
    let selector = strip_hex_prefix(input.trim())?.get(..8)?;
    if !selector.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", selector.to_ascii_lowercase()))
}

/// Rebuilds an ERC20/ERC721 transfer from a raw log. Logs that are not
/// Transfer events, or whose address topics are malformed, yield `None`.
pub fn decode_transfer(log: &LogRow) -> Option<TokenTransfer> {
    let topic0 = log.topics.first()?;
    if !topic0.eq_ignore_ascii_case(TRANSFER_EVENT_SIGNATURE) || log.topics.len() < 3 {
        return None;
    }

    let from = topic_to_address(&log.topics[1])?;
    let to = topic_to_address(&log.topics[2])?;

    let (token_type, value, token_id) = if log.topics.len() == 4 {
        (
            TokenStandard::Erc721,
            "1".to_string(),
            Some(quantity_to_decimal(&log.topics[3])),
        )
    } else {
        (
            TokenStandard::Erc20,
            quantity_to_decimal(log.data.as_deref().unwrap_or_default()),
            None,
        )
    };

    Some(TokenTransfer {
        transaction_hash: normalize_hex(&log.transaction_hash),
        log_index: log.log_index,
        block_number: log.block_number,
        timestamp: log.timestamp,
        token_address: normalize_hex(&log.address),
        from,
        to,
        value,
        token_id,
        token_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::utils::keccak256;

    fn pad(addr: &str) -> String {
        format!("0x{:0>64}", addr.trim_start_matches("0x"))
    }

    fn log(topics: Vec<String>, data: &str) -> LogRow {
        LogRow {
            address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            topics,
            data: Some(data.to_string()),
            block_number: 17,
            transaction_hash: format!("0x{}", "ab".repeat(32)),
            log_index: 3,
            timestamp: Some(1_700_000_000),
        }
    }

    #[test]
    fn transfer_signature_matches_keccak() {
        let hash = keccak256("Transfer(address,address,uint256)".as_bytes());
        let hex: String = hash.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(format!("0x{hex}"), TRANSFER_EVENT_SIGNATURE);
    }

    #[test]
    fn decodes_erc20_transfer_value_from_data() {
        let from = "1111111111111111111111111111111111111111";
        let to = "2222222222222222222222222222222222222222";
        let data = format!("0x{:0>64}", "de0b6b3a7640000");
        let transfer = decode_transfer(&log(
            vec![TRANSFER_EVENT_SIGNATURE.to_string(), pad(from), pad(to)],
            &data,
        ))
        .unwrap();

        assert_eq!(transfer.token_type, TokenStandard::Erc20);
        assert_eq!(transfer.from, format!("0x{from}"));
        assert_eq!(transfer.to, format!("0x{to}"));
        assert_eq!(transfer.value, "1000000000000000000");
        assert_eq!(transfer.token_id, None);
        assert_eq!(
            transfer.token_address,
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
        );
    }

    #[test]
    fn decodes_erc721_transfer_token_id_from_topic() {
        let transfer = decode_transfer(&log(
            vec![
                TRANSFER_EVENT_SIGNATURE.to_string(),
                pad("aa"),
                pad("bb"),
                pad("2a"),
            ],
            "0x",
        ))
        .unwrap();

        assert_eq!(transfer.token_type, TokenStandard::Erc721);
        assert_eq!(transfer.token_id.as_deref(), Some("42"));
        assert_eq!(transfer.value, "1");
    }

    #[test]
    fn malformed_data_decodes_as_zero() {
        for data in ["", "0x", "0xzz", "garbage"] {
            let transfer = decode_transfer(&log(
                vec![TRANSFER_EVENT_SIGNATURE.to_string(), pad("aa"), pad("bb")],
                data,
            ))
            .unwrap();
            assert_eq!(transfer.value, "0", "data {data:?}");
        }
    }

    #[test]
    fn skips_non_transfer_and_short_logs() {
        let approval = "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925";
        assert!(decode_transfer(&log(
            vec![approval.to_string(), pad("aa"), pad("bb")],
            "0x01"
        ))
        .is_none());
        assert!(decode_transfer(&log(
            vec![TRANSFER_EVENT_SIGNATURE.to_string(), pad("aa")],
            "0x01"
        ))
        .is_none());
        assert!(decode_transfer(&log(vec![], "0x01")).is_none());
    }

    #[test]
    fn parses_hex_and_decimal_quantities() {
        assert_eq!(quantity_to_decimal("0x0a"), "10");
        assert_eq!(quantity_to_decimal("12345"), "12345");
        assert_eq!(quantity_to_decimal("-5"), "0");
        assert!(is_zero_quantity("0x0"));
        assert!(is_zero_quantity("0"));
        assert!(!is_zero_quantity("5"));
    }

    #[test]
    fn method_selector_needs_four_bytes() {
        assert_eq!(
            method_selector("0xA9059CBB000000").as_deref(),
            Some("0xa9059cbb")
        );
        assert_eq!(method_selector("0x"), None);
        assert_eq!(method_selector("0x1234"), None);
    }

    #[test]
    fn non_ascii_input_is_rejected_without_panicking() {
        assert_eq!(method_selector("0x1234567é00"), None);
        assert_eq!(method_selector("0xé1234567"), None);
        let topic = format!("0x{}é", "0".repeat(62));
        assert_eq!(topic_to_address(&topic), None);
    }

    #[test]
    fn token_type_defaults_to_erc20() {
        assert_eq!(TokenStandard::from_indexer(Some("ERC-721")), TokenStandard::Erc721);
        assert_eq!(TokenStandard::from_indexer(Some("erc1155")), TokenStandard::Erc1155);
        assert_eq!(TokenStandard::from_indexer(Some("weird")), TokenStandard::Erc20);
        assert_eq!(TokenStandard::from_indexer(None), TokenStandard::Erc20);
    }
}
