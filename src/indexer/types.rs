//! Shapes of the indexer's `data` objects.
//!
//! Numeric fields arrive as JSON numbers, decimal strings or `0x`-hex
//! strings depending on the indexer version, so they go through the
//! lenient deserializers below.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::eth::parse_quantity;

fn quantity_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn de_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    de_opt_u64(deserializer).map(Option::unwrap_or_default)
}

fn de_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(raw) = value.and_then(quantity_from_value) else {
        return Ok(None);
    };
    let parsed = parse_quantity(&raw)
        .filter(|v| v.bits() <= 64)
        .map(|v| v.as_u64())
        .or_else(|| raw.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64));
    Ok(parsed)
}

fn de_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    de_opt_quantity(deserializer).map(Option::unwrap_or_default)
}

fn de_opt_quantity<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(quantity_from_value))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestHeightData {
    #[serde(deserialize_with = "de_u64")]
    pub latest_height: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRow {
    #[serde(deserialize_with = "de_u64")]
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    #[serde(deserialize_with = "de_u64")]
    pub timestamp: u64,
    pub miner: String,
    #[serde(default, deserialize_with = "de_quantity")]
    pub gas_used: String,
    #[serde(default, deserialize_with = "de_quantity")]
    pub gas_limit: String,
    #[serde(default, deserialize_with = "de_u64")]
    pub transaction_count: u64,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub base_fee_per_gas: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub size: Option<u64>,
    #[serde(default)]
    pub extra_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockByNumberData {
    pub block: Option<BlockRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockByHashData {
    pub block_by_hash: Option<BlockRow>,
}

#[derive(Debug, Deserialize)]
pub struct AddressBalanceRow {
    #[serde(default, deserialize_with = "de_quantity")]
    pub balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalanceData {
    pub address_balance: Option<AddressBalanceRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressActivityRow {
    #[serde(default, deserialize_with = "de_u64")]
    pub transaction_count: u64,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub first_seen: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub last_seen: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressActivityData {
    pub address_activity: Option<AddressActivityRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCreationRow {
    pub contract_address: String,
    pub creator: String,
    pub transaction_hash: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub block_number: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCreationData {
    pub contract_creation: Option<ContractCreationRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedContractRow {
    pub name: Option<String>,
    pub compiler_version: Option<String>,
    pub optimization_enabled: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub optimization_runs: Option<u64>,
    pub evm_version: Option<String>,
    pub license_type: Option<String>,
    pub source_code: Option<String>,
    /// ABI as stored text; parsed lazily by the handlers.
    pub abi: Option<String>,
    pub constructor_arguments: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub verified_at: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedContractData {
    pub verified_contract: Option<VerifiedContractRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceRow {
    pub contract_address: String,
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "de_quantity")]
    pub balance: String,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub token_id: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub decimals: Option<u64>,
}

/// A window of a larger upstream list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    #[serde(default, deserialize_with = "de_u64")]
    pub total_count: u64,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            total_count: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesData {
    #[serde(default)]
    pub address_token_balances: Option<Connection<TokenBalanceRow>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRow {
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub status: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub gas_used: Option<String>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub effective_gas_price: Option<String>,
    pub contract_address: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogRow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    pub hash: String,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub transaction_index: Option<u64>,
    pub from: String,
    pub to: Option<String>,
    #[serde(default, deserialize_with = "de_quantity")]
    pub value: String,
    #[serde(default, deserialize_with = "de_quantity")]
    pub gas: String,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub gas_price: Option<String>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub max_fee_per_gas: Option<String>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(default, deserialize_with = "de_u64")]
    pub nonce: u64,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "de_opt_u64")]
    pub tx_type: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub timestamp: Option<u64>,
    pub receipt: Option<ReceiptRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsByAddressData {
    #[serde(default)]
    pub transactions_by_address: Option<Connection<TransactionRow>>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionData {
    pub transaction: Option<TransactionRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceRow {
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub gas_price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecentGasPricesData {
    #[serde(default)]
    pub transactions: Option<Connection<GasPriceRow>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "de_u64")]
    pub block_number: u64,
    pub transaction_hash: String,
    #[serde(default, deserialize_with = "de_u64")]
    pub log_index: u64,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressLogsData {
    #[serde(default)]
    pub logs_by_participant: Option<Connection<LogRow>>,
}

#[derive(Debug, Deserialize)]
pub struct ContractLogsData {
    #[serde(default)]
    pub logs: Option<Connection<LogRow>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HolderRow {
    pub address: String,
    #[serde(default, deserialize_with = "de_quantity")]
    pub balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldersData {
    #[serde(default)]
    pub token_holders: Option<Connection<HolderRow>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadataRow {
    pub name: Option<String>,
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub decimals: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub total_supply: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadataData {
    pub token_metadata: Option<TokenMetadataRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorRow {
    pub address: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidatorsData {
    #[serde(default)]
    pub validators: Vec<ValidatorRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetricsRow {
    #[serde(default, deserialize_with = "de_u64")]
    pub transaction_count: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub block_count: u64,
    pub average_block_time: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub average_gas_price: Option<String>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub active_addresses: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_quantity")]
    pub total_gas_used: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetricsData {
    pub network_metrics: Option<NetworkMetricsRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_fields_accept_numbers_and_strings() {
        let row: LogRow = serde_json::from_value(json!({
            "address": "0xabc",
            "topics": [],
            "blockNumber": "0x10",
            "transactionHash": "0x01",
            "logIndex": 2,
            "timestamp": "1700000000"
        }))
        .unwrap();
        assert_eq!(row.block_number, 16);
        assert_eq!(row.log_index, 2);
        assert_eq!(row.timestamp, Some(1_700_000_000));
        assert_eq!(row.data, None);
    }

    #[test]
    fn receipt_status_accepts_hex() {
        let row: ReceiptRow = serde_json::from_value(json!({ "status": "0x1" })).unwrap();
        assert_eq!(row.status, Some(1));
        assert!(row.logs.is_empty());
    }

    #[test]
    fn missing_connection_defaults_to_empty() {
        let data: TokenHoldersData = serde_json::from_value(json!({})).unwrap();
        assert!(data.token_holders.is_none());
        let conn: Connection<HolderRow> =
            serde_json::from_value(json!({ "totalCount": "3" })).unwrap();
        assert!(conn.nodes.is_empty());
        assert_eq!(conn.total_count, 3);
    }
}
