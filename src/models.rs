//! Resources returned by the REST relay. Quantities are decimal strings,
//! addresses and hashes lowercase.

use serde::Serialize;
use serde_json::Value;

use crate::eth::{self, TokenStandard, TokenTransfer};
use crate::indexer::types::{
    BlockRow, ContractCreationRow, ReceiptRow, TokenBalanceRow, TransactionRow, ValidatorRow,
    VerifiedContractRow,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSummary {
    pub address: String,
    pub balance: String,
    pub transaction_count: u64,
    pub is_contract: bool,
    pub first_seen: Option<u64>,
    pub last_seen: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub contract_address: String,
    pub token_type: TokenStandard,
    pub balance: String,
    pub token_id: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u64>,
}

impl From<TokenBalanceRow> for TokenBalance {
    fn from(row: TokenBalanceRow) -> Self {
        Self {
            contract_address: eth::normalize_hex(&row.contract_address),
            token_type: TokenStandard::from_indexer(row.token_type.as_deref()),
            balance: eth::quantity_to_decimal(&row.balance),
            token_id: row.token_id.as_deref().map(eth::quantity_to_decimal),
            name: row.name,
            symbol: row.symbol,
            decimals: row.decimals,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalances {
    pub address: String,
    pub native_balance: String,
    pub tokens: Vec<TokenBalance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
    Pending,
}

impl TxStatus {
    /// No receipt means the transaction has not been mined yet.
    pub fn from_receipt(receipt: Option<&ReceiptRow>) -> Self {
        match receipt {
            None => TxStatus::Pending,
            Some(r) if r.status == Some(1) => TxStatus::Success,
            Some(_) => TxStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub hash: String,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub transaction_index: Option<u64>,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub gas: String,
    pub gas_price: Option<String>,
    pub max_fee_per_gas: Option<String>,
    pub max_priority_fee_per_gas: Option<String>,
    pub gas_used: Option<String>,
    pub effective_gas_price: Option<String>,
    pub nonce: u64,
    pub input: String,
    pub method_id: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: u64,
    pub status: TxStatus,
    pub timestamp: Option<u64>,
}

impl From<&TransactionRow> for TransactionView {
    fn from(row: &TransactionRow) -> Self {
        let input = row.input.clone().unwrap_or_else(|| "0x".to_string());
        let receipt = row.receipt.as_ref();
        Self {
            hash: eth::normalize_hex(&row.hash),
            block_number: row.block_number,
            block_hash: row.block_hash.as_deref().map(eth::normalize_hex),
            transaction_index: row.transaction_index,
            from: eth::normalize_hex(&row.from),
            to: row.to.as_deref().map(eth::normalize_hex),
            value: eth::quantity_to_decimal(&row.value),
            gas: eth::quantity_to_decimal(&row.gas),
            gas_price: row.gas_price.as_deref().map(eth::quantity_to_decimal),
            max_fee_per_gas: row.max_fee_per_gas.as_deref().map(eth::quantity_to_decimal),
            max_priority_fee_per_gas: row
                .max_priority_fee_per_gas
                .as_deref()
                .map(eth::quantity_to_decimal),
            gas_used: receipt
                .and_then(|r| r.gas_used.as_deref())
                .map(eth::quantity_to_decimal),
            effective_gas_price: receipt
                .and_then(|r| r.effective_gas_price.as_deref())
                .map(eth::quantity_to_decimal),
            nonce: row.nonce,
            method_id: eth::method_selector(&input),
            input,
            tx_type: row.tx_type.unwrap_or_default(),
            status: TxStatus::from_receipt(receipt),
            timestamp: row.timestamp,
        }
    }
}

/// Single-transaction view with its decoded token movements.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: TransactionView,
    pub contract_address: Option<String>,
    pub token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub miner: String,
    pub gas_used: String,
    pub gas_limit: String,
    pub transaction_count: u64,
    pub base_fee_per_gas: Option<String>,
    pub size: Option<u64>,
    pub extra_data: Option<String>,
}

impl From<BlockRow> for BlockView {
    fn from(row: BlockRow) -> Self {
        Self {
            number: row.number,
            hash: eth::normalize_hex(&row.hash),
            parent_hash: eth::normalize_hex(&row.parent_hash),
            timestamp: row.timestamp,
            miner: eth::normalize_hex(&row.miner),
            gas_used: eth::quantity_to_decimal(&row.gas_used),
            gas_limit: eth::quantity_to_decimal(&row.gas_limit),
            transaction_count: row.transaction_count,
            base_fee_per_gas: row.base_fee_per_gas.as_deref().map(eth::quantity_to_decimal),
            size: row.size,
            extra_data: row.extra_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PercentageBasis {
    /// Share of the token's reported total supply.
    TotalSupply,
    /// Share of the balances on the returned page only.
    Page,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolder {
    pub address: String,
    pub balance: String,
    pub percentage: f64,
    pub percentage_basis: PercentageBasis,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorView {
    pub address: String,
    pub active: bool,
    /// Not provided by any upstream source yet.
    pub name: Option<String>,
    pub commission: Option<String>,
    pub stake: Option<String>,
    pub delegator_count: Option<u64>,
}

impl From<ValidatorRow> for ValidatorView {
    fn from(row: ValidatorRow) -> Self {
        Self {
            address: eth::normalize_hex(&row.address),
            active: row.active,
            name: None,
            commission: None,
            stake: None,
            delegator_count: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub creator: String,
    pub creation_tx_hash: String,
    pub creation_block_number: Option<u64>,
    pub created_at: Option<u64>,
    pub verified: bool,
    pub name: Option<String>,
    pub compiler_version: Option<String>,
    pub optimization_enabled: Option<bool>,
    pub optimization_runs: Option<u64>,
    pub evm_version: Option<String>,
    pub license_type: Option<String>,
    pub verified_at: Option<u64>,
}

impl ContractInfo {
    pub fn new(
        address: String,
        creation: ContractCreationRow,
        verified: Option<&VerifiedContractRow>,
    ) -> Self {
        Self {
            address,
            creator: eth::normalize_hex(&creation.creator),
            creation_tx_hash: eth::normalize_hex(&creation.transaction_hash),
            creation_block_number: creation.block_number,
            created_at: creation.timestamp,
            verified: verified.is_some(),
            name: verified.and_then(|v| v.name.clone()),
            compiler_version: verified.and_then(|v| v.compiler_version.clone()),
            optimization_enabled: verified.and_then(|v| v.optimization_enabled),
            optimization_runs: verified.and_then(|v| v.optimization_runs),
            evm_version: verified.and_then(|v| v.evm_version.clone()),
            license_type: verified.and_then(|v| v.license_type.clone()),
            verified_at: verified.and_then(|v| v.verified_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAbi {
    pub address: String,
    pub name: Option<String>,
    pub abi: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSource {
    pub address: String,
    pub name: Option<String>,
    pub source_code: Option<String>,
    pub compiler_version: Option<String>,
    pub optimization_enabled: Option<bool>,
    pub optimization_runs: Option<u64>,
    pub constructor_arguments: Option<String>,
    pub evm_version: Option<String>,
    pub license_type: Option<String>,
}

/// Parses stored ABI text. Anything that is not valid JSON is dropped
/// instead of failing the request.
pub fn parse_abi(raw: Option<&str>) -> Option<Value> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!("stored ABI is not valid JSON: {}", err);
            None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u64>,
    pub total_supply: Option<String>,
    pub holder_count: u64,
    /// Logs emitted by the token contract, of any event type.
    pub log_count: u64,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub latest_block: u64,
    pub transactions_24h: u64,
    pub blocks_24h: u64,
    pub average_block_time: Option<f64>,
    pub average_gas_price: Option<String>,
    pub active_addresses_24h: Option<u64>,
    pub gas_used_24h: Option<String>,
    /// The indexer schema exposes no address or contract totals.
    pub total_addresses: Option<u64>,
    pub total_contracts: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    pub slow: String,
    pub standard: String,
    pub fast: String,
    pub unit: &'static str,
    pub sample_size: usize,
}
