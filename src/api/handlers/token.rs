//! Token resources. Whether an address is a token is decided by
//! [`is_active_token`].

use axum::extract::State;
use axum::response::Response;
use ethers_core::types::U256;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::extract::{Path, Query};
use crate::api::handlers::{fill_page, OVERFETCH_FACTOR};
use crate::api::response::{paginated_response, success_response, PageParams, PageQuery};
use crate::api::validate::validate_address;
use crate::api::AppState;
use crate::eth;
use crate::indexer::types::{
    ContractLogsData, HolderRow, LogRow, TokenHoldersData, TokenMetadataData, VerifiedContractData,
};
use crate::indexer::{queries, IndexerClient, IndexerError};
use crate::models::{PercentageBasis, TokenHolder, TokenInfo};

/// Percentages carry four decimals: `balance * 100 * 10^4 / basis`.
const PERCENT_PRECISION: u64 = 1_000_000;
const PERCENT_SCALE: f64 = 10_000.0;

/// Heuristic: an address is treated as a live token once it has emitted at
/// least one log. A verified contract with no logs still reports 404.
pub(crate) fn is_active_token(log_count: u64) -> bool {
    log_count > 0
}

pub(crate) fn holder_percentage(balance: U256, basis: U256) -> f64 {
    if basis.is_zero() {
        return 0.0;
    }
    let precision = U256::from(PERCENT_PRECISION);
    let scaled = match balance.checked_mul(precision) {
        Some(product) => product / basis,
        None => balance / (basis / precision).max(U256::one()),
    };
    u128::try_from(scaled).unwrap_or(u128::MAX) as f64 / PERCENT_SCALE
}

/// Prefers the token's total supply as the basis; falls back to the sum of
/// the page's balances when no supply is known.
pub(crate) fn to_holders(rows: Vec<HolderRow>, total_supply: Option<U256>) -> Vec<TokenHolder> {
    let balances: Vec<U256> = rows
        .iter()
        .map(|r| eth::parse_quantity(&r.balance).unwrap_or_default())
        .collect();

    let (basis, basis_kind) = match total_supply.filter(|s| !s.is_zero()) {
        Some(supply) => (supply, PercentageBasis::TotalSupply),
        None => (
            balances
                .iter()
                .fold(U256::zero(), |acc, b| acc.saturating_add(*b)),
            PercentageBasis::Page,
        ),
    };

    rows.into_iter()
        .zip(balances)
        .map(|(row, balance)| TokenHolder {
            address: eth::normalize_hex(&row.address),
            balance: balance.to_string(),
            percentage: holder_percentage(balance, basis),
            percentage_basis: basis_kind,
        })
        .collect()
}

async fn fetch_metadata_lenient(
    indexer: &IndexerClient,
    address: &str,
) -> Result<Option<TokenMetadataData>, IndexerError> {
    match indexer
        .query::<TokenMetadataData>(&queries::TOKEN_METADATA, json!({ "address": address }))
        .await
    {
        Ok(data) => Ok(Some(data)),
        Err(err) => {
            tracing::debug!(token = %address, "token metadata unavailable: {}", err);
            Ok(None)
        }
    }
}

pub async fn info(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let indexer = &state.indexer;

    let (logs, holders, verified, metadata) = futures_util::try_join!(
        indexer.query::<ContractLogsData>(
            &queries::CONTRACT_LOGS,
            json!({ "address": address, "limit": 1, "offset": 0 }),
        ),
        indexer.query::<TokenHoldersData>(
            &queries::TOKEN_HOLDERS,
            json!({ "token": address, "limit": 1, "offset": 0 }),
        ),
        indexer.query::<VerifiedContractData>(
            &queries::VERIFIED_CONTRACT,
            json!({ "address": address }),
        ),
        fetch_metadata_lenient(indexer, &address),
    )?;

    let log_count = logs.logs.unwrap_or_default().total_count;
    if !is_active_token(log_count) {
        return Err(ApiError::not_found("Token", address));
    }

    let metadata = metadata.and_then(|m| m.token_metadata);
    let verified = verified.verified_contract;
    Ok(success_response(TokenInfo {
        name: metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .or_else(|| verified.as_ref().and_then(|v| v.name.clone())),
        symbol: metadata.as_ref().and_then(|m| m.symbol.clone()),
        decimals: metadata.as_ref().and_then(|m| m.decimals),
        total_supply: metadata
            .as_ref()
            .and_then(|m| m.total_supply.as_deref())
            .map(eth::quantity_to_decimal),
        holder_count: holders.token_holders.unwrap_or_default().total_count,
        log_count,
        verified: verified.is_some(),
        address,
    }))
}

pub async fn holders(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let page = PageParams::from_query(&query);
    let indexer = &state.indexer;

    let (holders, metadata) = futures_util::try_join!(
        indexer.query::<TokenHoldersData>(
            &queries::TOKEN_HOLDERS,
            json!({ "token": address, "limit": page.limit, "offset": page.offset() }),
        ),
        fetch_metadata_lenient(indexer, &address),
    )?;

    let total_supply = metadata
        .and_then(|m| m.token_metadata)
        .and_then(|m| m.total_supply)
        .and_then(|s| eth::parse_quantity(&s));
    let holders = holders.token_holders.unwrap_or_default();
    Ok(paginated_response(
        to_holders(holders.nodes, total_supply),
        page.page,
        page.limit,
        holders.total_count,
    ))
}

pub async fn transfers(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let page = PageParams::from_query(&query);
    let indexer = &state.indexer;

    let filled = fill_page(
        |offset, limit| {
            let vars = json!({ "address": address, "limit": limit, "offset": offset });
            async move {
                let data: ContractLogsData = indexer.query(&queries::CONTRACT_LOGS, vars).await?;
                Ok::<_, IndexerError>(data.logs.unwrap_or_default())
            }
        },
        |log: LogRow| eth::decode_transfer(&log),
        page.offset(),
        page.limit * OVERFETCH_FACTOR,
        page.limit as usize,
    )
    .await?;

    Ok(paginated_response(
        filled.items,
        page.page,
        page.limit,
        filled.upstream_total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(address: &str, balance: &str) -> HolderRow {
        HolderRow {
            address: address.to_string(),
            balance: balance.to_string(),
        }
    }

    #[test]
    fn page_relative_percentages_are_flagged() {
        let holders = to_holders(vec![holder("0xAA", "75"), holder("0xbb", "0x19")], None);
        assert_eq!(holders[0].address, "0xaa");
        assert_eq!(holders[0].percentage, 75.0);
        assert_eq!(holders[1].balance, "25");
        assert_eq!(holders[1].percentage, 25.0);
        assert!(holders
            .iter()
            .all(|h| h.percentage_basis == PercentageBasis::Page));
    }

    #[test]
    fn total_supply_is_preferred_basis() {
        let holders = to_holders(vec![holder("0xaa", "10")], Some(U256::from(1000u64)));
        assert_eq!(holders[0].percentage, 1.0);
        assert_eq!(holders[0].percentage_basis, PercentageBasis::TotalSupply);

        let holders = to_holders(vec![holder("0xaa", "10")], Some(U256::zero()));
        assert_eq!(holders[0].percentage_basis, PercentageBasis::Page);
    }

    #[test]
    fn percentage_handles_huge_and_empty_values() {
        assert_eq!(holder_percentage(U256::from(5u64), U256::zero()), 0.0);
        assert_eq!(holder_percentage(U256::MAX, U256::MAX), 100.0);
        assert_eq!(holder_percentage(U256::from(1u64), U256::from(3u64)), 33.3333);
    }

    #[test]
    fn token_heuristic_needs_a_log() {
        assert!(!is_active_token(0));
        assert!(is_active_token(1));
    }
}
