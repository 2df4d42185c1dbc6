//! Network-wide figures: 24h activity and gas price tiers.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::response::Response;
use ethers_core::types::U256;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::response::success_response;
use crate::api::AppState;
use crate::eth;
use crate::indexer::types::{LatestHeightData, NetworkMetricsData, RecentGasPricesData};
use crate::indexer::{decode, queries, GraphQlRequest};
use crate::models::{GasEstimate, NetworkStats};

const DAY_SECS: u64 = 24 * 60 * 60;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// `GET /api/v1/stats`
pub async fn network(State(state): State<AppState>) -> Result<Response, ApiError> {
    let since = unix_now().saturating_sub(DAY_SECS).to_string();
    let mut results = state
        .indexer
        .query_parallel(vec![
            GraphQlRequest::new(&queries::LATEST_HEIGHT, json!({})),
            GraphQlRequest::new(&queries::NETWORK_METRICS, json!({ "since": since })),
        ])
        .await?
        .into_iter();

    let height: LatestHeightData = decode(results.next().unwrap_or_default())?;
    let metrics: NetworkMetricsData = decode(results.next().unwrap_or_default())?;
    let metrics = metrics.network_metrics.unwrap_or_default();

    Ok(success_response(NetworkStats {
        latest_block: height.latest_height,
        transactions_24h: metrics.transaction_count,
        blocks_24h: metrics.block_count,
        average_block_time: metrics.average_block_time,
        average_gas_price: metrics
            .average_gas_price
            .as_deref()
            .map(eth::quantity_to_decimal),
        active_addresses_24h: metrics.active_addresses,
        gas_used_24h: metrics.total_gas_used.as_deref().map(eth::quantity_to_decimal),
        total_addresses: None,
        total_contracts: None,
    }))
}

/// Slow/standard/fast tiers at the 25th/50th/75th percentile of `sorted`
/// (ascending). Index is `floor(n * p)`; `fallback` is used for every tier
/// when there are no samples.
pub(crate) fn gas_percentiles(sorted: &[U256], fallback: U256) -> (U256, U256, U256) {
    let Some(first) = sorted.first().copied() else {
        return (fallback, fallback, fallback);
    };
    let n = sorted.len();
    let at = |pct: usize| sorted.get(n * pct / 100).copied().unwrap_or(first);
    (at(25), at(50), at(75))
}

/// `GET /api/v1/stats/gas`
pub async fn gas(State(state): State<AppState>) -> Result<Response, ApiError> {
    let data: RecentGasPricesData = state
        .indexer
        .query(
            &queries::RECENT_GAS_PRICES,
            json!({ "limit": state.settings.gas_sample_size }),
        )
        .await?;

    let mut prices: Vec<U256> = data
        .transactions
        .unwrap_or_default()
        .nodes
        .into_iter()
        .filter_map(|row| row.gas_price.as_deref().and_then(eth::parse_quantity))
        .collect();
    prices.sort_unstable();

    let fallback = U256::from(state.settings.default_gas_price_wei);
    let (slow, standard, fast) = gas_percentiles(&prices, fallback);
    Ok(success_response(GasEstimate {
        slow: slow.to_string(),
        standard: standard.to_string(),
        fast: fast.to_string(),
        unit: "wei",
        sample_size: prices.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(raw: &[u64]) -> Vec<U256> {
        raw.iter().copied().map(U256::from).collect()
    }

    #[test]
    fn four_samples_pick_upper_quartiles() {
        let (slow, standard, fast) = gas_percentiles(&prices(&[10, 20, 30, 40]), U256::one());
        assert_eq!(slow, U256::from(20u64));
        assert_eq!(standard, U256::from(30u64));
        assert_eq!(fast, U256::from(40u64));
    }

    #[test]
    fn single_sample_fills_every_tier() {
        let (slow, standard, fast) = gas_percentiles(&prices(&[7]), U256::one());
        assert_eq!((slow, standard, fast), (U256::from(7u64), U256::from(7u64), U256::from(7u64)));
    }

    #[test]
    fn no_samples_use_fallback() {
        let fallback = U256::from(1_000_000_000u64);
        assert_eq!(gas_percentiles(&[], fallback), (fallback, fallback, fallback));
    }
}
