//! `/api/v1/account/{address}` and its sub-resources.

use std::collections::{BTreeSet, HashMap};

use axum::extract::State;
use axum::response::Response;
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::extract::{Path, Query};
use crate::api::handlers::contract::is_contract;
use crate::api::handlers::{fill_page, FULL_LIST_CAP, OVERFETCH_FACTOR};
use crate::api::response::{paginated_response, success_response, PageParams, PageQuery};
use crate::api::validate::{
    parse_bool_flag, parse_token_type, parse_tx_direction, validate_address, TxDirection,
};
use crate::api::AppState;
use crate::eth::{self, TokenStandard, TokenTransfer};
use crate::indexer::types::{
    AddressActivityData, AddressBalanceData, AddressLogsData, ContractCreationData, LogRow,
    TokenBalancesData, TransactionRow, TransactionsByAddressData, VerifiedContractData,
};
use crate::indexer::{queries, IndexerClient, IndexerError};
use crate::models::{AccountBalances, AddressSummary, TokenBalance, TransactionView};

#[derive(Debug, Default, Deserialize)]
pub struct BalancesQuery {
    pub include_zero: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokensQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub include_zero: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NftsQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    #[serde(rename = "type")]
    pub token_type: Option<String>,
    pub include_zero: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransfersQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    #[serde(rename = "type")]
    pub token_type: Option<String>,
    pub token: Option<String>,
}

pub async fn summary(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let vars = json!({ "address": address });

    let (balance, creation, activity) = futures_util::try_join!(
        state
            .indexer
            .query::<AddressBalanceData>(&queries::ADDRESS_BALANCE, vars.clone()),
        state
            .indexer
            .query::<ContractCreationData>(&queries::CONTRACT_CREATION, vars.clone()),
        state
            .indexer
            .query::<AddressActivityData>(&queries::ADDRESS_ACTIVITY, vars),
    )?;

    let activity = activity.address_activity.unwrap_or_default();
    Ok(success_response(AddressSummary {
        balance: balance
            .address_balance
            .map(|b| eth::quantity_to_decimal(&b.balance))
            .unwrap_or_else(|| "0".to_string()),
        // No creation record just means an externally owned account.
        is_contract: is_contract(creation.contract_creation.as_ref()),
        transaction_count: activity.transaction_count,
        first_seen: activity.first_seen,
        last_seen: activity.last_seen,
        address,
    }))
}

async fn fetch_token_balances(
    indexer: &IndexerClient,
    address: &str,
) -> Result<Vec<TokenBalance>, IndexerError> {
    let data: TokenBalancesData = indexer
        .query(
            &queries::TOKEN_BALANCES,
            json!({ "address": address, "limit": FULL_LIST_CAP, "offset": 0 }),
        )
        .await?;
    Ok(data
        .address_token_balances
        .unwrap_or_default()
        .nodes
        .into_iter()
        .map(TokenBalance::from)
        .collect())
}

/// Drops zero balances unless asked to keep them; order is preserved.
pub(crate) fn filter_zero_balances(tokens: Vec<TokenBalance>, include_zero: bool) -> Vec<TokenBalance> {
    if include_zero {
        return tokens;
    }
    tokens
        .into_iter()
        .filter(|t| !eth::is_zero_quantity(&t.balance))
        .collect()
}

pub async fn balances(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<BalancesQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let include_zero = parse_bool_flag(query.include_zero.as_deref());

    let (native, tokens) = futures_util::try_join!(
        state.indexer.query::<AddressBalanceData>(
            &queries::ADDRESS_BALANCE,
            json!({ "address": address })
        ),
        fetch_token_balances(&state.indexer, &address),
    )?;

    Ok(success_response(AccountBalances {
        native_balance: native
            .address_balance
            .map(|b| eth::quantity_to_decimal(&b.balance))
            .unwrap_or_else(|| "0".to_string()),
        tokens: filter_zero_balances(tokens, include_zero),
        address,
    }))
}

pub async fn nfts(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<NftsQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let wanted = parse_token_type(query.token_type.as_deref())?;
    let include_zero = parse_bool_flag(query.include_zero.as_deref());
    let page = PageParams::from_query(&query.paging);

    let held = fetch_token_balances(&state.indexer, &address).await?;
    let nfts: Vec<TokenBalance> = filter_zero_balances(held, include_zero)
        .into_iter()
        .filter(|t| t.token_type.is_nft())
        .filter(|t| wanted.map_or(true, |w| t.token_type == w))
        .collect();

    let total = nfts.len() as u64;
    Ok(paginated_response(page.window(nfts), page.page, page.limit, total))
}

pub async fn tokens(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<TokensQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let include_zero = parse_bool_flag(query.include_zero.as_deref());
    let page = PageParams::from_query(&query.paging);

    let held = fetch_token_balances(&state.indexer, &address).await?;
    let erc20: Vec<TokenBalance> = filter_zero_balances(held, include_zero)
        .into_iter()
        .filter(|t| t.token_type == TokenStandard::Erc20)
        .collect();

    let total = erc20.len() as u64;
    let mut items = page.window(erc20);
    enrich_token_names(
        &state.indexer,
        &mut items,
        state.settings.enrichment_concurrency,
    )
    .await;

    Ok(paginated_response(items, page.page, page.limit, total))
}

/// Fills in missing token names from verified-contract records, at most
/// `concurrency` lookups in flight. A failed lookup leaves the name null.
pub(crate) async fn enrich_token_names(
    indexer: &IndexerClient,
    tokens: &mut [TokenBalance],
    concurrency: usize,
) {
    let unnamed: BTreeSet<String> = tokens
        .iter()
        .filter(|t| t.name.is_none())
        .map(|t| t.contract_address.clone())
        .collect();
    if unnamed.is_empty() {
        return;
    }

    let names: HashMap<String, Option<String>> = stream::iter(unnamed)
        .map(|contract| async move {
            let lookup = indexer
                .query::<VerifiedContractData>(
                    &queries::VERIFIED_CONTRACT,
                    json!({ "address": contract }),
                )
                .await;
            let name = match lookup {
                Ok(data) => data.verified_contract.and_then(|c| c.name),
                Err(err) => {
                    tracing::debug!(contract = %contract, "token name lookup failed: {}", err);
                    None
                }
            };
            (contract, name)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    for token in tokens.iter_mut().filter(|t| t.name.is_none()) {
        token.name = names.get(&token.contract_address).cloned().flatten();
    }
}

pub(crate) fn matches_direction(tx: &TransactionRow, address: &str, direction: TxDirection) -> bool {
    let sent = eth::addresses_equal(&tx.from, address);
    let received = tx
        .to
        .as_deref()
        .map_or(false, |to| eth::addresses_equal(to, address));
    match direction {
        TxDirection::All => true,
        TxDirection::In => received && !sent,
        TxDirection::Out => sent && !received,
        TxDirection::SelfTransfer => sent && received,
    }
}

pub async fn transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let direction = parse_tx_direction(query.filter.as_deref())?;
    let page = PageParams::from_query(&query.paging);

    let batch = match direction {
        TxDirection::All => page.limit,
        _ => page.limit * OVERFETCH_FACTOR,
    };
    let indexer = &state.indexer;
    let filled = fill_page(
        |offset, limit| {
            let vars = json!({ "address": address, "limit": limit, "offset": offset });
            async move {
                let data: TransactionsByAddressData = indexer
                    .query(&queries::TRANSACTIONS_BY_ADDRESS, vars)
                    .await?;
                Ok::<_, IndexerError>(data.transactions_by_address.unwrap_or_default())
            }
        },
        |row: TransactionRow| {
            matches_direction(&row, &address, direction).then(|| TransactionView::from(&row))
        },
        page.offset(),
        batch,
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

pub async fn transfers(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<TransfersQuery>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let wanted = parse_token_type(query.token_type.as_deref())?;
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(validate_address)
        .transpose()?;
    let page = PageParams::from_query(&query.paging);

    let indexer = &state.indexer;
    let filled = fill_page(
        |offset, limit| {
            let vars = json!({ "address": address, "limit": limit, "offset": offset });
            async move {
                let data: AddressLogsData = indexer.query(&queries::ADDRESS_LOGS, vars).await?;
                Ok::<_, IndexerError>(data.logs_by_participant.unwrap_or_default())
            }
        },
        |log: LogRow| {
            eth::decode_transfer(&log)
                .filter(|t| involves(t, &address))
                .filter(|t| wanted.map_or(true, |w| t.token_type == w))
                .filter(|t| token.as_deref().map_or(true, |c| t.token_address == c))
        },
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

fn involves(transfer: &TokenTransfer, address: &str) -> bool {
    transfer.from == address || transfer.to == address
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(balance: &str) -> TokenBalance {
        TokenBalance {
            contract_address: "0x01".into(),
            token_type: TokenStandard::Erc20,
            balance: balance.into(),
            token_id: None,
            name: None,
            symbol: None,
            decimals: None,
        }
    }

    #[test]
    fn zero_balances_dropped_by_default() {
        let balances = |list: &[TokenBalance]| -> Vec<String> {
            list.iter().map(|t| t.balance.clone()).collect()
        };
        let all = vec![token("0"), token("5"), token("0")];
        assert_eq!(balances(&filter_zero_balances(all.clone(), false)), vec!["5"]);
        assert_eq!(
            balances(&filter_zero_balances(all, true)),
            vec!["0", "5", "0"]
        );
    }

    #[test]
    fn direction_filter_is_case_insensitive() {
        let me = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let row = |from: &str, to: Option<&str>| -> TransactionRow {
            serde_json::from_value(json!({ "hash": "0x1", "from": from, "to": to })).unwrap()
        };
        let upper = me.to_uppercase().replace("0X", "0x");
        let incoming = row("0xbbbb", Some(&upper));
        let outgoing = row(&upper, None);
        let own = row(me, Some(&upper));

        assert!(matches_direction(&incoming, me, TxDirection::In));
        assert!(!matches_direction(&incoming, me, TxDirection::Out));
        assert!(matches_direction(&outgoing, me, TxDirection::Out));
        assert!(matches_direction(&own, me, TxDirection::SelfTransfer));
        assert!(!matches_direction(&own, me, TxDirection::In));
        assert!(matches_direction(&own, me, TxDirection::All));
    }
}
