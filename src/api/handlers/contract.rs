//! Contract metadata. Whether an address is a contract at all is decided
//! by [`is_contract`], not by inspecting bytecode.

use axum::extract::State;
use axum::response::Response;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::extract::Path;
use crate::api::response::success_response;
use crate::api::validate::validate_address;
use crate::api::AppState;
use crate::indexer::types::{
    ContractCreationData, ContractCreationRow, VerifiedContractData, VerifiedContractRow,
};
use crate::indexer::{queries, IndexerClient};
use crate::models::{parse_abi, ContractAbi, ContractInfo, ContractSource};

/// Heuristic: an address counts as a contract when the indexer recorded a
/// creation for it. Not authoritative.
pub(crate) fn is_contract(creation: Option<&ContractCreationRow>) -> bool {
    creation.is_some()
}

async fn fetch_contract(
    indexer: &IndexerClient,
    address: &str,
) -> Result<(ContractCreationRow, Option<VerifiedContractRow>), ApiError> {
    let vars = json!({ "address": address });
    let (creation, verified) = futures_util::try_join!(
        indexer.query::<ContractCreationData>(&queries::CONTRACT_CREATION, vars.clone()),
        indexer.query::<VerifiedContractData>(&queries::VERIFIED_CONTRACT, vars),
    )?;

    match creation.contract_creation {
        Some(row) if is_contract(Some(&row)) => Ok((row, verified.verified_contract)),
        _ => Err(ApiError::not_found("Contract", address)),
    }
}

pub async fn info(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let (creation, verified) = fetch_contract(&state.indexer, &address).await?;
    Ok(success_response(ContractInfo::new(
        address,
        creation,
        verified.as_ref(),
    )))
}

pub async fn abi(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let (_, verified) = fetch_contract(&state.indexer, &address).await?;
    let verified = verified.ok_or_else(|| ApiError::not_found("Verified contract", &address))?;
    Ok(success_response(ContractAbi {
        abi: parse_abi(verified.abi.as_deref()),
        name: verified.name,
        address,
    }))
}

pub async fn source(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Response, ApiError> {
    let address = validate_address(&address)?;
    let (_, verified) = fetch_contract(&state.indexer, &address).await?;
    let verified = verified.ok_or_else(|| ApiError::not_found("Verified contract", &address))?;
    Ok(success_response(ContractSource {
        address,
        name: verified.name,
        source_code: verified.source_code,
        compiler_version: verified.compiler_version,
        optimization_enabled: verified.optimization_enabled,
        optimization_runs: verified.optimization_runs,
        constructor_arguments: verified.constructor_arguments,
        evm_version: verified.evm_version,
        license_type: verified.license_type,
    }))
}
