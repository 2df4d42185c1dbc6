use axum::extract::State;
use axum::response::Response;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::extract::Path;
use crate::api::response::success_response;
use crate::api::validate::{parse_block_id, BlockId};
use crate::api::AppState;
use crate::indexer::types::{BlockByHashData, BlockByNumberData, BlockRow, LatestHeightData};
use crate::indexer::{queries, IndexerClient};
use crate::models::BlockView;

async fn fetch_block(indexer: &IndexerClient, id: &BlockId) -> Result<Option<BlockRow>, ApiError> {
    let row = match id {
        BlockId::Number(number) => {
            indexer
                .query::<BlockByNumberData>(
                    &queries::BLOCK_BY_NUMBER,
                    json!({ "number": number.to_string() }),
                )
                .await?
                .block
        }
        BlockId::Hash(hash) => {
            indexer
                .query::<BlockByHashData>(&queries::BLOCK_BY_HASH, json!({ "hash": hash }))
                .await?
                .block_by_hash
        }
    };
    Ok(row)
}

/// `GET /api/v1/block/{numberOrHash}`
pub async fn by_number_or_hash(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let block_id = parse_block_id(&id)?;
    let block = fetch_block(&state.indexer, &block_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Block", block_id.to_string()))?;
    Ok(success_response(BlockView::from(block)))
}

/// `GET /api/v1/block/latest`
///
/// Height and block are read in two steps, so a block produced in between
/// is not reflected.
pub async fn latest(State(state): State<AppState>) -> Result<Response, ApiError> {
    let height: LatestHeightData = state
        .indexer
        .query(&queries::LATEST_HEIGHT, json!({}))
        .await?;
    let block = fetch_block(&state.indexer, &BlockId::Number(height.latest_height))
        .await?
        .ok_or_else(|| ApiError::not_found("Block", height.latest_height.to_string()))?;
    Ok(success_response(BlockView::from(block)))
}
