use axum::extract::State;
use axum::response::Response;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::extract::Path;
use crate::api::response::success_response;
use crate::api::validate::validate_hash;
use crate::api::AppState;
use crate::eth;
use crate::indexer::queries;
use crate::indexer::types::{TransactionData, TransactionRow};
use crate::models::{TransactionDetail, TransactionView};

/// `GET /api/v1/tx/{hash}`
pub async fn by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    let hash = validate_hash(&hash)?;
    let data: TransactionData = state
        .indexer
        .query(&queries::TRANSACTION, json!({ "hash": hash }))
        .await?;
    let row = data
        .transaction
        .ok_or_else(|| ApiError::not_found("Transaction", &hash))?;
    Ok(success_response(transaction_detail(&row)))
}

pub(crate) fn transaction_detail(row: &TransactionRow) -> TransactionDetail {
    let receipt = row.receipt.as_ref();
    TransactionDetail {
        transaction: TransactionView::from(row),
        contract_address: receipt
            .and_then(|r| r.contract_address.as_deref())
            .map(eth::normalize_hex),
        token_transfers: receipt
            .map(|r| r.logs.iter().filter_map(eth::decode_transfer).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eth::TRANSFER_EVENT_SIGNATURE;
    use crate::models::TxStatus;

    #[test]
    fn detail_decodes_receipt_transfers() {
        let from = format!("0x{:0>64}", "aa");
        let to = format!("0x{:0>64}", "bb");
        let row: TransactionRow = serde_json::from_value(json!({
            "hash": "0x01",
            "from": "0xaa",
            "to": "0xCC",
            "value": "0",
            "gas": "21000",
            "nonce": 0,
            "receipt": {
                "status": 1,
                "contractAddress": "0xDEAD",
                "logs": [
                    {
                        "address": "0xCC",
                        "topics": [TRANSFER_EVENT_SIGNATURE, from, to],
                        "data": "0x64",
                        "blockNumber": 7,
                        "transactionHash": "0x01",
                        "logIndex": 0
                    },
                    {
                        "address": "0xCC",
                        "topics": ["0x1234"],
                        "data": "0x",
                        "blockNumber": 7,
                        "transactionHash": "0x01",
                        "logIndex": 1
                    }
                ]
            }
        }))
        .unwrap();

        let detail = transaction_detail(&row);
        assert_eq!(detail.transaction.status, TxStatus::Success);
        assert_eq!(detail.contract_address.as_deref(), Some("0xdead"));
        assert_eq!(detail.token_transfers.len(), 1);
        assert_eq!(detail.token_transfers[0].value, "100");
    }

    #[test]
    fn pending_transaction_has_no_transfers() {
        let row: TransactionRow = serde_json::from_value(json!({
            "hash": "0x01",
            "from": "0xaa",
            "value": "0",
            "gas": "21000",
            "nonce": 0
        }))
        .unwrap();
        let detail = transaction_detail(&row);
        assert_eq!(detail.transaction.status, TxStatus::Pending);
        assert!(detail.token_transfers.is_empty());
        assert!(detail.contract_address.is_none());
    }
}
