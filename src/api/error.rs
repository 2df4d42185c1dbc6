use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::response::api_error_response;
use crate::indexer::IndexerError;

/// Every failure a handler can report to a client.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),
    #[error("Invalid hash format: {0}")]
    InvalidHash(String),
    #[error("Invalid value for parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
    /// The cause is logged, never rendered.
    #[error("Failed to reach the indexer")]
    IndexerConnection(#[source] IndexerError),
    #[error("{message}")]
    Other {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn invalid_parameter(name: &'static str, value: impl Into<String>) -> Self {
        ApiError::InvalidParameter {
            name,
            value: value.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAddress(_)
            | ApiError::InvalidHash(_)
            | ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::IndexerConnection(_) => StatusCode::BAD_GATEWAY,
            ApiError::Other { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidAddress(_) => "INVALID_ADDRESS",
            ApiError::InvalidHash(_) => "INVALID_HASH",
            ApiError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::IndexerConnection(_) => "INDEXER_CONNECTION_ERROR",
            ApiError::Other { code, .. } => *code,
        }
    }
}

impl From<IndexerError> for ApiError {
    fn from(err: IndexerError) -> Self {
        ApiError::IndexerConnection(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::IndexerConnection(cause) => {
                tracing::error!(error = %cause, "indexer failure while serving request");
            }
            ApiError::Other { status, .. } if status.is_server_error() => {
                tracing::error!(error = %self, "request failed");
            }
            _ => tracing::debug!(code = self.code(), "request rejected: {}", self),
        }
        api_error_response(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_and_codes() {
        let cases = [
            (ApiError::InvalidAddress("0x1".into()), 400, "INVALID_ADDRESS"),
            (ApiError::InvalidHash("0x1".into()), 400, "INVALID_HASH"),
            (ApiError::invalid_parameter("filter", "up"), 400, "INVALID_PARAMETER"),
            (ApiError::not_found("Block", "9"), 404, "NOT_FOUND"),
            (
                ApiError::from(IndexerError::MissingData),
                502,
                "INDEXER_CONNECTION_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn connection_error_hides_cause() {
        let err = ApiError::from(IndexerError::GraphQl(vec!["relation \"logs\" missing".into()]));
        assert_eq!(err.to_string(), "Failed to reach the indexer");
    }

    #[test]
    fn not_found_message_names_resource() {
        assert_eq!(
            ApiError::not_found("Transaction", "0xabc").to_string(),
            "Transaction not found: 0xabc"
        );
    }
}
