use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::extract::Query;
use crate::api::response::{paginated_response, PageParams, PageQuery};
use crate::api::validate::{parse_validator_status, ValidatorStatus};
use crate::api::AppState;
use crate::indexer::queries;
use crate::indexer::types::{ValidatorRow, ValidatorsData};
use crate::models::ValidatorView;

#[derive(Debug, Default, Deserialize)]
pub struct ValidatorsQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub status: Option<String>,
}

fn matches_status(row: &ValidatorRow, status: ValidatorStatus) -> bool {
    match status {
        ValidatorStatus::All => true,
        ValidatorStatus::Active => row.active,
        ValidatorStatus::Inactive => !row.active,
    }
}

/// `GET /api/v1/validators`
///
/// The indexer returns the whole set, so filtering and paging happen here.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ValidatorsQuery>,
) -> Result<Response, ApiError> {
    let status = parse_validator_status(query.status.as_deref())?;
    let page = PageParams::from_query(&query.paging);

    let data: ValidatorsData = state.indexer.query(&queries::VALIDATORS, json!({})).await?;
    let selected: Vec<ValidatorView> = data
        .validators
        .into_iter()
        .filter(|row| matches_status(row, status))
        .map(ValidatorView::from)
        .collect();

    let total = selected.len() as u64;
    Ok(paginated_response(
        page.window(selected),
        page.page,
        page.limit,
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(active: bool) -> ValidatorRow {
        ValidatorRow {
            address: "0xaa".to_string(),
            active,
        }
    }

    #[test]
    fn status_filter() {
        assert!(matches_status(&row(true), ValidatorStatus::Active));
        assert!(!matches_status(&row(false), ValidatorStatus::Active));
        assert!(matches_status(&row(false), ValidatorStatus::Inactive));
        assert!(matches_status(&row(false), ValidatorStatus::All));
    }
}
