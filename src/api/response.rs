//! JSON envelopes shared by every `/api/v1` route.

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_count: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total_count,
            total_pages: total_count.div_ceil(limit),
            has_next: page.saturating_mul(limit) < total_count,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct SuccessBody<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}


pub fn success_response<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(SuccessBody {
            success: true,
            data,
            pagination: None,
        }),
    )
        .into_response()
}

pub fn paginated_response<T: Serialize>(
    items: Vec<T>,
    page: u64,
    limit: u64,
    total_count: u64,
) -> Response {
    (
        StatusCode::OK,
        Json(SuccessBody {
            success: true,
            data: items,
            pagination: Some(Pagination::new(page, limit, total_count)),
        }),
    )
        .into_response()
}

pub fn api_error_response(error: &ApiError) -> Response {
    (
        error.status(),
        Json(ErrorBody {
            success: false,
            error: ErrorDetail {
                code: error.code(),
                message: error.to_string(),
            },
        }),
    )
        .into_response()
}

/// Middleware around the CORS layer: preflights it answered with an empty
/// 200 go out as 204.
pub async fn handle_cors_options(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// `page`/`limit` as they arrive in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    /// Unparseable or out-of-range values fall back to the defaults rather
    /// than rejecting the request.
    pub fn from_query(query: &PageQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u64>().ok())
            .map(|l| l.clamp(1, MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Slices an already filtered, fully fetched list down to this page.
    pub fn window<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> PageParams {
        PageParams::from_query(&PageQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        })
    }

    #[test]
    fn pagination_uses_ceiling_division() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(2, 20, 41);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);

        let p = Pagination::new(3, 20, 60);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next);
    }

    #[test]
    fn page_params_defaults_and_bounds() {
        assert_eq!(params(None, None), PageParams { page: 1, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(params(Some("0"), Some("0")), PageParams { page: 1, limit: 1 });
        assert_eq!(params(Some("x"), Some("5000")), PageParams { page: 1, limit: MAX_PAGE_SIZE });
        assert_eq!(params(Some("3"), Some("10")).offset(), 20);
    }

    #[test]
    fn window_applies_offset_and_limit() {
        let page = params(Some("2"), Some("2"));
        assert_eq!(page.window(vec![1, 2, 3, 4, 5]), vec![3, 4]);
        let page = params(Some("9"), Some("2"));
        assert!(page.window(vec![1, 2, 3]).is_empty());
    }

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn keys(value: &serde_json::Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    #[tokio::test]
    async fn envelopes_carry_only_declared_keys() {
        let body = body_of(success_response(1)).await;
        assert_eq!(keys(&body), ["data", "success"]);

        let body = body_of(paginated_response(vec![1], 1, 20, 1)).await;
        assert_eq!(keys(&body), ["data", "pagination", "success"]);
        assert_eq!(
            keys(&body["pagination"]),
            ["hasNext", "hasPrev", "limit", "page", "totalCount", "totalPages"]
        );

        let response = api_error_response(&ApiError::InvalidHash("x".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(keys(&body), ["error", "success"]);
        assert_eq!(keys(&body["error"]), ["code", "message"]);
    }
}
