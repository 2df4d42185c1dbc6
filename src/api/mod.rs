pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod validate;

use std::any::Any;

use anyhow::{Context, Result};
use axum::handler::Handler;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use axum::routing::{get, MethodRouter};
use axum::{middleware, Json, Router};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::api::response::{api_error_response, handle_cors_options};
use crate::indexer::IndexerClient;

/// Tunables the handlers read on every request.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Upper bound on concurrent name lookups per account-tokens request.
    pub enrichment_concurrency: usize,
    /// How many recent transactions feed the gas estimate.
    pub gas_sample_size: u64,
    /// Reported for every tier when no gas price sample is available.
    pub default_gas_price_wei: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            enrichment_concurrency: 8,
            gas_sample_size: 100,
            default_gas_price_wei: 1_000_000_000,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub indexer: IndexerClient,
    pub settings: RelaySettings,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn endpoint<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler).fallback(method_not_allowed)
}

async fn method_not_allowed() -> ApiError {
    ApiError::Other {
        status: StatusCode::METHOD_NOT_ALLOWED,
        code: "METHOD_NOT_ALLOWED",
        message: "Only GET is supported".to_string(),
    }
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::not_found("Route", uri.path())
}

/// Preflights are answered here; `Access-Control-Allow-Origin: *` goes on
/// every other response.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    api_error_response(&ApiError::Other {
        status: StatusCode::BAD_GATEWAY,
        code: "INDEXER_CONNECTION_ERROR",
        message: "Failed to reach the indexer".to_string(),
    })
}

pub fn app_router(state: AppState) -> Router {
    use handlers::{account, block, contract, stats, token, tx, validators};

    let v1 = Router::new()
        .route("/account/:address", endpoint(account::summary))
        .route("/account/:address/balances", endpoint(account::balances))
        .route("/account/:address/tokens", endpoint(account::tokens))
        .route("/account/:address/nfts", endpoint(account::nfts))
        .route("/account/:address/transactions", endpoint(account::transactions))
        .route("/account/:address/transfers", endpoint(account::transfers))
        .route("/block/latest", endpoint(block::latest))
        .route("/block/:id", endpoint(block::by_number_or_hash))
        .route("/contract/:address", endpoint(contract::info))
        .route("/contract/:address/abi", endpoint(contract::abi))
        .route("/contract/:address/source", endpoint(contract::source))
        .route("/token/:address", endpoint(token::info))
        .route("/token/:address/holders", endpoint(token::holders))
        .route("/token/:address/transfers", endpoint(token::transfers))
        .route("/tx/:hash", endpoint(tx::by_hash))
        .route("/validators", endpoint(validators::list))
        .route("/stats", endpoint(stats::network))
        .route("/stats/gas", endpoint(stats::gas));

    Router::new()
        .route("/health", endpoint(health))
        .nest("/api/v1", v1)
        .fallback(unknown_route)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(middleware::from_fn(handle_cors_options))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(addr: &str, state: AppState) -> Result<()> {
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
