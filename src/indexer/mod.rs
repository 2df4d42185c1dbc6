//! GraphQL client for the upstream indexer.
//!
//! Handlers talk to [`IndexerClient`], which wraps any [`Indexer`]
//! executor. The production executor is [`HttpIndexer`].

pub mod queries;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum IndexerError {
    #[error("indexer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("indexer did not answer within {0:?}")]
    Timeout(Duration),
    #[error("indexer returned HTTP {0}")]
    Status(u16),
    #[error("indexer reported errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    #[error("indexer response carried no data")]
    MissingData,
    #[error("unexpected indexer response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One GraphQL operation: document, operation name and variables.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub operation_name: &'static str,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn new(operation: &queries::Operation, variables: Value) -> Self {
        Self {
            query: operation.document,
            operation_name: operation.name,
            variables,
        }
    }
}

/// Executes a GraphQL operation and returns its `data` object.
#[async_trait]
pub trait Indexer: Send + Sync {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, IndexerError>;
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

pub struct HttpIndexer {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpIndexer {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, IndexerError> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl Indexer for HttpIndexer {
    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, IndexerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexerError::Status(status.as_u16()));
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| self.classify(e))?;
        if !body.errors.is_empty() {
            return Err(IndexerError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        body.data.ok_or(IndexerError::MissingData)
    }
}

impl HttpIndexer {
    fn classify(&self, err: reqwest::Error) -> IndexerError {
        if err.is_timeout() {
            IndexerError::Timeout(self.timeout)
        } else {
            IndexerError::Transport(err)
        }
    }
}

/// Cheap-to-clone handle shared by every request.
#[derive(Clone)]
pub struct IndexerClient {
    inner: Arc<dyn Indexer>,
    timeout: Duration,
}

impl IndexerClient {
    pub fn new(inner: Arc<dyn Indexer>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Runs one operation and decodes its `data` into `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        operation: &queries::Operation,
        variables: Value,
    ) -> Result<T, IndexerError> {
        let request = GraphQlRequest::new(operation, variables);
        let data = self.execute(&request).await?;
        serde_json::from_value(data).map_err(|e| {
            tracing::warn!(operation = operation.name, "failed to decode indexer data: {}", e);
            IndexerError::Decode(e)
        })
    }

    /// Runs all operations concurrently. The first failure fails the batch
    /// and drops the calls still in flight.
    pub async fn query_parallel(
        &self,
        requests: Vec<GraphQlRequest>,
    ) -> Result<Vec<Value>, IndexerError> {
        try_join_all(requests.iter().map(|request| self.execute(request))).await
    }

    async fn execute(&self, request: &GraphQlRequest) -> Result<Value, IndexerError> {
        tracing::debug!(operation = request.operation_name, "indexer query");
        match tokio::time::timeout(self.timeout, self.inner.execute(request)).await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(err)) => {
                tracing::warn!(operation = request.operation_name, "indexer query failed: {}", err);
                Err(err)
            }
            Err(_) => {
                tracing::warn!(operation = request.operation_name, "indexer query timed out");
                Err(IndexerError::Timeout(self.timeout))
            }
        }
    }
}

/// Decodes one element of a [`IndexerClient::query_parallel`] result.
pub fn decode<T: DeserializeOwned>(data: Value) -> Result<T, IndexerError> {
    Ok(serde_json::from_value(data)?)
}
