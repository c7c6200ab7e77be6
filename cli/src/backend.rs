//! `reqwest` implementation of the session backend.

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;

use std::time::Duration;

use chat::wire::{self, MORE_INFORMATION_PATH, PROCESS_QUERY_PATH};
use chat::{ApiError, Backend, BackendContract, MoreInfoRequest, MoreInfoResponse, QueryRequest, QueryResponse, SessionConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Build a client whose overall request timeout is the session timeout.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client fails to build.
    pub fn new(config: &SessionConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .build()?;
        Ok(Self { http, base_url: config.base_url.clone(), timeout: config.timeout })
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        let url = wire::endpoint(&self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!(%url, status = status.as_u16(), bytes = bytes.len(), "backend responded");
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout { secs: self.timeout.as_secs() }
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Backend for HttpBackend {
    async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        let body = serde_json::json!({ "query": request.query });
        self.post_json(PROCESS_QUERY_PATH, &body).await
    }

    async fn more_information(
        &self,
        request: &MoreInfoRequest,
        contract: BackendContract,
    ) -> Result<MoreInfoResponse, ApiError> {
        self.post_json(MORE_INFORMATION_PATH, &request.to_body(contract)).await
    }
}
