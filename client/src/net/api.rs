//! Backend transport for the browser.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`, raced against a
//! `gloo-timers` timeout.
//! Native builds: stubs returning [`ApiError::Network`] since these
//! endpoints are only reachable from the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is mapped onto [`ApiError`] so the session can turn it into
//! a bot message or an inline drill-down error. Nothing here panics.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use chat::wire::{self, MORE_INFORMATION_PATH, PROCESS_QUERY_PATH};
use chat::{ApiError, Backend, BackendContract, MoreInfoRequest, MoreInfoResponse, QueryRequest, QueryResponse, SessionConfig};

/// `gloo-net` implementation of [`Backend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlooBackend {
    base_url: String,
    timeout: Duration,
}

impl GlooBackend {
    pub fn new(config: &SessionConfig) -> Self {
        Self { base_url: config.base_url.clone(), timeout: config.timeout }
    }

    pub fn query_url(&self) -> String {
        wire::endpoint(&self.base_url, PROCESS_QUERY_PATH)
    }

    pub fn more_information_url(&self) -> String {
        wire::endpoint(&self.base_url, MORE_INFORMATION_PATH)
    }

    #[cfg(feature = "csr")]
    async fn post<T: serde::de::DeserializeOwned>(&self, url: &str, body: &serde_json::Value) -> Result<T, ApiError> {
        use futures::future::{Either, select};
        use gloo_timers::future::TimeoutFuture;

        let request = async {
            let resp = gloo_net::http::Request::post(url)
                .json(body)
                .map_err(|e| ApiError::Network(e.to_string()))?
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            if !resp.ok() {
                return Err(ApiError::HttpStatus(resp.status()));
            }
            resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
        };

        let timer = TimeoutFuture::new(timeout_millis(self.timeout));
        match select(Box::pin(request), Box::pin(timer)).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => {
                log::warn!("request to {url} timed out");
                Err(timed_out(self.timeout))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Backend for GlooBackend {
    async fn process_query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        #[cfg(feature = "csr")]
        {
            let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
            self.post(&self.query_url(), &body).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = request;
            Err(unavailable())
        }
    }

    async fn more_information(
        &self,
        request: &MoreInfoRequest,
        contract: BackendContract,
    ) -> Result<MoreInfoResponse, ApiError> {
        #[cfg(feature = "csr")]
        {
            self.post(&self.more_information_url(), &request.to_body(contract)).await
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (request, contract);
            Err(unavailable())
        }
    }
}

/// Timer length for `gloo-timers`, which takes whole milliseconds as `u32`.
#[cfg(any(test, feature = "csr"))]
fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(any(test, feature = "csr"))]
fn timed_out(timeout: Duration) -> ApiError {
    ApiError::Timeout { secs: timeout.as_secs() }
}

#[cfg(not(feature = "csr"))]
fn unavailable() -> ApiError {
    ApiError::Network("not available outside the browser".to_owned())
}
