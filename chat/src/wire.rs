//! Backend wire contract.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend exposes two JSON-over-HTTP endpoints. Transport lives in the
//! front ends (`reqwest` in `cli`, `gloo-net` in `client`); this module owns
//! the payload shapes, the error vocabulary, and the adapter that maps the
//! codes field across backend versions.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::{MoreInfoResult, NO_ANSWER_TEXT, ResultDetails};

pub const PROCESS_QUERY_PATH: &str = "/api/process-query";
pub const MORE_INFORMATION_PATH: &str = "/api/more-information";

/// Build an endpoint URL from a configured base URL and an API path.
#[must_use]
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, reset).
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),
    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),
    /// No response within the configured timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },
    /// The backend reported its own failure in the body.
    #[error("{0}")]
    Backend(String),
    /// The call was aborted because the session was torn down.
    #[error("request cancelled")]
    Cancelled,
}

// =============================================================================
// BACKEND CONTRACT
// =============================================================================

/// Naming of the result-codes field for a backend version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendContract {
    /// Canonical `codes` field.
    #[default]
    Current,
    /// Older warranty backend, which names the field `cust_conc_cds`.
    Legacy,
}

impl BackendContract {
    /// JSON field carrying result codes, both inside `results` and in the
    /// more-information request body.
    #[must_use]
    pub fn codes_field(self) -> &'static str {
        match self {
            Self::Current => "codes",
            Self::Legacy => "cust_conc_cds",
        }
    }

    /// Pull the code list out of a `results` payload.
    ///
    /// Non-object payloads (e.g. `text2sql` row arrays), a missing field, or
    /// non-string entries yield no codes.
    #[must_use]
    pub fn extract_codes(self, results: &Value) -> Vec<String> {
        results
            .get(self.codes_field())
            .and_then(Value::as_array)
            .map(|codes| codes.iter().filter_map(Value::as_str).map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

impl FromStr for BackendContract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown backend contract '{other}' (expected 'current' or 'legacy')")),
        }
    }
}

// =============================================================================
// PROCESS QUERY
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Body of a `process-query` response, decoded leniently and validated by
/// [`QueryResponse::into_answer`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub search_method: Option<String>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub results: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResponse {
    /// Validate the body and split it into answer text and details.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Backend`] when the body reports an error and
    /// [`ApiError::Decode`] when a required field is missing.
    pub fn into_answer(self, contract: BackendContract) -> Result<(String, ResultDetails), ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Backend(error));
        }
        let search_method = self.search_method.ok_or_else(|| missing("search_method"))?;
        let table_used = self.table_name.ok_or_else(|| missing("table_name"))?;
        let text = self
            .answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| NO_ANSWER_TEXT.to_owned());
        let codes = contract.extract_codes(&self.results);
        let details = ResultDetails {
            search_method,
            table_used,
            raw_results: self.results,
            codes,
            more_info: None,
            more_info_error: None,
        };
        Ok((text, details))
    }
}

// =============================================================================
// MORE INFORMATION
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoreInfoRequest {
    pub table_name: String,
    pub codes: Vec<String>,
}

impl MoreInfoRequest {
    /// JSON body with the codes field named per `contract`.
    #[must_use]
    pub fn to_body(&self, contract: BackendContract) -> Value {
        let mut body = Map::new();
        body.insert("table_name".to_owned(), Value::String(self.table_name.clone()));
        body.insert(
            contract.codes_field().to_owned(),
            Value::Array(self.codes.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(body)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MoreInfoResponse {
    #[serde(default)]
    pub overall_summary: Option<String>,
    #[serde(default)]
    pub concern_code_summaries: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub additional_results: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl MoreInfoResponse {
    /// Validate the body into a [`MoreInfoResult`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Backend`] when the body reports an error and
    /// [`ApiError::Decode`] when a required field is missing.
    pub fn into_result(self) -> Result<MoreInfoResult, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Backend(error));
        }
        Ok(MoreInfoResult {
            overall_summary: self.overall_summary.ok_or_else(|| missing("overall_summary"))?,
            concern_code_summaries: self
                .concern_code_summaries
                .ok_or_else(|| missing("concern_code_summaries"))?,
            additional_results: self.additional_results,
        })
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::Decode(format!("missing field `{field}`"))
}
