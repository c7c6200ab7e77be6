//! Conversation message model.

#[cfg(test)]
#[path = "message_test.rs"]
mod message_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Search method that makes an answer eligible for drill-down.
pub const VECTOR_SEARCH: &str = "vector_search";

/// Text used when the backend answers without an `answer` field.
pub const NO_ANSWER_TEXT: &str = "No answer provided";

/// A single entry in the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Text submitted by the user.
    User { text: String },
    /// Sentinel for an in-flight query. Always replaced once it settles.
    Loading,
    /// Answer (or synthetic error) produced for a query.
    Bot {
        text: String,
        #[serde(default)]
        details: Option<ResultDetails>,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn bot(text: impl Into<String>, details: Option<ResultDetails>) -> Self {
        Self::Bot { text: text.into(), details }
    }

    /// Synthetic bot message reporting a failed query.
    pub fn query_error(message: &str) -> Self {
        Self::Bot { text: format!("Error: {message}. Please try again."), details: None }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Structured details, when this is a bot answer that carries them.
    #[must_use]
    pub fn details(&self) -> Option<&ResultDetails> {
        match self {
            Self::Bot { details, .. } => details.as_ref(),
            Self::User { .. } | Self::Loading => None,
        }
    }

    pub fn details_mut(&mut self) -> Option<&mut ResultDetails> {
        match self {
            Self::Bot { details, .. } => details.as_mut(),
            Self::User { .. } | Self::Loading => None,
        }
    }
}

/// Structured result attached to a bot answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultDetails {
    pub search_method: String,
    pub table_used: String,
    /// Opaque backend payload; displayed, never interpreted beyond `codes`.
    pub raw_results: Value,
    /// Identifiers extracted from `raw_results`, the key for drill-down.
    pub codes: Vec<String>,
    #[serde(default)]
    pub more_info: Option<MoreInfoResult>,
    /// Inline error from the last failed drill-down on this message.
    #[serde(default)]
    pub more_info_error: Option<String>,
}

impl ResultDetails {
    /// Whether a "more information" request may be issued for this answer.
    ///
    /// Requires the vector search method and at least one code to send.
    #[must_use]
    pub fn is_drill_down_eligible(&self) -> bool {
        self.search_method == VECTOR_SEARCH && !self.codes.is_empty()
    }
}

/// Enriched detail fetched by a drill-down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoreInfoResult {
    pub overall_summary: String,
    pub concern_code_summaries: BTreeMap<String, String>,
    /// Raw rows the summaries were built from, `Null` when not returned.
    #[serde(default)]
    pub additional_results: Value,
}
