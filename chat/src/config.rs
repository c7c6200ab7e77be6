//! Session configuration, injected at construction.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::wire::BackendContract;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "What are the most frequent issues reported with sunroof leakage?",
    "Which diagnostic trouble codes have the highest repair costs?",
    "What do customers say about infotainment system freezes?",
    "Summarize warranty claims related to brake noise.",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Which messages a successful drill-down writes into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrillDownScope {
    /// Every drill-down eligible answer in the conversation.
    #[default]
    AllEligible,
    /// Only the answer whose control was activated.
    Triggering,
}

impl FromStr for DrillDownScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all_eligible" => Ok(Self::AllEligible),
            "triggering" | "single" => Ok(Self::Triggering),
            other => Err(format!("unknown drill-down scope '{other}' (expected 'all' or 'triggering')")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend origin; empty means same origin.
    pub base_url: String,
    pub timeout: Duration,
    pub contract: BackendContract,
    pub drill_down_scope: DrillDownScope,
    /// Prompts offered as one-click suggestion tiles.
    pub suggestions: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            contract: BackendContract::default(),
            drill_down_scope: DrillDownScope::default(),
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `WARRANTY_API_URL`: backend origin (default same origin)
    /// - `WARRANTY_TIMEOUT_SECS`: default 60
    /// - `WARRANTY_BACKEND_CONTRACT`: `current` (default) or `legacy`
    /// - `WARRANTY_DRILL_DOWN_SCOPE`: `all` (default) or `triggering`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("WARRANTY_API_URL") {
            config = config.with_base_url(url);
        }
        if let Some(secs) = env_parse::<u64>("WARRANTY_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(contract) = env_parse::<BackendContract>("WARRANTY_BACKEND_CONTRACT")? {
            config.contract = contract;
        }
        if let Some(scope) = env_parse::<DrillDownScope>("WARRANTY_DRILL_DOWN_SCOPE")? {
            config.drill_down_scope = scope;
        }
        Ok(config)
    }
}

fn env_parse<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid { var, message: e.to_string() }),
        Err(_) => Ok(None),
    }
}
