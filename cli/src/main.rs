//! Terminal front end for the warranty assistant.
//!
//! Interactive by default; `--query` asks one or more questions and exits,
//! which makes the binary usable from scripts.

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

mod backend;
mod render;
mod repl;

use std::io::IsTerminal;
use std::time::Duration;

use chat::{BackendContract, ChatSession, ConfigError, DispatchError, Dispatcher, DrillDownScope, SessionConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backend::HttpBackend;
use crate::render::Renderer;
use crate::repl::Repl;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client build failed: {0}")]
    HttpClientBuild(#[from] reqwest::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Flags read their `WARRANTY_*` variable when not passed on the command
/// line; anything still unset comes from `SessionConfig::from_env`.
#[derive(Parser, Debug)]
#[command(name = "warranty-bot", about = "Ask the warranty assistant from the terminal")]
struct Cli {
    /// Backend origin (http://127.0.0.1:8000 when unset).
    #[arg(long, env = "WARRANTY_API_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds (60 when unset).
    #[arg(long, env = "WARRANTY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Codes field naming, `current` or `legacy`.
    #[arg(long, env = "WARRANTY_BACKEND_CONTRACT")]
    contract: Option<BackendContract>,

    /// Answers a drill-down updates, `all` or `triggering`.
    #[arg(long, env = "WARRANTY_DRILL_DOWN_SCOPE")]
    drill_down_scope: Option<DrillDownScope>,

    /// Ask these questions in order and exit instead of starting the prompt.
    #[arg(short, long = "query")]
    queries: Vec<String>,

    /// With `--query`, also fetch more information for the eligible answers.
    #[arg(long, default_value_t = false, requires = "queries")]
    more_info: bool,

    /// Disable ANSI colors.
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let mut config = SessionConfig::from_env()?;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        } else if config.base_url.is_empty() {
            config = config.with_base_url(DEFAULT_BASE_URL);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(contract) = self.contract {
            config.contract = contract;
        }
        if let Some(scope) = self.drill_down_scope {
            config.drill_down_scope = scope;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with the transcript.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.session_config()?;
    info!(base_url = %config.base_url, timeout_secs = config.timeout.as_secs(), "starting");

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let dispatcher = Dispatcher::new(HttpBackend::new(&config)?);
    let mut repl = Repl::new(dispatcher, ChatSession::new(config), Renderer::new(color));

    if cli.queries.is_empty() {
        return repl.run().await;
    }
    repl.run_batch(&cli.queries, cli.more_info, &mut tokio::io::stdout()).await
}
