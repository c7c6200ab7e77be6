use super::*;
use clap::CommandFactory;

fn arg_env(id: &str) -> Option<String> {
    Cli::command()
        .get_arguments()
        .find(|a| a.get_id() == id)
        .and_then(|a| a.get_env())
        .map(|env| env.to_string_lossy().into_owned())
}

#[test]
fn flags_declare_their_environment_variables() {
    assert_eq!(arg_env("base_url").as_deref(), Some("WARRANTY_API_URL"));
    assert_eq!(arg_env("timeout_secs").as_deref(), Some("WARRANTY_TIMEOUT_SECS"));
    assert_eq!(arg_env("contract").as_deref(), Some("WARRANTY_BACKEND_CONTRACT"));
    assert_eq!(arg_env("drill_down_scope").as_deref(), Some("WARRANTY_DRILL_DOWN_SCOPE"));
}

#[test]
fn flags_override_config() {
    let cli = Cli::try_parse_from([
        "warranty-bot",
        "--base-url",
        "http://backend.test/",
        "--timeout-secs",
        "5",
        "--contract",
        "legacy",
        "--drill-down-scope",
        "triggering",
    ])
    .unwrap();

    let config = cli.session_config().unwrap();

    assert_eq!(config.base_url, "http://backend.test");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.contract, BackendContract::Legacy);
    assert_eq!(config.drill_down_scope, DrillDownScope::Triggering);
}

#[test]
fn more_info_requires_queries() {
    assert!(Cli::try_parse_from(["warranty-bot", "--more-info"]).is_err());
    assert!(Cli::try_parse_from(["warranty-bot", "-q", "brakes", "--more-info"]).is_ok());
}
