//! Configuration resolution and graceful degradation tests
//!
//! Uses serial_test to prevent ENV variable races: every test that reads or writes
//! `TLA_*` variables is marked #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tla_common::config::{
    load_toml_config, load_toml_config_or_default, CliOverrides, CompiledDefaults, Settings,
    TomlConfig, ENV_ANALYZING_MIN_DELAY_MS, ENV_GEMINI_API_KEY, ENV_PORT, PLACEHOLDER_API_KEY,
};

const ALL_VARS: &[&str] = &[
    "TLA_HOST",
    "TLA_PORT",
    "TLA_LOG_LEVEL",
    "TLA_GEMINI_API_KEY",
    "TLA_GEMINI_MODEL",
    "TLA_GEMINI_BASE_URL",
    "TLA_SUBMISSION_WEBHOOK_URL",
    "TLA_RESULTS_WEBHOOK_URL",
    "TLA_BOOKING_URL",
    "TLA_ANALYZING_MIN_DELAY_MS",
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default());

    assert_eq!(settings.host, CompiledDefaults::HOST);
    assert_eq!(settings.port, CompiledDefaults::PORT);
    assert_eq!(settings.analyzing_min_delay, Duration::from_secs(2));
    assert_eq!(settings.gemini.model, "gemini-2.0-flash");
    assert!(settings.webhooks.submission_url.is_some());
    assert!(settings.webhooks.results_url.is_some());
    assert!(settings.analytics_enabled);
}

#[test]
#[serial]
fn test_missing_api_key_substitutes_placeholder() {
    clear_env();

    let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default());

    assert_eq!(settings.gemini.api_key, PLACEHOLDER_API_KEY);
    assert!(!settings.gemini.api_key_configured);
}

#[test]
#[serial]
fn test_env_api_key_beats_toml() {
    clear_env();
    env::set_var(ENV_GEMINI_API_KEY, "env-key");

    let mut toml = TomlConfig::default();
    toml.gemini.api_key = Some("toml-key".to_string());

    let settings = Settings::resolve(&CliOverrides::default(), &toml);
    assert_eq!(settings.gemini.api_key, "env-key");
    assert!(settings.gemini.api_key_configured);

    clear_env();
}

#[test]
#[serial]
fn test_whitespace_api_key_is_not_configured() {
    clear_env();

    let mut toml = TomlConfig::default();
    toml.gemini.api_key = Some("   ".to_string());

    let settings = Settings::resolve(&CliOverrides::default(), &toml);
    assert!(!settings.gemini.api_key_configured);
}

#[test]
#[serial]
fn test_cli_beats_env_beats_toml_for_port() {
    clear_env();
    env::set_var(ENV_PORT, "6001");

    let toml = TomlConfig {
        port: Some(6002),
        ..Default::default()
    };

    let from_env = Settings::resolve(&CliOverrides::default(), &toml);
    assert_eq!(from_env.port, 6001);

    let cli = CliOverrides {
        port: Some(6000),
        ..Default::default()
    };
    let from_cli = Settings::resolve(&cli, &toml);
    assert_eq!(from_cli.port, 6000);

    env::remove_var(ENV_PORT);
    let from_toml = Settings::resolve(&CliOverrides::default(), &toml);
    assert_eq!(from_toml.port, 6002);
}

#[test]
#[serial]
fn test_unparseable_env_value_is_ignored() {
    clear_env();
    env::set_var(ENV_ANALYZING_MIN_DELAY_MS, "soon");

    let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default());
    assert_eq!(
        settings.analyzing_min_delay,
        Duration::from_millis(CompiledDefaults::ANALYZING_MIN_DELAY_MS)
    );

    clear_env();
}

#[test]
#[serial]
fn test_toml_file_sections_parse() {
    clear_env();

    let file = write_toml(
        r#"
port = 7000
analyzing_min_delay_ms = 500

[logging]
level = "debug"

[gemini]
api_key = "file-key"
model = "gemini-test"

[webhooks]
submission_url = "http://localhost:9000/submit"
send_results = false

[analytics]
enabled = false
event_capacity = 8
"#,
    );

    let toml = load_toml_config(file.path()).unwrap();
    let settings = Settings::resolve(&CliOverrides::default(), &toml);

    assert_eq!(settings.port, 7000);
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.analyzing_min_delay, Duration::from_millis(500));
    assert_eq!(settings.gemini.api_key, "file-key");
    assert_eq!(settings.gemini.model, "gemini-test");
    assert_eq!(
        settings.webhooks.submission_url.as_deref(),
        Some("http://localhost:9000/submit")
    );
    assert!(settings.webhooks.results_url.is_none());
    assert!(!settings.analytics_enabled);
    assert_eq!(settings.event_capacity, 8);
}

#[test]
#[serial]
fn test_zero_event_capacity_falls_back_to_default() {
    clear_env();

    let file = write_toml(
        r#"
[analytics]
event_capacity = 0
"#,
    );
    let toml = load_toml_config(file.path()).unwrap();
    let settings = Settings::resolve(&CliOverrides::default(), &toml);

    assert_eq!(settings.event_capacity, CompiledDefaults::EVENT_CAPACITY);
}

#[test]
#[serial]
fn test_blank_webhook_url_disables_notification() {
    clear_env();

    let file = write_toml(
        r#"
[webhooks]
submission_url = ""
"#,
    );
    let toml = load_toml_config(file.path()).unwrap();
    let settings = Settings::resolve(&CliOverrides::default(), &toml);

    assert!(settings.webhooks.submission_url.is_none());
}

#[test]
fn test_malformed_toml_degrades_to_defaults() {
    let file = write_toml("port = \"not a number\"\n[[[");

    assert!(load_toml_config(file.path()).is_err());
    assert_eq!(load_toml_config_or_default(Some(file.path())), TomlConfig::default());
}

#[test]
fn test_missing_explicit_file_degrades_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    assert_eq!(load_toml_config_or_default(Some(&missing)), TomlConfig::default());
}
