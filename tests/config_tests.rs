mod support;

use std::fs;

use livebook::application::AdmissionPolicy;
use livebook::error::{ConfigError, Error};
use livebook::infrastructure::config::settings::Config;
use support::config::write_temp_config;

fn load(toml: &str) -> Result<Config, Error> {
    let path = write_temp_config(toml);
    let result = Config::load(&path);
    let _ = fs::remove_file(&path);
    result
}

fn assert_invalid(toml: &str, expected: &str) {
    match load(toml) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) if field == expected => {}
        Err(err) => panic!("Expected invalid {expected}, got {err}"),
        Ok(_) => panic!("Expected {expected} to be rejected"),
    }
}

#[test]
fn full_config_round_trips_every_section() {
    let config = load(
        r#"
[logging]
level = "debug"
format = "json"

[exchange]
identity_url = "https://identitysso-cert.betfair.com/api/certlogin"
api_url = "https://api.betfair.com/exchange/betting/rest/v1.0/"
cert_path = "/etc/livebook/client.crt"
key_path = "/etc/livebook/client.key"

[exchange.http]
timeout_ms = 5000

[tracking]
max_slots = 20
max_request_event_ids = 25
min_traded_volume = 500
lookahead_minutes = 90
market_type_codes = ["MATCH_ODDS", "OVER_UNDER_25"]

[schedule]
base_period_secs = 15
discovery_every_cycles = 4

[buffer]
max_pending_snapshots = 1000

[sinks.csv]
directory = "/var/lib/livebook"

[sinks.sqlite]
enabled = true
database = "/var/lib/livebook/records.db"
"#,
    )
    .expect("valid config");

    assert_eq!(config.logging.format, "json");
    assert_eq!(config.exchange.http.timeout_ms, 5000);
    assert_eq!(config.exchange.http.connect_timeout_ms, 3000);
    assert_eq!(config.tracking.max_slots, 20);
    assert_eq!(config.tracking.market_type_codes.len(), 2);
    assert_eq!(config.schedule.discovery_every_cycles, 4);
    assert_eq!(config.schedule.error_threshold, 10);
    assert_eq!(config.buffer.max_pending_snapshots, 1000);
    assert_eq!(config.sinks.enabled(), vec!["csv", "sqlite"]);
}

#[test]
fn config_rejects_zero_discovery_period() {
    assert_invalid(
        "[schedule]\ndiscovery_every_cycles = 0\n",
        "discovery_every_cycles",
    );
}

#[test]
fn config_rejects_zero_base_period() {
    assert_invalid("[schedule]\nbase_period_secs = 0\n", "base_period_secs");
}

#[test]
fn config_rejects_negative_volume_threshold() {
    assert_invalid("[tracking]\nmin_traded_volume = -1\n", "min_traded_volume");
}

#[test]
fn config_rejects_non_positive_lookahead() {
    assert_invalid("[tracking]\nlookahead_minutes = 0\n", "lookahead_minutes");
}

#[test]
fn config_rejects_lookahead_beyond_a_week() {
    assert_invalid(
        "[tracking]\nlookahead_minutes = 9223372036854775807\n",
        "lookahead_minutes",
    );
    assert_invalid("[tracking]\nlookahead_minutes = 10081\n", "lookahead_minutes");
}

#[test]
fn week_long_lookahead_builds_a_policy() {
    let config = load("[tracking]\nlookahead_minutes = 10080\n").unwrap();
    let policy = AdmissionPolicy::from(&config.tracking);
    assert_eq!(policy.lookahead, chrono::Duration::days(7));
}

#[test]
fn config_rejects_unknown_log_format() {
    assert_invalid("[logging]\nformat = \"xml\"\n", "format");
}

#[test]
fn config_rejects_api_url_without_trailing_slash() {
    assert_invalid(
        "[exchange]\napi_url = \"https://api.betfair.com/exchange/betting/rest/v1.0\"\n",
        "api_url",
    );
}

#[test]
fn config_requires_market_type_codes() {
    match load("[tracking]\nmarket_type_codes = []\n") {
        Err(Error::Config(ConfigError::MissingField {
            field: "market_type_codes",
        })) => {}
        Err(err) => panic!("Expected missing market_type_codes, got {err}"),
        Ok(_) => panic!("Expected empty market_type_codes to be rejected"),
    }
}

#[test]
fn missing_file_is_read_error() {
    let result = Config::load("/nonexistent/livebook/config.toml");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}
