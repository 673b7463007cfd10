//! Application configuration loaded from `tibber.toml` and `TIBBER_*` environment variables.

use crate::tibber::{PolicyError, StatusPolicy, StatusPolicyConfig};
use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use fundu::{DurationParser, TimeUnit};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Default GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.tibber.com/v1-beta/gql";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Log level for the `tibber` crate, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Personal access token sent as a bearer token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Accepts plain seconds (`30`) or a unit suffix (`1500ms`, `2m`).
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    #[serde(default)]
    pub status_policy: StatusPolicyConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    /// Layered sources: `tibber.toml`, then `TIBBER_*` variables (`__` separates nested keys).
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("tibber.toml"))
            .merge(Env::prefixed("TIBBER_").split("__"))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::figment()
            .extract()
            .context("Failed to load config")
    }

    /// Build the validated status policy, rejecting overlapping sets.
    pub fn status_policy(&self) -> Result<StatusPolicy, PolicyError> {
        StatusPolicy::new(self.status_policy.clone())
    }
}

const TIME_UNITS: &[TimeUnit] = &[TimeUnit::MilliSecond, TimeUnit::Second, TimeUnit::Minute];

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DurationValue {
        Seconds(u64),
        Text(String),
    }

    match DurationValue::deserialize(deserializer)? {
        DurationValue::Seconds(secs) => Ok(Duration::from_secs(secs)),
        DurationValue::Text(text) => {
            let parsed = DurationParser::with_time_units(TIME_UNITS)
                .parse(text.trim())
                .map_err(|e| D::Error::custom(format!("invalid duration '{text}': {e}")))?;
            Duration::try_from(parsed)
                .map_err(|e| D::Error::custom(format!("duration '{text}' out of range: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn defaults_without_any_source() {
        figment::Jail::expect_with(|_jail| {
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.log_level, "info");
            assert_eq!(config.api_url, DEFAULT_API_URL);
            assert_eq!(config.access_token, None);
            assert_eq!(config.request_timeout, Duration::from_secs(30));
            assert_eq!(config.status_policy().unwrap(), StatusPolicy::default());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TIBBER_ACCESS_TOKEN", "token-123");
            jail.set_env("TIBBER_LOG_LEVEL", "debug");
            jail.set_env("TIBBER_REQUEST_TIMEOUT", "1500ms");
            jail.set_env("TIBBER_STATUS_POLICY__RETRIABLE", "[429, 503]");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.access_token.as_deref(), Some("token-123"));
            assert_eq!(config.log_level, "debug");
            assert_eq!(config.request_timeout, Duration::from_millis(1500));
            assert_eq!(config.status_policy.retriable, BTreeSet::from([429, 503]));
            assert_eq!(config.status_policy.fatal, BTreeSet::from([400, 401, 403, 404]));
            Ok(())
        });
    }

    #[test]
    fn toml_file_with_env_precedence() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "tibber.toml",
                r#"
                    api_url = "http://localhost:8080/gql"
                    request_timeout = 5

                    [status_policy]
                    fatal = [400, 401, 403, 404, 422]
                "#,
            )?;
            jail.set_env("TIBBER_API_URL", "http://localhost:9090/gql");

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.api_url, "http://localhost:9090/gql");
            assert_eq!(config.request_timeout, Duration::from_secs(5));
            assert!(config.status_policy.fatal.contains(&422));
            Ok(())
        });
    }

    #[test]
    fn overlapping_policy_is_rejected_at_startup() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TIBBER_STATUS_POLICY__FATAL", "[400, 503]");

            let config: Config = Config::figment().extract()?;
            assert!(matches!(
                config.status_policy(),
                Err(PolicyError::Overlap { first: "retriable", second: "fatal", .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn invalid_duration_fails_extraction() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TIBBER_REQUEST_TIMEOUT", "soon");
            assert!(Config::figment().extract::<Config>().is_err());
            Ok(())
        });
    }
}
