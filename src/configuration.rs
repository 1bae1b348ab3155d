use std::{path::PathBuf, time::Duration};

use reqwest::StatusCode;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::services::{RetryPolicy, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub fetcher: FetcherSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub record_delay_millis: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FetcherSettings {
    pub user_agent: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retry_status: u16,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retry_wait_secs: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl ApplicationSettings {
    pub fn record_delay(&self) -> Duration {
        Duration::from_millis(self.record_delay_millis)
    }
}

impl FetcherSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> anyhow::Result<RetryPolicy> {
        Ok(RetryPolicy {
            retry_status: StatusCode::from_u16(self.retry_status)?,
            wait: Duration::from_secs(self.retry_wait_secs),
            max_attempts: self.max_attempts,
        })
    }
}

/// Built-in defaults, then `configuration/base.yaml` if present, then
/// `APP_`-prefixed environment variables (`APP_FETCHER__RETRY_WAIT_SECS=5`).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.input_file", "job_titles.json")?
        .set_default("application.output_file", "jobs_with_metadata.json")?
        .set_default("application.record_delay_millis", 700_i64)?
        .set_default("fetcher.user_agent", DEFAULT_USER_AGENT)?
        .set_default("fetcher.timeout_secs", DEFAULT_TIMEOUT.as_secs() as i64)?
        .set_default("fetcher.retry_status", 406_i64)?
        .set_default("fetcher.retry_wait_secs", 120_i64)?
        .add_source(config::File::with_name("configuration/base").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher_settings() -> FetcherSettings {
        FetcherSettings {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
            retry_status: 406,
            retry_wait_secs: 120,
            max_attempts: None,
        }
    }

    #[test]
    fn defaults_match_default_retry_policy() {
        let settings = fetcher_settings();

        assert_eq!(settings.retry_policy().unwrap(), RetryPolicy::default());
        assert_eq!(settings.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn invalid_retry_status_is_rejected() {
        let settings = FetcherSettings {
            retry_status: 42,
            ..fetcher_settings()
        };

        assert!(settings.retry_policy().is_err());
    }

    #[test]
    fn numbers_may_arrive_as_strings() {
        let settings: ApplicationSettings = serde_json::from_str(
            r#"{"input_file": "in.json", "output_file": "out.json", "record_delay_millis": "250"}"#,
        )
        .unwrap();

        assert_eq!(settings.record_delay(), Duration::from_millis(250));
    }
}
