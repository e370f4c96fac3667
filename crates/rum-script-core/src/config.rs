use std::time::Duration;

use thiserror::Error;

use crate::template::ScriptSettings;

const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_WEB_CLIENT_VERSION: &str = "1.2.1";
const DEFAULT_APPLICATION_VERSION: &str = "1.0.0";
const DEFAULT_SCRIPT_KEY: &str = "rum.js";
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration of the uploader Lambda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    pub script: ScriptSettings,
    /// Object key the script is stored under in the website bucket.
    pub script_key: String,
    /// Timeout for each callback request.
    pub response_timeout: Duration,
    /// CloudWatch log stream of this invocation, referenced in failure reasons.
    pub log_stream: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {source}")]
    InvalidDuration {
        name: &'static str,
        #[source]
        source: humantime::DurationError,
    },
}

impl UploaderConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = var("RUM_REGION")
            .or_else(|| var("AWS_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let response_timeout = match var("RESPONSE_TIMEOUT") {
            Some(raw) => humantime::parse_duration(&raw).map_err(|source| {
                ConfigError::InvalidDuration {
                    name: "RESPONSE_TIMEOUT",
                    source,
                }
            })?,
            None => DEFAULT_RESPONSE_TIMEOUT,
        };

        Ok(Self {
            script: ScriptSettings {
                region,
                application_version: var("RUM_APPLICATION_VERSION")
                    .unwrap_or_else(|| DEFAULT_APPLICATION_VERSION.to_string()),
                web_client_version: var("RUM_WEB_CLIENT_VERSION")
                    .unwrap_or_else(|| DEFAULT_WEB_CLIENT_VERSION.to_string()),
            },
            script_key: var("RUM_SCRIPT_KEY").unwrap_or_else(|| DEFAULT_SCRIPT_KEY.to_string()),
            response_timeout,
            log_stream: var("AWS_LAMBDA_LOG_STREAM_NAME"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<UploaderConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        UploaderConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.script.region, "eu-west-1");
        assert_eq!(config.script.web_client_version, "1.2.1");
        assert_eq!(config.script.application_version, "1.0.0");
        assert_eq!(config.script_key, "rum.js");
        assert_eq!(config.response_timeout, Duration::from_secs(10));
        assert_eq!(config.log_stream, None);
    }

    #[test]
    fn rum_region_takes_precedence_over_lambda_region() {
        let config = load(&[("AWS_REGION", "us-west-2"), ("RUM_REGION", "eu-central-1")]).unwrap();
        assert_eq!(config.script.region, "eu-central-1");

        let config = load(&[("AWS_REGION", "us-west-2")]).unwrap();
        assert_eq!(config.script.region, "us-west-2");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("RUM_SCRIPT_KEY", "  ")]).unwrap();
        assert_eq!(config.script_key, "rum.js");
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("RUM_WEB_CLIENT_VERSION", "1.16.0"),
            ("RUM_APPLICATION_VERSION", "2.3.4"),
            ("RUM_SCRIPT_KEY", "assets/rum.js"),
            ("RESPONSE_TIMEOUT", "1m 30s"),
            ("AWS_LAMBDA_LOG_STREAM_NAME", "2022/04/18/[$LATEST]abc"),
        ])
        .unwrap();

        assert_eq!(config.script.web_client_version, "1.16.0");
        assert_eq!(config.script.application_version, "2.3.4");
        assert_eq!(config.script_key, "assets/rum.js");
        assert_eq!(config.response_timeout, Duration::from_secs(90));
        assert_eq!(config.log_stream.as_deref(), Some("2022/04/18/[$LATEST]abc"));
    }

    #[test]
    fn rejects_unparseable_timeout() {
        let err = load(&[("RESPONSE_TIMEOUT", "soon")]).unwrap_err();
        assert!(err.to_string().contains("RESPONSE_TIMEOUT"));
    }
}
