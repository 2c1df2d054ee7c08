//! Process configuration, read once at startup and shared read-only.

use std::fmt::{self, Debug};
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::services::origin_gate::{OriginPolicy, normalize_origin};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://onlinecourseformlm.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} contains an origin that is not a valid header value: {value:?}")]
    InvalidOrigin { var: &'static str, value: String },

    #[error("{var} lists no usable origins: {value:?}")]
    EmptyAllowList { var: &'static str, value: String },

    #[error("{var} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    /// Bearer credential for the upstream API. `None` when unset or blank.
    pub api_key: Option<String>,
    pub model: String,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub origin_policy: OriginPolicy,
    pub bind_addr: String,
}

// Keeps the credential out of logs.
impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("upstream_url", &self.upstream_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("origin_policy", &self.origin_policy)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                | Default                               |
    /// |-------------------------|---------------------------------------|
    /// | `OPENAI_API_KEY`        | unset                                 |
    /// | `OPENAI_MODEL`          | `gpt-4o-mini`                         |
    /// | `OPENAI_API_URL`        | `https://api.openai.com/v1/responses` |
    /// | `ALLOWED_ORIGINS`       | unset (comma list, enables allow-list)|
    /// | `ALLOWED_ORIGIN`        | `https://onlinecourseformlm.com`      |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                                  |
    /// | `BIND_ADDR`             | `0.0.0.0:3000`                        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let origin_policy = match non_blank("ALLOWED_ORIGINS") {
            Some(list) => {
                let origins: Vec<String> = list
                    .split(',')
                    .map(normalize_origin)
                    .filter(|o| !o.is_empty())
                    .collect();
                if origins.is_empty() {
                    return Err(ConfigError::EmptyAllowList {
                        var: "ALLOWED_ORIGINS",
                        value: list,
                    });
                }
                if let Some(bad) = origins.iter().find(|o| HeaderValue::from_str(o).is_err()) {
                    return Err(ConfigError::InvalidOrigin {
                        var: "ALLOWED_ORIGINS",
                        value: bad.clone(),
                    });
                }
                OriginPolicy::AllowList(origins)
            }
            None => {
                let origin = normalize_origin(
                    &non_blank("ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.into()),
                );
                let value = HeaderValue::from_str(&origin).map_err(|_| ConfigError::InvalidOrigin {
                    var: "ALLOWED_ORIGIN",
                    value: origin.clone(),
                })?;
                OriginPolicy::Fixed(value)
            }
        };

        let upstream_timeout = match non_blank("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: "UPSTREAM_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        Ok(Self {
            api_key: non_blank("OPENAI_API_KEY"),
            model: non_blank("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            upstream_url: non_blank("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.into()),
            upstream_timeout,
            origin_policy,
            bind_addr: non_blank("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.upstream_timeout, DEFAULT_UPSTREAM_TIMEOUT);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        match config.origin_policy {
            OriginPolicy::Fixed(v) => assert_eq!(v, DEFAULT_ALLOWED_ORIGIN),
            other => panic!("expected fixed policy, got {other:?}"),
        }
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn fixed_origin_is_trimmed_and_slash_stripped() {
        let config = config_from(&[("ALLOWED_ORIGIN", "  https://shop.example/ \n")]).unwrap();
        match config.origin_policy {
            OriginPolicy::Fixed(v) => assert_eq!(v, "https://shop.example"),
            other => panic!("expected fixed policy, got {other:?}"),
        }
    }

    #[test]
    fn origin_list_selects_allow_list() {
        let config = config_from(&[
            ("ALLOWED_ORIGINS", "https://a.example/, https://b.example,,"),
            ("ALLOWED_ORIGIN", "https://ignored.example"),
        ])
        .unwrap();
        match config.origin_policy {
            OriginPolicy::AllowList(list) => {
                assert_eq!(list, vec!["https://a.example", "https://b.example"])
            }
            other => panic!("expected allow-list, got {other:?}"),
        }
    }

    #[test]
    fn allow_list_without_origins_is_rejected() {
        for list in [", ,/", ",", "/ , /"] {
            assert!(
                matches!(
                    config_from(&[("ALLOWED_ORIGINS", list)]),
                    Err(ConfigError::EmptyAllowList { .. })
                ),
                "{list:?} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        assert!(matches!(
            config_from(&[("UPSTREAM_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            config_from(&[("UPSTREAM_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret-value")]).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<redacted>"));
    }
}
