use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::analysis::{
    DEFAULT_HUGGINGFACE_API_URL, DEFAULT_HUGGINGFACE_MODEL, DEFAULT_MISTRAL_API_URL,
    DEFAULT_MISTRAL_MODEL, DEFAULT_MYMEMORY_API_URL,
};

/// Application-level constants
pub const APP_NAME: &str = "AgleCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "aglecare_lib=info,tower_http=info"
}

/// Get the application data directory
/// ~/AgleCare/ on all platforms, or the working directory when no home
/// directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database location.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("aglecare.db")
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Endpoint, model and credentials for one completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl ProviderSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

/// Runtime configuration of the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub huggingface: ProviderSettings,
    pub mistral: ProviderSettings,
    pub provider_timeout_secs: u64,
    pub translation_enabled: bool,
    pub mymemory_api_url: String,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_raw = get("AGLECARE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                name: "AGLECARE_BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let db_path = get("AGLECARE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let provider_timeout_secs = match get("AGLECARE_PROVIDER_TIMEOUT_SECS") {
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        name: "AGLECARE_PROVIDER_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be greater than zero".into(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        name: "AGLECARE_PROVIDER_TIMEOUT_SECS",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
        };

        let translation_enabled = match get("AGLECARE_TRANSLATION_ENABLED") {
            None => true,
            Some(raw) => parse_bool("AGLECARE_TRANSLATION_ENABLED", &raw)?,
        };

        Ok(Self {
            bind_addr,
            db_path,
            huggingface: ProviderSettings {
                api_url: get("HUGGINGFACE_API_URL")
                    .unwrap_or_else(|| DEFAULT_HUGGINGFACE_API_URL.to_string()),
                model: get("HUGGINGFACE_MODEL")
                    .unwrap_or_else(|| DEFAULT_HUGGINGFACE_MODEL.to_string()),
                api_key: get("HUGGINGFACE_API_KEY"),
            },
            mistral: ProviderSettings {
                api_url: get("MISTRAL_API_URL")
                    .unwrap_or_else(|| DEFAULT_MISTRAL_API_URL.to_string()),
                model: get("MISTRAL_MODEL").unwrap_or_else(|| DEFAULT_MISTRAL_MODEL.to_string()),
                api_key: get("MISTRAL_API_KEY"),
            },
            provider_timeout_secs,
            translation_enabled,
            mymemory_api_url: get("MYMEMORY_API_URL")
                .unwrap_or_else(|| DEFAULT_MYMEMORY_API_URL.to_string()),
        })
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "expected true or false".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.provider_timeout_secs, 60);
        assert!(config.translation_enabled);
        assert_eq!(config.huggingface.model, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(config.mistral.model, "mistral-small");
        assert!(!config.huggingface.is_configured());
        assert!(!config.mistral.is_configured());
        assert!(config.db_path.ends_with("AgleCare/aglecare.db"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("AGLECARE_BIND_ADDR", "0.0.0.0:9000"),
            ("AGLECARE_DB_PATH", "/tmp/test.db"),
            ("HUGGINGFACE_API_KEY", "hf_key"),
            ("MISTRAL_API_URL", "http://localhost:1234"),
            ("AGLECARE_PROVIDER_TIMEOUT_SECS", "15"),
            ("AGLECARE_TRANSLATION_ENABLED", "off"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/test.db"));
        assert!(config.huggingface.is_configured());
        assert_eq!(config.mistral.api_url, "http://localhost:1234");
        assert_eq!(config.provider_timeout_secs, 15);
        assert!(!config.translation_enabled);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("MISTRAL_API_KEY", "   "), ("AGLECARE_BIND_ADDR", "")]).unwrap();
        assert!(!config.mistral.is_configured());
        assert_eq!(config.bind_addr.port(), 8787);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            config_from(&[("AGLECARE_BIND_ADDR", "not-an-address")]),
            Err(ConfigError::InvalidValue { name: "AGLECARE_BIND_ADDR", .. })
        ));
        assert!(config_from(&[("AGLECARE_PROVIDER_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("AGLECARE_PROVIDER_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("AGLECARE_TRANSLATION_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn app_name_is_aglecare() {
        assert_eq!(APP_NAME, "AgleCare");
        assert!(app_data_dir().ends_with("AgleCare"));
    }
}
