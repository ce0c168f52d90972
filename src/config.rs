use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestrator::PollSettings;

/// A required setting was absent at bootstrap. Fatal to process startup;
/// never occurs mid-session.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("required setting missing: {0} (set the {1} environment variable)")]
    Missing(&'static str, &'static str),
}

/// Main configuration structure for wakey
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WakeyConfig {
    /// Control-plane coordinates and credential
    pub fly: FlyConfig,
    /// Poll cadence and bound
    pub poll: PollConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlyConfig {
    /// Machines API token (can be set via env var)
    pub api_token: Option<String>,
    /// Application the target machine belongs to
    pub app_name: String,
    /// Identifier of the machine to wake
    pub machine_id: String,
    /// API base URL; overridable for tests and private deployments
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Seconds between status queries
    pub interval_seconds: u64,
    /// Abandon the session after this many minutes; unset means poll until
    /// ready or cancelled
    pub max_wait_minutes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level / env-filter directive
    pub log_level: String,
}

impl Default for WakeyConfig {
    fn default() -> Self {
        Self {
            fly: FlyConfig {
                api_token: None, // Read from env var
                app_name: String::new(),
                machine_id: String::new(),
                api_base: "https://api.machines.dev/v1".to_string(),
            },
            poll: PollConfig {
                interval_seconds: 30,
                max_wait_minutes: None,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl WakeyConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Configuration file (wakey.toml)
    /// 3. Environment variables (prefixed with WAKEY_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&WakeyConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("wakey.toml").exists() {
            builder = builder.add_source(File::with_name("wakey"));
        }

        builder = builder.add_source(
            Environment::with_prefix("WAKEY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut wakey_config: WakeyConfig = config.try_deserialize()?;

        // Special handling for the API token - check bare env vars too so an
        // existing flyctl environment just works
        if wakey_config.fly.api_token.is_none() {
            if let Ok(token) = std::env::var("FLY_API_TOKEN") {
                wakey_config.fly.api_token = Some(token);
            } else if let Ok(token) = std::env::var("WAKEY_FLY_API_TOKEN") {
                wakey_config.fly.api_token = Some(token);
            }
        }

        Ok(wakey_config)
    }

    /// Fail-fast validation of the settings the wake workflow cannot run
    /// without.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self.fly.api_token.as_deref() {
            None | Some("") => {
                return Err(ConfigurationError::Missing(
                    "control-plane credential",
                    "WAKEY_FLY__API_TOKEN or FLY_API_TOKEN",
                ))
            }
            Some(_) => {}
        }
        if self.fly.app_name.is_empty() {
            return Err(ConfigurationError::Missing(
                "application name",
                "WAKEY_FLY__APP_NAME",
            ));
        }
        if self.fly.machine_id.is_empty() {
            return Err(ConfigurationError::Missing(
                "machine identifier",
                "WAKEY_FLY__MACHINE_ID",
            ));
        }
        Ok(())
    }

    /// Poll settings for the orchestrator.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll.interval_seconds),
            max_wait: self
                .poll
                .max_wait_minutes
                .map(|minutes| Duration::from_secs(minutes * 60)),
        }
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> WakeyConfig {
        let mut config = WakeyConfig::default();
        config.fly.api_token = Some("fly-token".to_string());
        config.fly.app_name = "game-server".to_string();
        config.fly.machine_id = "d89023".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_token_fails_fast() {
        let mut config = valid_config();
        config.fly.api_token = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("credential"));
    }

    #[test]
    fn test_empty_token_fails_fast() {
        let mut config = valid_config();
        config.fly.api_token = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_app_name_fails_fast() {
        let mut config = valid_config();
        config.fly.app_name.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("application name"));
    }

    #[test]
    fn test_missing_machine_id_fails_fast() {
        let mut config = valid_config();
        config.fly.machine_id.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("machine identifier"));
    }

    #[test]
    fn test_default_poll_cadence_is_thirty_seconds_unbounded() {
        let settings = valid_config().poll_settings();
        assert_eq!(settings.interval, Duration::from_secs(30));
        assert!(settings.max_wait.is_none());
    }

    #[test]
    fn test_max_wait_minutes_converts_to_duration() {
        let mut config = valid_config();
        config.poll.max_wait_minutes = Some(10);
        assert_eq!(
            config.poll_settings().max_wait,
            Some(Duration::from_secs(600))
        );
    }
}
