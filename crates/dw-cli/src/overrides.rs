//! Merging of command-line settings over the config file
//!
//! Precedence, highest first: command-line flag, environment variable
//! (resolved by clap), config file, built-in default.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use dw_core::config::{self, DeployFailurePolicy, PollerConfig};

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    /// Seconds
    pub interval: Option<u64>,
    /// Seconds
    pub timeout: Option<u64>,
    pub force_wipe: bool,
    pub exclude_failed: bool,
    pub until_settled: bool,
}

impl ConfigOverrides {
    /// Apply on top of a loaded configuration. Boolean flags can only
    /// switch a setting on.
    pub fn apply(self, config: &mut PollerConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = Some(endpoint);
        }
        if let Some(token) = self.token {
            config.token = Some(token);
        }
        if let Some(secs) = self.interval {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Some(Duration::from_secs(secs));
        }
        if self.force_wipe {
            config.force_wipe = true;
        }
        if self.exclude_failed {
            config.on_deploy_failure = DeployFailurePolicy::Exclude;
        }
        if self.until_settled {
            config.until_settled = true;
        }
    }
}

/// Load the config file (explicit path, else the default one if present),
/// apply overrides and validate.
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<PollerConfig> {
    let mut config: PollerConfig = match path {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                config::load_config(&default_path).unwrap_or_else(|e| {
                    tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                    PollerConfig::default()
                })
            } else {
                tracing::debug!("No config file, using defaults");
                PollerConfig::default()
            }
        }
    };

    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_flags_win_over_file() {
        let file = config_file(
            r#"
endpoint = "http://from-file/webhook"
token = "file-token"
interval = 30
"#,
        );
        let overrides = ConfigOverrides {
            endpoint: Some("http://from-flag/webhook".to_string()),
            interval: Some(2),
            ..Default::default()
        };

        let config = resolve_config(Some(file.path()), overrides).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://from-flag/webhook"));
        assert_eq!(config.token.as_deref(), Some("file-token"));
        assert_eq!(config.interval, Duration::from_secs(2));
    }

    #[test]
    fn test_flags_only_switch_on() {
        let file = config_file("force_wipe = true\nuntil_settled = true\n");
        let config = resolve_config(Some(file.path()), ConfigOverrides::default()).unwrap();
        assert!(config.force_wipe);
        assert!(config.until_settled);
        assert_eq!(config.on_deploy_failure, DeployFailurePolicy::Abort);
    }

    #[test]
    fn test_exclude_failed_flag() {
        let mut config = PollerConfig::default();
        ConfigOverrides {
            exclude_failed: true,
            timeout: Some(15),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.on_deploy_failure, DeployFailurePolicy::Exclude);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(resolve_config(Some(&missing), ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_zero_interval_is_error() {
        let file = config_file("");
        let overrides = ConfigOverrides {
            interval: Some(0),
            ..Default::default()
        };
        assert!(resolve_config(Some(file.path()), overrides).is_err());
    }
}
