//! Environment configuration for the CLI. Command-line flags take precedence
//! over everything read here.

use std::path::PathBuf;
use std::time::Duration;

use berth_core::probe::{DEFAULT_PROBE_HOST, DEFAULT_PROBE_TIMEOUT};
use berth_core::source::DEFAULT_MANIFEST_PATH;
use tracing::warn;

pub const MANIFEST_ENV: &str = "BERTH_MANIFEST";
pub const PROBE_HOST_ENV: &str = "BERTH_PROBE_HOST";
pub const PROBE_TIMEOUT_ENV: &str = "BERTH_PROBE_TIMEOUT_MS";
pub const LOG_ENV: &str = "BERTH_LOG";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CliConfig {
    pub manifest_path: PathBuf,
    pub probe_host: String,
    pub probe_timeout: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            probe_host: DEFAULT_PROBE_HOST.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let manifest_path = lookup(MANIFEST_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.manifest_path);

        let probe_host = lookup(PROBE_HOST_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.probe_host);

        let probe_timeout = match lookup(PROBE_TIMEOUT_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => {
                    warn!(
                        value = %raw,
                        "ignoring invalid {PROBE_TIMEOUT_ENV}; expected a positive number of milliseconds"
                    );
                    defaults.probe_timeout
                }
            },
            None => defaults.probe_timeout,
        };

        Self {
            manifest_path,
            probe_host,
            probe_timeout,
        }
    }

    pub fn manifest_path(&self, explicit: Option<&PathBuf>) -> PathBuf {
        explicit
            .cloned()
            .unwrap_or_else(|| self.manifest_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{CliConfig, MANIFEST_ENV, PROBE_HOST_ENV, PROBE_TIMEOUT_ENV};

    fn config_from(vars: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_env() {
        assert_eq!(config_from(&[]), CliConfig::default());
        assert_eq!(CliConfig::default().manifest_path, PathBuf::from(".replit"));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = config_from(&[
            (MANIFEST_ENV, "deploy/.replit"),
            (PROBE_HOST_ENV, "0.0.0.0"),
            (PROBE_TIMEOUT_ENV, "1500"),
        ]);
        assert_eq!(config.manifest_path, PathBuf::from("deploy/.replit"));
        assert_eq!(config.probe_host, "0.0.0.0");
        assert_eq!(config.probe_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn malformed_timeout_falls_back() {
        for raw in ["soon", "0", "-5"] {
            let config = config_from(&[(PROBE_TIMEOUT_ENV, raw)]);
            assert_eq!(config.probe_timeout, Duration::from_millis(500));
        }
    }

    #[test]
    fn explicit_path_wins() {
        let config = config_from(&[(MANIFEST_ENV, "env/.replit")]);
        let explicit = PathBuf::from("cli/.replit");
        assert_eq!(config.manifest_path(Some(&explicit)), explicit);
        assert_eq!(config.manifest_path(None), PathBuf::from("env/.replit"));
    }
}
