//! Client configuration and loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::retry::RetryPolicy;

/// Top-level tessbot configuration.
///
/// Note: Custom Debug impl masks the access token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct TessbotConfig {
    /// API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token, with or without the `Bearer ` prefix.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Max retries on transient errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds. Doubles per retry.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Max topics of a unit processed concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for TessbotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TessbotConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("parallelism", &self.parallelism)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    500
}
fn default_parallelism() -> usize {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./tessbot-results")
}

impl Default for TessbotConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

impl TessbotConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            ..RetryPolicy::default()
        }
    }

    /// The token to use: an explicit one wins over the configured one.
    pub fn resolve_token(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.access_token.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .context("an access token is required (--token, TESSBOT_TOKEN or access_token in tessbot.toml)")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tessbot.toml` in the current directory
/// 2. `~/.config/tessbot/config.toml`
///
/// Environment variable overrides: `TESSBOT_TOKEN`, `TESSBOT_BASE_URL`.
pub fn load_config() -> Result<TessbotConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TessbotConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("tessbot.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TessbotConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TessbotConfig::default(),
    };

    if let Ok(token) = std::env::var("TESSBOT_TOKEN") {
        config.access_token = Some(token);
    }
    if let Ok(url) = std::env::var("TESSBOT_BASE_URL") {
        config.base_url = url;
    }

    config.base_url = resolve_env_vars(&config.base_url);
    config.access_token = config
        .access_token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.trim().is_empty());

    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");
    anyhow::ensure!(config.timeout_secs >= 1, "timeout_secs must be at least 1");

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tessbot"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_TESSBOT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_TESSBOT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_TESSBOT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_TESSBOT_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = TessbotConfig::default();
        assert_eq!(config.base_url, "https://api.tesseractonline.com");
        assert_eq!(config.parallelism, 1);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_policy().base_delay, Duration::from_millis(500));
    }

    #[test]
    fn parse_partial_config() {
        let config: TessbotConfig = toml::from_str(
            r#"
access_token = "Bearer abc"
timeout_secs = 10
parallelism = 2
"#,
        )
        .unwrap();
        assert_eq!(config.access_token.as_deref(), Some("Bearer abc"));
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.parallelism, 2);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn load_explicit_file_resolves_env_refs() {
        std::env::set_var("_TESSBOT_TEST_TOKEN", "from-env");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessbot.toml");
        std::fs::write(
            &path,
            "access_token = \"${_TESSBOT_TEST_TOKEN}\"\nbase_url = \"http://localhost:9\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();

        if std::env::var("TESSBOT_TOKEN").is_err() {
            assert_eq!(config.access_token.as_deref(), Some("from-env"));
        }
        if std::env::var("TESSBOT_BASE_URL").is_err() {
            assert_eq!(config.base_url, "http://localhost:9");
        }
        std::env::remove_var("_TESSBOT_TEST_TOKEN");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/tessbot.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_token_wins() {
        let config = TessbotConfig {
            access_token: Some("configured".into()),
            ..TessbotConfig::default()
        };
        assert_eq!(config.resolve_token(Some("cli".into())).unwrap(), "cli");
        assert_eq!(config.resolve_token(None).unwrap(), "configured");
        assert!(TessbotConfig::default().resolve_token(None).is_err());
        assert!(TessbotConfig::default()
            .resolve_token(Some("  ".into()))
            .is_err());
    }

    #[test]
    fn debug_masks_token() {
        let config = TessbotConfig {
            access_token: Some("super-secret".into()),
            ..TessbotConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }
}
