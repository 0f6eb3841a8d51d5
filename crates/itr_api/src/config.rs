use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use itr_core::error::AppError;
use itr_core::session::SessionStore;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DATA_DIR: &str = ".incident-tracker";

pub const ENV_CONFIG: &str = "ITR_CONFIG";
pub const ENV_API_URL: &str = "ITR_API_URL";
pub const ENV_TIMEOUT_MS: &str = "ITR_TIMEOUT_MS";
pub const ENV_DATA_DIR: &str = "ITR_DATA_DIR";

/// Where the backend lives and where local state is kept.
///
/// Resolution order: defaults, then the optional TOML file, then `ITR_*` environment variables,
/// then explicit command-line overrides. Call [`ClientConfig::validated`] last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Invalid configuration file")
                .with_details(e.to_string())
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read configuration file")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        toml::from_str(&text).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Invalid configuration file")
                .with_details(format!("path={}; err={e}", path.display()))
        })
    }

    /// Apply `ITR_API_URL`, `ITR_TIMEOUT_MS` and `ITR_DATA_DIR` as read through `lookup`.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), AppError> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS).filter(|v| !v.trim().is_empty()) {
            self.timeout_ms = raw.trim().parse().map_err(|_| {
                AppError::new("CONFIG_PARSE_FAILED", "Timeout must be a whole number of ms")
                    .with_details(format!("{ENV_TIMEOUT_MS}={raw}"))
            })?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<(), AppError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Normalize the base URL and reject values the client cannot use.
    pub fn validated(mut self) -> Result<Self, AppError> {
        self.base_url = normalize_base_url(&self.base_url)?;
        if self.timeout_ms == 0 {
            return Err(AppError::new("CONFIG_PARSE_FAILED", "Timeout must be positive")
                .with_details("timeout_ms=0"));
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.data_dir)
    }
}

/// Trim trailing slashes and check the scheme. Query strings and fragments are not allowed since
/// endpoint paths are appended verbatim.
pub fn normalize_base_url(raw: &str) -> Result<String, AppError> {
    let base_url = raw.trim().trim_end_matches('/').to_string();
    let invalid = |reason: &str| {
        AppError::new("API_INVALID_BASE_URL", "Backend URL is not usable")
            .with_details(format!("base_url={base_url}; reason={reason}"))
    };

    let rest = base_url
        .strip_prefix("http://")
        .or_else(|| base_url.strip_prefix("https://"))
        .ok_or_else(|| invalid("scheme must be http or https"))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(invalid("missing host"));
    }
    if rest.contains('?') || rest.contains('#') {
        return Err(invalid("query strings and fragments are not allowed"));
    }
    if rest.chars().any(char::is_whitespace) {
        return Err(invalid("whitespace in URL"));
    }
    Ok(base_url)
}
