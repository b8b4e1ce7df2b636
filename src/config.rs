//! Client Configuration
//!
//! Where the board service lives and how the client logs. Read from a JSON
//! file (missing file means defaults) with environment overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

pub const DEFAULT_API_URL: &str = "https://api.freetoolsy.com";
pub const DEFAULT_API_URL_DEV: &str = "http://localhost:8086";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_MODE: &str = "KANBAN_MODE";
pub const ENV_API_URL: &str = "KANBAN_API_URL";
pub const ENV_TIMEOUT_MS: &str = "KANBAN_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningMode {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for RunningMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunningMode::Development),
            "production" | "prod" => Ok(RunningMode::Production),
            other => Err(DomainError::invalid(format!("unknown running mode {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub mode: RunningMode,
    /// Service root used in production
    pub api_url: String,
    /// Service root used in development
    pub api_url_dev: String,
    pub timeout_ms: u64,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            mode: RunningMode::Development,
            api_url: DEFAULT_API_URL.to_string(),
            api_url_dev: DEFAULT_API_URL_DEV.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl BoardConfig {
    /// Read from a JSON file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Internal(format!("failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| DomainError::invalid(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Apply `KANBAN_MODE`, `KANBAN_API_URL` and `KANBAN_TIMEOUT_MS`
    pub fn with_env_overrides(self) -> DomainResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        if let Some(mode) = var(ENV_MODE) {
            self.mode = mode.parse()?;
        }
        if let Some(url) = var(ENV_API_URL) {
            match self.mode {
                RunningMode::Production => self.api_url = url,
                RunningMode::Development => self.api_url_dev = url,
            }
        }
        if let Some(timeout) = var(ENV_TIMEOUT_MS) {
            self.timeout_ms = timeout
                .trim()
                .parse()
                .map_err(|_| DomainError::invalid(format!("invalid {}: {:?}", ENV_TIMEOUT_MS, timeout)))?;
        }
        Ok(self)
    }

    /// API root for the selected mode, e.g. `http://localhost:8086/api`
    pub fn base_url(&self) -> String {
        let root = match self.mode {
            RunningMode::Production => &self.api_url,
            RunningMode::Development => &self.api_url_dev,
        };
        format!("{}/api", root.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
