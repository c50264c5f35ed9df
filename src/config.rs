//! Configuration loading and management.
//!
//! Loads garita configuration from `./garita.toml` (or `$GARITA_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

// ── Top-level config ────────────────────────────────────────────

/// Top-level garita configuration loaded from TOML.
///
/// Path: `./garita.toml` or `$GARITA_CONFIG_PATH`.
/// Env vars override file values; file values override defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GaritaConfig {
    /// Core settings (`[core]`).
    pub core: CoreConfig,
    /// Backend authority connection (`[backend]`).
    pub backend: BackendConfig,
    /// Filesystem paths for local artifacts (`[paths]`).
    pub paths: PathsConfig,
}

impl GaritaConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$GARITA_CONFIG_PATH` or `./garita.toml`.
    /// If the file does not exist, returns defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: GaritaConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(GaritaConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config file path: `$GARITA_CONFIG_PATH`, then `./garita.toml`.
    fn config_path() -> PathBuf {
        Self::config_path_with(|key| std::env::var(key).ok())
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("GARITA_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("garita.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids unsafe `set_var` in tests).
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        // Core.
        if let Some(v) = env("GARITA_LOG_LEVEL") {
            self.core.log_level = v;
        }

        // Backend.
        if let Some(v) = env("GARITA_BACKEND_URL") {
            self.backend.base_url = v;
        }
        if let Some(v) = env("GARITA_BACKEND_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.backend.timeout_seconds = n,
                Err(_) => tracing::warn!(
                    var = "GARITA_BACKEND_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("GARITA_BACKEND_TOKEN") {
            self.backend.token = Some(v);
        }

        // Paths.
        if let Some(v) = env("GARITA_AUDIT_LOG") {
            self.paths.audit_log = v;
        }
        if let Some(v) = env("GARITA_LOGS_DIR") {
            self.paths.logs_dir = v;
        }
    }

    /// Parse a TOML string into config (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: GaritaConfig =
            toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

// ── Core config ─────────────────────────────────────────────────

/// Core settings (`[core]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Tracing log level filter.
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// ── Backend config ──────────────────────────────────────────────

/// Backend authority connection (`[backend]`).
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend service.
    pub base_url: String,
    /// Per-request deadline in seconds.
    pub timeout_seconds: u64,
    /// Bearer token, usually injected via `GARITA_BACKEND_TOKEN`.
    pub token: Option<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("token", &self.token.as_ref().map(|_| "__REDACTED__"))
            .finish()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8600".to_string(),
            timeout_seconds: 10,
            token: None,
        }
    }
}

// ── Paths config ────────────────────────────────────────────────

/// Filesystem paths for local artifacts (`[paths]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Operator audit trail JSONL path.
    pub audit_log: String,
    /// Directory for rotated application logs.
    pub logs_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            audit_log: "garita-audit.jsonl".to_string(),
            logs_dir: "logs".to_string(),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
