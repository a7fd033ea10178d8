//! Replay configuration file

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use replay_flow::ReplaySettings;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Overrides the engine default step timeout (milliseconds)
pub const ENV_TIMEOUT_MS: &str = "FLOW_REPLAY_TIMEOUT_MS";
/// Overrides the configured log level
pub const ENV_LOG: &str = "FLOW_REPLAY_LOG";

/// On-disk configuration (`config/replay.yaml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Engine default step timeout; unset falls back to 5000ms
    pub default_timeout_ms: Option<u64>,
    pub key_settle_ms: u64,
    pub scroll_poll_ms: u64,
    pub wait_poll_ms: u64,
    pub bound_scroll_settle: bool,
    pub log_level: Option<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: None,
            key_settle_ms: 100,
            scroll_poll_ms: 50,
            wait_poll_ms: 100,
            bound_scroll_settle: true,
            log_level: None,
        }
    }
}

impl ReplayConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    /// Apply `FLOW_REPLAY_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` as the environment
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let timeout = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_TIMEOUT_MS, raw))?;
            self.default_timeout_ms = Some(timeout);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|level| !level.trim().is_empty()) {
            self.log_level = Some(level.trim().to_string());
        }
        Ok(())
    }

    /// Engine settings described by this configuration
    pub fn settings(&self) -> ReplaySettings {
        ReplaySettings {
            default_timeout: self.default_timeout_ms.map(Duration::from_millis),
            key_settle: Duration::from_millis(self.key_settle_ms),
            scroll_poll_interval: Duration::from_millis(self.scroll_poll_ms),
            wait_poll_interval: Duration::from_millis(self.wait_poll_ms),
            bound_scroll_settle: self.bound_scroll_settle,
        }
    }
}

pub struct LoadedConfig {
    pub config: ReplayConfig,
    pub path: PathBuf,
    /// Whether `path` existed; defaults are used otherwise
    pub found: bool,
}

/// Config path used when none is given on the command line.
///
/// Priority: ./config/replay.yaml > <config dir>/flow-replay/config.yaml
pub fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/replay.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("flow-replay");
    path.push("config.yaml");
    Ok(path)
}

/// Load the configuration file and apply environment overrides.
///
/// A missing file yields defaults; callers report it once logging is up.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    let (mut config, found) = read_config(&path).await?;
    config.apply_env_overrides()?;

    Ok(LoadedConfig {
        config,
        path,
        found,
    })
}

async fn read_config(path: &Path) -> Result<(ReplayConfig, bool)> {
    if !path.exists() {
        return Ok((ReplayConfig::default(), false));
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    Ok((ReplayConfig::from_yaml(&content)?, true))
}
