//! Configuration management for Impulse GW
//!
//! Handles loading and validating the YAML deployment configuration:
//! which physical channels the gateway manages, the virtual toggle each
//! one is paired with, and the engine timing constants.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::component::{ChannelId, ToggleId};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// One managed channel: a physical input, a pulsed relay output, and the
/// virtual toggle mirroring its on/off state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Physical channel index (input and relay share it)
    pub id: ChannelId,
    /// Paired virtual boolean component
    pub toggle_id: ToggleId,
    /// Display label used in logs and the REPL
    pub name: String,
    /// Disabled channels are invisible to the engine (e.g. a channel
    /// wired as a plain contactor instead of an impulse relay)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Engine timing constants
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Per-channel lock duration after a reconciliation action, covering
    /// the relay's physical settle (Auto-OFF) window
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Startup grace window during which all live events are discarded
    /// while initial toggle priming completes
    #[serde(default = "default_startup_grace_ms")]
    pub startup_grace_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            startup_grace_ms: default_startup_grace_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            anyhow::bail!("At least one channel must be defined");
        }

        let mut seen_ids = std::collections::HashSet::new();
        let mut seen_toggles = std::collections::HashSet::new();

        for channel in &self.channels {
            if channel.name.is_empty() {
                anyhow::bail!("Channel {} name cannot be empty", channel.id);
            }
            if !seen_ids.insert(channel.id) {
                anyhow::bail!("Duplicate channel id {}", channel.id);
            }
            if !seen_toggles.insert(channel.toggle_id) {
                anyhow::bail!(
                    "Toggle {} is paired with more than one channel",
                    channel.toggle_id
                );
            }
        }

        if self.timing.settle_ms == 0 {
            anyhow::bail!("timing.settle_ms must be greater than zero");
        }

        Ok(())
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_settle_ms() -> u64 {
    1500
}
fn default_startup_grace_ms() -> u64 {
    3000
}
