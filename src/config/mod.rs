//! Configuration management for nanoKONTROL OSC
//!
//! Handles loading, defaulting and validation of the YAML configuration file.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

use crate::state::GroupToken;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub osc: OscConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub aliases: AliasConfig,
}

/// MIDI input configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    #[serde(default = "default_input_port")]
    pub input_port: String,
    #[serde(default)]
    pub port_match: PortMatch,
}

/// How the configured port name is compared with discovered ports
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortMatch {
    #[default]
    Exact,
    /// Case-insensitive substring match
    Contains,
}

/// OSC destination configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OscConfig {
    #[serde(default = "default_osc_host")]
    pub host: String,
    #[serde(default = "default_osc_port")]
    pub port: u16,
    #[serde(default)]
    pub payload: PayloadFormat,
}

/// Numeric representation of outbound payloads
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// OSC int32, rounded to the nearest integer
    #[default]
    Int,
    /// OSC float32, unrounded
    Float,
}

/// Mapping engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: EngineMode,
    #[serde(default = "default_group")]
    pub default_group: String,
    #[serde(default)]
    pub transport_trigger: TransportTrigger,
}

/// Address policy of the mapping engine
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Solo/mute/record buttons select a group that prefixes slider/knob addresses
    #[default]
    Grouped,
    /// Every bank control emits on its own channel, no group prefix
    Direct,
}

/// Which values fire a transport button
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportTrigger {
    /// Every event, press and release alike
    #[default]
    Any,
    /// Only the pressed value (127)
    Pressed,
}

/// Group alias file configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AliasConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub strict: bool,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            input_port: default_input_port(),
            port_match: PortMatch::default(),
        }
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            host: default_osc_host(),
            port: default_osc_port(),
            payload: PayloadFormat::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::default(),
            default_group: default_group(),
            transport_trigger: TransportTrigger::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml(&contents).with_context(|| format!("Invalid config file: {}", path))
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            return Self::load(path).await;
        }

        info!("Config file {} not found, using built-in defaults", path);
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.midi.input_port.trim().is_empty() {
            anyhow::bail!("MIDI input_port cannot be empty");
        }

        if self.osc.host.trim().is_empty() {
            anyhow::bail!("OSC host cannot be empty");
        }
        if self.osc.port == 0 {
            anyhow::bail!("OSC port cannot be 0");
        }

        self.default_group()
            .context("Invalid engine.default_group")?;

        Ok(())
    }

    /// Parsed initial group token
    pub fn default_group(&self) -> Result<GroupToken> {
        Ok(self.engine.default_group.parse::<GroupToken>()?)
    }

    /// OSC destination as `host:port`
    pub fn osc_target(&self) -> String {
        format!("{}:{}", self.osc.host, self.osc.port)
    }
}

// Default value functions
fn default_input_port() -> String { "nanoKONTROL2".to_string() }
fn default_osc_host() -> String { "127.0.0.1".to_string() }
fn default_osc_port() -> u16 { 7700 }
fn default_group() -> String { "s1".to_string() }
