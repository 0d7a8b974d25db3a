//! # Node Configuration
//!
//! Unified configuration for the node and its subsystems.
//!
//! ## Sources (later wins)
//!
//! 1. `Default` impls
//! 2. Optional TOML file
//! 3. `TR_*` environment variables
//!
//! Key material is read from `TR_PUBLIC_KEY` / `TR_SECRET_KEY` only and never
//! from the file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tr_02_validation::AttestationConfig;
use tr_03_protocol::SessionConfig;
use tr_04_orchestrator::OrchestratorConfig;
use zeroize::Zeroizing;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Runtime settings.
    pub node: RuntimeConfig,
    /// Attestation validation.
    pub attestation: AttestationConfig,
    /// Protocol sessions.
    pub session: SessionConfig,
    /// Delivery to validators.
    pub orchestrator: OrchestratorConfig,
    /// Node key pair. Environment only.
    #[serde(skip)]
    pub keys: KeyConfig,
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Capacity of the queue between the router and the state layer.
    pub accept_queue: usize,
    /// Interval between sweeps of expired pending requests, in ms.
    pub pending_sweep_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            accept_queue: 1024,
            pending_sweep_ms: 5_000,
        }
    }
}

/// Raw node key material.
#[derive(Clone, Default, PartialEq)]
pub struct KeyConfig {
    pub public_key: Option<Vec<u8>>,
    pub secret_key: Option<Zeroizing<Vec<u8>>>,
}

impl KeyConfig {
    pub fn is_empty(&self) -> bool {
        self.public_key.is_none() && self.secret_key.is_none()
    }
}

impl fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfig")
            .field("public_key", &self.public_key.as_ref().map(hex::encode))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

impl NodeConfig {
    /// Parse a TOML document over the defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file over the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Apply `TR_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("TR_LOG_LEVEL") {
            self.node.log_level = level;
        }
        if let Some(channel) = lookup("TR_CHANNEL") {
            self.attestation.channel = channel;
        }

        parse_into(&lookup, "TR_ACCEPT_QUEUE", &mut self.node.accept_queue)?;
        parse_into(&lookup, "TR_FRESHNESS_WINDOW_MS", &mut self.attestation.freshness_window_ms)?;
        parse_into(&lookup, "TR_REPLY_TIMEOUT_MS", &mut self.session.reply_timeout_ms)?;
        parse_into(&lookup, "TR_RESPONSE_TIMEOUT_MS", &mut self.orchestrator.response_timeout_ms)?;
        parse_into(&lookup, "TR_MAX_RETRIES", &mut self.orchestrator.max_retries)?;
        parse_into(&lookup, "TR_ATTEMPT_TIMEOUT_MS", &mut self.orchestrator.attempt_timeout_ms)?;
        parse_into(&lookup, "TR_POLL_INTERVAL_MS", &mut self.orchestrator.poll_interval_ms)?;
        parse_into(&lookup, "TR_MAX_SENT_COUNT", &mut self.orchestrator.max_sent_count)?;

        if let Some(value) = lookup("TR_PUBLIC_KEY") {
            self.keys.public_key = Some(decode_key("TR_PUBLIC_KEY", value)?);
        }
        if let Some(value) = lookup("TR_SECRET_KEY") {
            self.keys.secret_key = Some(Zeroizing::new(decode_key("TR_SECRET_KEY", value)?));
        }
        Ok(())
    }
}

fn parse_into<F, T>(lookup: &F, key: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(value) = lookup(key) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { key, value })?;
    }
    Ok(())
}

fn decode_key(key: &'static str, value: String) -> Result<Vec<u8>, ConfigError> {
    hex::decode(value.trim()).map_err(|_| ConfigError::InvalidEnv {
        key,
        value: "<not hex>".to_string(),
    })
}
