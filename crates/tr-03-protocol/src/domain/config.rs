//! Session configuration and protocol tags.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Channel tag for the structured legacy protocol.
pub const LEGACY_PROTOCOL: &str = "tr/legacy/json";

/// Channel tag for the binary V1 protocol.
pub const V1_PROTOCOL: &str = "tr/v1/binary";

/// Protocol session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long V1 `send` waits for a reply, in ms.
    pub reply_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_timeout_ms: 10_000,
        }
    }
}

impl SessionConfig {
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}
