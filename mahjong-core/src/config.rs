//! Server configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "rule": { "claim_policy": "precedence", "claim_timeout_ms": 8000 },
//!   "room_queue_capacity": 64,
//!   "session_seed": 12345
//! }
//! ```
//!
//! Every field is optional; missing ones take the defaults below.

use std::path::Path;

use anyhow::Context;
use mahjong_engine::rule::GameRule;
use serde::{Deserialize, Serialize};

use crate::seeding::SessionRng;

/// Commands a room actor may have queued before senders wait.
pub const DEFAULT_ROOM_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub rule: GameRule,
    pub room_queue_capacity: usize,
    /// Makes every room's shuffles reproducible. Unset rooms use entropy.
    pub session_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rule: GameRule::default(),
            room_queue_capacity: DEFAULT_ROOM_QUEUE_CAPACITY,
            session_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text).context("invalid server config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("loading config {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.room_queue_capacity > 0,
            "room_queue_capacity must be positive"
        );
        anyhow::ensure!(
            self.rule.claim_timeout_ms > 0,
            "claim_timeout_ms must be positive"
        );
        Ok(())
    }

    pub fn session_rng(&self) -> Option<SessionRng> {
        self.session_seed.map(SessionRng::from_u64)
    }
}
