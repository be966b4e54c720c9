use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How competing reactions to one discard are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPolicy {
    /// The first legal claim received wins the discard outright.
    #[default]
    FirstCome,
    /// Claims are collected until every eligible seat has answered (or the
    /// window times out), then win > kong > pong > chow, ties going to the
    /// seat closest after the discarder.
    Precedence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRule {
    pub claim_policy: ClaimPolicy,
    /// Milliseconds an unanswered claim window stays open before it resolves
    /// as a universal pass.
    pub claim_timeout_ms: u64,
}

impl Default for GameRule {
    fn default() -> Self {
        Self::reference()
    }
}

impl GameRule {
    pub fn reference() -> Self {
        Self {
            claim_policy: ClaimPolicy::FirstCome,
            claim_timeout_ms: 10_000,
        }
    }

    pub fn precedence() -> Self {
        Self {
            claim_policy: ClaimPolicy::Precedence,
            ..Self::reference()
        }
    }

    pub fn claim_timeout(&self) -> Duration {
        Duration::from_millis(self.claim_timeout_ms)
    }
}
