use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tile::Tile;

/// Stable per-session identity the transport assigns to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Coarse room phase.
///
/// `WaitAct` covers both halves of a turn: `Room::needs_draw` tells whether
/// the current seat must draw or owes a discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Seats are filling.
    Waiting,
    /// The current seat must draw or discard.
    WaitAct,
    /// A discard is open to reactions from other seats.
    WaitResponse,
    /// Someone won or the wall ran out.
    Over,
}

/// A state-changing request from a seated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    StartGame,
    DrawTile,
    PlayTile(Tile),
    ClaimPong,
    /// Optional explicit run; the first legal run is used when absent.
    ClaimChow(Option<[Tile; 3]>),
    ClaimKong,
    /// Declare a kong from four concealed copies during one's own turn.
    ConcealedKong(Tile),
    DeclareWin {
        is_self_draw: bool,
    },
    Pass,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::StartGame => "start_game",
            Intent::DrawTile => "draw_tile",
            Intent::PlayTile(_) => "play_tile",
            Intent::ClaimPong => "claim_pong",
            Intent::ClaimChow(_) => "claim_chow",
            Intent::ClaimKong => "claim_kong",
            Intent::ConcealedKong(_) => "concealed_kong",
            Intent::DeclareWin { .. } => "declare_win",
            Intent::Pass => "pass",
        }
    }
}
