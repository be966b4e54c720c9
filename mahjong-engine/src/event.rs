//! Outbound room events.
//!
//! Serialized as `{"event": <name>, "data": {...}}`. A seat's concealed hand
//! only ever appears in events addressed to that seat.

use serde::Serialize;

use crate::action::PlayerId;
use crate::fan::FanResult;
use crate::tile::Tile;
use crate::types::{Meld, Seat};

/// Who receives an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum Target {
    Room,
    Player(PlayerId),
}

/// An event paired with its audience.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub target: Target,
    pub event: RoomEvent,
}

impl Delivery {
    pub fn room(event: RoomEvent) -> Self {
        Self {
            target: Target::Room,
            event,
        }
    }

    pub fn to(player: &PlayerId, event: RoomEvent) -> Self {
        Self {
            target: Target::Player(player.clone()),
            event,
        }
    }

    pub fn is_for(&self, player: &PlayerId) -> bool {
        match &self.target {
            Target::Room => true,
            Target::Player(p) => p == player,
        }
    }
}

/// Lobby view of a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Table view of a seat: the hand is reduced to its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub hand_count: usize,
    pub discarded: Vec<Tile>,
    pub melds: Vec<Meld>,
    pub score: u32,
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverKind {
    Win,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOver {
    #[serde(rename = "type")]
    pub kind: GameOverKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_index: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Tile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melds: Option<Vec<Meld>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan: Option<FanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_self_draw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GameOver {
    pub fn drawn(message: impl Into<String>) -> Self {
        Self {
            kind: GameOverKind::Draw,
            winner_id: None,
            winner_index: None,
            winner_name: None,
            hand: None,
            melds: None,
            fan: None,
            is_self_draw: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RoomEvent {
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: String,
        players: Vec<PlayerSummary>,
    },
    PlayerJoined {
        players: Vec<PlayerSummary>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
        players: Vec<PlayerSummary>,
    },
    #[serde(rename_all = "camelCase")]
    GameStarted {
        hand: Vec<Tile>,
        player_index: Seat,
        current_player_index: Seat,
        players: Vec<PublicPlayer>,
        wall_count: usize,
    },
    TileDrawn {
        tile: Tile,
    },
    #[serde(rename_all = "camelCase")]
    GameState {
        current_player_index: Seat,
        wall_count: usize,
        players: Vec<PublicPlayer>,
    },
    #[serde(rename_all = "camelCase")]
    TilePlayed {
        player_id: PlayerId,
        tile: Tile,
        player_index: Seat,
    },
    #[serde(rename_all = "camelCase")]
    CanClaim {
        can_chow: bool,
        can_pong: bool,
        can_kong: bool,
        can_win: bool,
        chow_options: Vec<[Tile; 3]>,
        tile: Tile,
    },
    #[serde(rename_all = "camelCase")]
    NextTurn {
        current_player_index: Seat,
        wall_count: usize,
        players: Vec<PublicPlayer>,
    },
    #[serde(rename_all = "camelCase")]
    PongClaimed {
        player_id: PlayerId,
        player_index: Seat,
        melds: Vec<Meld>,
    },
    #[serde(rename_all = "camelCase")]
    ChowClaimed {
        player_id: PlayerId,
        player_index: Seat,
        melds: Vec<Meld>,
    },
    #[serde(rename_all = "camelCase")]
    KongClaimed {
        player_id: PlayerId,
        player_index: Seat,
        melds: Vec<Meld>,
    },
    UpdateHand {
        hand: Vec<Tile>,
    },
    TileDrawnAfterKong {
        tile: Tile,
    },
    CanPlay {
        message: String,
    },
    GameOver(GameOver),
    Error {
        message: String,
    },
}

impl RoomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::RoomCreated { .. } => "room_created",
            RoomEvent::PlayerJoined { .. } => "player_joined",
            RoomEvent::PlayerLeft { .. } => "player_left",
            RoomEvent::GameStarted { .. } => "game_started",
            RoomEvent::TileDrawn { .. } => "tile_drawn",
            RoomEvent::GameState { .. } => "game_state",
            RoomEvent::TilePlayed { .. } => "tile_played",
            RoomEvent::CanClaim { .. } => "can_claim",
            RoomEvent::NextTurn { .. } => "next_turn",
            RoomEvent::PongClaimed { .. } => "pong_claimed",
            RoomEvent::ChowClaimed { .. } => "chow_claimed",
            RoomEvent::KongClaimed { .. } => "kong_claimed",
            RoomEvent::UpdateHand { .. } => "update_hand",
            RoomEvent::TileDrawnAfterKong { .. } => "tile_drawn_after_kong",
            RoomEvent::CanPlay { .. } => "can_play",
            RoomEvent::GameOver(_) => "game_over",
            RoomEvent::Error { .. } => "error",
        }
    }

    /// Wire form: `{"event": name, "data": payload}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Events that reveal concealed tiles and must never target the room.
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            RoomEvent::GameStarted { .. }
                | RoomEvent::TileDrawn { .. }
                | RoomEvent::UpdateHand { .. }
                | RoomEvent::TileDrawnAfterKong { .. }
                | RoomEvent::CanClaim { .. }
                | RoomEvent::CanPlay { .. }
                | RoomEvent::Error { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tile;

    #[test]
    fn event_envelope() {
        let ev = RoomEvent::TilePlayed {
            player_id: PlayerId::from("p1"),
            tile: parse_tile("5b").unwrap(),
            player_index: 0,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "tile_played");
        assert_eq!(json["data"]["playerId"], "p1");
        assert_eq!(json["data"]["tile"], "5b");
        assert_eq!(json["data"]["playerIndex"], 0);
        assert_eq!(ev.name(), "tile_played");
    }

    #[test]
    fn drawn_game_over_omits_winner_fields() {
        let ev = RoomEvent::GameOver(GameOver::drawn("wall exhausted"));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "game_over");
        assert_eq!(json["data"]["type"], "draw");
        assert_eq!(json["data"]["message"], "wall exhausted");
        assert!(json["data"].get("winnerName").is_none());
    }

    #[test]
    fn targeted_delivery() {
        let alice = PlayerId::from("alice");
        let d = Delivery::to(&alice, RoomEvent::CanPlay {
            message: "discard".into(),
        });
        assert!(d.is_for(&alice));
        assert!(!d.is_for(&PlayerId::from("bob")));
        assert!(Delivery::room(RoomEvent::PlayerJoined { players: vec![] }).is_for(&alice));
    }
}
