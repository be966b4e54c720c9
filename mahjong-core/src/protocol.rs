//! Inbound client messages.
//!
//! Same envelope as outbound events: `{"event": <name>, "data": {...}}`,
//! with camelCase payload fields. Every message names its room.

use mahjong_engine::action::Intent;
use mahjong_engine::errors::{RoomError, RoomResult};
use mahjong_engine::tile::Tile;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    CreateRoom { room_id: String, player_name: String },
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, player_name: String },
    #[serde(rename_all = "camelCase")]
    StartGame { room_id: String },
    #[serde(rename_all = "camelCase")]
    DrawTile { room_id: String },
    #[serde(rename_all = "camelCase")]
    PlayTile { room_id: String, tile: Tile },
    #[serde(rename_all = "camelCase")]
    ClaimPong { room_id: String },
    /// An empty or missing combination picks the first legal run.
    #[serde(rename_all = "camelCase")]
    ClaimChow {
        room_id: String,
        #[serde(default)]
        combination: Option<Vec<Tile>>,
    },
    #[serde(rename_all = "camelCase")]
    ClaimKong { room_id: String },
    #[serde(rename_all = "camelCase")]
    ConcealedKong { room_id: String, tile: Tile },
    #[serde(rename_all = "camelCase")]
    DeclareWin {
        room_id: String,
        #[serde(default)]
        is_self_draw: bool,
    },
    #[serde(rename_all = "camelCase")]
    Pass { room_id: String },
}

/// What a message asks the registry to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create { name: String },
    Join { name: String },
    Act(Intent),
}

impl ClientMessage {
    pub fn from_json(text: &str) -> RoomResult<Self> {
        serde_json::from_str(text).map_err(|e| RoomError::Parse {
            input: text.chars().take(64).collect(),
            message: e.to_string(),
        })
    }

    pub fn room_id(&self) -> &str {
        match self {
            ClientMessage::CreateRoom { room_id, .. }
            | ClientMessage::JoinRoom { room_id, .. }
            | ClientMessage::StartGame { room_id }
            | ClientMessage::DrawTile { room_id }
            | ClientMessage::PlayTile { room_id, .. }
            | ClientMessage::ClaimPong { room_id }
            | ClientMessage::ClaimChow { room_id, .. }
            | ClientMessage::ClaimKong { room_id }
            | ClientMessage::ConcealedKong { room_id, .. }
            | ClientMessage::DeclareWin { room_id, .. }
            | ClientMessage::Pass { room_id } => room_id,
        }
    }

    /// Splits the message into its room and request.
    pub fn into_request(self) -> RoomResult<(String, Request)> {
        let request = match &self {
            ClientMessage::CreateRoom { player_name, .. } => Request::Create {
                name: player_name.clone(),
            },
            ClientMessage::JoinRoom { player_name, .. } => Request::Join {
                name: player_name.clone(),
            },
            ClientMessage::StartGame { .. } => Request::Act(Intent::StartGame),
            ClientMessage::DrawTile { .. } => Request::Act(Intent::DrawTile),
            ClientMessage::PlayTile { tile, .. } => Request::Act(Intent::PlayTile(*tile)),
            ClientMessage::ClaimPong { .. } => Request::Act(Intent::ClaimPong),
            ClientMessage::ClaimChow { combination, .. } => {
                Request::Act(Intent::ClaimChow(chow_combination(combination.as_deref())?))
            }
            ClientMessage::ClaimKong { .. } => Request::Act(Intent::ClaimKong),
            ClientMessage::ConcealedKong { tile, .. } => Request::Act(Intent::ConcealedKong(*tile)),
            ClientMessage::DeclareWin { is_self_draw, .. } => Request::Act(Intent::DeclareWin {
                is_self_draw: *is_self_draw,
            }),
            ClientMessage::Pass { .. } => Request::Act(Intent::Pass),
        };
        Ok((self.room_id().to_string(), request))
    }
}

fn chow_combination(tiles: Option<&[Tile]>) -> RoomResult<Option<[Tile; 3]>> {
    match tiles {
        None | Some([]) => Ok(None),
        Some(&[a, b, c]) => Ok(Some([a, b, c])),
        Some(other) => Err(RoomError::InvalidClaim {
            message: format!("a chow takes 3 tiles, got {}", other.len()),
        }),
    }
}
