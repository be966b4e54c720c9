use crate::action::PlayerId;
use crate::event::{PlayerSummary, PublicPlayer};
use crate::tile::Tile;
use crate::types::Meld;

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    /// Concealed tiles, kept sorted.
    pub hand: Vec<Tile>,
    pub discards: Vec<Tile>,
    pub melds: Vec<Meld>,
    pub score: u32,
    pub connected: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Vec::new(),
            discards: Vec::new(),
            melds: Vec::new(),
            score: 0,
            connected: true,
        }
    }

    /// Clears everything dealt during a game. Score survives.
    pub fn reset(&mut self) {
        self.hand.clear();
        self.discards.clear();
        self.melds.clear();
    }

    /// Concealed tiles plus three per meld: 13 between turns, 14 while the
    /// seat owes a discard. A kong counts as three.
    pub fn turn_tile_count(&self) -> usize {
        self.hand.len() + 3 * self.melds.len()
    }

    /// Physical tiles owned, kong fourth tiles included.
    pub fn tiles_held(&self) -> usize {
        self.hand.len() + self.melds.iter().map(|m| m.tiles.len()).sum::<usize>()
    }

    pub fn count_in_hand(&self, tile: Tile) -> usize {
        self.hand.iter().filter(|&&t| t == tile).count()
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            score: self.score,
        }
    }

    pub fn public_view(&self) -> PublicPlayer {
        PublicPlayer {
            id: self.id.clone(),
            name: self.name.clone(),
            hand_count: self.hand.len(),
            discarded: self.discards.clone(),
            melds: self.melds.clone(),
            score: self.score,
            connected: self.connected,
        }
    }
}
