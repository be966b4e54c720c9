//! Bot self-play on a single room.
//!
//! `GameRunner` seats four bots, starts the game and drives it through
//! `Room::apply` using the same legal-intent enumeration a client would be
//! offered. In `WaitResponse` every seat the open window is waiting on is
//! asked in turn, until the window closes.

use mahjong_engine::action::{Intent, Phase, PlayerId};
use mahjong_engine::errors::RoomResult;
use mahjong_engine::event::GameOverKind;
use mahjong_engine::rule::GameRule;
use mahjong_engine::state::legal_actions::RoomLegalActions;
use mahjong_engine::state::Room;
use mahjong_engine::types::{Seat, NUM_SEATS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::seeding::SessionRng;

/// Picks one intent out of the legal ones for a seat.
pub trait ActionSelector {
    /// `legal` is never empty.
    fn select_intent(&mut self, seat: Seat, legal: &[Intent]) -> Intent;
}

/// Always takes the first legal intent: wins and claims whenever offered,
/// otherwise discards the lowest tile.
pub struct FirstActionSelector;

impl ActionSelector for FirstActionSelector {
    fn select_intent(&mut self, _seat: Seat, legal: &[Intent]) -> Intent {
        legal[0]
    }
}

/// Uniform choice among legal intents, reproducible from a seed.
pub struct SeededRandomSelector {
    rng: ChaCha8Rng,
}

impl SeededRandomSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ActionSelector for SeededRandomSelector {
    fn select_intent(&mut self, _seat: Seat, legal: &[Intent]) -> Intent {
        legal[self.rng.random_range(0..legal.len())]
    }
}

/// Upper bound on applied intents per game.
pub const MAX_STEPS: u32 = 10_000;

pub struct GameRunner {
    room: Room,
    bots: [PlayerId; NUM_SEATS],
    total_actions: u32,
}

impl GameRunner {
    /// Seats four bots in a fresh room and deals.
    pub fn new(seed: Option<u64>, rule: GameRule) -> RoomResult<Self> {
        let bots: [PlayerId; NUM_SEATS] = std::array::from_fn(|i| PlayerId::new(format!("bot-{i}")));
        let mut room = Room::new("self-play", bots[0].clone(), "Bot 0", rule, seed);
        for (i, bot) in bots.iter().enumerate().skip(1) {
            room.add_player(bot.clone(), format!("Bot {i}"))?;
        }
        room.apply(&bots[0], Intent::StartGame)?;
        Ok(Self {
            room,
            bots,
            total_actions: 0,
        })
    }

    /// Seeds the room from the next session seed.
    pub fn new_with_session(session: &mut SessionRng, rule: GameRule) -> RoomResult<Self> {
        Self::new(Some(session.next_room_seed()), rule)
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn is_done(&self) -> bool {
        self.room.is_over()
    }

    pub fn total_actions(&self) -> u32 {
        self.total_actions
    }

    pub fn scores(&self) -> [u32; NUM_SEATS] {
        std::array::from_fn(|i| self.room.players[i].score)
    }

    pub fn outcome(&self) -> Option<GameOverKind> {
        self.room.game_over.as_ref().map(|over| over.kind)
    }

    pub fn winner(&self) -> Option<Seat> {
        self.room.game_over.as_ref().and_then(|over| over.winner_index)
    }

    /// Exposed melds across all seats; concealed kongs excluded.
    pub fn claimed_melds(&self) -> usize {
        self.room
            .players
            .iter()
            .flat_map(|p| &p.melds)
            .filter(|m| !m.is_concealed())
            .count()
    }

    /// Advances the game by one decision point. Returns false once the game
    /// is over, stuck, or out of steps.
    pub fn step_once(&mut self, selector: &mut dyn ActionSelector) -> RoomResult<bool> {
        if self.room.is_over() || self.total_actions >= MAX_STEPS {
            return Ok(false);
        }

        match self.room.phase {
            Phase::WaitAct => {
                let seat = self.room.current_player;
                if !self.act(seat, selector)? {
                    return Ok(false);
                }
            }
            Phase::WaitResponse => {
                let Some(seq) = self.room.open_claim_seq() else {
                    return Ok(false);
                };
                let awaiting: Vec<Seat> = self
                    .room
                    .claim_window
                    .as_ref()
                    .map(|w| w.awaiting().collect())
                    .unwrap_or_default();
                for seat in awaiting {
                    if self.room.open_claim_seq() != Some(seq) {
                        break;
                    }
                    self.act(seat, selector)?;
                }
            }
            Phase::Waiting | Phase::Over => return Ok(false),
        }

        Ok(!self.room.is_over())
    }

    /// Lets `seat` pick and apply one intent. False if it had none.
    fn act(&mut self, seat: Seat, selector: &mut dyn ActionSelector) -> RoomResult<bool> {
        let bot = &self.bots[seat];
        let legal = self.room.legal_intents(bot);
        if legal.is_empty() {
            return Ok(false);
        }
        let chosen = selector.select_intent(seat, &legal);
        self.room.apply(bot, chosen)?;
        self.total_actions += 1;
        Ok(true)
    }

    pub fn run_to_completion(&mut self, selector: &mut dyn ActionSelector) -> RoomResult<()> {
        while self.step_once(selector)? {}
        Ok(())
    }
}
