//! Authoritative state of one four-seat room.
//!
//! Every mutation goes through [`Room::apply`] (or the lifecycle calls
//! `add_player`, `remove_player` and `expire_claim_window`). A rejected
//! intent returns an error and leaves the room untouched; an accepted one
//! returns the events to deliver, each tagged with its audience.

use tracing::{debug, info, warn};

use crate::action::{Phase, PlayerId, Intent};
use crate::errors::{RoomError, RoomResult};
use crate::event::{Delivery, GameOver, GameOverKind, PlayerSummary, PublicPlayer, RoomEvent};
use crate::fan::FanResult;
use crate::hand_evaluator::HandEvaluator;
use crate::rule::GameRule;
use crate::tile::{tile_counts, Tile, COPIES_PER_TILE, NUM_TILES};
use crate::types::{remove_one, sorted_insert, Meld, Seat, HAND_SIZE, NUM_SEATS};

pub mod claims;
pub mod legal_actions;
pub mod player;
pub mod wall;

use claims::{ClaimKind, ClaimWindow, Response};
use player::PlayerState;
use wall::Wall;

#[derive(Debug, Clone)]
pub struct Room {
    pub room_id: String,
    pub rule: GameRule,
    /// Seats in join order. Seat 0 hosts and deals.
    pub players: Vec<PlayerState>,
    pub wall: Wall,

    pub phase: Phase,
    pub current_player: Seat,
    /// In `WaitAct`: the current seat holds 13 and must draw.
    pub needs_draw: bool,
    /// Tile the current seat just took from the wall; only then may it
    /// declare a self-drawn win.
    pub drawn_tile: Option<Tile>,
    pub last_discard: Option<(Seat, Tile)>,
    pub claim_window: Option<ClaimWindow>,
    pub claim_seq: u64,
    pub game_over: Option<GameOver>,
}

impl Room {
    pub fn new(
        room_id: impl Into<String>,
        host: PlayerId,
        host_name: impl Into<String>,
        rule: GameRule,
        seed: Option<u64>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            rule,
            players: vec![PlayerState::new(host, host_name)],
            wall: Wall::new(seed),
            phase: Phase::Waiting,
            current_player: 0,
            needs_draw: false,
            drawn_tile: None,
            last_discard: None,
            claim_window: None,
            claim_seq: 0,
            game_over: None,
        }
    }

    /// `room_created`, addressed to the host.
    pub fn created_event(&self) -> Vec<Delivery> {
        self.players
            .first()
            .map(|host| {
                Delivery::to(&host.id, RoomEvent::RoomCreated {
                    room_id: self.room_id.clone(),
                    players: self.summaries(),
                })
            })
            .into_iter()
            .collect()
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        self.players.iter().position(|p| &p.id == player)
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Waiting
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Over
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.players
            .iter()
            .filter(|p| p.connected)
            .map(PlayerState::summary)
            .collect()
    }

    pub fn public_players(&self) -> Vec<PublicPlayer> {
        self.players.iter().map(PlayerState::public_view).collect()
    }

    pub(crate) fn game_state_event(&self) -> RoomEvent {
        RoomEvent::GameState {
            current_player_index: self.current_player,
            wall_count: self.wall.len(),
            players: self.public_players(),
        }
    }

    // ------------------------------------------------------------------
    // Seating
    // ------------------------------------------------------------------

    pub fn add_player(&mut self, id: PlayerId, name: impl Into<String>) -> RoomResult<Vec<Delivery>> {
        if self.is_started() {
            return Err(RoomError::AlreadyStarted);
        }
        if self.seat_of(&id).is_some() {
            return Err(RoomError::AlreadySeated {
                player: id.to_string(),
            });
        }
        if self.players.len() >= NUM_SEATS {
            return Err(RoomError::RoomFull);
        }
        debug!(room_id = %self.room_id, player = %id, seat = self.players.len(), "player joined");
        self.players.push(PlayerState::new(id, name));
        Ok(vec![Delivery::room(RoomEvent::PlayerJoined {
            players: self.summaries(),
        })])
    }

    /// Handles a dropped connection. Before the game the seat is freed and
    /// later seats shift down, so the next player becomes host. Once dealt
    /// the seat is kept and marked disconnected; a claim it still owed
    /// counts as a pass.
    pub fn remove_player(&mut self, id: &PlayerId) -> RoomResult<Vec<Delivery>> {
        let seat = self.seat_of(id).ok_or_else(|| RoomError::UnknownPlayer {
            player: id.to_string(),
        })?;

        let mut out = Vec::new();
        if self.is_started() {
            if !self.players[seat].connected {
                return Ok(out);
            }
            self.players[seat].connected = false;
            warn!(room_id = %self.room_id, seat, player = %id, "player disconnected mid-game");
            out.push(Delivery::room(RoomEvent::PlayerLeft {
                player_id: id.clone(),
                players: self.summaries(),
            }));
            let owes_response = self
                .claim_window
                .as_ref()
                .is_some_and(|w| w.is_eligible(seat) && w.responses[seat].is_none());
            if owes_response {
                self.record_response(seat, Response::Pass);
                out.extend(self.settle_if_complete()?);
            }
        } else {
            self.players.remove(seat);
            debug!(room_id = %self.room_id, player = %id, "player left before start");
            if !self.players.is_empty() {
                out.push(Delivery::room(RoomEvent::PlayerLeft {
                    player_id: id.clone(),
                    players: self.summaries(),
                }));
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    pub fn apply(&mut self, player: &PlayerId, intent: Intent) -> RoomResult<Vec<Delivery>> {
        let seat = self.seat_of(player).ok_or_else(|| RoomError::UnknownPlayer {
            player: player.to_string(),
        })?;
        if !self.players[seat].connected {
            return Err(RoomError::PlayerDisconnected { seat });
        }

        let out = match intent {
            Intent::StartGame => return self.start_game(seat, None),
            _ if self.phase == Phase::Waiting => return Err(RoomError::NotStarted),
            _ if self.phase == Phase::Over => return Err(RoomError::GameOver),
            Intent::DrawTile => self.draw_tile(seat)?,
            Intent::PlayTile(tile) => self.play_tile(seat, tile)?,
            Intent::ConcealedKong(tile) => self.concealed_kong(seat, tile)?,
            Intent::DeclareWin { is_self_draw: true } => self.declare_self_draw(seat)?,
            Intent::DeclareWin { is_self_draw: false } => {
                self.respond(seat, ClaimKind::Win, None)?
            }
            Intent::ClaimPong => self.respond(seat, ClaimKind::Pong, None)?,
            Intent::ClaimChow(run) => self.respond(seat, ClaimKind::Chow, run)?,
            Intent::ClaimKong => self.respond(seat, ClaimKind::Kong, None)?,
            Intent::Pass => self.pass(seat)?,
        };

        debug_assert!(
            self.check_invariants().is_ok(),
            "invariant broken after {}: {:?}",
            intent.name(),
            self.check_invariants()
        );
        Ok(out)
    }

    /// Starts with a fixed wall, first tile drawn first. Same checks as
    /// `StartGame`; used for replays and tests.
    pub fn start_game_with_wall(
        &mut self,
        player: &PlayerId,
        tiles: Vec<Tile>,
    ) -> RoomResult<Vec<Delivery>> {
        let seat = self.seat_of(player).ok_or_else(|| RoomError::UnknownPlayer {
            player: player.to_string(),
        })?;
        self.start_game(seat, Some(tiles))
    }

    fn start_game(&mut self, seat: Seat, wall: Option<Vec<Tile>>) -> RoomResult<Vec<Delivery>> {
        if self.is_started() {
            return Err(RoomError::AlreadyStarted);
        }
        if seat != 0 {
            return Err(RoomError::NotHost);
        }
        if self.players.len() < NUM_SEATS {
            return Err(RoomError::NotEnoughPlayers {
                seated: self.players.len(),
            });
        }
        match wall {
            Some(tiles) => self.wall.load(tiles)?,
            None => self.wall.shuffle(),
        }

        for p in &mut self.players {
            p.reset();
        }
        for seat in 0..NUM_SEATS {
            for _ in 0..HAND_SIZE {
                if let Some(t) = self.wall.draw() {
                    self.players[seat].hand.push(t);
                }
            }
            self.players[seat].hand.sort();
        }
        let extra = self.wall.draw();
        if let Some(t) = extra {
            sorted_insert(&mut self.players[0].hand, t);
        }

        self.current_player = 0;
        self.phase = Phase::WaitAct;
        self.needs_draw = false;
        self.drawn_tile = extra;
        self.last_discard = None;
        self.claim_window = None;
        self.game_over = None;
        info!(
            room_id = %self.room_id,
            wall_digest = %self.wall.wall_digest,
            wall_count = self.wall.len(),
            "game started"
        );

        let players = self.public_players();
        let mut out: Vec<Delivery> = self
            .players
            .iter()
            .enumerate()
            .map(|(index, p)| {
                Delivery::to(&p.id, RoomEvent::GameStarted {
                    hand: p.hand.clone(),
                    player_index: index,
                    current_player_index: self.current_player,
                    players: players.clone(),
                    wall_count: self.wall.len(),
                })
            })
            .collect();
        out.push(Delivery::to(&self.players[0].id, RoomEvent::CanPlay {
            message: "首轮开始，请出牌".to_string(),
        }));
        Ok(out)
    }

    /// Common gate for the current seat's own-turn actions.
    fn own_turn(&self, seat: Seat) -> RoomResult<()> {
        if self.phase != Phase::WaitAct || seat != self.current_player {
            return Err(RoomError::NotYourTurn);
        }
        Ok(())
    }

    fn draw_tile(&mut self, seat: Seat) -> RoomResult<Vec<Delivery>> {
        self.own_turn(seat)?;
        if !self.needs_draw {
            return Err(RoomError::MustDiscardFirst);
        }

        let Some(tile) = self.wall.draw() else {
            return Ok(self.finish_exhausted());
        };
        sorted_insert(&mut self.players[seat].hand, tile);
        self.needs_draw = false;
        self.drawn_tile = Some(tile);
        debug!(room_id = %self.room_id, seat, wall_count = self.wall.len(), "tile drawn");

        Ok(vec![
            Delivery::to(&self.players[seat].id, RoomEvent::TileDrawn { tile }),
            Delivery::room(self.game_state_event()),
        ])
    }

    fn play_tile(&mut self, seat: Seat, tile: Tile) -> RoomResult<Vec<Delivery>> {
        self.own_turn(seat)?;
        if self.needs_draw {
            return Err(RoomError::MustDrawFirst);
        }
        let p = &mut self.players[seat];
        if !remove_one(&mut p.hand, tile) {
            return Err(RoomError::TileNotInHand {
                tile: tile.to_string(),
            });
        }
        p.discards.push(tile);
        let player_id = p.id.clone();
        self.last_discard = Some((seat, tile));
        self.drawn_tile = None;
        debug!(room_id = %self.room_id, seat, tile = %tile, "tile played");

        let mut out = vec![Delivery::room(RoomEvent::TilePlayed {
            player_id,
            tile,
            player_index: seat,
        })];
        out.extend(self.open_claim_window(seat, tile));
        Ok(out)
    }

    fn concealed_kong(&mut self, seat: Seat, tile: Tile) -> RoomResult<Vec<Delivery>> {
        self.own_turn(seat)?;
        if self.needs_draw {
            return Err(RoomError::MustDrawFirst);
        }
        if self.players[seat].count_in_hand(tile) < COPIES_PER_TILE {
            return Err(RoomError::InvalidClaim {
                message: format!("need four {tile} for a concealed kong"),
            });
        }
        let supplement = self.wall.draw().ok_or_else(|| RoomError::InvalidClaim {
            message: "no supplement tile left in the wall".to_string(),
        })?;

        let p = &mut self.players[seat];
        for _ in 0..COPIES_PER_TILE {
            remove_one(&mut p.hand, tile);
        }
        p.melds.push(Meld::quad(tile, None));
        info!(room_id = %self.room_id, seat, tile = %tile, "concealed kong");
        Ok(self.meld_formed(seat, ClaimKind::Kong, Some(supplement)))
    }

    fn declare_self_draw(&mut self, seat: Seat) -> RoomResult<Vec<Delivery>> {
        self.own_turn(seat)?;
        if self.needs_draw {
            return Err(RoomError::MustDrawFirst);
        }
        if self.drawn_tile.is_none() {
            return Err(RoomError::CannotWin);
        }
        let p = &self.players[seat];
        let fan = HandEvaluator::new(&p.hand, &p.melds)
            .calc(true)
            .ok_or(RoomError::CannotWin)?;
        Ok(self.finish_win(seat, fan, true))
    }

    /// Moves the turn to the seat after `from`, which must now draw.
    pub(crate) fn advance_turn(&mut self, from: Seat) -> Vec<Delivery> {
        self.claim_window = None;
        self.last_discard = None;
        self.current_player = (from + 1) % NUM_SEATS;
        self.phase = Phase::WaitAct;
        self.needs_draw = true;
        self.drawn_tile = None;
        vec![Delivery::room(RoomEvent::NextTurn {
            current_player_index: self.current_player,
            wall_count: self.wall.len(),
            players: self.public_players(),
        })]
    }

    pub(crate) fn finish_win(&mut self, seat: Seat, fan: FanResult, is_self_draw: bool) -> Vec<Delivery> {
        self.phase = Phase::Over;
        self.claim_window = None;
        self.last_discard = None;
        self.current_player = seat;

        let winner = &mut self.players[seat];
        winner.score += fan.total;
        info!(
            room_id = %self.room_id,
            seat,
            winner = %winner.name,
            fan = fan.total,
            types = ?fan.labels(),
            is_self_draw,
            "game won"
        );
        let over = GameOver {
            kind: GameOverKind::Win,
            winner_id: Some(winner.id.clone()),
            winner_index: Some(seat),
            winner_name: Some(winner.name.clone()),
            hand: Some(winner.hand.clone()),
            melds: Some(winner.melds.clone()),
            fan: Some(fan),
            is_self_draw: Some(is_self_draw),
            message: None,
        };
        self.game_over = Some(over.clone());
        vec![Delivery::room(RoomEvent::GameOver(over))]
    }

    fn finish_exhausted(&mut self) -> Vec<Delivery> {
        self.phase = Phase::Over;
        self.claim_window = None;
        self.last_discard = None;
        info!(room_id = %self.room_id, "wall exhausted, game drawn");
        let over = GameOver::drawn("流局 - 牌堆已空");
        self.game_over = Some(over.clone());
        vec![Delivery::room(RoomEvent::GameOver(over))]
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Tiles in the wall, hands, ponds and melds.
    pub fn tile_total(&self) -> usize {
        self.wall.len()
            + self
                .players
                .iter()
                .map(|p| p.tiles_held() + p.discards.len())
                .sum::<usize>()
    }

    pub fn check_invariants(&self) -> RoomResult<()> {
        let broken = |message: String| Err(RoomError::InvalidState { message });

        if !self.is_started() {
            return Ok(());
        }
        if self.tile_total() != NUM_TILES {
            return broken(format!("{} tiles in play, expected {NUM_TILES}", self.tile_total()));
        }
        let all: Vec<Tile> = self
            .wall
            .remaining()
            .chain(self.players.iter().flat_map(|p| {
                p.hand
                    .iter()
                    .chain(&p.discards)
                    .chain(p.melds.iter().flat_map(|m| &m.tiles))
                    .copied()
            }))
            .collect();
        let counts = tile_counts(&all);
        if let Some(t) = Tile::all().find(|t| counts[t.index()] as usize != COPIES_PER_TILE) {
            return broken(format!("{} copies of {t} in play", counts[t.index()]));
        }
        if let Some(p) = self.players.iter().find(|p| p.hand.windows(2).any(|w| w[0] > w[1])) {
            return broken(format!("hand of {} is not sorted", p.id));
        }
        if self.current_player >= NUM_SEATS {
            return broken(format!("current seat {} out of range", self.current_player));
        }
        if (self.phase == Phase::WaitResponse) != self.claim_window.is_some() {
            return broken("claim window does not match phase".to_string());
        }

        let expected = |seat: Seat| match self.phase {
            Phase::WaitAct if seat == self.current_player && !self.needs_draw => Some(HAND_SIZE + 1),
            Phase::WaitAct | Phase::WaitResponse => Some(HAND_SIZE),
            _ => None,
        };
        for (seat, p) in self.players.iter().enumerate() {
            if let Some(n) = expected(seat) {
                if p.turn_tile_count() != n {
                    return broken(format!(
                        "seat {seat} holds {} effective tiles, expected {n}",
                        p.turn_tile_count()
                    ));
                }
            }
        }
        Ok(())
    }
}
