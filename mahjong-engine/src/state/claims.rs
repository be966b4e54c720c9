//! Claim windows: who may react to a discard, and how reactions resolve.
//!
//! A window opens on every discard that at least one other connected seat
//! can claim. Each window carries a sequence number; reactions and timeouts
//! aimed at a window that has already closed are rejected as stale.
//!
//! Under [`ClaimPolicy::FirstCome`] the first valid claim wins outright.
//! Under [`ClaimPolicy::Precedence`] responses are collected until every
//! eligible seat has answered or the timer fires, then the strongest claim
//! wins (win > kong > pong > chow), ties going to the seat closest after
//! the discarder.

use tracing::{debug, info};

use super::Room;
use crate::action::Phase;
use crate::errors::{RoomError, RoomResult};
use crate::event::{Delivery, RoomEvent};
use crate::hand_evaluator::HandEvaluator;
use crate::rule::ClaimPolicy;
use crate::tile::Tile;
use crate::types::{remove_one, sorted_insert, Meld, Seat, NUM_SEATS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClaimKind {
    Chow,
    Pong,
    Kong,
    Win,
}

impl ClaimKind {
    pub fn name(self) -> &'static str {
        match self {
            ClaimKind::Chow => "chow",
            ClaimKind::Pong => "pong",
            ClaimKind::Kong => "kong",
            ClaimKind::Win => "win",
        }
    }
}

/// What one seat may do with the open discard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimOptions {
    pub can_pong: bool,
    pub can_kong: bool,
    pub can_win: bool,
    /// Runs the seat could complete, in `n-2`, `n-1`, `n` order.
    pub chow_runs: Vec<[Tile; 3]>,
}

impl ClaimOptions {
    pub fn can_chow(&self) -> bool {
        !self.chow_runs.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.strongest().is_none()
    }

    /// Highest claim these options allow.
    pub fn strongest(&self) -> Option<ClaimKind> {
        if self.can_win {
            Some(ClaimKind::Win)
        } else if self.can_kong {
            Some(ClaimKind::Kong)
        } else if self.can_pong {
            Some(ClaimKind::Pong)
        } else if self.can_chow() {
            Some(ClaimKind::Chow)
        } else {
            None
        }
    }

    fn to_event(&self, tile: Tile) -> RoomEvent {
        RoomEvent::CanClaim {
            can_chow: self.can_chow(),
            can_pong: self.can_pong,
            can_kong: self.can_kong,
            can_win: self.can_win,
            chow_options: self.chow_runs.clone(),
            tile,
        }
    }
}

/// A validated claim. `run` is set for chows only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub kind: ClaimKind,
    pub run: Option<[Tile; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Pass,
    Claim(Claim),
}

#[derive(Debug, Clone)]
pub struct ClaimWindow {
    pub seq: u64,
    pub discarder: Seat,
    pub tile: Tile,
    /// `Some` for every seat allowed to respond.
    pub options: [Option<ClaimOptions>; NUM_SEATS],
    pub responses: [Option<Response>; NUM_SEATS],
}

impl ClaimWindow {
    pub fn is_eligible(&self, seat: Seat) -> bool {
        self.options.get(seat).is_some_and(Option::is_some)
    }

    /// Eligible seats that have not answered yet.
    pub fn awaiting(&self) -> impl Iterator<Item = Seat> + '_ {
        (0..NUM_SEATS).filter(|&s| self.is_eligible(s) && self.responses[s].is_none())
    }

    pub fn is_settled(&self) -> bool {
        self.awaiting().next().is_none()
    }

    /// True once the outcome is fixed: everyone answered, or no seat still
    /// awaited could beat the best recorded claim.
    pub fn is_decided(&self) -> bool {
        let Some((best_seat, best)) = self.best_claim() else {
            return self.is_settled();
        };
        !self.awaiting().any(|seat| {
            let Some(kind) = self.options[seat].as_ref().and_then(ClaimOptions::strongest) else {
                return false;
            };
            kind > best.kind
                || (kind == best.kind && self.distance(seat) < self.distance(best_seat))
        })
    }

    /// Seats after the discarder in turn order: 1, 2 or 3.
    fn distance(&self, seat: Seat) -> usize {
        (seat + NUM_SEATS - self.discarder) % NUM_SEATS
    }

    /// Strongest recorded claim; ties go to the nearest seat downstream.
    pub fn best_claim(&self) -> Option<(Seat, Claim)> {
        self.responses
            .iter()
            .enumerate()
            .filter_map(|(seat, r)| match r {
                Some(Response::Claim(c)) => Some((seat, *c)),
                _ => None,
            })
            .max_by(|(sa, a), (sb, b)| {
                a.kind
                    .cmp(&b.kind)
                    .then_with(|| self.distance(*sb).cmp(&self.distance(*sa)))
            })
    }
}

/// Runs in `hand` that `tile` completes.
pub fn chow_runs(hand: &[Tile], tile: Tile) -> Vec<[Tile; 3]> {
    tile.runs_containing()
        .filter(|run| {
            run.iter()
                .filter(|&&t| t != tile)
                .all(|t| hand.contains(t))
        })
        .collect()
}

/// Options for a hand facing a discard. `may_chow` holds only for the seat
/// right after the discarder; a kong needs a supplement tile left in the wall.
pub fn claim_options(
    hand: &[Tile],
    melds: &[Meld],
    tile: Tile,
    may_chow: bool,
    wall_has_tiles: bool,
) -> ClaimOptions {
    let held = hand.iter().filter(|&&t| t == tile).count();
    ClaimOptions {
        can_pong: held >= 2,
        can_kong: held >= 3 && wall_has_tiles,
        can_win: HandEvaluator::with_claimed(hand, melds, tile).is_win(),
        chow_runs: if may_chow {
            chow_runs(hand, tile)
        } else {
            Vec::new()
        },
    }
}

fn select_claim(
    options: &ClaimOptions,
    kind: ClaimKind,
    run: Option<[Tile; 3]>,
) -> RoomResult<Claim> {
    let allowed = match kind {
        ClaimKind::Win => {
            if !options.can_win {
                return Err(RoomError::CannotWin);
            }
            true
        }
        ClaimKind::Kong => options.can_kong,
        ClaimKind::Pong => options.can_pong,
        ClaimKind::Chow => {
            let chosen = match run {
                Some(mut wanted) => {
                    wanted.sort();
                    options.chow_runs.iter().find(|r| **r == wanted).copied()
                }
                None => options.chow_runs.first().copied(),
            };
            return chosen
                .map(|r| Claim {
                    kind,
                    run: Some(r),
                })
                .ok_or_else(|| RoomError::InvalidClaim {
                    message: "no matching chow combination".to_string(),
                });
        }
    };
    if !allowed {
        return Err(RoomError::InvalidClaim {
            message: format!("cannot {} this tile", kind.name()),
        });
    }
    Ok(Claim { kind, run: None })
}

impl Room {
    /// Offers `tile` to the other seats, or passes the turn on when nobody
    /// can use it.
    pub(super) fn open_claim_window(&mut self, discarder: Seat, tile: Tile) -> Vec<Delivery> {
        let options: [Option<ClaimOptions>; NUM_SEATS] =
            std::array::from_fn(|seat| self.options_for(seat, discarder, tile));
        if options.iter().all(Option::is_none) {
            return self.advance_turn(discarder);
        }

        self.claim_seq += 1;
        let mut out = Vec::new();
        for (seat, opts) in options.iter().enumerate() {
            if let Some(opts) = opts {
                out.push(Delivery::to(&self.players[seat].id, opts.to_event(tile)));
            }
        }
        debug!(
            room_id = %self.room_id,
            seq = self.claim_seq,
            discarder,
            tile = %tile,
            eligible = out.len(),
            "claim window opened"
        );
        self.claim_window = Some(ClaimWindow {
            seq: self.claim_seq,
            discarder,
            tile,
            options,
            responses: Default::default(),
        });
        self.phase = Phase::WaitResponse;
        out
    }

    fn options_for(&self, seat: Seat, discarder: Seat, tile: Tile) -> Option<ClaimOptions> {
        if seat == discarder {
            return None;
        }
        let p = self.players.get(seat)?;
        if !p.connected {
            return None;
        }
        let opts = claim_options(
            &p.hand,
            &p.melds,
            tile,
            seat == (discarder + 1) % NUM_SEATS,
            !self.wall.is_empty(),
        );
        (!opts.is_empty()).then_some(opts)
    }

    /// Sequence number of the open window, if any.
    pub fn open_claim_seq(&self) -> Option<u64> {
        self.claim_window.as_ref().map(|w| w.seq)
    }

    pub(super) fn respond(
        &mut self,
        seat: Seat,
        kind: ClaimKind,
        run: Option<[Tile; 3]>,
    ) -> RoomResult<Vec<Delivery>> {
        let window = self.claim_window.as_ref().ok_or(RoomError::StaleClaim)?;
        let Some(options) = window.options[seat].as_ref() else {
            if kind == ClaimKind::Win {
                return Err(RoomError::CannotWin);
            }
            return Err(RoomError::InvalidClaim {
                message: "no claim is open to you on this discard".to_string(),
            });
        };
        if window.responses[seat].is_some() {
            return Err(RoomError::InvalidClaim {
                message: "already responded to this discard".to_string(),
            });
        }
        let claim = select_claim(options, kind, run)?;

        match self.rule.claim_policy {
            ClaimPolicy::FirstCome => self.resolve_claim(seat, claim),
            ClaimPolicy::Precedence => {
                self.record_response(seat, Response::Claim(claim));
                self.settle_if_complete()
            }
        }
    }

    pub(super) fn pass(&mut self, seat: Seat) -> RoomResult<Vec<Delivery>> {
        let window = self.claim_window.as_ref().ok_or(RoomError::StaleClaim)?;
        if !window.is_eligible(seat) {
            return Err(RoomError::InvalidClaim {
                message: "nothing to pass on".to_string(),
            });
        }
        if window.responses[seat].is_some() {
            return Err(RoomError::InvalidClaim {
                message: "already responded to this discard".to_string(),
            });
        }
        self.record_response(seat, Response::Pass);
        self.settle_if_complete()
    }

    /// Closes window `seq` on timeout. Seats that did not answer count as
    /// passing; claims already recorded still resolve.
    pub fn expire_claim_window(&mut self, seq: u64) -> RoomResult<Vec<Delivery>> {
        match &self.claim_window {
            Some(w) if w.seq == seq => {
                info!(
                    room_id = %self.room_id,
                    seq,
                    silent = w.awaiting().count(),
                    "claim window timed out"
                );
                self.settle_window()
            }
            _ => Err(RoomError::StaleClaim),
        }
    }

    pub(super) fn record_response(&mut self, seat: Seat, response: Response) {
        if let Some(w) = self.claim_window.as_mut() {
            w.responses[seat] = Some(response);
        }
    }

    pub(super) fn settle_if_complete(&mut self) -> RoomResult<Vec<Delivery>> {
        match &self.claim_window {
            Some(w) if w.is_decided() => self.settle_window(),
            _ => Ok(Vec::new()),
        }
    }

    fn settle_window(&mut self) -> RoomResult<Vec<Delivery>> {
        let Some(window) = self.claim_window.as_ref() else {
            return Err(RoomError::StaleClaim);
        };
        match window.best_claim() {
            Some((seat, claim)) => self.resolve_claim(seat, claim),
            None => {
                let discarder = window.discarder;
                Ok(self.advance_turn(discarder))
            }
        }
    }

    /// Applies a winning claim to the open window's tile.
    fn resolve_claim(&mut self, seat: Seat, claim: Claim) -> RoomResult<Vec<Delivery>> {
        let (discarder, tile) = match &self.claim_window {
            Some(w) => (w.discarder, w.tile),
            None => return Err(RoomError::StaleClaim),
        };

        // Everything that can fail happens before the first mutation.
        let fan = match claim.kind {
            ClaimKind::Win => {
                let p = &self.players[seat];
                Some(
                    HandEvaluator::with_claimed(&p.hand, &p.melds, tile)
                        .calc(false)
                        .ok_or(RoomError::CannotWin)?,
                )
            }
            _ => None,
        };
        if claim.kind == ClaimKind::Chow && claim.run.is_none() {
            return Err(RoomError::InvalidState {
                message: "chow claim without a run".to_string(),
            });
        }
        let supplement = match claim.kind {
            ClaimKind::Kong => Some(self.wall.draw().ok_or_else(|| RoomError::InvalidClaim {
                message: "no supplement tile left in the wall".to_string(),
            })?),
            _ => None,
        };

        self.claim_window = None;
        self.last_discard = None;
        let taken = self.players[discarder].discards.pop();
        debug_assert_eq!(taken, Some(tile));
        info!(
            room_id = %self.room_id,
            seat,
            from = discarder,
            claim = claim.kind.name(),
            tile = %tile,
            "claim resolved"
        );

        let player = &mut self.players[seat];
        let claimed = match claim.kind {
            ClaimKind::Win => {
                sorted_insert(&mut player.hand, tile);
                return match fan {
                    Some(fan) => Ok(self.finish_win(seat, fan, false)),
                    None => Err(RoomError::CannotWin),
                };
            }
            ClaimKind::Pong => {
                for _ in 0..2 {
                    remove_one(&mut player.hand, tile);
                }
                player.melds.push(Meld::triplet(tile, discarder));
                ClaimKind::Pong
            }
            ClaimKind::Chow => {
                if let Some(run) = claim.run {
                    for &t in run.iter().filter(|&&t| t != tile) {
                        remove_one(&mut player.hand, t);
                    }
                    player.melds.push(Meld::run(run, tile, discarder));
                }
                ClaimKind::Chow
            }
            ClaimKind::Kong => {
                for _ in 0..3 {
                    remove_one(&mut player.hand, tile);
                }
                player.melds.push(Meld::quad(tile, Some(discarder)));
                ClaimKind::Kong
            }
        };

        self.current_player = seat;
        self.phase = Phase::WaitAct;
        self.needs_draw = false;
        self.drawn_tile = None;
        Ok(self.meld_formed(seat, claimed, supplement))
    }

    /// Events after a pong, chow or kong; a kong also hands over its
    /// supplement tile.
    pub(super) fn meld_formed(
        &mut self,
        seat: Seat,
        kind: ClaimKind,
        supplement: Option<Tile>,
    ) -> Vec<Delivery> {
        if let Some(t) = supplement {
            sorted_insert(&mut self.players[seat].hand, t);
            self.drawn_tile = Some(t);
        }

        let p = &self.players[seat];
        let player_id = p.id.clone();
        let melds = p.melds.clone();
        let announce = match kind {
            ClaimKind::Pong => RoomEvent::PongClaimed {
                player_id: player_id.clone(),
                player_index: seat,
                melds,
            },
            ClaimKind::Chow => RoomEvent::ChowClaimed {
                player_id: player_id.clone(),
                player_index: seat,
                melds,
            },
            _ => RoomEvent::KongClaimed {
                player_id: player_id.clone(),
                player_index: seat,
                melds,
            },
        };

        let mut out = vec![
            Delivery::room(announce),
            Delivery::to(&player_id, RoomEvent::UpdateHand {
                hand: p.hand.clone(),
            }),
        ];
        if let Some(tile) = supplement {
            out.push(Delivery::to(&player_id, RoomEvent::TileDrawnAfterKong { tile }));
        }
        out.push(Delivery::room(self.game_state_event()));
        let message = if supplement.is_some() {
            "杠牌后已摸牌，请出牌"
        } else {
            "请出牌"
        };
        out.push(Delivery::to(&player_id, RoomEvent::CanPlay {
            message: message.to_string(),
        }));
        out
    }
}
