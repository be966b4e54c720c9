use crate::action::{Intent, Phase, PlayerId};
use crate::hand_evaluator::HandEvaluator;
use crate::state::Room;
use crate::tile::{tile_counts, Tile, COPIES_PER_TILE};
use crate::types::NUM_SEATS;

pub trait RoomLegalActions {
    /// Intents `player` could submit right now without being rejected.
    /// Strongest options come first.
    fn legal_intents(&self, player: &PlayerId) -> Vec<Intent>;
}

impl RoomLegalActions for Room {
    fn legal_intents(&self, player: &PlayerId) -> Vec<Intent> {
        let Some(seat) = self.seat_of(player) else {
            return Vec::new();
        };
        let p = &self.players[seat];
        if !p.connected {
            return Vec::new();
        }

        let mut legals = Vec::new();
        match self.phase {
            Phase::Waiting => {
                if seat == 0 && self.players.len() == NUM_SEATS {
                    legals.push(Intent::StartGame);
                }
            }
            Phase::Over => {}
            Phase::WaitAct => {
                if seat != self.current_player {
                    return legals;
                }
                if self.needs_draw {
                    legals.push(Intent::DrawTile);
                    return legals;
                }
                if self.drawn_tile.is_some() && HandEvaluator::new(&p.hand, &p.melds).is_win() {
                    legals.push(Intent::DeclareWin { is_self_draw: true });
                }
                if !self.wall.is_empty() {
                    let counts = tile_counts(&p.hand);
                    legals.extend(
                        Tile::all()
                            .filter(|t| counts[t.index()] as usize == COPIES_PER_TILE)
                            .map(Intent::ConcealedKong),
                    );
                }
                let mut last = None;
                for &t in &p.hand {
                    if last != Some(t) {
                        legals.push(Intent::PlayTile(t));
                        last = Some(t);
                    }
                }
            }
            Phase::WaitResponse => {
                let Some(window) = &self.claim_window else {
                    return legals;
                };
                let Some(opts) = window.options[seat].as_ref() else {
                    return legals;
                };
                if window.responses[seat].is_some() {
                    return legals;
                }
                if opts.can_win {
                    legals.push(Intent::DeclareWin { is_self_draw: false });
                }
                if opts.can_kong {
                    legals.push(Intent::ClaimKong);
                }
                if opts.can_pong {
                    legals.push(Intent::ClaimPong);
                }
                legals.extend(opts.chow_runs.iter().map(|&run| Intent::ClaimChow(Some(run))));
                legals.push(Intent::Pass);
            }
        }
        legals
    }
}
