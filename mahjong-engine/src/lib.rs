pub mod errors;
pub mod fan;
pub mod hand_evaluator;
mod tests;
pub mod tile;
pub mod types;

pub mod action;
pub mod event;
pub mod parser;
pub mod rule;
pub mod state;

pub use action::{Intent, Phase, PlayerId};
pub use errors::{RoomError, RoomResult};
pub use event::{Delivery, RoomEvent, Target};
pub use hand_evaluator::{is_winning_hand, HandEvaluator};
pub use rule::{ClaimPolicy, GameRule};
pub use state::legal_actions::RoomLegalActions;
pub use state::Room;
pub use tile::Tile;
