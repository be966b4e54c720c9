use thiserror::Error;

/// Reasons a room rejects an intent. A rejected intent never mutates the room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("the game has not started")]
    NotStarted,
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("room is full")]
    RoomFull,
    #[error("need 4 players to start, have {seated}")]
    NotEnoughPlayers { seated: usize },
    #[error("only the host can start the game")]
    NotHost,
    #[error("player {player} is not seated in this room")]
    UnknownPlayer { player: String },
    #[error("player {player} already has a seat")]
    AlreadySeated { player: String },
    #[error("seat {seat} is disconnected")]
    PlayerDisconnected { seat: usize },
    #[error("not your turn")]
    NotYourTurn,
    #[error("draw a tile before discarding")]
    MustDrawFirst,
    #[error("discard a tile before drawing")]
    MustDiscardFirst,
    #[error("tile {tile} is not in your hand")]
    TileNotInHand { tile: String },
    /// 吃/碰/杠 that the current hand does not support.
    #[error("invalid claim: {message}")]
    InvalidClaim { message: String },
    /// Claim or pass for a window that has already been resolved.
    #[error("claim window is closed")]
    StaleClaim,
    #[error("hand is not a winning hand")]
    CannotWin,
    #[error("the game is over")]
    GameOver,
    #[error("cannot parse '{input}': {message}")]
    Parse { input: String, message: String },
    /// Broken structural invariant; unreachable in a correct engine.
    #[error("invalid state: {message}")]
    InvalidState { message: String },
}

pub type RoomResult<T> = Result<T, RoomError>;
