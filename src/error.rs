//! Error types.

use thiserror::Error;

use crate::board::{Side, Square};
use crate::piece::PieceId;

/// Why a candidate action is not legal on a given board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("square {0} is off the board")]
    OffBoard(Square),
    #[error("square {0} is not a dark square")]
    LightSquare(Square),
    #[error("square {0} is occupied")]
    Occupied(Square),
    #[error("{from} and {to} are not diagonal neighbours")]
    NotAdjacent { from: Square, to: Square },
    #[error("piece {0} cannot move in that direction")]
    WrongDirection(PieceId),
    #[error("piece {0} is not where the action expects it")]
    PieceMismatch(PieceId),
    #[error("action belongs to {actual}, but {expected} is to move")]
    WrongSide { expected: Side, actual: Side },
    #[error("action is not among the legal actions")]
    NotLegal,
}

/// Why a human move submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("the game is over")]
    GameOver,
    #[error("it is not {0}'s turn")]
    NotYourTurn(Side),
    #[error("{0} is not controlled by a human")]
    NotHuman(Side),
    #[error("no move is being waited for")]
    NoPendingTurn,
    #[error("illegal action: {0}")]
    Illegal(#[from] RuleError),
    #[error("the coordinator has stopped")]
    Stopped,
}

/// Malformed square or action text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("invalid square '{0}'")]
    Square(String),
    #[error("invalid action '{0}'")]
    Action(String),
    #[error("no legal action matches '{0}'")]
    NoMatch(String),
}
