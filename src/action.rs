//! Actions: single-step moves and capture chains.
//!
//! An action carries a snapshot of the acting piece as it was when the action
//! was generated, so it knows which side acts and whether it crowns the piece.
//! The crowning flag is fixed at construction; it is never read back from the
//! board, which may have crowned and uncrowned the same piece several times
//! while a search explored and retracted branches.

use std::fmt;

use crate::board::{Side, Square, parse_square, square_name};
use crate::error::NotationError;
use crate::piece::Piece;

/// A single diagonal step to an adjacent empty square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    promotes: bool,
}

impl Move {
    pub fn new(piece: Piece, to: Square) -> Self {
        Self {
            from: piece.square,
            to,
            piece,
            promotes: piece.promotes_at(to),
        }
    }

    /// Whether applying this move crowns the acting piece.
    pub fn promotes(&self) -> bool {
        self.promotes
    }
}

/// One or more chained captures by a single piece.
///
/// `path[i]` is the landing square reached by jumping over `captured[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jump {
    pub start: Square,
    pub path: Vec<Square>,
    pub captured: Vec<Piece>,
    pub piece: Piece,
    promotes: bool,
}

impl Jump {
    pub fn new(piece: Piece, path: Vec<Square>, captured: Vec<Piece>) -> Self {
        debug_assert_eq!(path.len(), captured.len());
        let promotes = path.last().is_some_and(|&end| piece.promotes_at(end));
        Self {
            start: piece.square,
            path,
            captured,
            piece,
            promotes,
        }
    }

    pub fn end(&self) -> Square {
        self.path.last().copied().unwrap_or(self.start)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Move(Move),
    Jump(Jump),
}

impl Action {
    /// The side performing the action.
    pub fn side(&self) -> Side {
        self.piece().owner
    }

    /// The acting piece, as it was before the action.
    pub fn piece(&self) -> &Piece {
        match self {
            Action::Move(m) => &m.piece,
            Action::Jump(j) => &j.piece,
        }
    }

    pub fn from(&self) -> Square {
        match self {
            Action::Move(m) => m.from,
            Action::Jump(j) => j.start,
        }
    }

    pub fn to(&self) -> Square {
        match self {
            Action::Move(m) => m.to,
            Action::Jump(j) => j.end(),
        }
    }

    /// Whether applying this action crowns the acting piece.
    pub fn promotes(&self) -> bool {
        match self {
            Action::Move(m) => m.promotes,
            Action::Jump(j) => j.promotes,
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, Action::Jump(_))
    }

    pub fn captured(&self) -> &[Piece] {
        match self {
            Action::Move(_) => &[],
            Action::Jump(j) => &j.captured,
        }
    }

    /// Square notation: `c3-d4` for a move, `c3xe5xg7` for a capture chain.
    pub fn notation(&self) -> String {
        match self {
            Action::Move(m) => format!("{}-{}", square_name(m.from), square_name(m.to)),
            Action::Jump(j) => std::iter::once(j.start)
                .chain(j.path.iter().copied())
                .map(square_name)
                .collect::<Vec<_>>()
                .join("x"),
        }
    }

    /// Find the legal action written as `text`.
    ///
    /// Accepts the full notation, or `from-to` / `fromxto` naming only the start
    /// and final squares of a capture chain.
    pub fn find(text: &str, legal: &[Action]) -> Result<Action, NotationError> {
        let text = text.trim().to_ascii_lowercase();
        if let Some(action) = legal.iter().find(|a| a.notation() == text) {
            return Ok(action.clone());
        }

        let squares = text
            .split(['-', 'x'])
            .map(|s| parse_square(s).ok_or_else(|| NotationError::Square(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        let (Some(&from), Some(&to)) = (squares.first(), squares.last()) else {
            return Err(NotationError::Action(text));
        };
        if squares.len() < 2 {
            return Err(NotationError::Action(text));
        }

        legal
            .iter()
            .find(|a| a.from() == from && a.to() == to)
            .cloned()
            .ok_or(NotationError::NoMatch(text))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side(), self.notation())?;
        if self.promotes() {
            write!(f, " (crowned)")?;
        }
        Ok(())
    }
}
