//! Pieces and their movement directions.

use std::fmt;

use crate::board::{Direction, Side, Square, row};

/// Identifier of a piece, unique within one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(pub u8);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Man,
    King,
}

/// Red men step toward row 0.
pub const RED_DIRECTIONS: [Direction; 2] = [Direction::NORTH_WEST, Direction::NORTH_EAST];

/// White men step toward row 7.
pub const WHITE_DIRECTIONS: [Direction; 2] = [Direction::SOUTH_WEST, Direction::SOUTH_EAST];

pub const KING_DIRECTIONS: [Direction; 4] = [
    Direction::NORTH_WEST,
    Direction::NORTH_EAST,
    Direction::SOUTH_WEST,
    Direction::SOUTH_EAST,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub owner: Side,
    pub kind: PieceKind,
    pub square: Square,
}

impl Piece {
    pub fn new(id: PieceId, owner: Side, square: Square) -> Self {
        Self {
            id,
            owner,
            kind: PieceKind::Man,
            square,
        }
    }

    #[inline]
    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// Directions this piece may move and capture in.
    pub fn directions(&self) -> &'static [Direction] {
        match (self.kind, self.owner) {
            (PieceKind::King, _) => &KING_DIRECTIONS,
            (PieceKind::Man, Side::Red) => &RED_DIRECTIONS,
            (PieceKind::Man, Side::White) => &WHITE_DIRECTIONS,
        }
    }

    /// Whether landing on `sq` crowns this piece. Always false for kings.
    pub fn promotes_at(&self, sq: Square) -> bool {
        !self.is_king() && row(sq) == self.owner.promotion_row()
    }

    pub fn symbol(&self) -> char {
        match (self.owner, self.kind) {
            (Side::Red, PieceKind::Man) => 'r',
            (Side::Red, PieceKind::King) => 'R',
            (Side::White, PieceKind::Man) => 'w',
            (Side::White, PieceKind::King) => 'W',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_men_only_move_forward() {
        let red = Piece::new(PieceId(0), Side::Red, 42);
        assert!(red.directions().iter().all(|d| d.drow == Side::Red.forward()));
        let white = Piece::new(PieceId(1), Side::White, 17);
        assert!(white.directions().iter().all(|d| d.drow == Side::White.forward()));
    }

    #[test]
    fn test_kings_move_all_ways_and_never_promote() {
        let mut king = Piece::new(PieceId(0), Side::Red, 1);
        king.kind = PieceKind::King;
        assert_eq!(king.directions().len(), 4);
        assert!(!king.promotes_at(3));
        let man = Piece::new(PieceId(1), Side::Red, 10);
        assert!(man.promotes_at(1));
        assert!(!man.promotes_at(62));
    }
}
