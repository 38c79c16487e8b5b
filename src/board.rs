//! The 8x8 checkers board.
//!
//! The grid stores, per cell, which piece (side and id) occupies it. The pieces
//! themselves live in two rosters, one per side, kept sorted by id. Every mutation
//! updates grid and roster together so that a listed piece always sits on the cell
//! that refers to it.

use std::fmt;

use crate::constants::{BOARDSIZE, N, RED_START_ROWS, WHITE_START_ROWS};
use crate::error::RuleError;
use crate::piece::{Piece, PieceId, PieceKind};

/// A cell index in `0..64`, `row * 8 + col`.
pub type Square = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Player one. Starts on rows 5-7, moves toward row 0, plays first.
    Red,
    /// Player two. Starts on rows 0-2, moves toward row 7.
    White,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Red, Side::White];

    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::White,
            Side::White => Side::Red,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Red => 0,
            Side::White => 1,
        }
    }

    /// Row direction of a forward step.
    #[inline]
    pub fn forward(self) -> isize {
        match self {
            Side::Red => -1,
            Side::White => 1,
        }
    }

    /// The opponent's back row, where this side's men are crowned.
    pub fn promotion_row(self) -> usize {
        match self {
            Side::Red => 0,
            Side::White => N - 1,
        }
    }

    /// This side's own back row.
    pub fn home_row(self) -> usize {
        self.opponent().promotion_row()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Red => write!(f, "Red"),
            Side::White => write!(f, "White"),
        }
    }
}

/// A diagonal step, as a row and column delta of +-1.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Direction {
    pub drow: isize,
    pub dcol: isize,
}

impl Direction {
    pub const NORTH_WEST: Direction = Direction { drow: -1, dcol: -1 };
    pub const NORTH_EAST: Direction = Direction { drow: -1, dcol: 1 };
    pub const SOUTH_WEST: Direction = Direction { drow: 1, dcol: -1 };
    pub const SOUTH_EAST: Direction = Direction { drow: 1, dcol: 1 };
}

#[inline]
pub fn row(sq: Square) -> usize {
    sq / N
}

#[inline]
pub fn col(sq: Square) -> usize {
    sq % N
}

/// True for in-range cells where `row + col` is odd, the only playable squares.
#[inline]
pub fn is_dark(sq: Square) -> bool {
    sq < BOARDSIZE && (row(sq) + col(sq)) % 2 == 1
}

/// The square at `(row, col)`, or `None` off the board.
#[inline]
pub fn square_at(row: isize, col: isize) -> Option<Square> {
    if (0..N as isize).contains(&row) && (0..N as isize).contains(&col) {
        Some(row as usize * N + col as usize)
    } else {
        None
    }
}

/// The square `steps` diagonal steps away from `sq` in `dir`, without wrapping
/// around the board edge.
#[inline]
pub fn offset(sq: Square, dir: Direction, steps: isize) -> Option<Square> {
    square_at(
        row(sq) as isize + dir.drow * steps,
        col(sq) as isize + dir.dcol * steps,
    )
}

/// Square name, files `a`-`h` left to right and ranks `1`-`8` bottom to top.
pub fn square_name(sq: Square) -> String {
    let file = (b'a' + col(sq) as u8) as char;
    format!("{file}{}", N - row(sq))
}

/// Parse a square name such as `c3`.
pub fn parse_square(s: &str) -> Option<Square> {
    let bytes = s.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    let col = (file - b'a') as usize;
    let row = N - (rank - b'0') as usize;
    Some(row * N + col)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [Option<(Side, PieceId)>; BOARDSIZE],
    rosters: [Vec<Piece>; 2],
    next_id: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position: twelve men per side on the dark squares.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for sq in 0..BOARDSIZE {
            if !is_dark(sq) {
                continue;
            }
            let side = if WHITE_START_ROWS.contains(&row(sq)) {
                Side::White
            } else if RED_START_ROWS.contains(&row(sq)) {
                Side::Red
            } else {
                continue;
            };
            board.insert(Piece::new(PieceId(board.next_id), side, sq));
            board.next_id += 1;
        }
        board
    }

    /// A board without pieces, for setting up positions with [`Board::place`].
    pub fn empty() -> Self {
        Self {
            cells: [None; BOARDSIZE],
            rosters: [Vec::new(), Vec::new()],
            next_id: 0,
        }
    }

    /// Put a new piece on an empty dark square.
    pub fn place(&mut self, side: Side, sq: Square, kind: PieceKind) -> Result<PieceId, RuleError> {
        if sq >= BOARDSIZE {
            return Err(RuleError::OffBoard(sq));
        }
        if !is_dark(sq) {
            return Err(RuleError::LightSquare(sq));
        }
        if self.cells[sq].is_some() {
            return Err(RuleError::Occupied(sq));
        }
        let id = PieceId(self.next_id);
        self.next_id += 1;
        let mut piece = Piece::new(id, side, sq);
        piece.kind = kind;
        self.insert(piece);
        Ok(id)
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        let (side, id) = (*self.cells.get(sq)?)?;
        self.piece(side, id)
    }

    /// Out-of-range squares count as occupied.
    pub fn is_occupied(&self, sq: Square) -> bool {
        self.cells.get(sq).is_none_or(|c| c.is_some())
    }

    /// This side's live pieces, in id order.
    pub fn pieces(&self, side: Side) -> &[Piece] {
        &self.rosters[side.index()]
    }

    pub fn piece(&self, side: Side, id: PieceId) -> Option<&Piece> {
        let roster = &self.rosters[side.index()];
        roster
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &roster[i])
    }

    pub fn count(&self, side: Side) -> usize {
        self.rosters[side.index()].len()
    }

    pub fn total_pieces(&self) -> usize {
        self.count(Side::Red) + self.count(Side::White)
    }

    /// Relocate a piece. The target must be empty.
    pub(crate) fn move_piece(&mut self, side: Side, id: PieceId, to: Square) {
        let Some(piece) = self.piece_mut(side, id) else {
            debug_assert!(false, "moving a piece that is not on the board: {side} {id}");
            return;
        };
        let from = piece.square;
        piece.square = to;
        debug_assert!(self.cells[to].is_none() || from == to, "target {to} occupied");
        self.cells[from] = None;
        self.cells[to] = Some((side, id));
    }

    /// Take a piece off both grid and roster, returning it as it was.
    pub(crate) fn remove_piece(&mut self, side: Side, id: PieceId) -> Option<Piece> {
        let roster = &mut self.rosters[side.index()];
        let idx = roster.binary_search_by_key(&id, |p| p.id).ok()?;
        let piece = roster.remove(idx);
        self.cells[piece.square] = None;
        Some(piece)
    }

    /// Put a previously removed piece back exactly where it was.
    pub(crate) fn restore_piece(&mut self, piece: Piece) {
        debug_assert!(self.cells[piece.square].is_none(), "restoring onto occupied {}", piece.square);
        self.insert(piece);
    }

    pub(crate) fn set_kind(&mut self, side: Side, id: PieceId, kind: PieceKind) {
        if let Some(piece) = self.piece_mut(side, id) {
            piece.kind = kind;
        }
    }

    /// Check that grid and rosters agree. Used by debug assertions and tests.
    pub fn is_consistent(&self) -> bool {
        let listed = Side::ALL.iter().all(|&side| {
            self.pieces(side)
                .iter()
                .all(|p| p.owner == side && self.cells[p.square] == Some((side, p.id)))
        });
        let occupied = self.cells.iter().filter(|c| c.is_some()).count();
        listed && occupied == self.total_pieces()
    }

    fn piece_mut(&mut self, side: Side, id: PieceId) -> Option<&mut Piece> {
        let roster = &mut self.rosters[side.index()];
        let idx = roster.binary_search_by_key(&id, |p| p.id).ok()?;
        Some(&mut roster[idx])
    }

    fn insert(&mut self, piece: Piece) {
        let roster = &mut self.rosters[piece.owner.index()];
        let idx = roster.partition_point(|p| p.id < piece.id);
        roster.insert(idx, piece);
        self.cells[piece.square] = Some((piece.owner, piece.id));
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..N {
            write!(f, "{} ", N - r)?;
            for c in 0..N {
                let sq = r * N + c;
                let ch = match self.piece_at(sq) {
                    Some(piece) => piece.symbol(),
                    None if is_dark(sq) => '.',
                    None => ' ',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}
