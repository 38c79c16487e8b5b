//! Static evaluation shared by the search agents.
//!
//! A position is scored from one side's point of view as the difference of
//! both sides' sums of material, square tables and formation bonuses.
//! Terminal positions score a large win or loss divided by the ply at which
//! they are reached, so that quicker wins outrank slower ones. The magnitude is
//! floored just above [`EvalWeights::max_static`] so deep forced results stay
//! distinguishable from ordinary evaluations.

use crate::board::{Board, Direction, Side, offset, row};
use crate::constants::{
    BACK_RANK_BONUS, BOARDSIZE, ENDGAME_KING_BONUS, KING_TABLE, KING_VALUE, MAN_TABLE, MAN_VALUE,
    TRIANGLE_BONUS, WIN_SCORE,
};
use crate::piece::Piece;
use crate::state::{GameStage, GameState, Outcome};

/// Tuning parameters of the evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalWeights {
    pub man: i32,
    pub king: i32,
    /// Percentage applied to the square tables.
    pub table_scale: i32,
    pub back_rank: i32,
    pub triangle: i32,
    pub endgame_king: i32,
    pub win: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            man: MAN_VALUE,
            king: KING_VALUE,
            table_scale: 100,
            back_rank: BACK_RANK_BONUS,
            triangle: TRIANGLE_BONUS,
            endgame_king: ENDGAME_KING_BONUS,
            win: WIN_SCORE,
        }
    }
}

impl EvalWeights {
    /// Largest magnitude a non-terminal evaluation can reach, roughly.
    pub fn max_static(&self) -> i32 {
        let per_piece = self.king + self.endgame_king + self.back_rank + self.triangle + 30;
        per_piece * crate::constants::PIECES_PER_SIDE as i32
    }
}

/// Score `state` for `side`, `ply` plies below the search root.
pub fn score(state: &GameState, side: Side, ply: u32, weights: &EvalWeights) -> i32 {
    match state.outcome() {
        Some(outcome) => terminal_score(outcome, side, ply, weights),
        None => evaluate(state, side, weights),
    }
}

/// Win or loss magnitude shrinks with `ply` but never falls into the static range.
pub fn terminal_score(outcome: Outcome, side: Side, ply: u32, weights: &EvalWeights) -> i32 {
    let magnitude = (weights.win / (ply as i32 + 1)).max(weights.max_static() + 1);
    match outcome {
        Outcome::Draw => 0,
        Outcome::Win(winner) if winner == side => magnitude,
        Outcome::Win(_) => -magnitude,
    }
}

/// Static evaluation of a non-terminal position for `side`.
pub fn evaluate(state: &GameState, side: Side, weights: &EvalWeights) -> i32 {
    let stage = state.stage();
    let board = state.board();
    side_total(board, side, stage, weights) - side_total(board, side.opponent(), stage, weights)
}

fn side_total(board: &Board, side: Side, stage: GameStage, weights: &EvalWeights) -> i32 {
    board
        .pieces(side)
        .iter()
        .map(|piece| piece_value(board, piece, stage, weights))
        .sum()
}

fn piece_value(board: &Board, piece: &Piece, stage: GameStage, weights: &EvalWeights) -> i32 {
    // Tables are written for Red; White reads them mirrored through the centre.
    let sq = match piece.owner {
        Side::Red => piece.square,
        Side::White => BOARDSIZE - 1 - piece.square,
    };

    if piece.is_king() {
        let bonus = if stage == GameStage::End { weights.endgame_king } else { 0 };
        return weights.king + bonus + KING_TABLE[sq] * weights.table_scale / 100;
    }

    let mut value = weights.man + MAN_TABLE[sq] * weights.table_scale / 100;
    if row(piece.square) == piece.owner.home_row() {
        value += weights.back_rank;
    }
    if is_backed(board, piece) {
        value += weights.triangle;
    }
    value
}

/// Both squares diagonally behind the man hold friendly pieces.
fn is_backed(board: &Board, piece: &Piece) -> bool {
    let back = -piece.owner.forward();
    [-1, 1].iter().all(|&dcol| {
        offset(piece.square, Direction { drow: back, dcol }, 1)
            .and_then(|sq| board.piece_at(sq))
            .is_some_and(|p| p.owner == piece.owner)
    })
}

/// Map an evaluation for `side` into a reward in `[0, 1]`.
pub fn normalize(eval: i32, scale: f64) -> f64 {
    (0.5 + 0.5 * (eval as f64 / scale)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::parse_square;
    use crate::piece::PieceKind;

    #[test]
    fn test_start_position_is_balanced() {
        let state = GameState::new();
        let w = EvalWeights::default();
        assert_eq!(evaluate(&state, Side::Red, &w), 0);
        assert_eq!(evaluate(&state, Side::White, &w), 0);
    }

    #[test]
    fn test_king_outweighs_man() {
        let mut board = Board::empty();
        board.place(Side::Red, parse_square("d4").unwrap(), PieceKind::King).unwrap();
        board.place(Side::White, parse_square("e5").unwrap(), PieceKind::Man).unwrap();
        let state = GameState::from_board(board, Side::White);
        assert!(evaluate(&state, Side::Red, &EvalWeights::default()) > 0);
    }

    #[test]
    fn test_faster_wins_score_higher() {
        let w = EvalWeights::default();
        let fast = terminal_score(Outcome::Win(Side::Red), Side::Red, 1, &w);
        let slow = terminal_score(Outcome::Win(Side::Red), Side::Red, 5, &w);
        assert!(fast > slow);
        assert!(slow > w.max_static());
        assert_eq!(terminal_score(Outcome::Draw, Side::Red, 3, &w), 0);
        assert_eq!(terminal_score(Outcome::Win(Side::White), Side::Red, 1, &w), -fast);
    }

    #[test]
    fn test_deep_wins_stay_above_static_range() {
        let w = EvalWeights::default();
        for ply in [32, 33, 40, 200] {
            let win = terminal_score(Outcome::Win(Side::Red), Side::Red, ply, &w);
            assert!(win > w.max_static(), "ply {ply} scored {win}");
            assert_eq!(terminal_score(Outcome::Win(Side::White), Side::Red, ply, &w), -win);
        }
        let shallow = terminal_score(Outcome::Win(Side::Red), Side::Red, 10, &w);
        let deep = terminal_score(Outcome::Win(Side::Red), Side::Red, 60, &w);
        assert!(shallow > deep);
    }

    #[test]
    fn test_normalize_is_clamped() {
        assert_eq!(normalize(0, 100.0), 0.5);
        assert_eq!(normalize(1_000, 100.0), 1.0);
        assert_eq!(normalize(-1_000, 100.0), 0.0);
    }
}
