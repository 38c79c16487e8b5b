//! Game state: board, side to move and draw counter, with exact apply/undo.
//!
//! `apply` followed by `undo` of the same action restores a state equal to the
//! original in board contents (including roster order and king flags), side to
//! move and quiet-ply counter. The prior counter values are kept on a stack
//! because a capture resets the counter and the old value cannot be recomputed.

use std::fmt;

use crate::action::Action;
use crate::board::{Board, Side};
use crate::constants::{DRAW_THRESHOLD, MIDGAME_MIN_PIECES, OPENING_MIN_PIECES};
use crate::error::RuleError;
use crate::piece::PieceKind;
use crate::rules::{check_simple_move, generate_legal_actions};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameStage {
    Opening,
    Mid,
    End,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win(Side),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(side) => write!(f, "{side} wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    current: Side,
    quiet_plies: u32,
    quiet_history: Vec<u32>,
    draw_threshold: u32,
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.current == other.current
            && self.quiet_plies == other.quiet_plies
    }
}

impl Eq for GameState {}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// The standard opening position with Red to move.
    pub fn new() -> Self {
        Self::from_board(Board::new(), Side::Red)
    }

    pub fn from_board(board: Board, to_move: Side) -> Self {
        Self {
            board,
            current: to_move,
            quiet_plies: 0,
            quiet_history: Vec::new(),
            draw_threshold: DRAW_THRESHOLD,
        }
    }

    pub fn with_quiet_plies(mut self, quiet_plies: u32) -> Self {
        self.quiet_plies = quiet_plies;
        self
    }

    pub fn with_draw_threshold(mut self, threshold: u32) -> Self {
        self.draw_threshold = threshold;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_side(&self) -> Side {
        self.current
    }

    pub fn quiet_plies(&self) -> u32 {
        self.quiet_plies
    }

    pub fn draw_threshold(&self) -> u32 {
        self.draw_threshold
    }

    pub fn stage(&self) -> GameStage {
        match self.board.total_pieces() {
            n if n >= OPENING_MIN_PIECES => GameStage::Opening,
            n if n >= MIDGAME_MIN_PIECES => GameStage::Mid,
            _ => GameStage::End,
        }
    }

    /// Legal actions for the side to move, captures being mandatory.
    pub fn legal_actions(&self) -> Vec<Action> {
        generate_legal_actions(self.current, &self.board)
    }

    /// Validate an externally supplied action against this state.
    pub fn check_action(&self, action: &Action) -> Result<(), RuleError> {
        if action.side() != self.current {
            return Err(RuleError::WrongSide {
                expected: self.current,
                actual: action.side(),
            });
        }
        if let Action::Move(mv) = action {
            check_simple_move(mv, &self.board)?;
        }
        if self.legal_actions().contains(action) {
            Ok(())
        } else {
            Err(RuleError::NotLegal)
        }
    }

    /// Play `action` for the side to move.
    pub fn apply(&mut self, action: &Action) {
        let piece = *action.piece();
        let side = piece.owner;
        debug_assert_eq!(side, self.current, "{action} applied out of turn");

        match action {
            Action::Move(mv) => self.board.move_piece(side, piece.id, mv.to),
            Action::Jump(jump) => {
                for &land in &jump.path {
                    self.board.move_piece(side, piece.id, land);
                }
                for victim in &jump.captured {
                    let removed = self.board.remove_piece(victim.owner, victim.id);
                    debug_assert_eq!(removed.as_ref(), Some(victim), "captured piece out of sync");
                }
            }
        }
        if action.promotes() {
            self.board.set_kind(side, piece.id, PieceKind::King);
        }

        self.quiet_history.push(self.quiet_plies);
        if action.is_capture() || piece.is_king() {
            self.quiet_plies = 0;
        } else {
            self.quiet_plies += 1;
        }
        self.current = side.opponent();
        debug_assert!(self.board.is_consistent());
    }

    /// Retract `action`, which must be the last action applied to this state.
    pub fn undo(&mut self, action: &Action) {
        let piece = *action.piece();
        let side = piece.owner;
        self.current = side;

        if action.promotes() {
            self.board.set_kind(side, piece.id, PieceKind::Man);
        }
        self.board.move_piece(side, piece.id, action.from());
        for victim in action.captured().iter().rev() {
            self.board.restore_piece(*victim);
        }

        let previous = self.quiet_history.pop();
        debug_assert!(previous.is_some(), "undo without matching apply");
        self.quiet_plies = previous.unwrap_or(0);
        debug_assert!(self.board.is_consistent());
    }

    /// A copy of this state with `action` applied.
    pub fn successor(&self, action: &Action) -> GameState {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome_with_actions(&self.legal_actions())
    }

    /// Same as [`GameState::outcome`], reusing already generated legal actions.
    pub fn outcome_with_actions(&self, legal: &[Action]) -> Option<Outcome> {
        let mover = self.current;
        if self.quiet_plies >= self.draw_threshold {
            Some(Outcome::Draw)
        } else if self.board.count(mover) == 0 || legal.is_empty() {
            Some(Outcome::Win(mover.opponent()))
        } else if self.board.count(mover.opponent()) == 0 {
            Some(Outcome::Win(mover))
        } else {
            None
        }
    }

    /// The winning side; `None` while the game is running or when it is drawn.
    pub fn winner(&self) -> Option<Side> {
        match self.outcome() {
            Some(Outcome::Win(side)) => Some(side),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.outcome() == Some(Outcome::Draw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let state = GameState::new();
        assert_eq!(state.current_side(), Side::Red);
        assert_eq!(state.stage(), GameStage::Opening);
        assert_eq!(state.legal_actions().len(), 7);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_apply_switches_side_and_counts_quiet_plies() {
        let mut state = GameState::new();
        let action = state.legal_actions()[0].clone();
        state.apply(&action);
        assert_eq!(state.current_side(), Side::White);
        assert_eq!(state.quiet_plies(), 1);
        state.undo(&action);
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_successor_leaves_original_untouched() {
        let state = GameState::new();
        let action = state.legal_actions()[3].clone();
        let next = state.successor(&action);
        assert_ne!(next, state);
        assert_eq!(state, GameState::new());
        assert!(next.board().piece_at(action.to()).is_some());
    }
}
