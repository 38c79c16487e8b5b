//! Monte Carlo playouts (simulated continuations of a position).
//!
//! A playout plays up to [`PLAYOUT_PLY_CAP`] plies from a position, either
//! uniformly at random or greedily by one-ply static evaluation, then scores
//! the result for one side. Every simulated action is undone before returning,
//! so the position handed in is left exactly as it was.

use crate::action::Action;
use crate::board::Side;
use crate::constants::{PLAYOUT_EVAL_SCALE, PLAYOUT_PLY_CAP, REWARD_DRAW, REWARD_LOSS, REWARD_WIN};
use crate::eval::{EvalWeights, evaluate, normalize};
use crate::state::{GameState, Outcome};

/// How a playout picks the next action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlayoutPolicy {
    #[default]
    Random,
    /// Best action by static evaluation after one ply; ties keep generation order.
    Greedy,
}

/// Reward of a finished game for `side`.
pub fn outcome_reward(outcome: Outcome, side: Side) -> f64 {
    match outcome {
        Outcome::Draw => REWARD_DRAW,
        Outcome::Win(winner) if winner == side => REWARD_WIN,
        Outcome::Win(_) => REWARD_LOSS,
    }
}

/// Simulate from `state` and return the reward for `perspective` in `[0, 1]`.
///
/// The state is mutated during the playout and restored before returning.
pub fn playout(
    state: &mut GameState,
    policy: PlayoutPolicy,
    rng: &mut fastrand::Rng,
    weights: &EvalWeights,
    perspective: Side,
) -> f64 {
    let mut played: Vec<Action> = Vec::with_capacity(PLAYOUT_PLY_CAP);

    let reward = loop {
        let mut actions = state.legal_actions();
        if let Some(outcome) = state.outcome_with_actions(&actions) {
            break outcome_reward(outcome, perspective);
        }
        if played.len() >= PLAYOUT_PLY_CAP {
            break normalize(evaluate(state, perspective, weights), PLAYOUT_EVAL_SCALE);
        }

        let idx = match policy {
            PlayoutPolicy::Random => rng.usize(..actions.len()),
            PlayoutPolicy::Greedy => greedy_index(state, &actions, weights),
        };
        let action = actions.swap_remove(idx);
        state.apply(&action);
        played.push(action);
    };

    for action in played.iter().rev() {
        state.undo(action);
    }
    reward
}

fn greedy_index(state: &mut GameState, actions: &[Action], weights: &EvalWeights) -> usize {
    let mover = state.current_side();
    let mut best = (0, i32::MIN);
    for (idx, action) in actions.iter().enumerate() {
        state.apply(action);
        let value = evaluate(state, mover, weights);
        state.undo(action);
        if value > best.1 {
            best = (idx, value);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, parse_square};
    use crate::piece::PieceKind;

    #[test]
    fn test_playout_restores_state() {
        let mut rng = fastrand::Rng::with_seed(11);
        let weights = EvalWeights::default();
        for policy in [PlayoutPolicy::Random, PlayoutPolicy::Greedy] {
            let mut state = GameState::new();
            let before = state.clone();
            let reward = playout(&mut state, policy, &mut rng, &weights, Side::Red);
            assert!((0.0..=1.0).contains(&reward));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_terminal_position_scores_outcome() {
        let mut board = Board::empty();
        board.place(Side::Red, parse_square("d4").unwrap(), PieceKind::Man).unwrap();
        let mut state = GameState::from_board(board, Side::White);
        let mut rng = fastrand::Rng::with_seed(1);
        let w = EvalWeights::default();
        assert_eq!(playout(&mut state, PlayoutPolicy::Random, &mut rng, &w, Side::Red), REWARD_WIN);
        assert_eq!(playout(&mut state, PlayoutPolicy::Random, &mut rng, &w, Side::White), REWARD_LOSS);
    }

    #[test]
    fn test_greedy_takes_the_capture_that_wins_material() {
        let mut board = Board::empty();
        board.place(Side::Red, parse_square("c3").unwrap(), PieceKind::Man).unwrap();
        board.place(Side::White, parse_square("d4").unwrap(), PieceKind::Man).unwrap();
        board.place(Side::White, parse_square("h8").unwrap(), PieceKind::Man).unwrap();
        let mut state = GameState::from_board(board, Side::Red);
        let actions = state.legal_actions();
        let idx = greedy_index(&mut state, &actions, &EvalWeights::default());
        assert!(actions[idx].is_capture());
    }
}
