//! Alpha-beta minimax with iterative deepening.
//!
//! Each call to [`MinimaxAgent::next_move`] searches depth 1, 2, 3, ... up to the
//! configured ceiling on a background thread. Only fully searched depths are
//! reported back; a depth interrupted by the time slice is discarded and the
//! previous depth's move is played. If no depth completes, a random legal action
//! is played instead.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, unbounded};
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::agent::{Agent, random_action};
use crate::board::Side;
use crate::budget::Budget;
use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_TIME_SLICE, MINIMAX_BUDGET_UNITS, SEARCH_GRACE};
use crate::eval::{EvalWeights, evaluate, terminal_score};
use crate::state::GameState;

/// Result of one fully searched depth.
#[derive(Clone, Debug)]
pub struct DepthResult {
    pub depth: u32,
    pub action: Action,
    pub score: i32,
    pub nodes: u64,
}

/// Summary of the last search run by a [`MinimaxAgent`].
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// Deepest completed depth, 0 if none completed.
    pub depth: u32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// The move was chosen at random because no depth completed.
    pub fallback: bool,
}

pub struct MinimaxAgent {
    max_depth: u32,
    time_slice: Duration,
    weights: EvalWeights,
    rng: fastrand::Rng,
    last_report: Option<SearchReport>,
}

impl Default for MinimaxAgent {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, DEFAULT_TIME_SLICE)
    }
}

impl MinimaxAgent {
    pub fn new(max_depth: u32, time_slice: Duration) -> Self {
        Self {
            max_depth: max_depth.max(1),
            time_slice,
            weights: EvalWeights::default(),
            rng: fastrand::Rng::new(),
            last_report: None,
        }
    }

    pub fn with_weights(mut self, weights: EvalWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.rng = fastrand::Rng::with_seed(seed);
        }
        self
    }

    /// Report of the last search; `None` if the last move was forced.
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }

    /// Run the background search against an explicit budget.
    pub fn search_with_budget(&mut self, state: &GameState, budget: Budget) -> Option<Action> {
        let (tx, rx) = unbounded::<DepthResult>();
        let root = state.clone();
        let weights = self.weights.clone();
        let max_depth = self.max_depth;
        let worker_budget = budget.clone();

        thread::spawn(move || {
            iterative_deepening(&root, max_depth, &weights, &worker_budget, |result| {
                let _ = tx.send(result);
            });
        });

        let mut best: Option<DepthResult> = None;
        loop {
            let received = match budget.deadline() {
                Some(deadline) => rx.recv_deadline(deadline + SEARCH_GRACE),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(result) => best = Some(result),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    warn!("minimax search overran its deadline, abandoning it");
                    budget.cancel();
                    break;
                }
            }
        }

        let elapsed = budget.elapsed();
        match best {
            Some(result) => {
                info!(
                    depth = result.depth,
                    score = result.score,
                    nodes = result.nodes,
                    ?elapsed,
                    action = %result.action,
                    "minimax move"
                );
                self.last_report = Some(SearchReport {
                    depth: result.depth,
                    score: result.score,
                    nodes: result.nodes,
                    elapsed,
                    fallback: false,
                });
                Some(result.action)
            }
            None => {
                warn!(?elapsed, "no depth completed, playing a random move");
                self.last_report = Some(SearchReport {
                    depth: 0,
                    score: 0,
                    nodes: 0,
                    elapsed,
                    fallback: true,
                });
                random_action(state, &mut self.rng)
            }
        }
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        "minimax"
    }

    fn next_move(&mut self, state: &GameState) -> Option<Action> {
        let mut actions = state.legal_actions();
        if actions.len() <= 1 {
            self.last_report = None;
            return actions.pop();
        }
        let budget = Budget::with_timeout(MINIMAX_BUDGET_UNITS, self.time_slice);
        self.search_with_budget(state, budget)
    }
}

/// Search depths `1..=max_depth`, calling `on_depth` after each completed depth.
///
/// Returns the result of the deepest completed depth. Stops early once a forced
/// win or loss is found, or as soon as the budget is exhausted.
pub fn iterative_deepening(
    state: &GameState,
    max_depth: u32,
    weights: &EvalWeights,
    budget: &Budget,
    mut on_depth: impl FnMut(DepthResult),
) -> Option<DepthResult> {
    let mut best = None;
    let mut nodes = 0;

    for depth in 1..=max_depth {
        if budget.is_exhausted() {
            break;
        }
        let mut search = AlphaBeta {
            weights,
            budget,
            side: state.current_side(),
            nodes: 0,
            aborted: false,
        };
        let result = search.root(state, depth);
        nodes += search.nodes;
        if search.aborted {
            debug!(depth, "depth interrupted, keeping previous result");
            break;
        }
        let Some((action, score)) = result else {
            break;
        };

        debug!(depth, score, nodes, action = %action, "depth complete");
        let result = DepthResult { depth, action, score, nodes };
        on_depth(result.clone());
        best = Some(result);

        if score.abs() > weights.max_static() {
            debug!(depth, score, "forced result found");
            break;
        }
    }

    best
}

struct AlphaBeta<'a> {
    weights: &'a EvalWeights,
    budget: &'a Budget,
    /// The side the search chooses a move for; scores are from its point of view.
    side: Side,
    nodes: u64,
    aborted: bool,
}

impl AlphaBeta<'_> {
    /// Best action and its score. Ties keep the first action in generation order.
    fn root(&mut self, state: &GameState, depth: u32) -> Option<(Action, i32)> {
        let mut alpha = i32::MIN;
        let beta = i32::MAX;
        let mut best: Option<(Action, i32)> = None;

        for action in state.legal_actions() {
            let child = state.successor(&action);
            let value = self.alphabeta(&child, depth - 1, 1, alpha, beta, false);
            if self.aborted {
                return None;
            }
            if best.as_ref().is_none_or(|(_, score)| value > *score) {
                alpha = alpha.max(value);
                best = Some((action, value));
            }
        }
        best
    }

    fn alphabeta(
        &mut self,
        state: &GameState,
        depth: u32,
        ply: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        if self.budget.is_exhausted() {
            self.aborted = true;
            return 0;
        }

        let actions = state.legal_actions();
        if let Some(outcome) = state.outcome_with_actions(&actions) {
            return terminal_score(outcome, self.side, ply, self.weights);
        }
        if depth == 0 {
            return evaluate(state, self.side, self.weights);
        }

        if maximizing {
            let mut value = i32::MIN;
            for action in &actions {
                let child = state.successor(action);
                value = value.max(self.alphabeta(&child, depth - 1, ply + 1, alpha, beta, false));
                if self.aborted {
                    return 0;
                }
                alpha = alpha.max(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        } else {
            let mut value = i32::MAX;
            for action in &actions {
                let child = state.successor(action);
                value = value.min(self.alphabeta(&child, depth - 1, ply + 1, alpha, beta, true));
                if self.aborted {
                    return 0;
                }
                beta = beta.min(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, parse_square};
    use crate::piece::PieceKind;

    fn sq(name: &str) -> usize {
        parse_square(name).unwrap()
    }

    #[test]
    fn test_single_action_skips_search() {
        let mut board = Board::empty();
        board.place(Side::Red, sq("a3"), PieceKind::Man).unwrap();
        board.place(Side::White, sq("h8"), PieceKind::Man).unwrap();
        let state = GameState::from_board(board, Side::Red);
        assert_eq!(state.legal_actions().len(), 1);

        let mut agent = MinimaxAgent::new(6, Duration::from_secs(5));
        let action = agent.next_move(&state).unwrap();
        assert_eq!(action, state.legal_actions()[0]);
        assert!(agent.last_report().is_none());
    }

    #[test]
    fn test_exhausted_budget_falls_back_to_random() {
        let state = GameState::new();
        let mut agent = MinimaxAgent::new(4, Duration::from_secs(1)).with_seed(Some(3));
        let action = agent.search_with_budget(&state, Budget::new(0)).unwrap();
        assert!(state.legal_actions().contains(&action));
        assert!(agent.last_report().unwrap().fallback);
    }

    #[test]
    fn test_iterative_deepening_reports_each_depth() {
        let state = GameState::new();
        let mut depths = Vec::new();
        let best = iterative_deepening(&state, 3, &EvalWeights::default(), &Budget::new(u64::MAX), |r| {
            depths.push(r.depth)
        });
        assert_eq!(depths, vec![1, 2, 3]);
        assert_eq!(best.unwrap().depth, 3);
    }

    #[test]
    fn test_interrupted_depth_keeps_previous_result() {
        let state = GameState::new();
        let budget = Budget::new(u64::MAX);
        let cutoff = budget.clone();
        let mut seen = Vec::new();
        let best = iterative_deepening(&state, 6, &EvalWeights::default(), &budget, |r| {
            if r.depth == 2 {
                cutoff.cancel();
            }
            seen.push((r.depth, r.action));
        });

        let best = best.unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(best.depth, 2);
        assert_eq!(best.action, seen[1].1);
    }
}
