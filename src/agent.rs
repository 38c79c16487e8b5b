//! Computer players.
//!
//! An agent picks an action for the side to move. Agents never mutate the
//! state they are given; they search on their own copies.

use tracing::debug;

use crate::action::Action;
use crate::config::{PlayerModel, SearchLimits};
use crate::eval::EvalWeights;
use crate::mcts::MctsAgent;
use crate::minimax::MinimaxAgent;
use crate::state::GameState;

pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Choose an action for the side to move, `None` if it has none.
    fn next_move(&mut self, state: &GameState) -> Option<Action>;
}

/// A uniformly random legal action.
pub fn random_action(state: &GameState, rng: &mut fastrand::Rng) -> Option<Action> {
    let mut actions = state.legal_actions();
    if actions.is_empty() {
        return None;
    }
    let idx = rng.usize(..actions.len());
    Some(actions.swap_remove(idx))
}

pub struct RandomAgent {
    rng: fastrand::Rng,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { rng }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn next_move(&mut self, state: &GameState) -> Option<Action> {
        random_action(state, &mut self.rng)
    }
}

/// Build the agent for a player model; `None` for human players.
pub fn for_model(
    model: PlayerModel,
    limits: &SearchLimits,
    weights: &EvalWeights,
    seed: Option<u64>,
) -> Option<Box<dyn Agent>> {
    debug!(%model, ?limits, "creating agent");
    match model {
        PlayerModel::Human => None,
        PlayerModel::Random => Some(Box::new(RandomAgent::new(seed))),
        PlayerModel::Minimax => Some(Box::new(
            MinimaxAgent::new(limits.max_depth, limits.time_slice)
                .with_weights(weights.clone())
                .with_seed(seed),
        )),
        PlayerModel::Mcts => Some(Box::new(
            MctsAgent::new(limits.iterations, limits.time_slice)
                .with_weights(weights.clone())
                .with_seed(seed),
        )),
    }
}
