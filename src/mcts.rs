//! Monte Carlo Tree Search with UCT selection.
//!
//! Each iteration runs the four classic phases:
//! - selection: descend through fully expanded nodes by the UCT formula
//! - expansion: materialize one child for an untried action
//! - simulation: a capped random or greedy playout from the new node
//! - backpropagation: add the reward to every node back up to the root
//!
//! The tree is an arena of nodes; children are indices owned by the parent and
//! the parent link is a plain index. Rewards are stored from the point of view of
//! the side that made the move leading into a node, so a parent picks the child
//! whose average reward is highest for itself.

use std::time::Duration;

use tracing::{debug, info};

use crate::action::Action;
use crate::agent::Agent;
use crate::board::Side;
use crate::budget::Budget;
use crate::constants::{DEFAULT_ITERATIONS, DEFAULT_TIME_SLICE, UCT_C};
use crate::eval::EvalWeights;
use crate::playout::{PlayoutPolicy, playout};
use crate::state::GameState;

pub type NodeId = usize;

/// A node in the MCTS search tree.
pub struct Node {
    state: GameState,
    action: Option<Action>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visits: u32,
    reward: f64,
    /// Untried actions, stored reversed so that `pop` yields generation order.
    unexplored: Vec<Action>,
}

impl Node {
    fn new(state: GameState, action: Option<Action>, parent: Option<NodeId>) -> Self {
        let mut unexplored = state.legal_actions();
        if state.outcome_with_actions(&unexplored).is_some() {
            unexplored.clear();
        }
        unexplored.reverse();
        Self {
            state,
            action,
            parent,
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
            unexplored,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The action that led here, `None` at the root.
    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Average reward for the side that moved into this node.
    pub fn average(&self) -> f64 {
        if self.visits > 0 {
            self.reward / self.visits as f64
        } else {
            0.0
        }
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.unexplored.is_empty()
    }

    /// The side whose move led into this node.
    fn mover(&self) -> Side {
        self.state.current_side().opponent()
    }
}

/// Arena-allocated search tree; the root is node 0.
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub const ROOT: NodeId = 0;

    pub fn new(state: GameState) -> Self {
        Self {
            nodes: vec![Node::new(state, None, None)],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child of `id` maximizing the UCT score; unvisited children come first.
    fn select_child(&self, id: NodeId) -> NodeId {
        let parent = &self.nodes[id];
        let ln_parent = (parent.visits.max(1) as f64).ln();
        let mut best = (parent.children[0], f64::NEG_INFINITY);
        for &child_id in &parent.children {
            let child = &self.nodes[child_id];
            let uct = if child.visits == 0 {
                f64::INFINITY
            } else {
                child.average() + UCT_C * (ln_parent / child.visits as f64).sqrt()
            };
            if uct > best.1 {
                best = (child_id, uct);
            }
        }
        best.0
    }

    /// Descend while the current node is fully expanded and has children.
    fn select(&self) -> NodeId {
        let mut id = Self::ROOT;
        while self.nodes[id].is_fully_expanded() && !self.nodes[id].children.is_empty() {
            id = self.select_child(id);
        }
        id
    }

    /// Materialize one untried child of `id`, or return `id` if none is left.
    fn expand(&mut self, id: NodeId) -> NodeId {
        let Some(action) = self.nodes[id].unexplored.pop() else {
            return id;
        };
        let state = self.nodes[id].state.successor(&action);
        let child_id = self.nodes.len();
        self.nodes.push(Node::new(state, Some(action), Some(id)));
        self.nodes[id].children.push(child_id);
        child_id
    }

    /// Add `reward` (for the mover into `id`) along the path to the root.
    fn backpropagate(&mut self, mut id: NodeId, mut reward: f64) {
        loop {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.reward += reward;
            match node.parent {
                Some(parent) => {
                    id = parent;
                    reward = 1.0 - reward;
                }
                None => break,
            }
        }
    }

    /// Root child with the highest average reward; ties keep generation order.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &self.root().children {
            let child = &self.nodes[child_id];
            if child.visits == 0 {
                continue;
            }
            let avg = child.average();
            if best.is_none_or(|(_, score)| avg > score) {
                best = Some((child_id, avg));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Log the statistics of the root's children.
    pub fn dump_children(&self) {
        for &child_id in &self.root().children {
            let child = &self.nodes[child_id];
            if let Some(action) = &child.action {
                debug!(
                    action = %action.notation(),
                    visits = child.visits,
                    avg = format_args!("{:.3}", child.average()),
                    "root child"
                );
            }
        }
    }
}

/// Statistics of one root child in an [`MctsReport`].
#[derive(Clone, Debug)]
pub struct ChildStats {
    pub notation: String,
    pub visits: u32,
    pub average: f64,
}

/// Summary of the last search run by an [`MctsAgent`].
#[derive(Clone, Debug)]
pub struct MctsReport {
    pub iterations: u64,
    pub root_visits: u32,
    pub nodes: usize,
    pub elapsed: Duration,
    pub children: Vec<ChildStats>,
}

pub struct MctsAgent {
    iterations: u64,
    time_slice: Duration,
    policy: PlayoutPolicy,
    weights: EvalWeights,
    rng: fastrand::Rng,
    last_report: Option<MctsReport>,
}

impl Default for MctsAgent {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS, DEFAULT_TIME_SLICE)
    }
}

impl MctsAgent {
    pub fn new(iterations: u64, time_slice: Duration) -> Self {
        Self {
            iterations,
            time_slice,
            policy: PlayoutPolicy::default(),
            weights: EvalWeights::default(),
            rng: fastrand::Rng::new(),
            last_report: None,
        }
    }

    pub fn with_policy(mut self, policy: PlayoutPolicy) -> Self {
        self.policy = policy;
        self
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

    pub fn last_report(&self) -> Option<&MctsReport> {
        self.last_report.as_ref()
    }

    /// Grow a tree from `state` until `budget` runs out.
    ///
    /// One budget unit is consumed per iteration, and the budget is only polled
    /// between iterations, so a timeout never interrupts a backpropagation.
    pub fn search(&mut self, state: &GameState, budget: &Budget) -> Tree {
        let mut tree = Tree::new(state.clone());
        let mut iterations = 0u64;

        while budget.consume() {
            let selected = tree.select();
            let leaf = tree.expand(selected);
            let mover = tree.nodes[leaf].mover();
            let reward = playout(
                &mut tree.nodes[leaf].state,
                self.policy,
                &mut self.rng,
                &self.weights,
                mover,
            );
            tree.backpropagate(leaf, reward);
            iterations += 1;
        }

        let children = tree
            .root()
            .children
            .iter()
            .filter_map(|&id| {
                let node = tree.node(id);
                node.action.as_ref().map(|action| ChildStats {
                    notation: action.notation(),
                    visits: node.visits,
                    average: node.average(),
                })
            })
            .collect();
        self.last_report = Some(MctsReport {
            iterations,
            root_visits: tree.root().visits,
            nodes: tree.len(),
            elapsed: budget.elapsed(),
            children,
        });
        tree
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &str {
        "mcts"
    }

    fn next_move(&mut self, state: &GameState) -> Option<Action> {
        let mut actions = state.legal_actions();
        if actions.len() <= 1 {
            self.last_report = None;
            return actions.pop();
        }

        let budget = Budget::with_timeout(self.iterations, self.time_slice);
        let tree = self.search(state, &budget);
        tree.dump_children();

        let best = tree
            .best_child()
            .and_then(|id| tree.node(id).action.clone());
        if let Some(report) = &self.last_report {
            info!(
                iterations = report.iterations,
                nodes = report.nodes,
                elapsed = ?report.elapsed,
                action = ?best.as_ref().map(Action::notation),
                "mcts move"
            );
        }
        // A zero budget leaves the root unexpanded; play the first legal action.
        best.or_else(|| actions.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_visits_match_iterations() {
        let mut agent = MctsAgent::new(200, Duration::from_secs(30)).with_seed(Some(5));
        let tree = agent.search(&GameState::new(), &Budget::new(200));
        let root = tree.root();
        assert_eq!(root.visits(), 200);
        let child_visits: u32 = root.children().iter().map(|&id| tree.node(id).visits()).sum();
        assert_eq!(child_visits, 200);
        assert_eq!(agent.last_report().unwrap().iterations, 200);
    }

    #[test]
    fn test_children_link_back_to_parent() {
        let mut agent = MctsAgent::new(50, Duration::from_secs(30)).with_seed(Some(9));
        let tree = agent.search(&GameState::new(), &Budget::new(50));
        for id in 1..tree.len() {
            let parent = tree.node(id).parent().unwrap();
            assert!(tree.node(parent).children().contains(&id));
            let action = tree.node(id).action().unwrap();
            assert_eq!(&tree.node(parent).state().successor(action), tree.node(id).state());
        }
    }

    #[test]
    fn test_first_iterations_expand_root_in_order() {
        let state = GameState::new();
        let mut agent = MctsAgent::new(7, Duration::from_secs(30)).with_seed(Some(2));
        let tree = agent.search(&state, &Budget::new(7));
        let expanded: Vec<Action> = tree
            .root()
            .children()
            .iter()
            .map(|&id| tree.node(id).action().unwrap().clone())
            .collect();
        assert_eq!(expanded, state.legal_actions());
        assert!(tree.root().is_fully_expanded());
    }

    #[test]
    fn test_greedy_agent_returns_legal_move() {
        let state = GameState::new();
        let mut agent = MctsAgent::new(100, Duration::from_secs(30))
            .with_policy(PlayoutPolicy::Greedy)
            .with_seed(Some(4));
        let action = agent.next_move(&state).unwrap();
        assert!(state.legal_actions().contains(&action));
    }
}
