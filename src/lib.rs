//! Checkers-Engine: rules and search for 8x8 checkers.
//!
//! This crate provides a checkers rule engine with mandatory captures and
//! maximal capture chains, a reversible game state, two search agents
//! (alpha-beta minimax and UCT Monte Carlo Tree Search) and a threaded turn
//! loop that alternates human and computer players.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, rule thresholds and search defaults
//! - [`board`] - Board representation, sides and square notation
//! - [`piece`] - Pieces and their movement directions
//! - [`action`] - Simple moves and capture chains
//! - [`rules`] - Move validation and legal action generation
//! - [`state`] - Game state with exact apply/undo and terminal detection
//! - [`eval`] - Static evaluation shared by the agents
//! - [`budget`] - Shared search budget with a wall-clock cutoff
//! - [`agent`] - The agent trait, a random agent and the agent factory
//! - [`minimax`] - Alpha-beta search with iterative deepening
//! - [`mcts`] - Monte Carlo Tree Search with UCT
//! - [`playout`] - Random and greedy playouts for MCTS
//! - [`config`] - Difficulty levels, player models and game configuration
//! - [`coordinator`] - The turn loop and its event stream
//! - [`console`] - Line-based text front end
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use checkers_engine::agent::Agent;
//! use checkers_engine::mcts::MctsAgent;
//! use checkers_engine::state::GameState;
//! use std::time::Duration;
//!
//! // Create a new game; Red moves first with 7 options
//! let mut state = GameState::new();
//! assert_eq!(state.legal_actions().len(), 7);
//!
//! // Let MCTS pick a move and play it
//! let mut agent = MctsAgent::new(200, Duration::from_secs(1));
//! let action = agent.next_move(&state).unwrap();
//! println!("Best move: {action}");
//! state.apply(&action);
//! ```

pub mod action;
pub mod agent;
pub mod board;
pub mod budget;
pub mod config;
pub mod console;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod eval;
pub mod mcts;
pub mod minimax;
pub mod piece;
pub mod playout;
pub mod rules;
pub mod state;
