//! Constants for board geometry, game rules, search and evaluation defaults.
//!
//! The board is a flat 64-cell array indexed `row * 8 + col`, row 0 at the top
//! (White's home row) and row 7 at the bottom (Red's home row). Only the dark
//! squares, where `row + col` is odd, are ever occupied.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board width and height.
pub const N: usize = 8;

/// Total number of cells.
pub const BOARDSIZE: usize = N * N;

/// Number of pieces each side starts with.
pub const PIECES_PER_SIDE: usize = 12;

/// Rows occupied by White at the start of a game.
pub const WHITE_START_ROWS: std::ops::RangeInclusive<usize> = 0..=2;

/// Rows occupied by Red at the start of a game.
pub const RED_START_ROWS: std::ops::RangeInclusive<usize> = 5..=7;

// =============================================================================
// Game Rules
// =============================================================================

/// Consecutive quiet plies after which the game is drawn.
pub const DRAW_THRESHOLD: u32 = 40;

/// Total piece count at or above which the game is still in the opening.
pub const OPENING_MIN_PIECES: usize = 20;

/// Total piece count at or above which the game is in the middle game.
pub const MIDGAME_MIN_PIECES: usize = 9;

/// Default cap on the length of a coordinated game (reaching it is a draw).
pub const MAX_GAME_PLIES: u32 = 400;

// =============================================================================
// Evaluation Defaults
// =============================================================================

/// Material value of a man.
pub const MAN_VALUE: i32 = 100;

/// Material value of a king.
pub const KING_VALUE: i32 = 175;

/// Bonus for each man still guarding its own back row.
pub const BACK_RANK_BONUS: i32 = 12;

/// Bonus for each man protected from behind on both diagonals.
pub const TRIANGLE_BONUS: i32 = 8;

/// Extra king value once the game reaches its end stage.
pub const ENDGAME_KING_BONUS: i32 = 25;

/// Score of a won terminal position before depth scaling.
pub const WIN_SCORE: i32 = 100_000;

/// Positional table for a man, from Red's point of view (Red moves toward row 0).
///
/// Rewards advanced and central squares. White uses the table mirrored through
/// the board centre. Light squares are never occupied and hold 0.
#[rustfmt::skip]
pub const MAN_TABLE: [i32; BOARDSIZE] = [
     0, 30,  0, 30,  0, 30,  0, 30,
    22,  0, 24,  0, 24,  0, 22,  0,
     0, 16,  0, 20,  0, 20,  0, 14,
    10,  0, 14,  0, 16,  0, 12,  0,
     0,  8,  0, 12,  0, 12,  0,  6,
     4,  0,  6,  0,  8,  0,  4,  0,
     0,  2,  0,  4,  0,  4,  0,  2,
     2,  0,  2,  0,  2,  0,  2,  0,
];

/// Positional table for a king: prefers the centre, avoids edges and corners.
#[rustfmt::skip]
pub const KING_TABLE: [i32; BOARDSIZE] = [
     0, -4,  0, -2,  0, -2,  0, -6,
    -4,  0,  4,  0,  4,  0,  2,  0,
     0,  4,  0, 10,  0, 10,  0, -2,
    -2,  0, 10,  0, 14,  0,  4,  0,
     0,  4,  0, 14,  0, 10,  0, -2,
    -2,  0, 10,  0, 10,  0,  4,  0,
     0,  2,  0,  4,  0,  4,  0, -4,
    -6,  0, -2,  0, -2,  0, -4,  0,
];

// =============================================================================
// Minimax Parameters
// =============================================================================

/// Default iterative-deepening ceiling.
pub const DEFAULT_MAX_DEPTH: u32 = 6;

/// Budget units granted to a minimax search; the time slice is the real limit.
pub const MINIMAX_BUDGET_UNITS: u64 = u64::MAX;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of MCTS iterations per move.
pub const DEFAULT_ITERATIONS: u64 = 8_000;

/// UCT exploration constant (sqrt 2).
pub const UCT_C: f64 = std::f64::consts::SQRT_2;

/// Maximum number of plies simulated in one playout.
pub const PLAYOUT_PLY_CAP: usize = 10;

/// Reward for a won playout.
pub const REWARD_WIN: f64 = 1.0;

/// Reward for a drawn playout.
pub const REWARD_DRAW: f64 = 0.5;

/// Reward for a lost playout.
pub const REWARD_LOSS: f64 = 0.0;

/// Evaluation magnitude mapped to a certain win/loss when normalising capped playouts.
pub const PLAYOUT_EVAL_SCALE: f64 = 1_500.0;

// =============================================================================
// Time Slices
// =============================================================================

/// Default wall-clock budget for one search.
pub const DEFAULT_TIME_SLICE: Duration = Duration::from_millis(1_000);

/// Time slice used when a difficulty string is not recognised.
pub const FALLBACK_TIME_SLICE: Duration = Duration::from_millis(2_000);

/// Slack granted to a background search after its deadline before it is abandoned.
pub const SEARCH_GRACE: Duration = Duration::from_millis(50);
