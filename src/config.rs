//! Difficulty levels, player models and game configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;

use crate::board::Side;
use crate::constants::{FALLBACK_TIME_SLICE, MAX_GAME_PLIES};
use crate::eval::EvalWeights;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    VeryHard,
}

/// Concrete limits handed to a search agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    /// Iterative-deepening ceiling for minimax.
    pub max_depth: u32,
    /// Iteration budget for MCTS.
    pub iterations: u64,
    /// Wall-clock budget for one search.
    pub time_slice: Duration,
}

impl Difficulty {
    pub fn limits(self) -> SearchLimits {
        let (max_depth, iterations, millis) = match self {
            Difficulty::Easy => (2, 500, 100),
            Difficulty::Medium => (4, 2_000, 500),
            Difficulty::Hard => (6, 8_000, 1_000),
            Difficulty::VeryHard => (10, 50_000, 10_000),
        };
        SearchLimits {
            max_depth,
            iterations,
            time_slice: Duration::from_millis(millis),
        }
    }
}

impl SearchLimits {
    /// Limits for a difficulty name that is not recognised.
    pub fn fallback() -> Self {
        SearchLimits {
            time_slice: FALLBACK_TIME_SLICE,
            ..Difficulty::Medium.limits()
        }
    }

    /// Limits for a difficulty name, falling back for unknown names.
    pub fn for_name(name: &str) -> Self {
        Difficulty::from_str(name, true)
            .map(Difficulty::limits)
            .unwrap_or_else(|_| Self::fallback())
    }
}

/// Who controls a side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlayerModel {
    Human,
    Minimax,
    Mcts,
    Random,
}

impl PlayerModel {
    pub fn is_human(self) -> bool {
        self == PlayerModel::Human
    }
}

impl fmt::Display for PlayerModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerModel::Human => "human",
            PlayerModel::Minimax => "minimax",
            PlayerModel::Mcts => "mcts",
            PlayerModel::Random => "random",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PlayerModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <PlayerModel as ValueEnum>::from_str(s, true)
    }
}

/// What the turn loop does once a game ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum EndMode {
    #[default]
    Halt,
    Restart,
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub red: PlayerModel,
    pub white: PlayerModel,
    pub limits: SearchLimits,
    pub weights: EvalWeights,
    pub end_mode: EndMode,
    /// Game length after which the game is declared drawn.
    pub max_plies: u32,
    /// Pause after each applied action.
    pub move_delay: Duration,
    /// Seed for random and MCTS agents.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            red: PlayerModel::Human,
            white: PlayerModel::Minimax,
            limits: Difficulty::default().limits(),
            weights: EvalWeights::default(),
            end_mode: EndMode::Halt,
            max_plies: MAX_GAME_PLIES,
            move_delay: Duration::ZERO,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn model(&self, side: Side) -> PlayerModel {
        match side {
            Side::Red => self.red,
            Side::White => self.white,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_time_slices() {
        assert_eq!(Difficulty::Easy.limits().time_slice, Duration::from_millis(100));
        assert_eq!(Difficulty::VeryHard.limits().time_slice, Duration::from_millis(10_000));
        assert!(Difficulty::Hard.limits().max_depth > Difficulty::Easy.limits().max_depth);
    }

    #[test]
    fn test_unknown_difficulty_falls_back() {
        assert_eq!(SearchLimits::for_name("hard"), Difficulty::Hard.limits());
        assert_eq!(SearchLimits::for_name("nightmare").time_slice, FALLBACK_TIME_SLICE);
    }

    #[test]
    fn test_parse_player_model() {
        assert_eq!("MCTS".parse::<PlayerModel>(), Ok(PlayerModel::Mcts));
        assert!("alien".parse::<PlayerModel>().is_err());
    }
}
