//! Checkers-Engine: play checkers against minimax and MCTS agents.
//!
//! ## Usage
//!
//! - `checkers` - Show a demo
//! - `checkers play` - Play on the console (Red human vs White minimax by default)
//! - `checkers demo` - Watch two computer players

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use checkers_engine::config::{Difficulty, EndMode, GameConfig, PlayerModel};
use checkers_engine::console::Console;
use checkers_engine::coordinator::{GameEvent, TurnCoordinator};

/// Checkers-Engine: checkers rules and search
#[derive(Parser)]
#[command(name = "checkers")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play on the console
    Play(GameArgs),
    /// Run a game between two computer players and print it
    Demo(GameArgs),
}

#[derive(Args, Clone)]
struct GameArgs {
    /// Who plays Red (moves first)
    #[arg(long, value_enum)]
    red: Option<PlayerModel>,
    /// Who plays White
    #[arg(long, value_enum)]
    white: Option<PlayerModel>,
    #[arg(long, value_enum, default_value_t = Difficulty::default())]
    difficulty: Difficulty,
    /// Start a new game when one ends
    #[arg(long)]
    restart: bool,
    /// Seed for the random and MCTS agents
    #[arg(long)]
    seed: Option<u64>,
    /// Pause after each move, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

impl GameArgs {
    fn config(&self, red: PlayerModel, white: PlayerModel) -> GameConfig {
        GameConfig {
            red: self.red.unwrap_or(red),
            white: self.white.unwrap_or(white),
            limits: self.difficulty.limits(),
            end_mode: if self.restart { EndMode::Restart } else { EndMode::Halt },
            move_delay: Duration::from_millis(self.delay_ms),
            seed: self.seed,
            ..GameConfig::default()
        }
    }
}

impl Default for GameArgs {
    fn default() -> Self {
        Self {
            red: None,
            white: None,
            difficulty: Difficulty::Easy,
            restart: false,
            seed: None,
            delay_ms: 0,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Play(args)) => run_play(&args),
        Some(Commands::Demo(args)) => run_demo(&args),
        None => run_demo(&GameArgs::default()),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_play(args: &GameArgs) -> Result<()> {
    let config = args.config(PlayerModel::Human, PlayerModel::Minimax);
    if !config.red.is_human() && !config.white.is_human() {
        bail!("play needs at least one human side; use `demo` for computer games");
    }

    println!("Checkers-Engine: {} (Red) vs {} (White)", config.red, config.white);
    println!("Type `help` for commands.\n");
    let (coordinator, events) = TurnCoordinator::spawn(config);
    Console::new(coordinator, events)
        .run()
        .context("console I/O failed")
}

fn run_demo(args: &GameArgs) -> Result<()> {
    let config = args.config(PlayerModel::Minimax, PlayerModel::Mcts);
    if config.red.is_human() || config.white.is_human() {
        bail!("demo is for computer players only; use `play` for human games");
    }

    println!("Checkers-Engine: {} (Red) vs {} (White)\n", config.red, config.white);
    let (coordinator, events) = TurnCoordinator::spawn(config);

    for event in events.iter() {
        match event {
            GameEvent::Narration { text, .. } => println!("{text}"),
            GameEvent::GameOver { .. } => {
                println!("\n{}", coordinator.snapshot().board());
                println!("Plies played: {}", coordinator.plies());
                if coordinator.config().end_mode == EndMode::Halt {
                    break;
                }
            }
            _ => {}
        }
    }
    coordinator.join();
    Ok(())
}
