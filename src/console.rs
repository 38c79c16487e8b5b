//! Line-based text front end for playing against the engine.
//!
//! Commands are read one per line. Every response starts with `=` on success
//! or `?` on failure, followed by the response text and a blank line.
//!
//! ## Supported Commands
//!
//! - `board` - Print the current position
//! - `moves` - List the legal actions, numbered from 1
//! - `play <n|notation>` - Play action number `n` or an action such as `c3-d4`
//! - `turn` - Show whose turn it is
//! - `help` - List the commands
//! - `quit` - Stop the game and exit

use std::io::{self, BufRead, Write};

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::action::Action;
use crate::coordinator::{GameEvent, TurnCoordinator};
use crate::state::Outcome;

const KNOWN_COMMANDS: &[&str] = &["board", "help", "moves", "play", "quit", "turn"];

pub struct Console {
    coordinator: TurnCoordinator,
    events: Receiver<GameEvent>,
    outcome: Option<Outcome>,
}

impl Console {
    pub fn new(coordinator: TurnCoordinator, events: Receiver<GameEvent>) -> Self {
        Self {
            coordinator,
            events,
            outcome: None,
        }
    }

    /// Run the command loop on stdin/stdout until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        // Let the computer open if it plays Red.
        let opening = self.wait_for_human();
        if !opening.is_empty() {
            writeln!(stdout, "{}\n", opening.join("\n"))?;
        }

        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let command = parts[0].to_lowercase();
            let (success, message) = self.execute(&command, &parts[1..]);
            let prefix = if success { '=' } else { '?' };
            writeln!(stdout, "{prefix} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        self.coordinator.stop();
        Ok(())
    }

    /// Execute one command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "board" => (true, format!("\n{}", self.coordinator.snapshot().board())),

            "moves" => {
                let legal = self.coordinator.snapshot().legal_actions();
                let lines: Vec<String> = legal
                    .iter()
                    .enumerate()
                    .map(|(i, action)| format!("{}. {}", i + 1, action.notation()))
                    .collect();
                (true, lines.join("\n"))
            }

            "turn" => (true, self.turn_text()),

            "help" => (true, KNOWN_COMMANDS.join("\n")),

            "quit" => {
                self.coordinator.stop();
                (true, String::new())
            }

            "play" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let state = self.coordinator.snapshot();
                let legal = state.legal_actions();
                let action = match resolve(arg, &legal) {
                    Ok(action) => action,
                    Err(message) => return (false, message),
                };
                match self.coordinator.submit(state.current_side(), action) {
                    Ok(()) => (true, self.wait_for_human().join("\n")),
                    Err(err) => (false, err.to_string()),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn turn_text(&self) -> String {
        if let Some(outcome) = self.outcome {
            return format!("game over: {outcome}");
        }
        let state = self.coordinator.snapshot();
        let side = state.current_side();
        format!("{side} to move ({})", self.coordinator.config().model(side))
    }

    /// Collect narration until a human is asked to move or the game ends.
    fn wait_for_human(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = self.events.recv() {
            debug!(?event, "console event");
            match event {
                GameEvent::Narration { text, .. } => lines.push(text),
                GameEvent::TurnAvailable { controller, .. } if controller.is_human() => {
                    self.outcome = None;
                    break;
                }
                // A halted game closes the channel; a restarted one goes on to the next human turn.
                GameEvent::GameOver { outcome } => {
                    self.outcome = Some(outcome);
                    if !self.has_human() {
                        break;
                    }
                }
                _ => {}
            }
        }
        lines
    }

    fn has_human(&self) -> bool {
        let config = self.coordinator.config();
        config.red.is_human() || config.white.is_human()
    }
}

/// Find an action by 1-based index into `legal` or by notation.
fn resolve(arg: &str, legal: &[Action]) -> Result<Action, String> {
    if let Ok(index) = arg.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| legal.get(i))
            .cloned()
            .ok_or_else(|| format!("no action number {index}"));
    }
    Action::find(arg, legal).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, PlayerModel};

    fn console(white: PlayerModel) -> Console {
        let config = GameConfig {
            red: PlayerModel::Human,
            white,
            seed: Some(1),
            ..GameConfig::default()
        };
        let (coordinator, events) = TurnCoordinator::spawn(config);
        let mut console = Console::new(coordinator, events);
        console.wait_for_human();
        console
    }

    #[test]
    fn test_moves_lists_opening() {
        let mut console = console(PlayerModel::Human);
        let (success, response) = console.execute("moves", &[]);
        assert!(success);
        assert_eq!(response.lines().count(), 7);
        console.execute("quit", &[]);
    }

    #[test]
    fn test_play_by_notation_and_index() {
        let mut console = console(PlayerModel::Random);
        let (success, response) = console.execute("play", &["c3-d4"]);
        assert!(success, "{response}");
        assert!(response.contains("c3-d4"));
        assert_eq!(console.execute("turn", &[]).1, "Red to move (human)");

        let (success, _) = console.execute("play", &["1"]);
        assert!(success);
        console.execute("quit", &[]);
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let mut console = console(PlayerModel::Human);
        assert!(!console.execute("play", &[]).0);
        assert!(!console.execute("play", &["99"]).0);
        assert!(!console.execute("play", &["c3-c4"]).0);
        assert!(!console.execute("fly", &[]).0);
        console.execute("quit", &[]);
    }

    #[test]
    fn test_resolve() {
        let legal = crate::state::GameState::new().legal_actions();
        assert_eq!(resolve("1", &legal), Ok(legal[0].clone()));
        assert!(resolve("0", &legal).is_err());
        assert!(resolve("z9-a1", &legal).is_err());
    }
}
