//! The turn-taking loop.
//!
//! A [`TurnCoordinator`] owns the authoritative [`GameState`] on a dedicated
//! thread and is its only mutator. Each turn it either asks the side's agent for
//! an action or waits for a human submission through a single-use gate: a fresh
//! one-slot channel is created for every human turn and its sender can be taken
//! exactly once, so a late or duplicate submission can never release a later wait.
//!
//! Everything that happens is reported as [`GameEvent`]s over an unbounded
//! channel. Sends never block and are ignored once the receiver is gone.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::agent::{Agent, for_model};
use crate::board::{Side, Square};
use crate::config::{EndMode, GameConfig, PlayerModel};
use crate::error::SubmitError;
use crate::piece::PieceId;
use crate::state::{GameState, Outcome};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    WaitingForMove,
    ApplyingMove,
    Finished,
}

/// Display colour attached to narration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NarrationColor {
    Side(Side),
    System,
}

/// One-way notifications to observers.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    TurnAvailable {
        side: Side,
        controller: PlayerModel,
    },
    PieceMoved {
        side: Side,
        id: PieceId,
        from: Square,
        to: Square,
        crowned: bool,
    },
    PieceRemoved {
        side: Side,
        id: PieceId,
        square: Square,
    },
    Narration {
        text: String,
        color: NarrationColor,
    },
    GameOver {
        outcome: Outcome,
    },
}

struct Shared {
    snapshot: GameState,
    phase: Phase,
    /// Sender half of the current turn's gate; taken by the one submission it accepts.
    gate: Option<Sender<Action>>,
    running: bool,
    plies: u32,
}

pub struct TurnCoordinator {
    shared: Arc<Mutex<Shared>>,
    config: GameConfig,
    handle: Option<JoinHandle<()>>,
}

impl TurnCoordinator {
    /// Start a game on its own thread.
    pub fn spawn(config: GameConfig) -> (Self, Receiver<GameEvent>) {
        Self::spawn_from(config, GameState::new())
    }

    /// Start a game from an arbitrary position.
    pub fn spawn_from(config: GameConfig, state: GameState) -> (Self, Receiver<GameEvent>) {
        let (events, rx) = unbounded();
        let shared = Arc::new(Mutex::new(Shared {
            snapshot: state.clone(),
            phase: Phase::ApplyingMove,
            gate: None,
            running: true,
            plies: 0,
        }));

        let turn_loop = TurnLoop {
            agents: [
                for_model(config.red, &config.limits, &config.weights, config.seed),
                for_model(
                    config.white,
                    &config.limits,
                    &config.weights,
                    config.seed.map(|s| s.wrapping_add(1)),
                ),
            ],
            config: config.clone(),
            shared: Arc::clone(&shared),
            state,
            events,
            plies: 0,
        };
        let handle = thread::spawn(move || turn_loop.run());

        let coordinator = Self {
            shared,
            config,
            handle: Some(handle),
        };
        (coordinator, rx)
    }

    /// Hand a human action to the waiting turn loop.
    ///
    /// The action is validated against the current position first; a rejected
    /// submission leaves the game untouched and the loop keeps waiting.
    pub fn submit(&self, side: Side, action: Action) -> Result<(), SubmitError> {
        let mut shared = self.shared.lock();
        if !shared.running {
            return Err(SubmitError::Stopped);
        }
        if shared.phase == Phase::Finished {
            return Err(SubmitError::GameOver);
        }
        if side != shared.snapshot.current_side() {
            return Err(SubmitError::NotYourTurn(side));
        }
        if !self.config.model(side).is_human() {
            return Err(SubmitError::NotHuman(side));
        }
        if let Err(err) = shared.snapshot.check_action(&action) {
            debug!(%action, %err, "rejected submission");
            return Err(err.into());
        }
        let gate = shared.gate.take().ok_or(SubmitError::NoPendingTurn)?;
        shared.phase = Phase::ApplyingMove;
        gate.send(action).map_err(|_| SubmitError::Stopped)
    }

    /// Copy of the position as of the last applied action.
    pub fn snapshot(&self) -> GameState {
        self.shared.lock().snapshot.clone()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    /// Plies played in the current game.
    pub fn plies(&self) -> u32 {
        self.shared.lock().plies
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Ask the loop to stop after the current turn; a pending human wait ends at once.
    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        shared.running = false;
        shared.gate = None;
    }

    /// Wait for the turn loop to exit.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("turn loop panicked");
        }
    }
}

impl Drop for TurnCoordinator {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

struct TurnLoop {
    config: GameConfig,
    agents: [Option<Box<dyn Agent>>; 2],
    shared: Arc<Mutex<Shared>>,
    state: GameState,
    events: Sender<GameEvent>,
    plies: u32,
}

impl TurnLoop {
    fn run(mut self) {
        info!(red = %self.config.red, white = %self.config.white, "turn loop started");
        while let Some(outcome) = self.play_game() {
            info!(%outcome, plies = self.plies, "game over");
            self.emit(GameEvent::Narration {
                text: format!("Game over: {outcome}"),
                color: NarrationColor::System,
            });
            self.emit(GameEvent::GameOver { outcome });

            if self.config.end_mode != EndMode::Restart || !self.shared.lock().running {
                break;
            }
            self.state = GameState::new();
            self.plies = 0;
            self.publish(Phase::ApplyingMove);
            self.emit(GameEvent::Narration {
                text: "New game".to_string(),
                color: NarrationColor::System,
            });
        }

        let mut shared = self.shared.lock();
        shared.phase = Phase::Finished;
        shared.gate = None;
        debug!("turn loop finished");
    }

    /// Play turns until the game ends (`Some`) or the loop is stopped (`None`).
    fn play_game(&mut self) -> Option<Outcome> {
        loop {
            if !self.shared.lock().running {
                return None;
            }
            let legal = self.state.legal_actions();
            if let Some(outcome) = self.state.outcome_with_actions(&legal) {
                return Some(outcome);
            }
            if self.plies >= self.config.max_plies {
                debug!(plies = self.plies, "ply limit reached");
                return Some(Outcome::Draw);
            }

            let side = self.state.current_side();
            let action = if self.agents[side.index()].is_some() {
                self.emit(GameEvent::TurnAvailable {
                    side,
                    controller: self.config.model(side),
                });
                self.agent_move(side)?
            } else {
                self.wait_for_human(side)?
            };
            self.play(action);
        }
    }

    fn agent_move(&mut self, side: Side) -> Option<Action> {
        let agent = self.agents[side.index()].as_mut()?;
        let action = agent.next_move(&self.state);
        if action.is_none() {
            warn!(%side, agent = agent.name(), "agent produced no action");
        }
        action
    }

    /// Open a fresh gate and block until a submission arrives through it.
    fn wait_for_human(&mut self, side: Side) -> Option<Action> {
        let (gate, turn) = bounded(1);
        {
            let mut shared = self.shared.lock();
            if !shared.running {
                return None;
            }
            shared.gate = Some(gate);
            shared.phase = Phase::WaitingForMove;
        }
        // Announced only once the gate is open, so a reaction to the event can submit.
        self.emit(GameEvent::TurnAvailable {
            side,
            controller: PlayerModel::Human,
        });
        debug!(%side, "waiting for human move");
        // Dropping the gate (stop) disconnects the channel and ends the wait.
        turn.recv().ok()
    }

    fn play(&mut self, action: Action) {
        debug_assert!(self.state.legal_actions().contains(&action), "{action} is not legal");
        let side = action.side();
        let piece = *action.piece();

        self.state.apply(&action);
        self.plies += 1;
        self.publish(Phase::ApplyingMove);

        self.emit(GameEvent::PieceMoved {
            side,
            id: piece.id,
            from: action.from(),
            to: action.to(),
            crowned: action.promotes(),
        });
        for victim in action.captured() {
            self.emit(GameEvent::PieceRemoved {
                side: victim.owner,
                id: victim.id,
                square: victim.square,
            });
        }
        self.emit(GameEvent::Narration {
            text: action.to_string(),
            color: NarrationColor::Side(side),
        });

        if !self.config.move_delay.is_zero() {
            thread::sleep(self.config.move_delay);
        }
    }

    fn publish(&self, phase: Phase) {
        let mut shared = self.shared.lock();
        shared.snapshot = self.state.clone();
        shared.plies = self.plies;
        shared.phase = phase;
    }

    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human_vs_human() -> GameConfig {
        GameConfig {
            red: PlayerModel::Human,
            white: PlayerModel::Human,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_gate_accepts_one_submission() {
        let (coordinator, events) = TurnCoordinator::spawn(human_vs_human());
        assert!(matches!(
            events.recv().unwrap(),
            GameEvent::TurnAvailable { side: Side::Red, .. }
        ));
        let action = coordinator.snapshot().legal_actions()[0].clone();
        coordinator.submit(Side::Red, action.clone()).unwrap();
        // Depending on whether the loop has applied the first action yet.
        assert!(matches!(
            coordinator.submit(Side::Red, action),
            Err(SubmitError::NoPendingTurn | SubmitError::NotYourTurn(Side::Red))
        ));
        coordinator.stop();
        coordinator.join();
    }
}
