//! Turn loop scenarios: human submissions, event stream, game end and restart.

use std::time::Duration;

use checkers_engine::action::{Action, Move};
use checkers_engine::board::{Board, Side, Square, parse_square};
use checkers_engine::config::{EndMode, GameConfig, PlayerModel};
use checkers_engine::coordinator::{GameEvent, Phase, TurnCoordinator};
use checkers_engine::error::SubmitError;
use checkers_engine::piece::PieceKind;
use checkers_engine::state::{GameState, Outcome};
use crossbeam_channel::Receiver;

const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

fn sq(name: &str) -> Square {
    parse_square(name).unwrap()
}

fn config(red: PlayerModel, white: PlayerModel) -> GameConfig {
    GameConfig {
        red,
        white,
        seed: Some(17),
        ..GameConfig::default()
    }
}

/// Receive events until one matches, returning everything seen before it too.
fn wait_for(events: &Receiver<GameEvent>, pred: impl Fn(&GameEvent) -> bool) -> Vec<GameEvent> {
    let mut seen = Vec::new();
    loop {
        let event = events.recv_timeout(EVENT_TIMEOUT).expect("no event");
        let done = pred(&event);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

fn is_turn_of(side: Side) -> impl Fn(&GameEvent) -> bool {
    move |event| matches!(event, GameEvent::TurnAvailable { side: s, .. } if *s == side)
}

fn is_game_over(event: &GameEvent) -> bool {
    matches!(event, GameEvent::GameOver { .. })
}

// =============================================================================
// Human submissions
// =============================================================================

#[test]
fn test_illegal_submission_leaves_game_untouched() {
    let (coordinator, events) = TurnCoordinator::spawn(config(PlayerModel::Human, PlayerModel::Human));
    wait_for(&events, is_turn_of(Side::Red));
    assert_eq!(coordinator.phase(), Phase::WaitingForMove);

    let state = coordinator.snapshot();
    let man = *state.board().piece_at(sq("c3")).unwrap();
    let backwards = Action::Move(Move::new(man, sq("d2")));
    assert!(matches!(
        coordinator.submit(Side::Red, backwards),
        Err(SubmitError::Illegal(_))
    ));

    let too_far = Action::Move(Move::new(man, sq("e5")));
    assert!(matches!(
        coordinator.submit(Side::Red, too_far),
        Err(SubmitError::Illegal(_))
    ));

    assert_eq!(coordinator.snapshot(), GameState::new());
    assert_eq!(coordinator.phase(), Phase::WaitingForMove);
    assert_eq!(coordinator.plies(), 0);

    // The turn is still open for a legal action.
    let legal = state.legal_actions()[2].clone();
    coordinator.submit(Side::Red, legal).unwrap();
    wait_for(&events, is_turn_of(Side::White));
    assert_eq!(coordinator.snapshot().current_side(), Side::White);

    coordinator.stop();
    coordinator.join();
}

#[test]
fn test_out_of_turn_submission_is_rejected() {
    let (coordinator, events) = TurnCoordinator::spawn(config(PlayerModel::Human, PlayerModel::Human));
    wait_for(&events, is_turn_of(Side::Red));

    let white_man = *coordinator.snapshot().board().piece_at(sq("b6")).unwrap();
    let action = Action::Move(Move::new(white_man, sq("a5")));
    assert_eq!(
        coordinator.submit(Side::White, action.clone()),
        Err(SubmitError::NotYourTurn(Side::White))
    );
    // Claiming to be the side to move does not help either.
    assert!(matches!(
        coordinator.submit(Side::Red, action),
        Err(SubmitError::Illegal(_))
    ));
    assert_eq!(coordinator.snapshot(), GameState::new());

    coordinator.stop();
    coordinator.join();
}

#[test]
fn test_extra_submission_does_not_release_next_turn() {
    let (coordinator, events) = TurnCoordinator::spawn(config(PlayerModel::Human, PlayerModel::Human));
    wait_for(&events, is_turn_of(Side::Red));

    let action = coordinator.snapshot().legal_actions()[0].clone();
    coordinator.submit(Side::Red, action.clone()).unwrap();
    assert!(matches!(
        coordinator.submit(Side::Red, action),
        Err(SubmitError::NoPendingTurn | SubmitError::NotYourTurn(Side::Red))
    ));

    wait_for(&events, is_turn_of(Side::White));
    assert_eq!(coordinator.plies(), 1);
    assert_eq!(coordinator.phase(), Phase::WaitingForMove);

    coordinator.stop();
    coordinator.join();
}

#[test]
fn test_capture_reports_removed_piece() {
    let mut board = Board::empty();
    board.place(Side::Red, sq("c3"), PieceKind::Man).unwrap();
    let victim = board.place(Side::White, sq("d4"), PieceKind::Man).unwrap();
    board.place(Side::White, sq("h8"), PieceKind::Man).unwrap();
    let state = GameState::from_board(board, Side::Red);

    let (coordinator, events) = TurnCoordinator::spawn_from(
        config(PlayerModel::Human, PlayerModel::Human),
        state.clone(),
    );
    wait_for(&events, is_turn_of(Side::Red));
    coordinator.submit(Side::Red, state.legal_actions()[0].clone()).unwrap();

    let seen = wait_for(&events, is_turn_of(Side::White));
    assert!(seen.iter().any(|e| matches!(
        e,
        GameEvent::PieceMoved { side: Side::Red, from, to, crowned: false, .. }
            if *from == sq("c3") && *to == sq("e5")
    )));
    assert!(seen.contains(&GameEvent::PieceRemoved {
        side: Side::White,
        id: victim,
        square: sq("d4"),
    }));
    assert_eq!(coordinator.snapshot().board().count(Side::White), 1);

    coordinator.stop();
    coordinator.join();
}

#[test]
fn test_computer_reply_comes_before_next_human_turn() {
    let (coordinator, events) = TurnCoordinator::spawn(config(PlayerModel::Human, PlayerModel::Random));
    wait_for(&events, is_turn_of(Side::Red));
    coordinator
        .submit(Side::Red, coordinator.snapshot().legal_actions()[0].clone())
        .unwrap();
    wait_for(&events, is_turn_of(Side::Red));
    assert_eq!(coordinator.plies(), 2);

    let white_move = {
        let mut state = coordinator.snapshot();
        let red = state.legal_actions()[0].clone();
        state.apply(&red);
        state.legal_actions()[0].clone()
    };
    assert_eq!(
        coordinator.submit(Side::White, white_move),
        Err(SubmitError::NotYourTurn(Side::White))
    );

    coordinator.stop();
    coordinator.join();
}

// =============================================================================
// Game end
// =============================================================================

#[test]
fn test_random_game_runs_to_completion() {
    let (coordinator, events) =
        TurnCoordinator::spawn(config(PlayerModel::Random, PlayerModel::Random));
    let seen = wait_for(&events, is_game_over);

    let moves = seen
        .iter()
        .filter(|e| matches!(e, GameEvent::PieceMoved { .. }))
        .count();
    assert!(moves > 0);
    assert!(moves as u32 <= coordinator.config().max_plies);
    assert!(seen.iter().any(|e| matches!(e, GameEvent::Narration { .. })));

    coordinator.join();
    // A halted game's loop has exited and closed the event channel.
    assert!(events.recv_timeout(EVENT_TIMEOUT).is_err());
}

#[test]
fn test_ply_limit_ends_in_draw() {
    let config = GameConfig {
        max_plies: 6,
        ..config(PlayerModel::Random, PlayerModel::Random)
    };
    let (coordinator, events) = TurnCoordinator::spawn(config);
    let seen = wait_for(&events, is_game_over);
    assert!(matches!(
        seen.last(),
        Some(GameEvent::GameOver { outcome: Outcome::Draw })
    ));
    coordinator.join();
}

#[test]
fn test_restart_mode_plays_another_game() {
    let config = GameConfig {
        max_plies: 4,
        end_mode: EndMode::Restart,
        ..config(PlayerModel::Random, PlayerModel::Random)
    };
    let (coordinator, events) = TurnCoordinator::spawn(config);
    wait_for(&events, is_game_over);
    wait_for(&events, is_game_over);
    coordinator.stop();
    coordinator.join();
}

#[test]
fn test_submit_after_game_over() {
    let config = GameConfig {
        max_plies: 2,
        ..config(PlayerModel::Human, PlayerModel::Random)
    };
    let (coordinator, events) = TurnCoordinator::spawn(config);
    wait_for(&events, is_turn_of(Side::Red));
    let action = coordinator.snapshot().legal_actions()[0].clone();
    coordinator.submit(Side::Red, action).unwrap();
    wait_for(&events, is_game_over);

    // The loop marks the game finished right after announcing the result.
    while coordinator.phase() != Phase::Finished {
        std::thread::sleep(Duration::from_millis(5));
    }
    let action = coordinator.snapshot().legal_actions()[0].clone();
    assert_eq!(coordinator.submit(Side::Red, action), Err(SubmitError::GameOver));
    coordinator.join();
}

#[test]
fn test_stop_ends_human_wait() {
    let (coordinator, events) = TurnCoordinator::spawn(config(PlayerModel::Human, PlayerModel::Human));
    wait_for(&events, is_turn_of(Side::Red));
    coordinator.stop();
    let action = coordinator.snapshot().legal_actions()[0].clone();
    assert_eq!(coordinator.submit(Side::Red, action), Err(SubmitError::Stopped));
    coordinator.join();
    assert!(events.recv_timeout(EVENT_TIMEOUT).is_err());
}
