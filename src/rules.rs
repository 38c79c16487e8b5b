//! Move legality and move generation.
//!
//! Pure functions over a [`Board`]. Captures are mandatory: when the side to
//! move has any jump, only jumps are legal. A capture chain always continues
//! while a further capture exists from the landing square, and never captures
//! the same piece twice.

use tracing::trace;

use crate::action::{Action, Jump, Move};
use crate::board::{Board, Direction, Side, Square, col, is_dark, offset, row};
use crate::constants::BOARDSIZE;
use crate::error::RuleError;
use crate::piece::Piece;

/// True iff `from` and `to` are distinct squares on a common diagonal.
pub fn is_on_diagonal(from: Square, to: Square) -> bool {
    if from >= BOARDSIZE || to >= BOARDSIZE {
        return false;
    }
    let drow = row(from).abs_diff(row(to));
    let dcol = col(from).abs_diff(col(to));
    drow == dcol && drow != 0
}

/// Validate a single-step move, reporting the first rule it breaks.
pub fn check_simple_move(mv: &Move, board: &Board) -> Result<(), RuleError> {
    if mv.to >= BOARDSIZE {
        return Err(RuleError::OffBoard(mv.to));
    }
    if !is_dark(mv.to) {
        return Err(RuleError::LightSquare(mv.to));
    }
    if board.is_occupied(mv.to) {
        return Err(RuleError::Occupied(mv.to));
    }
    if board.piece_at(mv.from) != Some(&mv.piece) {
        return Err(RuleError::PieceMismatch(mv.piece.id));
    }
    if !is_on_diagonal(mv.from, mv.to) || row(mv.from).abs_diff(row(mv.to)) != 1 {
        return Err(RuleError::NotAdjacent { from: mv.from, to: mv.to });
    }
    let allowed = mv
        .piece
        .directions()
        .iter()
        .any(|&dir| offset(mv.from, dir, 1) == Some(mv.to));
    if !allowed {
        return Err(RuleError::WrongDirection(mv.piece.id));
    }
    Ok(())
}

pub fn is_legal_simple_move(mv: &Move, board: &Board) -> bool {
    check_simple_move(mv, board).is_ok()
}

/// True iff `piece`, standing on `from`, can capture in `dir`: the adjacent
/// square holds an opposing piece and the square beyond it is free.
pub fn is_legal_jump_step(piece: &Piece, from: Square, dir: Direction, board: &Board) -> bool {
    jump_step(piece, from, dir, board, &[]).is_some()
}

/// The captured piece and landing square of one hop, if the hop is possible.
///
/// The jumping piece's own starting square counts as free, since the piece has
/// left it. Pieces already in `captured` stay on the board until the chain is
/// complete, so they can be neither jumped again nor landed on.
fn jump_step(
    piece: &Piece,
    from: Square,
    dir: Direction,
    board: &Board,
    captured: &[Piece],
) -> Option<(Piece, Square)> {
    let over = offset(from, dir, 1)?;
    let land = offset(from, dir, 2)?;
    let victim = *board.piece_at(over)?;
    if victim.owner == piece.owner || captured.iter().any(|c| c.id == victim.id) {
        return None;
    }
    if board.is_occupied(land) && land != piece.square {
        return None;
    }
    Some((victim, land))
}

/// All single-step moves for `side`, ignoring the capture rule.
pub fn generate_simple_moves(side: Side, board: &Board) -> Vec<Action> {
    let mut moves = Vec::new();
    for piece in board.pieces(side) {
        for &dir in piece.directions() {
            let Some(to) = offset(piece.square, dir, 1) else {
                continue;
            };
            let mv = Move::new(*piece, to);
            if is_legal_simple_move(&mv, board) {
                moves.push(Action::Move(mv));
            }
        }
    }
    moves
}

/// Every maximal capture chain available to `side`.
pub fn generate_jump_actions(side: Side, board: &Board) -> Vec<Action> {
    let mut jumps = Vec::new();
    let mut path = Vec::new();
    let mut captured = Vec::new();
    for piece in board.pieces(side) {
        extend_chain(board, piece, piece.square, &mut path, &mut captured, &mut jumps);
        debug_assert!(path.is_empty() && captured.is_empty());
    }
    trace!(%side, count = jumps.len(), "generated jumps");
    jumps
}

fn extend_chain(
    board: &Board,
    piece: &Piece,
    at: Square,
    path: &mut Vec<Square>,
    captured: &mut Vec<Piece>,
    out: &mut Vec<Action>,
) {
    let mut extended = false;
    for &dir in piece.directions() {
        let Some((victim, land)) = jump_step(piece, at, dir, board, captured) else {
            continue;
        };
        extended = true;
        path.push(land);
        captured.push(victim);
        extend_chain(board, piece, land, path, captured, out);
        path.pop();
        captured.pop();
    }

    if !extended && !path.is_empty() {
        out.push(Action::Jump(Jump::new(*piece, path.clone(), captured.clone())));
    }
}

/// The legal actions for `side`: its capture chains if it has any, otherwise
/// its simple moves.
pub fn generate_legal_actions(side: Side, board: &Board) -> Vec<Action> {
    let jumps = generate_jump_actions(side, board);
    if jumps.is_empty() {
        generate_simple_moves(side, board)
    } else {
        jumps
    }
}
