//! Legal move filtering.
//!
//! A candidate is legal when, after playing it on a scratch copy of the board,
//! the mover's king is not attacked. One scratch board is used per query: each
//! candidate is applied, tested, and undone from the pre-move board.

use tracing::trace;

use crate::engine::attacks::in_check;
use crate::engine::board::Board;
use crate::engine::castling::generate_castling;
use crate::engine::history::History;
use crate::engine::movegen::generate_pseudo_legal;
use crate::engine::types::{ChessError, Color, Move, Square};

/// Legal moves for the piece on `from`, in generation order.
///
/// Empty when `from` is empty, holds an opposing piece, or every candidate
/// would leave `side`'s king attacked.
pub fn generate_legal_moves(
    board: &Board,
    history: &History,
    from: Square,
    side: Color,
) -> Result<Vec<Move>, ChessError> {
    board.validate()?;

    let mut candidates = Vec::with_capacity(32);
    generate_pseudo_legal(board, history, from, side, &mut candidates);
    generate_castling(board, history, from, side, &mut candidates);
    if candidates.is_empty() {
        return Ok(candidates);
    }

    let mut scratch = *board;
    let mut legal = Vec::with_capacity(candidates.len());
    for mv in candidates {
        let touched = scratch.make_move(mv);
        let exposed = in_check(&scratch, history, side)?;
        scratch.undo(board, &touched);
        if exposed {
            trace!(mv = %mv, "rejected: leaves king attacked");
            continue;
        }
        legal.push(mv);
    }
    Ok(legal)
}

/// Every legal move for `side`, ordered by source square.
pub fn all_legal_moves(
    board: &Board,
    history: &History,
    side: Color,
) -> Result<Vec<Move>, ChessError> {
    let mut moves = Vec::new();
    for (from, _) in board.pieces(side) {
        moves.extend(generate_legal_moves(board, history, from, side)?);
    }
    Ok(moves)
}

/// Whether `side` has no legal move at all. Stops at the first one found.
pub fn has_no_legal_moves(
    board: &Board,
    history: &History,
    side: Color,
) -> Result<bool, ChessError> {
    for (from, _) in board.pieces(side) {
        if !generate_legal_moves(board, history, from, side)?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}
