//! Threat detection.
//!
//! A square is threatened by a side when one of that side's pseudo-legal moves
//! lands on it. Pawns are the one exception to "uses the move list as-is":
//! they threaten their capture diagonals whether or not anything stands
//! there, and never threaten their push squares. That keeps empty castling
//! transit squares correctly covered.

use crate::engine::board::Board;
use crate::engine::history::History;
use crate::engine::movegen::{generate_pseudo_legal, pawn_attack_squares};
use crate::engine::types::{ChessError, Color, Move, PieceKind, Square};

/// Is `target` attacked by any piece of colour `attacker`?
pub fn threatens(board: &Board, history: &History, target: Square, attacker: Color) -> bool {
    let mut buffer: Vec<Move> = Vec::with_capacity(32);
    for (from, kind) in board.pieces(attacker) {
        if kind == PieceKind::Pawn {
            if pawn_attack_squares(from, attacker).any(|sq| sq == target) {
                return true;
            }
            continue;
        }
        buffer.clear();
        generate_pseudo_legal(board, history, from, attacker, &mut buffer);
        if buffer.iter().any(|m| m.to == target) {
            return true;
        }
    }
    false
}

/// Every square holding a piece of `attacker` that threatens `target`.
pub fn attackers_of(
    board: &Board,
    history: &History,
    target: Square,
    attacker: Color,
) -> Vec<Square> {
    let mut buffer: Vec<Move> = Vec::with_capacity(32);
    let mut found = Vec::new();
    for (from, kind) in board.pieces(attacker) {
        let hits = if kind == PieceKind::Pawn {
            pawn_attack_squares(from, attacker).any(|sq| sq == target)
        } else {
            buffer.clear();
            generate_pseudo_legal(board, history, from, attacker, &mut buffer);
            buffer.iter().any(|m| m.to == target)
        };
        if hits {
            found.push(from);
        }
    }
    found
}

/// Is `side`'s king attacked by the opponent?
///
/// Fails with `InvariantViolation` when `side` does not have exactly one king.
pub fn in_check(board: &Board, history: &History, side: Color) -> Result<bool, ChessError> {
    let king = board.king_square(side)?;
    Ok(threatens(board, history, king, !side))
}
