//! Castling evaluation.
//!
//! Rights are never stored: they are derived from the full move history every
//! time. A right survives only while nothing has left the king's home square
//! and nothing has left or landed on that side's rook corner.

use crate::engine::attacks::threatens;
use crate::engine::board::{Board, castling_king_target, king_home, rook_home};
use crate::engine::history::History;
use crate::engine::types::{CastleSide, CastlingRights, Color, Move, PieceKind, Square};

/// Castling rights for `color` implied by `history`.
pub fn castling_rights(history: &History, color: Color) -> CastlingRights {
    let mut rights = CastlingRights::NONE;
    if history.moved_from(color, king_home(color)) {
        return rights;
    }
    for side in CastleSide::BOTH {
        if !history.touched(rook_home(color, side)) {
            rights.0 |= CastlingRights::flag(color, side);
        }
    }
    rights
}

/// Castling rights for both colours, e.g. for display as "KQkq".
pub fn all_castling_rights(history: &History) -> CastlingRights {
    let white = castling_rights(history, Color::White);
    let black = castling_rights(history, Color::Black);
    CastlingRights(white.0 | black.0)
}

/// Squares strictly between the king and the rook that must be empty.
fn path_squares(side: CastleSide) -> &'static [u8] {
    match side {
        CastleSide::Kingside => &[5, 6],
        CastleSide::Queenside => &[1, 2, 3],
    }
}

/// Squares the king crosses or lands on, origin excluded.
fn transit_squares(side: CastleSide) -> &'static [u8] {
    match side {
        CastleSide::Kingside => &[5, 6],
        CastleSide::Queenside => &[3, 2],
    }
}

/// Append every castling move available to the king on `from`.
///
/// Nothing is appended unless `from` holds `side`'s king on its home square.
pub fn generate_castling(
    board: &Board,
    history: &History,
    from: Square,
    side: Color,
    moves: &mut Vec<Move>,
) {
    let home = king_home(side);
    if from != home || !board.piece_at(from).is(side, PieceKind::King) {
        return;
    }

    let rights = castling_rights(history, side);
    if rights == CastlingRights::NONE {
        return;
    }

    // Can't castle out of check.
    if threatens(board, history, home, !side) {
        return;
    }

    let rank = side.home_rank();
    for castle in CastleSide::BOTH {
        if !rights.can_castle(side, castle) {
            continue;
        }
        if !board.piece_at(rook_home(side, castle)).is(side, PieceKind::Rook) {
            continue;
        }
        let path_clear = path_squares(castle)
            .iter()
            .all(|&file| board.is_empty(Square::from_file_rank(file, rank)));
        if !path_clear {
            continue;
        }
        let transit_safe = transit_squares(castle)
            .iter()
            .all(|&file| !threatens(board, history, Square::from_file_rank(file, rank), !side));
        if !transit_safe {
            continue;
        }
        moves.push(Move::new(
            side,
            home,
            castling_king_target(side, castle),
            PieceKind::King,
        ));
    }
}

// =========================================================================
// Tests
// =========================================================================
