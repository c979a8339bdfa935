//! Pseudo-legal move generation.
//!
//! Per-piece templates that obey movement geometry and current occupancy but
//! ignore whether the mover's own king ends up attacked. Everything here is a
//! pure function of the board (and, for en passant, the history); nothing calls
//! back into the threat detector, so castling is produced separately by
//! `engine::castling`.

use crate::engine::board::Board;
use crate::engine::history::History;
use crate::engine::types::{Color, Move, Piece, PieceKind, Square};

// =========================================================================
// Direction sets
// =========================================================================

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 1),
    (0, 1),
    (-1, 1),
    (1, 0),
    (-1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

// =========================================================================
// Public API
// =========================================================================

/// Append the pseudo-legal moves of the piece on `from` to `moves`.
///
/// Nothing is appended when `from` is empty or holds a piece of the other
/// colour.
pub fn generate_pseudo_legal(
    board: &Board,
    history: &History,
    from: Square,
    side: Color,
    moves: &mut Vec<Move>,
) {
    let Piece::Occupied { color, kind } = board.piece_at(from) else {
        return;
    };
    if color != side {
        return;
    }

    match kind {
        PieceKind::Pawn => generate_pawn_moves(board, history, from, side, moves),
        PieceKind::Knight => step(board, from, side, kind, &KNIGHT_OFFSETS, moves),
        PieceKind::Bishop => slide(board, from, side, kind, &BISHOP_DIRECTIONS, moves),
        PieceKind::Rook => slide(board, from, side, kind, &ROOK_DIRECTIONS, moves),
        PieceKind::Queen => slide(board, from, side, kind, &QUEEN_DIRECTIONS, moves),
        PieceKind::King => step(board, from, side, kind, &KING_OFFSETS, moves),
    }
}

/// Convenience wrapper returning a fresh vector.
pub fn pseudo_legal_moves(
    board: &Board,
    history: &History,
    from: Square,
    side: Color,
) -> Vec<Move> {
    let mut moves = Vec::with_capacity(32);
    generate_pseudo_legal(board, history, from, side, &mut moves);
    moves
}

/// Squares a pawn of `side` on `from` captures onto, whether or not they
/// are occupied.
pub fn pawn_attack_squares(from: Square, side: Color) -> impl Iterator<Item = Square> {
    [-1i8, 1]
        .into_iter()
        .filter_map(move |df| from.offset(df, side.forward()))
}

// =========================================================================
// Shared primitives
// =========================================================================

/// Leaper template: one hop to each offset, onto empty or opposing squares.
pub fn step(
    board: &Board,
    from: Square,
    side: Color,
    kind: PieceKind,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        if !board.piece_at(to).is_color(side) {
            moves.push(Move::new(side, from, to, kind));
        }
    }
}

/// Slider template: walk each direction until the edge or the first occupied
/// square, which is included only when it holds an opposing piece.
pub fn slide(
    board: &Board,
    from: Square,
    side: Color,
    kind: PieceKind,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in directions {
        let mut cursor = from;
        while let Some(to) = cursor.offset(df, dr) {
            match board.piece_at(to) {
                Piece::Empty => moves.push(Move::new(side, from, to, kind)),
                occupant => {
                    if !occupant.is_color(side) {
                        moves.push(Move::new(side, from, to, kind));
                    }
                    break;
                }
            }
            cursor = to;
        }
    }
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(
    board: &Board,
    history: &History,
    from: Square,
    side: Color,
    moves: &mut Vec<Move>,
) {
    let forward = side.forward();

    // --- Single push, then double push from the start rank ---
    if let Some(one) = from.offset(0, forward)
        && board.is_empty(one)
    {
        add_pawn_move(side, from, one, moves);

        if from.rank() == side.pawn_start_rank()
            && let Some(two) = from.offset(0, 2 * forward)
            && board.is_empty(two)
        {
            moves.push(Move::new(side, from, two, PieceKind::Pawn));
        }
    }

    // --- Captures (including promotion captures) ---
    for to in pawn_attack_squares(from, side) {
        if board.piece_at(to).is_color(!side) {
            add_pawn_move(side, from, to, moves);
        }
    }

    // --- En passant ---
    if let Some(to) = en_passant_target(board, history, from, side) {
        moves.push(Move::new(side, from, to, PieceKind::Pawn));
    }
}

/// Push a pawn move, fanning out into the four promotions on the last rank.
fn add_pawn_move(side: Color, from: Square, to: Square, moves: &mut Vec<Move>) {
    if to.rank() == side.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(Move::new(side, from, to, kind));
        }
    } else {
        moves.push(Move::new(side, from, to, PieceKind::Pawn));
    }
}

/// The en-passant landing square for the pawn on `from`, if the move just
/// played was an opposing double step to the square beside it.
fn en_passant_target(
    board: &Board,
    history: &History,
    from: Square,
    side: Color,
) -> Option<Square> {
    let (color, pawn_sq) = history.last_double_step()?;
    if color == side || pawn_sq.rank() != from.rank() {
        return None;
    }
    if (pawn_sq.file() as i8 - from.file() as i8).abs() != 1 {
        return None;
    }
    if !board.piece_at(pawn_sq).is(color, PieceKind::Pawn) {
        return None;
    }
    let target = pawn_sq.offset(0, side.forward())?;
    board.is_empty(target).then_some(target)
}

// =========================================================================
// Tests
// =========================================================================
