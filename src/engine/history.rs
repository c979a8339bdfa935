//! Append-only record of applied moves.

use crate::engine::types::{Color, Move, PieceKind, Square};

/// Ordered sequence of every move applied to a board, oldest first.
///
/// Entries are only ever appended; nothing is rewritten or truncated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    moves: Vec<Move>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The most recently applied move.
    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Whether any entry left from or landed on `sq`.
    pub fn touched(&self, sq: Square) -> bool {
        self.moves.iter().any(|m| m.from == sq || m.to == sq)
    }

    /// Whether any entry by `color` left from `sq`.
    pub fn moved_from(&self, color: Color, sq: Square) -> bool {
        self.moves.iter().any(|m| m.color == color && m.from == sq)
    }

    /// Square a pawn just double-stepped to, if the latest entry was one.
    pub fn last_double_step(&self) -> Option<(Color, Square)> {
        let last = self.last()?;
        let is_double = last.kind == PieceKind::Pawn
            && last.from.file() == last.to.file()
            && last.from.rank() == last.color.pawn_start_rank()
            && last.to.rank() as i8 == last.from.rank() as i8 + 2 * last.color.forward();
        is_double.then_some((last.color, last.to))
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
