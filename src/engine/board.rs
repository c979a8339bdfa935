//! Fixed-size mailbox board.
//!
//! `Board` stores all 64 squares explicitly, a1 = 0 … h8 = 63. It is `Copy`,
//! so the legality filter can take a scratch copy without allocating, and it
//! knows how to apply a move in place and restore the squares a move touched.

use std::fmt;

use crate::engine::types::{CastleSide, ChessError, Color, Move, Piece, PieceKind, Square};

/// Piece placement of the standard starting position (FEN field 1).
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

// ---------------------------------------------------------------------------
// MoveClass: how a move is carried out on the board
// ---------------------------------------------------------------------------

/// Classification of a move against the board it is about to be applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveClass {
    Quiet,
    Capture,
    DoublePush,
    EnPassant,
    Castle(CastleSide),
    Promotion { capture: bool },
}

impl MoveClass {
    pub fn is_capture(self) -> bool {
        matches!(
            self,
            MoveClass::Capture | MoveClass::EnPassant | MoveClass::Promotion { capture: true }
        )
    }
}

// ---------------------------------------------------------------------------
// TouchedSquares: the undo record
// ---------------------------------------------------------------------------

/// Squares written by one `make_move` call (at most four, for castling).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchedSquares {
    squares: [Square; 4],
    len: usize,
}

impl TouchedSquares {
    fn push(&mut self, sq: Square) {
        self.squares[self.len] = sq;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Complete square → piece mapping. Every square holds an explicit value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [Piece; Square::NUM],
}

impl Board {
    /// A board with every square empty. Not a valid position on its own.
    pub fn empty() -> Self {
        Board {
            squares: [Piece::Empty; Square::NUM],
        }
    }

    /// Standard starting position.
    pub fn initial() -> Result<Self, ChessError> {
        Self::from_placement(STARTING_PLACEMENT)
            .map_err(|e| ChessError::MalformedInitialPosition(e.to_string()))
    }

    /// Parse the piece-placement field of a FEN string.
    ///
    /// Any trailing FEN fields are ignored: side to move, castling and en
    /// passant are derived from the move history, never from text.
    pub fn from_placement(text: &str) -> Result<Self, ChessError> {
        let placement = text.split_whitespace().next().unwrap_or("");
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidPlacement(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((color, kind)) = PieceKind::from_char(ch) {
                    board.set(Square::from_file_rank(file, rank), Piece::new(color, kind));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidPlacement(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        board.validate()?;
        Ok(board)
    }

    /// Export the piece placement as a FEN field.
    pub fn to_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Piece::Empty => empty_count += 1,
                    piece => {
                        if empty_count > 0 {
                            out.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        out.push(piece.to_char());
                    }
                }
            }
            if empty_count > 0 {
                out.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_empty()
    }

    /// All squares holding a piece of `color`, with the piece kind.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, PieceKind)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Piece::Occupied { color: c, kind } if c == color => Some((sq, kind)),
            _ => None,
        })
    }

    /// Find the king square for the given colour.
    ///
    /// Fails with `InvariantViolation` unless exactly one such king exists.
    pub fn king_square(&self, color: Color) -> Result<Square, ChessError> {
        let mut found = None;
        let mut kings = 0usize;
        for (sq, kind) in self.pieces(color) {
            if kind == PieceKind::King {
                kings += 1;
                found = Some(sq);
            }
        }
        match (kings, found) {
            (1, Some(sq)) => Ok(sq),
            _ => Err(ChessError::InvariantViolation { color, kings }),
        }
    }

    /// Check the one-king-per-colour invariant.
    pub fn validate(&self) -> Result<(), ChessError> {
        for color in Color::BOTH {
            self.king_square(color)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = piece;
    }

    /// Classify `mv` against this (pre-move) board.
    pub fn classify(&self, mv: Move) -> MoveClass {
        let moved = self.piece_at(mv.from).kind();
        let target_empty = self.is_empty(mv.to);
        let file_delta = mv.to.file() as i8 - mv.from.file() as i8;
        let rank_delta = mv.to.rank() as i8 - mv.from.rank() as i8;

        match moved {
            Some(PieceKind::King) if rank_delta == 0 && file_delta.abs() == 2 => {
                if file_delta > 0 {
                    MoveClass::Castle(CastleSide::Kingside)
                } else {
                    MoveClass::Castle(CastleSide::Queenside)
                }
            }
            Some(PieceKind::Pawn) if mv.kind != PieceKind::Pawn => MoveClass::Promotion {
                capture: !target_empty,
            },
            Some(PieceKind::Pawn) if file_delta != 0 && target_empty => MoveClass::EnPassant,
            Some(PieceKind::Pawn) if rank_delta.abs() == 2 => MoveClass::DoublePush,
            _ if !target_empty => MoveClass::Capture,
            _ => MoveClass::Quiet,
        }
    }

    /// Apply a move in place and report every square written.
    ///
    /// No legality check happens here: callers either validate first
    /// (`apply_move`) or are probing candidates on a scratch board.
    pub fn make_move(&mut self, mv: Move) -> TouchedSquares {
        let mut touched = TouchedSquares::default();
        let landing = Piece::new(mv.color, mv.kind);

        match self.classify(mv) {
            MoveClass::Castle(side) => {
                let (rook_from, rook_to) = castling_rook_squares(mv.color, side);
                self.set(mv.from, Piece::Empty);
                self.set(rook_from, Piece::Empty);
                self.set(rook_to, Piece::new(mv.color, PieceKind::Rook));
                self.set(mv.to, landing);
                touched.push(mv.from);
                touched.push(rook_from);
                touched.push(rook_to);
                touched.push(mv.to);
            }
            MoveClass::EnPassant => {
                // The captured pawn sits beside the source, on the destination file.
                let captured = Square::from_file_rank(mv.to.file(), mv.from.rank());
                self.set(captured, Piece::Empty);
                self.set(mv.from, Piece::Empty);
                self.set(mv.to, landing);
                touched.push(mv.from);
                touched.push(captured);
                touched.push(mv.to);
            }
            _ => {
                self.set(mv.from, Piece::Empty);
                self.set(mv.to, landing);
                touched.push(mv.from);
                touched.push(mv.to);
            }
        }
        touched
    }

    /// Restore the `touched` squares from the board as it was before the move.
    pub fn undo(&mut self, pre_move: &Board, touched: &TouchedSquares) {
        for &sq in touched.as_slice() {
            self.squares[sq.index()] = pre_move.squares[sq.index()];
        }
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as text, rank 8 at the top.
    pub fn render(&self, with_coords: bool) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            if with_coords {
                s.push((b'1' + rank) as char);
                s.push(' ');
            }
            for file in 0..8 {
                s.push(self.piece_at(Square::from_file_rank(file, rank)).to_char());
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        if with_coords {
            s.push_str("  a b c d e f g h");
        } else {
            s.pop();
        }
        s
    }

    /// Render the board with rank and file labels, useful for debugging.
    pub fn board_string(&self) -> String {
        self.render(true)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board({})", self.to_placement())?;
        write!(f, "{}", self.board_string())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Castling geometry (free functions)
// ---------------------------------------------------------------------------

/// Home square of the king for `color`.
#[inline]
pub fn king_home(color: Color) -> Square {
    Square::from_file_rank(4, color.home_rank())
}

/// Corner square of the rook on `side`.
#[inline]
pub fn rook_home(color: Color, side: CastleSide) -> Square {
    let file = match side {
        CastleSide::Kingside => 7,
        CastleSide::Queenside => 0,
    };
    Square::from_file_rank(file, color.home_rank())
}

/// Destination of the king when castling on `side`.
#[inline]
pub fn castling_king_target(color: Color, side: CastleSide) -> Square {
    let file = match side {
        CastleSide::Kingside => 6,
        CastleSide::Queenside => 2,
    };
    Square::from_file_rank(file, color.home_rank())
}

/// For a castle on `side`, return (rook_from, rook_to).
#[inline]
pub fn castling_rook_squares(color: Color, side: CastleSide) -> (Square, Square) {
    let to_file = match side {
        CastleSide::Kingside => 5,
        CastleSide::Queenside => 3,
    };
    (
        rook_home(color, side),
        Square::from_file_rank(to_file, color.home_rank()),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
