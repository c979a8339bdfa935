//! Terminal detection, move application and the stateful game controller.
//!
//! `apply_move` and `terminal_state` are the free-standing rules operations.
//! `Game` wraps a board, its history and the side to move, and is what the
//! text driver talks to.

use tracing::{debug, warn};

use crate::engine::attacks;
use crate::engine::board::Board;
use crate::engine::history::History;
use crate::engine::legal::{all_legal_moves, generate_legal_moves, has_no_legal_moves};
use crate::engine::types::{ChessError, Color, Move, Piece, PieceKind, Square, TerminalState};

// =========================================================================
// Rules operations
// =========================================================================

/// Checkmate, stalemate or ongoing, for `side` to move.
pub fn terminal_state(
    board: &Board,
    history: &History,
    side: Color,
) -> Result<TerminalState, ChessError> {
    if !has_no_legal_moves(board, history, side)? {
        return Ok(TerminalState::Ongoing);
    }
    if attacks::in_check(board, history, side)? {
        Ok(TerminalState::Checkmate)
    } else {
        Ok(TerminalState::Stalemate)
    }
}

/// Validate `mv` against the legal set for its source square, then play it.
///
/// On rejection neither `board` nor `history` is modified.
pub fn apply_move(board: &mut Board, history: &mut History, mv: Move) -> Result<(), ChessError> {
    if !board.piece_at(mv.from).is_color(mv.color) {
        warn!(mv = %mv, "rejected: no {} piece on {}", mv.color, mv.from);
        return Err(ChessError::illegal(
            mv,
            format!("no {} piece on {}", mv.color, mv.from),
        ));
    }
    if board.piece_at(mv.to).kind() == Some(PieceKind::King) {
        warn!(mv = %mv, "rejected: king on {}", mv.to);
        return Err(ChessError::illegal(mv, "a king cannot be captured"));
    }

    let legal = generate_legal_moves(board, history, mv.from, mv.color)?;
    if !legal.contains(&mv) {
        warn!(mv = %mv, "rejected: not a legal move");
        return Err(ChessError::illegal(mv, "not a legal move"));
    }

    let class = board.classify(mv);
    board.make_move(mv);
    history.push(mv);
    debug!(
        color = %mv.color,
        from = %mv.from,
        to = %mv.to,
        class = ?class,
        ply = history.len(),
        "move applied"
    );
    Ok(())
}

// =========================================================================
// MoveRecord
// =========================================================================

/// A move played through `Game`, with what it led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub notation: String,
    pub check_after: bool,
    pub status_after: TerminalState,
}

// =========================================================================
// Game
// =========================================================================

/// A game in progress: board, history, side to move and cached status.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    history: History,
    records: Vec<MoveRecord>,
    side_to_move: Color,
    status: TerminalState,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position, White to move.
    pub fn new() -> Result<Self, ChessError> {
        Self::with_board(Board::initial()?, Color::White)
    }

    /// A game from a FEN piece placement with an empty history.
    ///
    /// Castling rights and en passant therefore start from scratch: all
    /// rights are available while the pieces stand on their home squares.
    /// A placement where the side not to move is in check is refused.
    pub fn from_placement(placement: &str, side_to_move: Color) -> Result<Self, ChessError> {
        Self::with_board(Board::from_placement(placement)?, side_to_move)
    }

    fn with_board(board: Board, side_to_move: Color) -> Result<Self, ChessError> {
        let history = History::new();
        if attacks::in_check(&board, &history, !side_to_move)? {
            return Err(ChessError::InvalidPlacement(format!(
                "{} is in check with {side_to_move} to move",
                !side_to_move
            )));
        }
        let status = terminal_state(&board, &history, side_to_move)?;
        Ok(Game {
            board,
            history,
            records: Vec::new(),
            side_to_move,
            status,
        })
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Moves played through this game, oldest first.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn status(&self) -> TerminalState {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> Result<bool, ChessError> {
        attacks::in_check(&self.board, &self.history, self.side_to_move)
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> Result<Vec<Move>, ChessError> {
        all_legal_moves(&self.board, &self.history, self.side_to_move)
    }

    /// Legal moves of the side to move starting on `sq`.
    pub fn legal_moves_from(&self, sq: Square) -> Result<Vec<Move>, ChessError> {
        generate_legal_moves(&self.board, &self.history, sq, self.side_to_move)
    }

    // -----------------------------------------------------------------
    // Move lookup
    // -----------------------------------------------------------------

    /// Resolve a from/to pair into a legal move of the side to move.
    ///
    /// With no `promotion` a promoting pawn becomes a queen.
    pub fn find_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Move, ChessError> {
        let promotes = self.board.piece_at(from).kind() == Some(PieceKind::Pawn)
            && to.rank() == self.side_to_move.promotion_rank();
        let wanted = match (promotes, promotion) {
            (true, Some(kind)) => kind,
            (true, None) => PieceKind::Queen,
            (false, _) => self.board.piece_at(from).kind().unwrap_or(PieceKind::Pawn),
        };
        let mv = Move::new(self.side_to_move, from, to, wanted);

        if promotion.is_some() && !promotes {
            return Err(ChessError::illegal(mv, "only a pawn reaching the last rank promotes"));
        }
        if self.legal_moves_from(from)?.contains(&mv) {
            Ok(mv)
        } else {
            Err(ChessError::illegal(mv, "not a legal move"))
        }
    }

    /// Parse coordinate text (`e2e4`, `e7e8q`) into a legal move.
    pub fn parse_move(&self, text: &str) -> Result<Move, ChessError> {
        let text = text.trim();
        let (Some(from), Some(to)) = (text.get(0..2), text.get(2..4)) else {
            return Err(ChessError::InvalidSquare(text.to_string()));
        };
        let from: Square = from.parse()?;
        let to: Square = to.parse()?;

        let mut rest = text[4..].chars();
        let promotion = match (rest.next(), rest.next()) {
            (None, _) => None,
            (Some(c), None) => match PieceKind::from_char(c) {
                Some((_, kind)) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
                _ => {
                    return Err(ChessError::IllegalMove {
                        mv: text.to_string(),
                        reason: format!("unknown promotion piece '{c}'"),
                    });
                }
            },
            _ => {
                return Err(ChessError::IllegalMove {
                    mv: text.to_string(),
                    reason: "trailing characters".into(),
                });
            }
        };
        self.find_move(from, to, promotion)
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Play a move for the side to move.
    ///
    /// Fails with `GameOver` once the game has ended and with `IllegalMove`
    /// when `mv` is out of turn or not legal. The game is unchanged on error.
    pub fn make_move(&mut self, mv: Move) -> Result<&MoveRecord, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status));
        }
        if mv.color != self.side_to_move {
            warn!(mv = %mv, "rejected: {} to move", self.side_to_move);
            return Err(ChessError::illegal(
                mv,
                format!("it is {}'s turn", self.side_to_move),
            ));
        }

        let moved = self.board.piece_at(mv.from).kind().unwrap_or(mv.kind);
        let mut board = self.board;
        let mut history = self.history.clone();
        apply_move(&mut board, &mut history, mv)?;
        let next = !self.side_to_move;
        let status = terminal_state(&board, &history, next)?;
        let check_after = attacks::in_check(&board, &history, next)?;

        // Commit only once every step has succeeded.
        self.board = board;
        self.history = history;
        self.side_to_move = next;
        self.status = status;
        self.records.push(MoveRecord {
            mv,
            notation: mv.to_coordinates(moved),
            check_after,
            status_after: status,
        });
        let record = &self.records[self.records.len() - 1];
        Ok(record)
    }

    // -----------------------------------------------------------------
    // Board array
    // -----------------------------------------------------------------

    /// 8×8 board array, rank 8 first. Empty squares are empty strings,
    /// pieces are like "wP" or "bK".
    pub fn board_array(&self) -> [[String; 8]; 8] {
        let mut out = std::array::from_fn(|_| std::array::from_fn(|_| String::new()));
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, 7 - rank);
                if let Piece::Occupied { color, kind } = self.board.piece_at(sq) {
                    let c = match color {
                        Color::White => 'w',
                        Color::Black => 'b',
                    };
                    out[rank as usize][file as usize] =
                        format!("{c}{}", kind.to_char(Color::White));
                }
            }
        }
        out
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play(g: &mut Game, text: &str) {
        let mv = g.parse_move(text).unwrap();
        g.make_move(mv).unwrap();
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game_is_ongoing() {
        let g = Game::new().unwrap();
        assert_eq!(g.status(), TerminalState::Ongoing);
        assert_eq!(g.side_to_move(), Color::White);
        assert_eq!(g.in_check(), Ok(false));
        assert_eq!(g.legal_moves().unwrap().len(), 20);
        assert!(g.history().is_empty());
    }

    #[test]
    fn from_placement_computes_status() {
        let g = Game::from_placement("k7/2K5/1Q6/8/8/8/8/8", Color::Black).unwrap();
        assert_eq!(g.status(), TerminalState::Stalemate);
        assert!(g.is_game_over());
    }

    #[test]
    fn from_placement_rejects_bad_text() {
        assert!(matches!(
            Game::from_placement("8/8/8", Color::White),
            Err(ChessError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn from_placement_rejects_opponent_in_check() {
        // Black is in check from the rook yet White would move again.
        assert!(matches!(
            Game::from_placement("4k2R/8/8/8/8/8/8/4K3", Color::White),
            Err(ChessError::InvalidPlacement(_))
        ));
        let g = Game::from_placement("4k2R/8/8/8/8/8/8/4K3", Color::Black).unwrap();
        assert_eq!(g.in_check(), Ok(true));
        assert!(g.find_move(sq("h8"), sq("e8"), None).is_err());
    }

    // -----------------------------------------------------------------
    // Terminal states
    // -----------------------------------------------------------------

    #[test]
    fn scholars_mate() {
        let mut g = Game::new().unwrap();
        for text in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
            play(&mut g, text);
        }
        assert_eq!(g.status(), TerminalState::Checkmate);
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(g.in_check(), Ok(true));
        let last = g.records().last().unwrap();
        assert!(last.check_after);
        assert_eq!(last.status_after, TerminalState::Checkmate);
    }

    #[test]
    fn fools_mate() {
        let mut g = Game::new().unwrap();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play(&mut g, text);
        }
        assert_eq!(g.status(), TerminalState::Checkmate);
        assert_eq!(g.side_to_move(), Color::White);
    }

    #[test]
    fn check_is_not_terminal() {
        let mut g = Game::new().unwrap();
        for text in ["e2e4", "f7f6", "d1h5"] {
            play(&mut g, text);
        }
        assert_eq!(g.in_check(), Ok(true));
        assert_eq!(g.status(), TerminalState::Ongoing);
    }

    #[test]
    fn terminal_state_distinguishes_mate_from_stalemate() {
        let h = History::new();
        let mate = Board::from_placement("k7/1Q6/1K6/8/8/8/8/8").unwrap();
        let stale = Board::from_placement("k7/2K5/1Q6/8/8/8/8/8").unwrap();
        assert_eq!(terminal_state(&mate, &h, Color::Black), Ok(TerminalState::Checkmate));
        assert_eq!(terminal_state(&stale, &h, Color::Black), Ok(TerminalState::Stalemate));
        assert_eq!(terminal_state(&stale, &h, Color::White), Ok(TerminalState::Ongoing));
    }

    #[test]
    fn moves_after_game_over_are_refused() {
        let mut g = Game::new().unwrap();
        for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play(&mut g, text);
        }
        let mv = Move::new(Color::White, sq("a2"), sq("a3"), PieceKind::Pawn);
        assert_eq!(
            g.make_move(mv),
            Err(ChessError::GameOver(TerminalState::Checkmate))
        );
    }

    // -----------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------

    #[test]
    fn illegal_move_leaves_game_unchanged() {
        let mut g = Game::new().unwrap();
        let before = *g.board();
        let mv = Move::new(Color::White, sq("e2"), sq("e5"), PieceKind::Pawn);
        assert!(matches!(g.make_move(mv), Err(ChessError::IllegalMove { .. })));
        assert_eq!(*g.board(), before);
        assert!(g.history().is_empty());
        assert_eq!(g.side_to_move(), Color::White);
    }

    #[test]
    fn out_of_turn_move_is_rejected() {
        let mut g = Game::new().unwrap();
        let mv = Move::new(Color::Black, sq("e7"), sq("e5"), PieceKind::Pawn);
        assert!(matches!(g.make_move(mv), Err(ChessError::IllegalMove { .. })));
    }

    #[test]
    fn apply_move_rejects_empty_source() {
        let mut b = Board::initial().unwrap();
        let mut h = History::new();
        let mv = Move::new(Color::White, sq("e4"), sq("e5"), PieceKind::Pawn);
        assert!(matches!(
            apply_move(&mut b, &mut h, mv),
            Err(ChessError::IllegalMove { .. })
        ));
        assert_eq!(b, Board::initial().unwrap());
        assert!(h.is_empty());
    }

    #[test]
    fn apply_move_refuses_king_capture() {
        let mut b = Board::from_placement("4k2R/8/8/8/8/8/8/4K3").unwrap();
        let before = b;
        let mut h = History::new();
        let mv = Move::new(Color::White, sq("h8"), sq("e8"), PieceKind::Rook);
        assert!(matches!(
            apply_move(&mut b, &mut h, mv),
            Err(ChessError::IllegalMove { .. })
        ));
        assert_eq!(b, before);
        assert!(h.is_empty());
    }

    #[test]
    fn apply_move_rejects_wrong_landing_kind() {
        let mut b = Board::initial().unwrap();
        let mut h = History::new();
        let mv = Move::new(Color::White, sq("g1"), sq("f3"), PieceKind::Queen);
        assert!(apply_move(&mut b, &mut h, mv).is_err());
    }

    #[test]
    fn parse_move_errors() {
        let g = Game::new().unwrap();
        assert!(matches!(g.parse_move("e2"), Err(ChessError::InvalidSquare(_))));
        assert!(matches!(g.parse_move("z9e4"), Err(ChessError::InvalidSquare(_))));
        assert!(matches!(g.parse_move("e2e4x"), Err(ChessError::IllegalMove { .. })));
        assert!(matches!(g.parse_move("e2e4q"), Err(ChessError::IllegalMove { .. })));
        assert!(matches!(g.parse_move("e2e5"), Err(ChessError::IllegalMove { .. })));
    }

    // -----------------------------------------------------------------
    // Special moves
    // -----------------------------------------------------------------

    #[test]
    fn en_passant_removes_the_captured_pawn() {
        let mut g = Game::new().unwrap();
        for text in ["e2e4", "a7a6", "e4e5", "d7d5", "e5d6"] {
            play(&mut g, text);
        }
        assert!(g.board().is_empty(sq("d5")));
        assert!(g.board().piece_at(sq("d6")).is(Color::White, PieceKind::Pawn));
        assert!(g.board().is_empty(sq("e5")));
    }

    #[test]
    fn en_passant_expires_after_one_move() {
        let mut g = Game::new().unwrap();
        for text in ["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"] {
            play(&mut g, text);
        }
        assert!(g.parse_move("e5d6").is_err());
    }

    #[test]
    fn castling_moves_the_rook() {
        let mut g = Game::new().unwrap();
        for text in ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"] {
            play(&mut g, text);
        }
        assert!(g.board().piece_at(sq("g1")).is(Color::White, PieceKind::King));
        assert!(g.board().piece_at(sq("f1")).is(Color::White, PieceKind::Rook));
        assert!(g.board().is_empty(sq("h1")));
        assert!(g.board().is_empty(sq("e1")));
    }

    #[test]
    fn promotion_defaults_to_queen_and_honours_choice() {
        let g = Game::from_placement("4k3/P7/8/8/8/8/8/4K3", Color::White).unwrap();
        let queen = g.parse_move("a7a8").unwrap();
        assert_eq!(queen.kind, PieceKind::Queen);
        let knight = g.parse_move("a7a8n").unwrap();
        assert_eq!(knight.kind, PieceKind::Knight);

        let mut g = g;
        let record = g.make_move(knight).unwrap();
        assert_eq!(record.notation, "a7a8n");
        assert!(g.board().piece_at(sq("a8")).is(Color::White, PieceKind::Knight));
    }

    // -----------------------------------------------------------------
    // Board array
    // -----------------------------------------------------------------

    #[test]
    fn board_array_starting_position() {
        let g = Game::new().unwrap();
        let board = g.board_array();
        assert_eq!(board[0][0], "bR");
        assert_eq!(board[7][4], "wK");
        assert_eq!(board[6][3], "wP");
        assert_eq!(board[3][0], "");
    }

    #[test]
    fn records_use_coordinate_notation() {
        let mut g = Game::new().unwrap();
        play(&mut g, "g1f3");
        play(&mut g, "d7d5");
        let notation: Vec<&str> = g.records().iter().map(|r| r.notation.as_str()).collect();
        assert_eq!(notation, ["g1f3", "d7d5"]);
        assert_eq!(g.history().len(), 2);
    }
}
