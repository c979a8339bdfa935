pub mod attacks;
pub mod board;
pub mod castling;
pub mod game;
pub mod history;
pub mod legal;
pub mod movegen;
pub mod types;

pub use attacks::{attackers_of, in_check, threatens};
pub use board::{Board, TouchedSquares};
pub use castling::{all_castling_rights, castling_rights, generate_castling};
pub use game::{Game, MoveRecord, apply_move, terminal_state};
pub use history::History;
pub use legal::{all_legal_moves, generate_legal_moves, has_no_legal_moves};
pub use movegen::generate_pseudo_legal;
pub use types::*;
