//! Perft (PERFormance Test): exhaustive move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth matches
//! known-correct values for standard positions. Positions are set up from the
//! piece placement alone with an empty history, so castling rights come from
//! pieces standing on their home squares and en passant only appears after a
//! double step played inside the tree.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_rules::engine::{Board, Color, History, all_legal_moves};

/// Recursive perft: count leaf nodes at `depth`.
fn perft(board: &Board, history: &History, side: Color, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = all_legal_moves(board, history, side).unwrap();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = *board;
        child.make_move(mv);
        let mut child_history = history.clone();
        child_history.push(mv);
        nodes += perft(&child, &child_history, !side, depth - 1);
    }
    nodes
}

fn count(placement: &str, side: Color, depth: u32) -> u64 {
    let board = Board::from_placement(placement).unwrap();
    perft(&board, &History::new(), side, depth)
}

// =====================================================================
// Position 1: starting position
// =====================================================================

#[test]
fn perft_start_depth_1() {
    let board = Board::initial().unwrap();
    assert_eq!(perft(&board, &History::new(), Color::White, 1), 20);
}

#[test]
fn perft_start_depth_2() {
    let board = Board::initial().unwrap();
    assert_eq!(perft(&board, &History::new(), Color::White, 2), 400);
}

#[test]
fn perft_start_depth_3() {
    let board = Board::initial().unwrap();
    assert_eq!(perft(&board, &History::new(), Color::White, 3), 8_902);
}

#[test]
#[ignore = "slow without optimisations; run with --ignored"]
fn perft_start_depth_4() {
    let board = Board::initial().unwrap();
    assert_eq!(perft(&board, &History::new(), Color::White, 4), 197_281);
}

// =====================================================================
// Position 2: "Kiwipete" (castling, en passant, pins, promotions)
// =====================================================================

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R";

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(count(KIWIPETE, Color::White, 1), 48);
}

#[test]
fn perft_kiwipete_depth_2() {
    assert_eq!(count(KIWIPETE, Color::White, 2), 2_039);
}

#[test]
#[ignore = "slow without optimisations; run with --ignored"]
fn perft_kiwipete_depth_3() {
    assert_eq!(count(KIWIPETE, Color::White, 3), 97_862);
}

// =====================================================================
// Position 3: rook endgame with en passant pins
// =====================================================================

const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8";

#[test]
fn perft_pos3_depth_1() {
    assert_eq!(count(POSITION_3, Color::White, 1), 14);
}

#[test]
fn perft_pos3_depth_2() {
    assert_eq!(count(POSITION_3, Color::White, 2), 191);
}

#[test]
fn perft_pos3_depth_3() {
    assert_eq!(count(POSITION_3, Color::White, 3), 2_812);
}

#[test]
fn perft_pos3_depth_4() {
    assert_eq!(count(POSITION_3, Color::White, 4), 43_238);
}

// =====================================================================
// Position 4: promotions and black castling
// =====================================================================

const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1";

#[test]
fn perft_pos4_depth_1() {
    assert_eq!(count(POSITION_4, Color::White, 1), 6);
}

#[test]
fn perft_pos4_depth_2() {
    assert_eq!(count(POSITION_4, Color::White, 2), 264);
}

#[test]
fn perft_pos4_depth_3() {
    assert_eq!(count(POSITION_4, Color::White, 3), 9_467);
}

// =====================================================================
// Position 5
// =====================================================================

const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R";

#[test]
fn perft_pos5_depth_1() {
    assert_eq!(count(POSITION_5, Color::White, 1), 44);
}

#[test]
fn perft_pos5_depth_2() {
    assert_eq!(count(POSITION_5, Color::White, 2), 1_486);
}

#[test]
#[ignore = "slow without optimisations; run with --ignored"]
fn perft_pos5_depth_3() {
    assert_eq!(count(POSITION_5, Color::White, 3), 62_379);
}
