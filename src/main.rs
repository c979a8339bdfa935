use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info, warn};

use chess_rules::config::{AppConfig, OutputFormat};
use chess_rules::engine::{ChessError, Color, Game, Square, TerminalState};

/// JSON view of the game after a move.
#[derive(Serialize)]
struct Snapshot<'a> {
    board: [[String; 8]; 8],
    side_to_move: Color,
    in_check: bool,
    status: TerminalState,
    moves: Vec<&'a str>,
}

fn main() -> ExitCode {
    let config = AppConfig::from_env();

    // Initialize tracing (structured logging) on stderr so stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    info!("chess-rules v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = Game::new()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for text in &config.script {
        match play(&mut game, text) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(mv = %text, "script stopped: {e}");
                break;
            }
        }
        if game.is_game_over() {
            break;
        }
    }
    render(&mut out, &game, config)?;
    if game.is_game_over() {
        return Ok(());
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        match command {
            "quit" | "exit" => break,
            "board" => render(&mut out, &game, config)?,
            "moves" => {
                let Some(square) = words.next() else {
                    writeln!(out, "usage: moves <square>")?;
                    continue;
                };
                match square.parse::<Square>() {
                    Ok(sq) => {
                        let mut targets: Vec<String> = game
                            .legal_moves_from(sq)?
                            .iter()
                            .map(|m| m.to.to_algebraic())
                            .collect();
                        // Promotions repeat the same destination.
                        targets.dedup();
                        writeln!(out, "{sq}: {}", targets.join(" "))?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            text => match play(&mut game, text) {
                Ok(()) => {
                    render(&mut out, &game, config)?;
                    if game.is_game_over() {
                        break;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => writeln!(out, "{e}")?,
            },
        }
    }
    Ok(())
}

fn play(game: &mut Game, text: &str) -> Result<(), ChessError> {
    let mv = game.parse_move(text)?;
    game.make_move(mv)?;
    Ok(())
}

fn render(
    out: &mut impl Write,
    game: &Game,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let in_check = game.in_check()?;
    match config.output {
        OutputFormat::Json => {
            let snapshot = Snapshot {
                board: game.board_array(),
                side_to_move: game.side_to_move(),
                in_check,
                status: game.status(),
                moves: game.records().iter().map(|r| r.notation.as_str()).collect(),
            };
            writeln!(out, "{}", serde_json::to_string(&snapshot)?)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{}", game.board().render(config.show_coords))?;
            match game.status() {
                TerminalState::Ongoing if in_check => {
                    writeln!(out, "{} to move, in check", game.side_to_move())?
                }
                TerminalState::Ongoing => writeln!(out, "{} to move", game.side_to_move())?,
                TerminalState::Checkmate => {
                    writeln!(out, "checkmate, {} wins", !game.side_to_move())?
                }
                TerminalState::Stalemate => writeln!(out, "stalemate")?,
            }
        }
    }
    out.flush()?;
    Ok(())
}
