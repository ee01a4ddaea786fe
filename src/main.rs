use std::io::{BufRead, Write};

use anyhow::Context;
use chess_rules::{Game, GameState, Status, Transition};
use clap::Parser;
use itertools::Itertools;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod command;
mod render;

use command::{Command, HELP};
use render::BoardView;

#[derive(Parser)]
#[clap(about = "two players, one board, one terminal")]
struct Opts {
    /// starting position, in FEN format. `reset` still goes back to the standard position
    #[clap(short, long)]
    fen: Option<String>,
    /// draw pieces as letters instead of unicode glyphs
    #[clap(short, long)]
    ascii: bool,
    /// log filter such as `debug` or `chess_rules=trace`, takes precedence over RUST_LOG
    #[clap(short, long)]
    log: Option<String>,
}

macro_rules! retry {
    ($e:expr, $game:expr) => {{
        match $e {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{e}");
                prompt(&$game)?;
                continue;
            }
        }
    }};
}

fn prompt(game: &Game) -> std::io::Result<()> {
    match game.state() {
        GameState::AwaitingSelection(color) => print!("{color} to move: "),
        GameState::PieceSelected(color, pos) => print!("{color} to move, {pos} selected: "),
        GameState::Checkmate(_) => print!("game over, type `reset` to play again: "),
    }
    std::io::stdout().flush()
}

/// Tells the players about check and checkmate. Returns whether the game is over.
fn announce(game: &Game) -> bool {
    match game.status() {
        Status::Ongoing => false,
        Status::Check(color) => {
            println!("{color} is in check!");
            false
        }
        Status::Checkmate(color) => {
            println!("Checkmate! {} wins.", color.other());
            true
        }
    }
}

fn init_logging(directives: Option<&str>) -> anyhow::Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter \"{directives}\""))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.log.as_deref())?;

    let mut game = match &opts.fen {
        Some(fen) => Game::from_fen(fen)
            .with_context(|| format!("invalid starting position \"{fen}\""))?,
        None => Game::new(),
    };
    debug!(%game, "starting");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{}", BoardView::new(&game, opts.ascii));
    announce(&game);
    prompt(&game)?;
    while let Some(line) = lines.next() {
        let line = line?;
        if line.trim().is_empty() {
            prompt(&game)?;
            continue;
        }
        let command: Command = retry!(line.parse(), game);
        debug!(?command, "read command");

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Fen => println!("{game}"),
            Command::Reset => {
                game.reset();
                println!("{}", BoardView::new(&game, opts.ascii));
            }
            Command::Moves(pos) => {
                let moves = game.legal_moves(pos);
                if moves.is_empty() {
                    println!("no legal moves from {pos}");
                } else {
                    println!("{pos}: {}", moves.iter().format(" "));
                }
            }
            Command::Select(pos) => match game.select_square(pos) {
                Transition::NoOp => {}
                Transition::SelectionChanged => {
                    println!("{}", BoardView::new(&game, opts.ascii));
                }
                Transition::MoveCommitted => {
                    println!("{}", BoardView::new(&game, opts.ascii));
                    if let Some(record) = game.last_move() {
                        println!("played {record}");
                    }
                    if announce(&game) {
                        print!("play again? [y/N] ");
                        std::io::stdout().flush()?;
                        let answer = lines.next().transpose()?.unwrap_or_default();
                        if !answer.trim().to_ascii_lowercase().starts_with('y') {
                            break;
                        }
                        game.reset();
                        println!("{}", BoardView::new(&game, opts.ascii));
                    }
                }
            },
        }
        prompt(&game)?;
    }

    Ok(())
}
