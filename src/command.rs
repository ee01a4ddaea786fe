use std::str::FromStr;

use chess_rules::{InvalidPosition, Position};

/// One line of player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// pick a square on the board
    Select(Position),
    /// list where the piece on a square may go
    Moves(Position),
    /// start over
    Reset,
    /// print the position as FEN
    Fen,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("nothing entered")]
    Empty,
    #[error("unknown command \"{0}\", type `help` for a list of commands")]
    Unknown(String),
    #[error("`moves` needs a square, like `moves e2`")]
    MissingSquare,
    #[error(transparent)]
    Square(#[from] InvalidPosition),
}

pub const HELP: &str = "\
commands:
  <square>      pick a square, either as `e2` or as `row,col` with row 0 at the top
  moves <sq>    list where the piece on <sq> may go
  reset         start a new game
  fen           print the position
  help          print this message
  quit          leave";

/// Reads a square either in algebraic notation or as `row,col` counted from the top left.
fn square(s: &str) -> Result<Position, InvalidPosition> {
    match s.split_once(',') {
        Some((row, col)) => {
            let row = row.trim().parse().map_err(|_| InvalidPosition)?;
            let col = col.trim().parse().map_err(|_| InvalidPosition)?;
            Position::try_new(row, col).ok_or(InvalidPosition)
        }
        None => s.parse(),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(first) = words.next() else {
            return Err(CommandError::Empty);
        };
        let command = match first.to_ascii_lowercase().as_str() {
            "reset" => Command::Reset,
            "fen" => Command::Fen,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "moves" => {
                let sq = words.next().ok_or(CommandError::MissingSquare)?;
                Command::Moves(square(sq)?)
            }
            x if x.len() == 2 || x.contains(',') => Command::Select(square(x)?),
            _ => return Err(CommandError::Unknown(first.to_owned())),
        };
        match words.next() {
            Some(extra) => Err(CommandError::Unknown(extra.to_owned())),
            None => Ok(command),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn squares() {
        assert_eq!("e2".parse(), Ok(Command::Select(pos("e2"))));
        assert_eq!("  E2 ".parse(), Ok(Command::Select(pos("e2"))));
        assert_eq!("6,4".parse(), Ok(Command::Select(pos("e2"))));
        assert_eq!(
            "0, 0".parse::<Command>(),
            Err(CommandError::Square(InvalidPosition))
        );
        assert_eq!("0,0".parse(), Ok(Command::Select(pos("a8"))));
        assert_eq!(
            "8,0".parse::<Command>(),
            Err(CommandError::Square(InvalidPosition))
        );
        assert_eq!(
            "e9".parse::<Command>(),
            Err(CommandError::Square(InvalidPosition))
        );
    }

    #[test]
    fn words() {
        assert_eq!("reset".parse(), Ok(Command::Reset));
        assert_eq!("FEN".parse(), Ok(Command::Fen));
        assert_eq!("help".parse(), Ok(Command::Help));
        assert_eq!("quit".parse(), Ok(Command::Quit));
        assert_eq!("moves g1".parse(), Ok(Command::Moves(pos("g1"))));
        assert_eq!("moves 7,6".parse(), Ok(Command::Moves(pos("g1"))));
        assert_eq!(
            "moves".parse::<Command>(),
            Err(CommandError::MissingSquare)
        );
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "castle".parse::<Command>(),
            Err(CommandError::Unknown("castle".into()))
        );
    }
}
