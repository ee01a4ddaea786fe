use std::str::FromStr;

use nom::{
    branch::alt,
    character::complete::{char as nchar, digit1, one_of},
    combinator::{fail, opt, value, verify},
    multi::many_m_n,
    sequence::tuple,
    IResult, Parser,
};
use tracing::trace;

use super::{is_in_check, Board, Game};
use crate::{Color, Piece, Position};

/// Reasons for a FEN string to be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// something followed the last field
    #[error("trailing characters")]
    TrailingChars,
    /// the string is not a FEN string
    #[error("failed to parse position")]
    ParseError,
    /// a side has no king, or more than one
    #[error("expected exactly one {0} king, found {1}")]
    KingCount(Color, usize),
    /// the king of the side that just moved could be captured
    #[error("the {0} king is in check although it is not {0}'s turn")]
    WaitingSideInCheck(Color),
}

impl Game {
    /// Parses a [FEN](https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation) string.
    ///
    /// Only the piece placement and the side to move are required. Castling rights, the en
    /// passant square and the move counters may follow; they are checked for syntax and then
    /// ignored, since none of them have an effect on the rules played here.
    ///
    /// ### Examples
    /// ```
    /// # use chess_rules::Game;
    /// let game: Game = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    ///                 .parse()
    ///                 .unwrap();
    /// assert_eq!(game, Game::new());
    ///
    /// let game: Game = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w".parse().unwrap();
    /// assert_eq!(game, Game::new());
    /// ```
    pub fn from_fen(s: &str) -> Result<Self, FenError> {
        let (s, (board, _, to_move, ignored)) =
            tuple((piece_placement, nchar(' '), side_to_move, opt(ignored_fields)))(s)
                .map_err(|_| FenError::ParseError)?;

        if !s.is_empty() {
            return Err(FenError::TrailingChars);
        }

        if let Some((en_passant, halfmove, fullmove)) = ignored {
            trace!(?en_passant, halfmove, fullmove, "ignoring extra fen fields");
        }

        for color in [Color::White, Color::Black] {
            let kings = board
                .pieces_of(color)
                .filter(|(_, piece)| piece.is_king())
                .count();
            if kings != 1 {
                return Err(FenError::KingCount(color, kings));
            }
        }

        if is_in_check(&board, to_move.other()) {
            return Err(FenError::WaitingSideInCheck(to_move.other()));
        }

        Ok(Game::with_position(board, to_move))
    }
}

impl FromStr for Game {
    type Err = FenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Field {
    /// a piece
    Piece(Piece),
    /// `self.0` empty fields
    Empty(u8),
}

impl Field {
    fn width(&self) -> usize {
        match self {
            Field::Piece(_) => 1,
            Field::Empty(n) => *n as usize,
        }
    }
}

fn field(s: &str) -> IResult<&str, Field> {
    let (s, x) = one_of("rnbqkpRNBQKP12345678")(s)?;
    let field = match x {
        '1'..='8' => Field::Empty(x as u8 - b'0'),
        x => match Piece::from_char(x) {
            Some(piece) => Field::Piece(piece),
            None => return fail(s),
        },
    };
    Ok((s, field))
}

fn side_to_move(s: &str) -> IResult<&str, Color> {
    let (s, color) = one_of("wb")(s)?;
    let color = if color == 'w' {
        Color::White
    } else {
        Color::Black
    };
    Ok((s, color))
}

/// a single rank, which has to describe exactly eight squares
fn rank(s: &str) -> IResult<&str, Vec<Field>> {
    verify(many_m_n(1, 8, field), |fields: &Vec<Field>| {
        fields.iter().map(Field::width).sum::<usize>() == 8
    })(s)
}

fn piece_placement(s: &str) -> IResult<&str, Board> {
    let (s, before) = many_m_n(7, 7, tuple((rank, nchar('/'))))(s)?;
    let (s, last) = rank(s)?;

    let mut board = Board::empty();
    let mut i = 0;
    for val in before
        .into_iter()
        .flat_map(|(x, _)| x)
        .chain(last.into_iter())
    {
        match val {
            Field::Piece(piece) => {
                board.fields[i] = Some(piece);
                i += 1;
            }
            Field::Empty(n) => i += n as usize,
        }
    }

    Ok((s, board))
}

/// castling rights, en passant square and both move counters
fn ignored_fields(s: &str) -> IResult<&str, (Option<Position>, usize, usize)> {
    let (s, (_, _, _, en_passant, _, halfmove, _, fullmove)) = tuple((
        nchar(' '),
        castling_ability,
        nchar(' '),
        en_passant_sq,
        nchar(' '),
        counter,
        nchar(' '),
        counter,
    ))(s)?;
    Ok((s, (en_passant, halfmove, fullmove)))
}

fn castling_ability(s: &str) -> IResult<&str, ()> {
    alt((
        value((), nchar('-')),
        value(
            (),
            tuple((
                opt(nchar('K')),
                opt(nchar('Q')),
                opt(nchar('k')),
                opt(nchar('q')),
            )),
        ),
    ))(s)
}

fn en_passant_sq(s: &str) -> IResult<&str, Option<Position>> {
    alt((
        value(None, nchar('-')),
        tuple((one_of("abcdefgh"), one_of("36")))
            .map(|(file, rank)| Some(Position::new(b'8' - rank as u8, file as u8 - b'a'))),
    ))(s)
}

fn counter(s: &str) -> IResult<&str, usize> {
    let (s, num) = digit1(s)?;
    let Ok(num) = num.parse() else {
        return fail(s);
    };

    Ok((s, num))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{board::tests::pieces::*, Status};
    use pretty_assertions::assert_eq;

    #[test]
    fn starting_position() {
        let game: Game = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .expect("should be a valid fen string");
        assert_eq!(game, Game::new());
    }

    #[test]
    fn placement_lands_on_the_right_squares() {
        let game = Game::from_fen("2k5/2p2pb1/3p2pp/3P4/p1PP1B2/N4P2/1r3KPP/8 w - - 3 31")
            .expect("should be a valid fen string");
        #[rustfmt::skip]
        let fields = [
            x, x, k, x, x, x, x, x,
            x, x, p, x, x, p, b, x,
            x, x, x, p, x, x, p, p,
            x, x, x, P, x, x, x, x,
            p, x, P, P, x, B, x, x,
            N, x, x, x, x, P, x, x,
            x, r, x, x, x, K, P, P,
            x, x, x, x, x, x, x, x,
        ];
        assert_eq!(game.board(), &Board { fields });
        assert_eq!(game.to_move(), Color::White);
    }

    #[test]
    fn display_round_trips() {
        let fen = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b";
        let game = Game::from_fen(fen).expect("should be a valid fen string");
        assert_eq!(game.to_string(), fen);
    }

    #[test]
    fn trailing_chars() {
        assert_eq!(
            Game::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w foo"),
            Err(FenError::TrailingChars)
        );
        assert_eq!(
            Game::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 "),
            Err(FenError::TrailingChars)
        );
    }

    #[test]
    fn malformed() {
        for fen in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w",
            "rnbqkbnr/pppppppp/44k/8/8/8/PPPPPPPP/RNBQKBNR w",
            "rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w",
        ] {
            assert_eq!(Game::from_fen(fen), Err(FenError::ParseError), "{fen:?}");
        }
    }

    #[test]
    fn exactly_one_king_each() {
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/8 w"),
            Err(FenError::KingCount(Color::White, 0))
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/2k1K3 w"),
            Err(FenError::KingCount(Color::Black, 2))
        );
    }

    #[test]
    fn king_of_the_waiting_side_must_not_be_capturable() {
        assert_eq!(
            Game::from_fen("4k2R/8/8/8/8/8/8/4K3 w"),
            Err(FenError::WaitingSideInCheck(Color::Black))
        );
        assert_eq!(
            Game::from_fen("4k3/8/8/8/8/8/8/r3K3 b"),
            Err(FenError::WaitingSideInCheck(Color::White))
        );
        // the same positions are fine with the checked side to move
        let game = Game::from_fen("4k2R/8/8/8/8/8/8/4K3 b").expect("black is to move");
        assert_eq!(game.status(), Status::Check(Color::Black));
        assert!(Game::from_fen("4k3/8/8/8/8/8/8/r3K3 w").is_ok());
    }
}
