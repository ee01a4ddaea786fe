use std::{fmt::Display, ops::Add, str::FromStr};

/// A square on the board, addressed by `(row, col)`. Row 0 is Black's back rank (the top of the
/// board as it is usually drawn), column 0 is the a-file.
///
/// Enforces that the position is actually on the board.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash, PartialOrd, Ord)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Creates a new position.
    ///
    /// ## Panics
    ///
    /// Panics if `row >= 8` or if `col >= 8`. To fail recoverably, use [`try_new`] instead
    ///
    /// [`try_new`]: Position::try_new
    pub fn new(row: u8, col: u8) -> Position {
        assert!(row < 8, "row {row} is not on the board");
        assert!(col < 8, "column {col} is not on the board");
        Position { row, col }
    }

    /// Creates a new position. Returns `None` if the position would not be on the board
    ///
    /// ```
    /// # use chess_rules::Position;
    /// assert!(Position::try_new(7, 7).is_some());
    /// assert!(Position::try_new(8, 0).is_none());
    /// ```
    pub fn try_new(row: u8, col: u8) -> Option<Position> {
        if row < 8 && col < 8 {
            Some(Position { row, col })
        } else {
            None
        }
    }

    /// returns the row, counted from Black's side of the board
    ///
    /// ```
    /// # use chess_rules::Position;
    /// assert_eq!("e2".parse::<Position>().unwrap().row(), 6);
    /// ```
    pub fn row(&self) -> u8 {
        self.row
    }

    /// returns the column, counted from the a-file
    ///
    /// ```
    /// # use chess_rules::Position;
    /// assert_eq!("e2".parse::<Position>().unwrap().col(), 4);
    /// ```
    pub fn col(&self) -> u8 {
        self.col
    }

    /// returns the move distance between two positions. The move distance is defined as the
    /// minimum number of moves it takes for a king to move from a to b, assuming otherwise empty
    /// board
    pub fn distance(self, other: Self) -> u8 {
        std::cmp::max(self.row.abs_diff(other.row), self.col.abs_diff(other.col))
    }

    /// the signed `(row, col)` offset that leads from `self` to `other`
    pub fn delta(self, other: Self) -> (i8, i8) {
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// iterates over all 64 squares, row by row starting at `a8`
    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|row| (0..8).map(move |col| Position { row, col }))
    }

    /// the index of this square in a row-major 64 element array
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }
}

impl Add<(i8, i8)> for Position {
    type Output = Option<Position>;

    fn add(self, (drow, dcol): (i8, i8)) -> Self::Output {
        let row = self.row.checked_add_signed(drow)?;
        let col = self.col.checked_add_signed(dcol)?;
        Position::try_new(row, col)
    }
}

/// Error that arises when a square cannot be read
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Position is invalid")]
pub struct InvalidPosition;

impl FromStr for Position {
    type Err = InvalidPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let col = match chars.next().ok_or(InvalidPosition)? {
            c @ 'a'..='h' => c as u8 - b'a',
            _ => return Err(InvalidPosition),
        };
        let row = match chars.next().ok_or(InvalidPosition)? {
            c @ '1'..='8' => b'8' - c as u8,
            _ => return Err(InvalidPosition),
        };
        if chars.next().is_some() {
            return Err(InvalidPosition);
        }
        Ok(Position { row, col })
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (self.col + b'a') as char;
        let rank = (b'8' - self.row) as char;

        write!(f, "{file}{rank}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_any_position() {
        let files = b"abcdefgh ,.14nr8";
        let ranks = b"87654321 0abcz'.";

        for (col, &x) in files.iter().enumerate() {
            for (row, &y) in ranks.iter().enumerate() {
                let arr = [x, y];
                let s = std::str::from_utf8(&arr).unwrap();
                let pos = s.parse::<Position>();
                if col < 8 && row < 8 {
                    assert_eq!(pos, Ok(Position::new(row as u8, col as u8)));
                } else {
                    assert_eq!(pos, Err(InvalidPosition))
                }
            }
        }

        assert!("e41".parse::<Position>().is_err());
        assert!("e8 ".parse::<Position>().is_err());
        assert!("".parse::<Position>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        assert_eq!(Position::new(0, 0).to_string(), "a8");
        assert_eq!(Position::new(7, 4).to_string(), "e1");
        assert_eq!(Position::new(7, 7).to_string(), "h1");
        for pos in Position::all() {
            assert_eq!(pos.to_string().parse::<Position>(), Ok(pos));
        }
    }

    #[test]
    fn offsets_stay_on_board() {
        let corner = Position::new(0, 7);
        assert_eq!(corner + (1, -1), Some(Position::new(1, 6)));
        assert_eq!(corner + (-1, 0), None);
        assert_eq!(corner + (0, 1), None);
        assert_eq!(Position::new(4, 4) + (3, 3), Some(Position::new(7, 7)));
        assert_eq!(Position::new(4, 4) + (4, 0), None);
    }

    #[test]
    fn all_covers_the_board_once() {
        let all: Vec<_> = Position::all().collect();
        assert_eq!(all.len(), 64);
        for (i, pos) in all.iter().enumerate() {
            assert_eq!(pos.index(), i);
        }
    }

    #[test]
    fn distance_is_king_distance() {
        let e1: Position = "e1".parse().unwrap();
        assert_eq!(e1.distance("e1".parse().unwrap()), 0);
        assert_eq!(e1.distance("f2".parse().unwrap()), 1);
        assert_eq!(e1.distance("a8".parse().unwrap()), 7);
        assert_eq!(e1.delta("e3".parse().unwrap()), (-2, 0));
    }

    #[test]
    #[should_panic]
    fn new_rejects_off_board() {
        let _ = Position::new(0, 8);
    }
}
