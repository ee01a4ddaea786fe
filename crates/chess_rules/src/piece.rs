use std::fmt::Display;

use crate::{game::Board, Color, Position};

/// Of which kind a piece is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PieceKind {
    /// a pawn (♙)
    #[default]
    Pawn,
    /// a rook (♖)
    Rook,
    /// a knight (♘)
    Knight,
    /// a bishop (♗)
    Bishop,
    /// a queen (♕)
    Queen,
    /// a king (♔)
    King,
}

impl PieceKind {
    /// all six kinds, in the order they are declared
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
    ];
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PieceKind::Pawn => 'p',
                PieceKind::Rook => 'r',
                PieceKind::Knight => 'n',
                PieceKind::Bishop => 'b',
                PieceKind::Queen => 'q',
                PieceKind::King => 'k',
            }
        )
    }
}

/// A piece with a color. Construct this with [`Piece::new_black`] and [`Piece::new_white`]. There
/// usually is no need to construct though, as this is done by [`Game::new`]
///
/// A piece does not know where it stands; the [`Board`] is the only record of that.
///
/// [`Game::new`]: crate::Game::new
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
}

impl Piece {
    /// Constructs a new Piece with the given kind for the given color
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Constructs a new dark colored piece
    #[inline]
    pub const fn new_black(kind: PieceKind) -> Self {
        Self::new(kind, Color::Black)
    }

    /// Constructs a new light colored piece
    #[inline]
    pub const fn new_white(kind: PieceKind) -> Self {
        Self::new(kind, Color::White)
    }

    /// reads a piece from its FEN letter. Uppercase letters are white pieces.
    ///
    /// ```
    /// # use chess_rules::*;
    /// assert_eq!(Piece::from_char('N'), Some(Piece::new_white(PieceKind::Knight)));
    /// assert_eq!(Piece::from_char('q'), Some(Piece::new_black(PieceKind::Queen)));
    /// assert_eq!(Piece::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'r' => PieceKind::Rook,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self::new(kind, color))
    }

    /// returns to which color the piece belongs
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// returns the [`PieceKind`] of the piece, i.e. 'erases' the color
    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns `true` if the piece kind is [`King`].
    ///
    /// [`King`]: PieceKind::King
    ///
    /// ```
    /// # use chess_rules::*;
    /// assert_eq!(Piece::new_white(PieceKind::King).is_king(), true);
    /// ```
    #[must_use]
    #[inline]
    pub fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// the unicode chess glyph for this piece
    pub fn symbol(&self) -> char {
        match (self.color, self.kind) {
            (Color::White, PieceKind::King) => '♔',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::Black, PieceKind::King) => '♚',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Pawn) => '♟',
        }
    }

    /// Whether this piece, standing on `from`, may go to `to` by its own movement rules.
    ///
    /// Only the geometry of the move and the occupancy of the board are taken into account. It is
    /// not checked whether the move would leave the own king in check, see
    /// [`Game::legal_moves`](crate::Game::legal_moves) for that. Moving onto a piece of the same
    /// color or staying in place is never legal.
    ///
    /// ```
    /// # use chess_rules::{*, game::Board};
    /// let board = Board::new();
    /// let knight = Piece::new_white(PieceKind::Knight);
    /// let b1 = "b1".parse().unwrap();
    /// assert!(knight.is_legal_move(b1, "c3".parse().unwrap(), &board));
    /// assert!(!knight.is_legal_move(b1, "d2".parse().unwrap(), &board));
    /// ```
    pub fn is_legal_move(&self, from: Position, to: Position, board: &Board) -> bool {
        if from == to {
            return false;
        }
        if matches!(board[to], Some(other) if other.color == self.color) {
            return false;
        }

        let (drow, dcol) = from.delta(to);
        match self.kind {
            PieceKind::Pawn => {
                let forward = self.color.forward();
                let target_empty = board[to].is_none();
                if dcol == 0 && drow == forward {
                    target_empty
                } else if dcol == 0 && drow == 2 * forward {
                    from.row() == self.color.pawn_row()
                        && target_empty
                        && board.is_path_clear(from, to)
                } else if dcol.abs() == 1 && drow == forward {
                    // the target can only hold an opposing piece at this point
                    !target_empty
                } else {
                    false
                }
            }
            PieceKind::Rook => (drow == 0 || dcol == 0) && board.is_path_clear(from, to),
            PieceKind::Bishop => drow.abs() == dcol.abs() && board.is_path_clear(from, to),
            PieceKind::Queen => {
                (drow == 0 || dcol == 0 || drow.abs() == dcol.abs())
                    && board.is_path_clear(from, to)
            }
            PieceKind::Knight => {
                matches!((drow.abs(), dcol.abs()), (1, 2) | (2, 1))
            }
            PieceKind::King => from.distance(to) == 1,
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = self.kind.to_string();
        match self.color {
            Color::White => write!(f, "{}", letter.to_ascii_uppercase()),
            Color::Black => write!(f, "{letter}"),
        }
    }
}
