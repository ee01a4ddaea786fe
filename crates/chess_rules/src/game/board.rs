use std::{
    fmt::Display,
    ops::{Index, IndexMut},
};

use crate::{happy_try, Color, Piece, PieceKind, Position};

/// A chess board. Indexable via [`Position`]
///
/// The board is the only place that knows where a piece stands, so every query that hands out a
/// piece hands out its position alongside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pub(super) fields: [Option<Piece>; 64],
}

/// What a relocation did to the board, so that it can be taken back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    from: Position,
    to: Position,
    piece: Piece,
    captured: Option<Piece>,
}

impl MoveRecord {
    /// the square the piece left
    pub fn from(&self) -> Position {
        self.from
    }

    /// the square the piece arrived on
    pub fn to(&self) -> Position {
        self.to
    }

    /// the piece that moved
    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// the opposing piece that stood on the target square, if any
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }
}

impl Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let separator = if self.captured.is_some() { 'x' } else { '-' };
        write!(f, "{}{}{separator}{}", self.piece, self.from, self.to)
    }
}

impl Index<Position> for Board {
    type Output = Option<Piece>;

    fn index(&self, i: Position) -> &Self::Output {
        &self.fields[i.index()]
    }
}

impl IndexMut<Position> for Board {
    fn index_mut(&mut self, i: Position) -> &mut Self::Output {
        &mut self.fields[i.index()]
    }
}

impl Board {
    /// Sets up a new board in the standard way.
    pub fn new() -> Self {
        use PieceKind::*;
        Board {
            #[rustfmt::skip]
            fields: [
                Some(Piece::new_black(Rook)),
                Some(Piece::new_black(Knight)),
                Some(Piece::new_black(Bishop)),
                Some(Piece::new_black(Queen)),
                Some(Piece::new_black(King)),
                Some(Piece::new_black(Bishop)),
                Some(Piece::new_black(Knight)),
                Some(Piece::new_black(Rook)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                Some(Piece::new_black(Pawn)),
                None, None, None, None, None, None, None, None,
                None, None, None, None, None, None, None, None,
                None, None, None, None, None, None, None, None,
                None, None, None, None, None, None, None, None,
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Pawn)),
                Some(Piece::new_white(Rook)),
                Some(Piece::new_white(Knight)),
                Some(Piece::new_white(Bishop)),
                Some(Piece::new_white(Queen)),
                Some(Piece::new_white(King)),
                Some(Piece::new_white(Bishop)),
                Some(Piece::new_white(Knight)),
                Some(Piece::new_white(Rook)),
            ],
        }
    }

    /// A board without any pieces on it
    pub fn empty() -> Self {
        Board { fields: [None; 64] }
    }

    /// Puts every piece back on its starting square and clears the rest of the board.
    pub fn setup_initial_position(&mut self) {
        self.fields = Self::new().fields;
    }

    /// the piece on `pos`, if there is one
    #[inline]
    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        self[pos]
    }

    /// Overwrites the square at `pos`. Whatever stood there before is dropped.
    #[inline]
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        self[pos] = piece;
    }

    /// Moves the piece on `start` to `end` if its movement rules allow it, capturing whatever
    /// opposing piece stood on `end`.
    ///
    /// Returns `None`, leaving the board untouched, if there is no piece on `start` or the piece
    /// can't go to `end`. Whether the move exposes the own king is not considered here.
    ///
    /// ```
    /// # use chess_rules::game::Board;
    /// let mut board = Board::new();
    /// assert!(board.move_piece("e2".parse().unwrap(), "e4".parse().unwrap()).is_some());
    /// assert!(board.move_piece("e4".parse().unwrap(), "e6".parse().unwrap()).is_none());
    /// ```
    pub fn move_piece(&mut self, start: Position, end: Position) -> Option<MoveRecord> {
        let piece = self[start]?;
        if !piece.is_legal_move(start, end, self) {
            return None;
        }
        Some(self.relocate(start, end))
    }

    /// Moves whatever stands on `from` to `to` without asking any questions.
    ///
    /// ## Panics
    ///
    /// Panics if there is no piece on `from`
    pub(crate) fn relocate(&mut self, from: Position, to: Position) -> MoveRecord {
        let piece = self[from].take().expect("must have a piece here");
        let captured = self[to].replace(piece);
        MoveRecord {
            from,
            to,
            piece,
            captured,
        }
    }

    /// Takes back a move made by [`Board::move_piece`]. Must be called in the reverse order of
    /// the moves made.
    pub(crate) fn unmake_move(&mut self, record: MoveRecord) {
        self[record.from] = Some(record.piece);
        self[record.to] = record.captured;
    }

    /// Whether all squares strictly between `from` and `to` are empty.
    ///
    /// `from` and `to` have to share a row, a column or a diagonal. Adjacent squares trivially
    /// have a clear path.
    pub fn is_path_clear(&self, from: Position, to: Position) -> bool {
        let (drow, dcol) = from.delta(to);
        let step = (drow.signum(), dcol.signum());
        let mut current = from;
        loop {
            let Some(next) = current + step else {
                return false;
            };
            if next == to {
                return true;
            }
            if self[next].is_some() {
                return false;
            }
            current = next;
        }
    }

    /// where the king of the given color stands
    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.enumerate_pieces()
            .find(|(_, piece)| piece.is_king() && piece.color() == color)
            .map(|(pos, _)| pos)
    }

    /// returns an iterator over each piece on the board, including its position
    pub fn enumerate_pieces(&self) -> EnumeratePieces<'_> {
        EnumeratePieces {
            row: 0,
            col: 0,
            board: self,
        }
    }

    /// all pieces of one color, including their positions
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.enumerate_pieces()
            .filter(move |(_, piece)| piece.color() == color)
    }
}

/// Iterator over the occupied squares of a [`Board`], row by row starting at `a8`
#[derive(Debug)]
pub struct EnumeratePieces<'a> {
    row: u8,
    col: u8,
    board: &'a Board,
}

impl<'a> EnumeratePieces<'a> {
    fn next_idx(&mut self) -> Option<Position> {
        let position = Position::try_new(self.row, self.col)?;
        self.col += 1;
        if self.col >= 8 {
            self.col = 0;
            self.row += 1;
        }
        Some(position)
    }
}

impl<'a> Iterator for EnumeratePieces<'a> {
    type Item = (Position, Piece);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pos = self.next_idx()?;
            happy_try!(self.board[pos].map(|x| (pos, x)));
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, rank) in self.fields.chunks(8).enumerate() {
            let mut skip = 0;
            for field in rank {
                match field {
                    Some(p) => {
                        if skip != 0 {
                            write!(f, "{skip}")?;
                        }
                        skip = 0;
                        write!(f, "{p}")?;
                    }
                    None => skip += 1,
                }
            }
            if skip != 0 {
                write!(f, "{skip}")?;
            }
            if row != 7 {
                write!(f, "/")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use pieces::*;
    pub(crate) mod pieces {
        #![allow(non_upper_case_globals, unused)]
        use crate::{Piece, PieceKind};
        pub const R: Option<Piece> = Some(Piece::new_white(PieceKind::Rook));
        pub const N: Option<Piece> = Some(Piece::new_white(PieceKind::Knight));
        pub const B: Option<Piece> = Some(Piece::new_white(PieceKind::Bishop));
        pub const Q: Option<Piece> = Some(Piece::new_white(PieceKind::Queen));
        pub const K: Option<Piece> = Some(Piece::new_white(PieceKind::King));
        pub const P: Option<Piece> = Some(Piece::new_white(PieceKind::Pawn));

        pub const r: Option<Piece> = Some(Piece::new_black(PieceKind::Rook));
        pub const n: Option<Piece> = Some(Piece::new_black(PieceKind::Knight));
        pub const b: Option<Piece> = Some(Piece::new_black(PieceKind::Bishop));
        pub const q: Option<Piece> = Some(Piece::new_black(PieceKind::Queen));
        pub const k: Option<Piece> = Some(Piece::new_black(PieceKind::King));
        pub const p: Option<Piece> = Some(Piece::new_black(PieceKind::Pawn));

        pub const x: Option<Piece> = None;
    }

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn to_string_starting_pos() {
        let board = Board::default();
        assert_eq!(
            board.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        )
    }

    #[test]
    fn to_string_random() {
        #[rustfmt::skip]
        let board = Board {
            fields:
            [
                x,x,k,x,x,x,x,x,
                x,x,p,x,x,p,b,x,
                x,x,x,p,x,x,p,p,
                x,x,x,P,x,x,x,x,
                p,x,P,P,x,B,x,x,
                N,x,x,x,x,P,x,x,
                x,r,x,x,x,K,P,P,
                x,x,x,x,x,x,x,x,
            ],
        };

        assert_eq!(
            board.to_string(),
            "2k5/2p2pb1/3p2pp/3P4/p1PP1B2/N4P2/1r3KPP/8"
        );
        assert_eq!(board.king_position(Color::White), Some(pos("f2")));
        assert_eq!(board.king_position(Color::Black), Some(pos("c8")));
    }

    #[test]
    fn starting_layout_has_every_piece_on_its_square() {
        let board = Board::new();
        assert_eq!(board.enumerate_pieces().count(), 32);
        assert_eq!(board.pieces_of(Color::White).count(), 16);
        assert_eq!(board.pieces_of(Color::Black).count(), 16);

        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, kind) in back_rank.into_iter().enumerate() {
            let col = col as u8;
            assert_eq!(
                board.get_piece(Position::new(0, col)),
                Some(Piece::new_black(kind))
            );
            assert_eq!(
                board.get_piece(Position::new(7, col)),
                Some(Piece::new_white(kind))
            );
            assert_eq!(
                board.get_piece(Position::new(1, col)),
                Some(Piece::new_black(PieceKind::Pawn))
            );
            assert_eq!(
                board.get_piece(Position::new(6, col)),
                Some(Piece::new_white(PieceKind::Pawn))
            );
        }
    }

    #[test]
    fn setup_is_idempotent() {
        let mut board = Board::new();
        board.setup_initial_position();
        assert_eq!(board, Board::new());

        let mut board = Board::empty();
        board.set_piece(pos("d4"), Some(Piece::new_white(PieceKind::Queen)));
        board.setup_initial_position();
        board.setup_initial_position();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn move_piece_rejects_without_touching_the_board() {
        let mut board = Board::new();
        // nothing there
        assert_eq!(board.move_piece(pos("e4"), pos("e5")), None);
        // blocked by own pawn
        assert_eq!(board.move_piece(pos("a1"), pos("a3")), None);
        // not a knight's jump
        assert_eq!(board.move_piece(pos("g1"), pos("g3")), None);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn move_piece_captures_and_unmakes() {
        let mut board = Board::empty();
        board.set_piece(pos("a1"), R);
        board.set_piece(pos("a7"), p);
        board.set_piece(pos("e1"), K);
        board.set_piece(pos("e8"), k);
        let before = board.clone();

        let record = board.move_piece(pos("a1"), pos("a7")).unwrap();
        assert_eq!(record.captured(), p);
        assert_eq!(record.piece(), R.unwrap());
        assert_eq!(record.to_string(), "Ra1xa7");
        assert_eq!(board[pos("a1")], None);
        assert_eq!(board[pos("a7")], R);
        assert_eq!(board.enumerate_pieces().count(), 3);

        board.unmake_move(record);
        assert_eq!(board, before);
    }

    #[test]
    fn path_clear_ignores_endpoints() {
        let board = Board::new();
        assert!(board.is_path_clear(pos("a2"), pos("a7")));
        assert!(!board.is_path_clear(pos("a1"), pos("a7")));
        assert!(board.is_path_clear(pos("e1"), pos("e2")));
        assert!(!board.is_path_clear(pos("c1"), pos("h6")));
        assert!(board.is_path_clear(pos("c2"), pos("g6")));
    }
}
