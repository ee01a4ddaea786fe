use crate::{game::Board, Color, Piece, PieceKind, Position};
use directions::{EightWayDirection, FourWayDirection, Offset};

mod directions {
    pub(super) trait Offset {
        /// the `(row, col)` offset of walking `distance` squares in this direction
        #[must_use]
        fn offset(self, distance: u8) -> (i8, i8);

        #[must_use]
        fn rotate_once(self) -> Option<Self>
        where
            Self: Sized;
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub(super) enum FourWayDirection {
        #[default]
        Up,
        Right,
        Down,
        Left,
    }

    impl Offset for FourWayDirection {
        fn offset(self, distance: u8) -> (i8, i8) {
            use FourWayDirection::*;
            let distance = distance as i8;
            match self {
                Up => (-distance, 0),
                Right => (0, distance),
                Down => (distance, 0),
                Left => (0, -distance),
            }
        }

        fn rotate_once(self) -> Option<Self> {
            match self {
                FourWayDirection::Up => Some(Self::Right),
                FourWayDirection::Right => Some(Self::Down),
                FourWayDirection::Down => Some(Self::Left),
                FourWayDirection::Left => None,
            }
        }
    }

    impl FourWayDirection {
        /// the diagonal obtained by turning this direction 45° clockwise
        #[must_use]
        pub(super) fn offset_diagonal(self, distance: u8) -> (i8, i8) {
            use FourWayDirection::*;
            let distance = distance as i8;
            match self {
                Up => (-distance, distance),
                Right => (distance, distance),
                Down => (distance, -distance),
                Left => (-distance, -distance),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(super) enum EightWayDirection {
        #[default]
        Up,
        UpRight,
        Right,
        DownRight,
        Down,
        DownLeft,
        Left,
        UpLeft,
    }

    impl Offset for EightWayDirection {
        fn offset(self, distance: u8) -> (i8, i8) {
            use EightWayDirection::*;
            let distance = distance as i8;
            match self {
                Up => (-distance, 0),
                UpRight => (-distance, distance),
                Right => (0, distance),
                DownRight => (distance, distance),
                Down => (distance, 0),
                DownLeft => (distance, -distance),
                Left => (0, -distance),
                UpLeft => (-distance, -distance),
            }
        }

        fn rotate_once(self) -> Option<Self> {
            use EightWayDirection::*;
            match self {
                Up => Some(UpRight),
                UpRight => Some(Right),
                Right => Some(DownRight),
                DownRight => Some(Down),
                Down => Some(DownLeft),
                DownLeft => Some(Left),
                Left => Some(UpLeft),
                UpLeft => None,
            }
        }
    }
}

/// Combines the creation and usage of a Iterator over the squares a piece may move to.
///
/// The squares yielded are exactly those for which [`Piece::is_legal_move`] holds: the movement
/// rules of the piece are respected, but the safety of the own king is not.
pub trait Mover<'a>: Iterator<Item = Position> + Sized {
    /// creates a new mover for the piece at the given position.
    ///
    /// # Panics
    ///
    /// Panics if there is no piece on this square
    fn new(pos: Position, board: &'a Board) -> Self {
        let color = board[pos].expect("there must be a piece to move").color();
        Self::new_with_color(pos, board, color)
    }

    /// Creates a new mover with the given color. The piece does not have to exist on the board
    /// for this function to work.
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self;
}

/// Walks outwards from a square, one direction after the other, stopping each ray at the first
/// occupied square.
#[derive(Debug, PartialEq, Eq)]
struct Rotator<T> {
    directions: Option<T>,
    distance: u8,
}

impl<T> Rotator<T>
where
    T: PartialEq + Copy + Offset + std::fmt::Debug + Default,
{
    fn new() -> Self {
        Self {
            directions: Some(T::default()),
            distance: 1,
        }
    }

    fn rotate_once(&mut self) {
        if let Some(direction) = self.directions {
            self.directions = direction.rotate_once();
            self.distance = 1;
        }
    }

    #[inline]
    fn next(&mut self, pos: Position, board: &Board, own_color: Color) -> Option<Position> {
        self.next_with(pos, board, own_color, <T as Offset>::offset)
    }

    fn next_with(
        &mut self,
        pos: Position,
        board: &Board,
        own_color: Color,
        f: impl Fn(T, u8) -> (i8, i8),
    ) -> Option<Position> {
        loop {
            let direction = self.directions?;
            let offset = f(direction, self.distance);
            let Some(target) = pos + offset else {
                self.rotate_once();
                continue;
            };
            match board[target] {
                // can't capture own piece
                Some(piece) if piece.color() == own_color => {
                    self.rotate_once();
                    continue;
                }
                // can capture enemy piece, but not look past it
                Some(_) => {
                    self.rotate_once();
                    return Some(target);
                }
                None => {
                    self.distance += 1;
                    return Some(target);
                }
            }
        }
    }
}

/// Iterator over the possible moves that the rook can make.
///
/// Construct this via the [`Mover`] trait or via [`PieceMove`]
#[derive(Debug, PartialEq, Eq)]
pub struct RookMove<'a> {
    pos: Position,
    board: &'a Board,
    rotator: Rotator<FourWayDirection>,
    color: Color,
}

impl<'a> Mover<'a> for RookMove<'a> {
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        Self {
            pos,
            board,
            color,
            rotator: Rotator::new(),
        }
    }
}

impl<'a> Iterator for RookMove<'a> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.rotator.next(self.pos, self.board, self.color)
    }
}

/// Iterator over the possible moves that the bishop can make.
///
/// Construct this via the [`Mover`] trait or via [`PieceMove`]
#[derive(Debug, PartialEq, Eq)]
pub struct BishopMove<'a> {
    pos: Position,
    board: &'a Board,
    rotator: Rotator<FourWayDirection>,
    color: Color,
}

impl<'a> Mover<'a> for BishopMove<'a> {
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        Self {
            pos,
            board,
            color,
            rotator: Rotator::new(),
        }
    }
}

impl<'a> Iterator for BishopMove<'a> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.rotator.next_with(
            self.pos,
            self.board,
            self.color,
            FourWayDirection::offset_diagonal,
        )
    }
}

/// Iterator over the possible moves that the queen can make.
///
/// Construct this via the [`Mover`] trait or via [`PieceMove`]
#[derive(Debug, PartialEq, Eq)]
pub struct QueenMove<'a> {
    pos: Position,
    board: &'a Board,
    rotator: Rotator<EightWayDirection>,
    color: Color,
}

impl<'a> Mover<'a> for QueenMove<'a> {
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        Self {
            pos,
            board,
            color,
            rotator: Rotator::new(),
        }
    }
}

impl<'a> Iterator for QueenMove<'a> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.rotator.next(self.pos, self.board, self.color)
    }
}

/// Iterator over the possible moves that the knight can make.
///
/// Construct this via the [`Mover`] trait or via [`PieceMove`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnightMove<'a> {
    rotation: Option<EightWayDirection>,
    pos: Position,
    board: &'a Board,
    color: Color,
}

impl<'a> Mover<'a> for KnightMove<'a> {
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        Self {
            pos,
            color,
            board,
            rotation: Some(EightWayDirection::Up),
        }
    }
}

impl<'a> KnightMove<'a> {
    /// each of the eight directions is paired with the jump that lies just clockwise of it
    fn offset(dir: EightWayDirection) -> (i8, i8) {
        use EightWayDirection::*;
        match dir {
            Up => (-2, 1),
            UpRight => (-1, 2),
            Right => (1, 2),
            DownRight => (2, 1),
            Down => (2, -1),
            DownLeft => (1, -2),
            Left => (-1, -2),
            UpLeft => (-2, -1),
        }
    }
}

impl<'a> Iterator for KnightMove<'a> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rot = self.rotation?;
            self.rotation = rot.rotate_once();

            let Some(target) = self.pos + Self::offset(rot) else {
                continue;
            };
            match self.board[target] {
                Some(piece) if piece.color() == self.color => continue,
                Some(_) | None => return Some(target),
            }
        }
    }
}

/// Iterator over the possible moves that the king can make.
///
/// Construct this via the [`Mover`] trait or via [`PieceMove`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KingMove<'a> {
    rotation: Option<EightWayDirection>,
    pos: Position,
    board: &'a Board,
    color: Color,
}

impl<'a> Mover<'a> for KingMove<'a> {
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        Self {
            pos,
            color,
            board,
            rotation: Some(EightWayDirection::Up),
        }
    }
}

impl<'a> Iterator for KingMove<'a> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rot = self.rotation?;
            self.rotation = rot.rotate_once();

            let Some(target) = self.pos + rot.offset(1) else {
                continue;
            };
            match self.board[target] {
                Some(piece) if piece.color() == self.color => continue,
                Some(_) | None => return Some(target),
            }
        }
    }
}

/// Iterator over the possible moves that the pawn can make.
///
/// Construct this via the [`Mover`] trait or via [`PieceMove`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PawnMove<'a> {
    pos: Position,
    board: &'a Board,
    color: Color,
    is_blocked: bool,
    push_two: bool,
    dir: Option<PawnDir>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PawnDir {
    #[default]
    PushOne,
    PushTwo,
    CaptureLeft,
    CaptureRight,
}

impl PawnDir {
    fn requires_capture(&self) -> bool {
        match self {
            PawnDir::PushOne | PawnDir::PushTwo => false,
            PawnDir::CaptureLeft | PawnDir::CaptureRight => true,
        }
    }

    #[inline]
    fn next(self) -> Option<Self> {
        match self {
            PawnDir::PushOne => Some(PawnDir::PushTwo),
            PawnDir::PushTwo => Some(PawnDir::CaptureLeft),
            PawnDir::CaptureLeft => Some(PawnDir::CaptureRight),
            PawnDir::CaptureRight => None,
        }
    }
}

impl<'a> Mover<'a> for PawnMove<'a> {
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        Self {
            pos,
            color,
            board,
            push_two: pos.row() == color.pawn_row(),
            dir: Some(PawnDir::PushOne),
            is_blocked: false,
        }
    }
}

impl<'a> PawnMove<'a> {
    fn offset(&self, pawn_dir: PawnDir) -> (i8, i8) {
        use PawnDir::*;
        let forward = self.color.forward();

        match pawn_dir {
            PushOne => (forward, 0),
            PushTwo => (2 * forward, 0),
            CaptureLeft => (forward, -1),
            CaptureRight => (forward, 1),
        }
    }
}

impl<'a> Iterator for PawnMove<'a> {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pawn_dir = self.dir?;
            self.dir = pawn_dir.next();

            if matches!(pawn_dir, PawnDir::PushOne) {
                self.is_blocked = true;
            }

            match pawn_dir {
                PawnDir::PushTwo if !self.push_two => continue,
                PawnDir::PushTwo if self.is_blocked => continue,
                _ => (),
            }

            let Some(target) = self.pos + self.offset(pawn_dir) else {
                continue;
            };

            match self.board[target] {
                Some(piece) if piece.color() == self.color => continue,
                Some(_) if pawn_dir.requires_capture() => return Some(target),
                // pushes need an empty square, captures need a piece
                Some(_) => continue,
                None if pawn_dir.requires_capture() => continue,
                None => {
                    self.is_blocked = false;
                    return Some(target);
                }
            }
        }
    }
}

/// Unifies the moves of a piece, independent of what piece exactly it is.
///
/// This enum implements the [`Mover`] trait, so use that to create it.
///
/// ```
/// # use chess_rules::{game::{Board, Mover, PieceMove}, Position};
/// let board = Board::new();
/// let moves: Vec<Position> = PieceMove::new("g1".parse().unwrap(), &board).collect();
/// assert!(moves.contains(&"f3".parse().unwrap()));
/// assert!(moves.contains(&"h3".parse().unwrap()));
/// assert_eq!(moves.len(), 2);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub enum PieceMove<'a> {
    /// the piece is a pawn
    Pawn(PawnMove<'a>),
    /// the piece is a rook
    Rook(RookMove<'a>),
    /// the piece is a knight
    Knight(KnightMove<'a>),
    /// the piece is a bishop
    Bishop(BishopMove<'a>),
    /// the piece is a queen
    Queen(QueenMove<'a>),
    /// the piece is a king
    King(KingMove<'a>),
}

impl<'a> Mover<'a> for PieceMove<'a> {
    /// # Panics
    ///
    /// Panics if there is no piece on `pos`
    #[inline]
    fn new_with_color(pos: Position, board: &'a Board, color: Color) -> Self {
        let kind = board[pos].expect("there must be a piece to move").kind();
        Self::new_with_piece(pos, board, Piece::new(kind, color))
    }
}

impl<'a> PieceMove<'a> {
    /// creates a mover for `piece` as if it stood on `pos`. The square itself is not looked at.
    pub fn new_with_piece(pos: Position, board: &'a Board, piece: Piece) -> Self {
        let color = piece.color();
        match piece.kind() {
            PieceKind::Pawn => Self::Pawn(PawnMove::new_with_color(pos, board, color)),
            PieceKind::Rook => Self::Rook(RookMove::new_with_color(pos, board, color)),
            PieceKind::Knight => Self::Knight(KnightMove::new_with_color(pos, board, color)),
            PieceKind::Bishop => Self::Bishop(BishopMove::new_with_color(pos, board, color)),
            PieceKind::Queen => Self::Queen(QueenMove::new_with_color(pos, board, color)),
            PieceKind::King => Self::King(KingMove::new_with_color(pos, board, color)),
        }
    }
}

impl<'a> Iterator for PieceMove<'a> {
    type Item = Position;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            PieceMove::Pawn(inner) => inner.next(),
            PieceMove::Rook(inner) => inner.next(),
            PieceMove::Knight(inner) => inner.next(),
            PieceMove::Bishop(inner) => inner.next(),
            PieceMove::Queen(inner) => inner.next(),
            PieceMove::King(inner) => inner.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;
    const PASSIVE_AGGRESSIVE_NOTE: &str = "i got this from chess.com, it better be valid";
    use super::*;
    use crate::Game;

    /// generates a test case. The format is `testcase!([Mover struct], <name of test case>, <FEN
    /// string of the position>, <initial position> => <comma separated list of possible target
    /// squares>);`
    macro_rules! testcase {
        ($who:ident, $name:ident, $fen:literal, $start:literal => $($expected:literal),*) => {
            #[test]
            fn $name() {
                let game = Game::from_fen($fen).expect(PASSIVE_AGGRESSIVE_NOTE);
                let mut moves = $who::new($start.parse().unwrap(), game.board())
                    .map(|x| x.to_string())
                    .collect_vec();
                let mut expected = [$($expected,)*]
                    .map(|x: &str| x.parse::<Position>().unwrap().to_string());
                moves.sort();
                expected.sort();

                assert_eq!(moves, &expected);
            }
        };
        ($name:ident, $fen:literal, $start:literal => $($expected:literal),*) => {
            testcase!(PieceMove, $name, $fen, $start => $($expected),*);
        };
    }

    #[test]
    fn rook_cannot_move() {
        let board = Board::new();
        let moves = RookMove::new(Position::new(7, 0), &board).collect_vec();
        assert_eq!(moves, &[]);
    }

    testcase!(KnightMove, knight_move, "rn2kb1r/p1q1pp1p/2p2np1/1p6/3PB3/2N2N2/PPP2PPP/R1BQ1RK1 w kq - 2 10", "c3"
        => "b5", "a4", "b1", "e2", "d5" );

    testcase!(BishopMove, bishop_move, "rn2kb1r/p1q1pp1p/2p2np1/1p6/3PB3/2N2N2/PPP2PPP/R1BQ1RK1 w kq - 2 10", "e4"
        => "d3", "f5", "g6", "d5", "c6" );

    testcase!(RookMove, rook_move, "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 w - - 1 22", "e7"
        => "f7", "e8", "e6", "e5", "e4", "e3", "e2", "e1", "d7", "c7", "b7", "a7");

    testcase!(QueenMove, queen_move, "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 w - - 1 22", "d1"
        => "c1", "b1", "e1", "f1", "c2", "d2", "e2", "b3", "d3", "d4", "d5", "d6");

    testcase!(PawnMove, pawn_just_push, "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 w - - 1 22", "c4"
        => "c5");

    testcase!(PawnMove, pawn_double_push, "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 w - - 1 22", "g2"
        => "g3", "g4");

    testcase!(PawnMove, pawn_blocked, "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 w - - 1 22", "f2"
        => );

    testcase!(PawnMove, pawn_capture, "2r2r2/p3Rp1p/nnk3p1/2Pp4/P7/5N2/1P3PPP/R2Q2K1 w - - 0 23", "c5"
        => "b6");

    testcase!(PawnMove, black_pawn_moves_down, "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 b", "h7"
        => "h6", "h5");

    testcase!(KingMove, king_has_no_castling, "rnbqkbnr/pp4pp/2pppp2/8/8/2NPB3/PPPQPPPP/R3KBNR w", "e1"
        => "d1");

    testcase!(king_in_the_open, "8/8/8/3k4/8/8/8/4K3 b", "d5"
        => "c6", "d6", "e6", "c5", "e5", "c4", "d4", "e4");

    #[test]
    fn generator_agrees_with_legality_predicate() {
        let positions = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w",
            "rn2kb1r/p1q1pp1p/2p2np1/1p6/3PB3/2N2N2/PPP2PPP/R1BQ1RK1 w",
            "2r2r2/p3Rp1p/nnkp2p1/8/P1P5/5N2/1P3PPP/R2Q2K1 b",
            "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b",
            "4k3/1P6/8/3pP3/8/8/6p1/4K3 w",
        ];

        for fen in positions {
            let game = Game::from_fen(fen).expect(PASSIVE_AGGRESSIVE_NOTE);
            let board = game.board();
            for (from, piece) in board.enumerate_pieces() {
                let generated = PieceMove::new(from, board).sorted().collect_vec();
                let predicate = Position::all()
                    .filter(|&to| piece.is_legal_move(from, to, board))
                    .sorted()
                    .collect_vec();
                assert_eq!(generated, predicate, "{piece} on {from} in {fen}");
            }
        }
    }
}
