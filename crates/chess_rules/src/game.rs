//! The turn state machine: selection, move validation, check and checkmate.

use std::fmt::Display;

use tinyvec::ArrayVec;
use tracing::{debug, trace};

use crate::{Color, Piece, Position};

mod board;
mod fen;
mod movement;

pub use board::{Board, EnumeratePieces, MoveRecord};
pub use fen::FenError;
pub use movement::{
    BishopMove, KingMove, KnightMove, Mover, PawnMove, PieceMove, QueenMove, RookMove,
};

/// The squares a single piece may move to. No piece ever has more than 27.
pub type Targets = ArrayVec<[Position; 32]>;

/// What a call to [`Game::select_square`] did, so that a front end knows what to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// a move was played; the board changed and it is the other side's turn
    MoveCommitted,
    /// a piece was selected, another piece was selected instead, or the selection was dropped
    SelectionChanged,
    /// nothing changed
    NoOp,
}

/// Where the game currently is in its turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// waiting for the given color to pick one of its pieces
    AwaitingSelection(Color),
    /// the given color has picked the piece on the given square and may now choose its target
    PieceSelected(Color, Position),
    /// the given color has been checkmated; only [`Game::reset`] continues from here
    Checkmate(Color),
}

/// The situation of the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// nothing special is going on
    Ongoing,
    /// the given color is in check, but can get out of it
    Check(Color),
    /// the given color is in check and has no legal move left
    Checkmate(Color),
}

/// Reasons for [`Game::try_make_move`] to refuse a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// there is nothing to move on the starting square
    #[error("there is no piece on {0}")]
    NoPiece(Position),
    /// the piece on the starting square belongs to the side that is waiting
    #[error("the piece on {square} belongs to {owner}, but it is {to_move}'s turn")]
    NotYourTurn {
        /// the starting square
        square: Position,
        /// the color of the piece on it
        owner: Color,
        /// whose turn it is
        to_move: Color,
    },
    /// the piece does not move like that, or the way is blocked
    #[error("{piece} cannot move from {from} to {to}")]
    Illegal {
        /// the piece that was asked to move
        piece: Piece,
        /// the starting square
        from: Position,
        /// the target square
        to: Position,
    },
    /// after the move, the own king could be captured
    #[error("moving from {from} to {to} would leave the {color} king in check")]
    LeavesKingInCheck {
        /// the starting square
        from: Position,
        /// the target square
        to: Position,
        /// the side that attempted the move
        color: Color,
    },
    /// no more moves are accepted
    #[error("the game is over, {0} is checkmated")]
    GameOver(Color),
}

/// A game of chess between two players sharing one board.
///
/// ```
/// # use chess_rules::*;
/// let mut game = Game::new();
/// let e2 = "e2".parse().unwrap();
/// let e4 = "e4".parse().unwrap();
///
/// assert_eq!(game.select_square(e2), Transition::SelectionChanged);
/// assert_eq!(game.select_square(e4), Transition::MoveCommitted);
/// assert_eq!(game.to_move(), Color::Black);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    /// Which color is next to move
    to_move: Color,
    /// the square picked by the side to move. Always holds one of its pieces.
    selected: Option<Position>,
    /// the color that has been checkmated, if any
    mated: Option<Color>,
    last_move: Option<MoveRecord>,
}

impl Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = match self.to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        write!(f, "{} {side}", self.board)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game in the standard starting position, White to move.
    pub fn new() -> Self {
        Game {
            board: Board::new(),
            to_move: Color::White,
            selected: None,
            mated: None,
            last_move: None,
        }
    }

    /// Continues a game from an arbitrary position. The board must hold one king per color.
    fn with_position(board: Board, to_move: Color) -> Self {
        let mut game = Game {
            board,
            to_move,
            selected: None,
            mated: None,
            last_move: None,
        };
        if game.is_checkmate(to_move) {
            game.mated = Some(to_move);
        }
        game
    }

    /// Starts over from the standard starting position, whatever state the game is in.
    pub fn reset(&mut self) {
        debug!("resetting the game");
        *self = Self::new();
    }

    /// the board the game is played on
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// the piece on `pos`, if any
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.board[pos]
    }

    /// whose turn it is
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    /// the square the side to move has picked, if any
    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// the last move that was played, if any
    pub fn last_move(&self) -> Option<MoveRecord> {
        self.last_move
    }

    /// where the game is in its turn cycle
    pub fn state(&self) -> GameState {
        match (self.mated, self.selected) {
            (Some(color), _) => GameState::Checkmate(color),
            (None, Some(pos)) => GameState::PieceSelected(self.to_move, pos),
            (None, None) => GameState::AwaitingSelection(self.to_move),
        }
    }

    /// check and checkmate of the side to move
    pub fn status(&self) -> Status {
        if let Some(color) = self.mated {
            Status::Checkmate(color)
        } else if self.is_in_check(self.to_move) {
            Status::Check(self.to_move)
        } else {
            Status::Ongoing
        }
    }

    /// where the king of `color` stands
    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.board.king_position(color)
    }

    /// Whether some opposing piece could capture the king of `color` right now.
    ///
    /// ```
    /// # use chess_rules::*;
    /// let game: Game = "4k3/8/8/8/8/8/8/r3K3 w".parse().unwrap();
    /// assert!(game.is_in_check(Color::White));
    /// assert!(!game.is_in_check(Color::Black));
    /// ```
    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(&self.board, color)
    }

    /// Whether `color` is in check and no move of any of its pieces gets it out of it.
    pub fn is_checkmate(&self, color: Color) -> bool {
        is_in_check(&self.board, color) && !has_legal_move(&self.board, color)
    }

    /// The squares the piece on `pos` may move to without leaving its own king in check.
    ///
    /// Empty if the square is empty, the piece on it belongs to the side that is waiting, or the
    /// game is over.
    ///
    /// ```
    /// # use chess_rules::*;
    /// let game = Game::new();
    /// let moves = game.legal_moves("b1".parse().unwrap());
    /// assert_eq!(moves.len(), 2);
    /// assert!(game.legal_moves("b8".parse().unwrap()).is_empty());
    /// ```
    pub fn legal_moves(&self, pos: Position) -> Targets {
        match self.board[pos] {
            Some(piece) if piece.color() == self.to_move && self.mated.is_none() => {
                legal_moves(&self.board, pos, piece)
            }
            _ => Targets::default(),
        }
    }

    /// Plays the piece on `from` to `to`, if the side to move may do so.
    ///
    /// On success the turn passes to the other side, any selection is dropped and check and
    /// checkmate are evaluated for the side now to move. On failure nothing changes.
    pub fn try_make_move(
        &mut self,
        from: Position,
        to: Position,
    ) -> Result<MoveRecord, MoveError> {
        let result = self.make_move(from, to);
        match &result {
            Ok(record) => debug!(%record, "move committed"),
            Err(err) => debug!(%err, "move rejected"),
        }
        result
    }

    fn make_move(&mut self, from: Position, to: Position) -> Result<MoveRecord, MoveError> {
        if let Some(color) = self.mated {
            return Err(MoveError::GameOver(color));
        }
        let piece = self.board[from].ok_or(MoveError::NoPiece(from))?;
        if piece.color() != self.to_move {
            return Err(MoveError::NotYourTurn {
                square: from,
                owner: piece.color(),
                to_move: self.to_move,
            });
        }
        let record = self
            .board
            .move_piece(from, to)
            .ok_or(MoveError::Illegal { piece, from, to })?;

        if is_in_check(&self.board, self.to_move) {
            self.board.unmake_move(record);
            return Err(MoveError::LeavesKingInCheck {
                from,
                to,
                color: self.to_move,
            });
        }

        self.selected = None;
        self.last_move = Some(record);
        self.to_move.flip();

        if self.is_checkmate(self.to_move) {
            debug!(color = %self.to_move, "checkmate");
            self.mated = Some(self.to_move);
        } else if self.is_in_check(self.to_move) {
            debug!(color = %self.to_move, "check");
        }

        Ok(record)
    }

    /// Feeds a square chosen by the side to move into the game.
    ///
    /// - without a selection, choosing one of the own pieces selects it
    /// - with a selection, choosing a square the selected piece may legally go to plays the move
    /// - with a selection, choosing another own piece selects that one instead
    /// - anything else drops the selection
    ///
    /// Once the game is over, nothing happens until the game is [`reset`](Game::reset).
    pub fn select_square(&mut self, pos: Position) -> Transition {
        if self.mated.is_some() {
            trace!(%pos, "game is over, ignoring square");
            return Transition::NoOp;
        }

        let own_piece = matches!(self.board[pos], Some(piece) if piece.color() == self.to_move);

        let Some(selected) = self.selected else {
            if own_piece {
                trace!(%pos, "selected");
                self.selected = Some(pos);
                return Transition::SelectionChanged;
            }
            return Transition::NoOp;
        };

        if selected == pos {
            return Transition::NoOp;
        }

        if own_piece {
            trace!(from = %selected, to = %pos, "selection replaced");
            self.selected = Some(pos);
            return Transition::SelectionChanged;
        }

        if self.legal_moves(selected).contains(&pos) && self.try_make_move(selected, pos).is_ok() {
            return Transition::MoveCommitted;
        }

        trace!(%selected, "selection cancelled");
        self.selected = None;
        Transition::SelectionChanged
    }
}

/// Whether any piece of the other color attacks the king of `color`.
fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_position(color) else {
        return false;
    };
    board
        .pieces_of(color.other())
        .any(|(from, piece)| piece.is_legal_move(from, king, board))
}

/// Plays `from`-`to` on the scratch board, looks whether the king of `color` is attacked and takes
/// the move back.
fn leaves_king_in_check(
    scratch: &mut Board,
    from: Position,
    to: Position,
    color: Color,
) -> bool {
    let record = scratch.relocate(from, to);
    let in_check = is_in_check(scratch, color);
    scratch.unmake_move(record);
    in_check
}

/// The legal moves of `piece` on `pos`, regardless of whose turn it is.
fn legal_moves(board: &Board, pos: Position, piece: Piece) -> Targets {
    let mut scratch = board.clone();
    PieceMove::new_with_piece(pos, board, piece)
        .filter(|&to| !leaves_king_in_check(&mut scratch, pos, to, piece.color()))
        .collect()
}

/// Whether `color` has at least one legal move. Stops at the first one found.
fn has_legal_move(board: &Board, color: Color) -> bool {
    let mut scratch = board.clone();
    board.pieces_of(color).any(|(from, piece)| {
        PieceMove::new_with_piece(from, board, piece)
            .any(|to| !leaves_king_in_check(&mut scratch, from, to, color))
    })
}
