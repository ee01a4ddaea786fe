#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod game;
mod piece;
mod position;

use std::fmt::Display;

pub use game::{Game, GameState, MoveError, Status, Transition};
pub use piece::{Piece, PieceKind};
pub use position::{InvalidPosition, Position};

/// short circuits if the value was [`Some`].
#[macro_export]
macro_rules! happy_try {
    ($x:expr) => {
        if let Some(tmp) = $x {
            return Some(tmp);
        }
    };
}

/// The two sides of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// The side playing the light colored pieces (the ones that start)
    #[default]
    White,
    /// The side playing the dark colored pieces
    Black,
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

impl Color {
    /// changes the inner value to the color that wasn't playing
    #[inline]
    pub fn flip(&mut self) {
        *self = self.other();
    }

    /// returns the opposing color
    #[inline]
    pub const fn other(&self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// returns the row on which the pieces of this color start out
    #[inline]
    pub const fn home_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// returns the row on which the pawns of this color start out
    #[inline]
    pub const fn pawn_row(&self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// the direction, in rows, in which the pawns of this color advance
    ///
    /// ```
    /// # use chess_rules::*;
    /// assert_eq!(Color::White.forward(), -1);
    /// assert_eq!(Color::Black.forward(), 1);
    /// ```
    #[inline]
    pub const fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }
}
