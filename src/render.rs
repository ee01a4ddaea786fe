use std::fmt::Display;

use chess_rules::{Game, Position};
use itertools::Itertools;

/// Draws the board of a game for the terminal, White at the bottom.
///
/// The selected piece is put in brackets, the squares it may go to are marked with `*` when empty
/// and put in parentheses when there is something to capture.
pub struct BoardView<'a> {
    game: &'a Game,
    ascii: bool,
}

impl<'a> BoardView<'a> {
    pub fn new(game: &'a Game, ascii: bool) -> Self {
        Self { game, ascii }
    }

    fn cell(&self, pos: Position, targets: &[Position]) -> String {
        let glyph = match self.game.piece_at(pos) {
            Some(piece) if self.ascii => piece.to_string(),
            Some(piece) => piece.symbol().to_string(),
            None if targets.contains(&pos) => "*".to_owned(),
            None => ".".to_owned(),
        };
        if self.game.selected() == Some(pos) {
            format!("[{glyph}]")
        } else if targets.contains(&pos) && self.game.piece_at(pos).is_some() {
            format!("({glyph})")
        } else {
            format!(" {glyph} ")
        }
    }
}

impl Display for BoardView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let targets = self
            .game
            .selected()
            .map(|pos| self.game.legal_moves(pos))
            .unwrap_or_default();

        for row in 0..8 {
            let line = format!(
                "{} {}",
                8 - row,
                (0..8)
                    .map(|col| self.cell(Position::new(row, col), &targets))
                    .format("")
            );
            writeln!(f, "{}", line.trim_end())?;
        }
        let files = format!("  {}", ('a'..='h').map(|c| format!(" {c} ")).format(""));
        write!(f, "{}", files.trim_end())
    }
}
