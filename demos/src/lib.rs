// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared chessboard layout for the drag-and-drop demos.
//!
//! The board is one node with 64 square children; a piece on a square is a
//! child of that square. Squares are 50×50 with a1 in the lower-left corner.

use kurbo::{Point, Rect};
use understory_dnd::backend::{NodeGeometry, NodeId};

/// Side length of a square.
pub const SQUARE_SIZE: f64 = 50.0;

/// The board node.
pub const BOARD: NodeId = NodeId(1);

/// A square, by file (`0` = a) and rank (`0` = 1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Parse algebraic notation such as `"c3"`.
    pub fn parse(name: &str) -> Option<Self> {
        let &[file, rank] = name.as_bytes() else {
            return None;
        };
        let file = file.checked_sub(b'a').filter(|f| *f < 8)?;
        let rank = rank.checked_sub(b'1').filter(|r| *r < 8)?;
        Some(Self { file, rank })
    }

    /// Algebraic name, such as `"c3"`.
    pub fn name(self) -> String {
        format!("{}{}", char::from(b'a' + self.file), self.rank + 1)
    }

    /// Whether a knight can move between the two squares.
    pub fn is_knight_move(self, to: Self) -> bool {
        let df = self.file.abs_diff(to.file);
        let dr = self.rank.abs_diff(to.rank);
        matches!((df, dr), (1, 2) | (2, 1))
    }

    /// All 64 squares, a1 first.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..64).map(Self::from_index)
    }

    /// The square node.
    pub fn node(self) -> NodeId {
        NodeId(100 + u64::from(self.file) * 8 + u64::from(self.rank))
    }

    /// The node of a piece standing on this square.
    pub fn piece_node(self) -> NodeId {
        NodeId(200 + u64::from(self.file) * 8 + u64::from(self.rank))
    }

    /// The square's client rect.
    pub fn rect(self) -> Rect {
        let x = f64::from(self.file) * SQUARE_SIZE;
        let y = f64::from(7 - self.rank) * SQUARE_SIZE;
        Rect::new(x, y, x + SQUARE_SIZE, y + SQUARE_SIZE)
    }

    /// The center of the square.
    pub fn center(self) -> Point {
        self.rect().center()
    }

    /// Root→target path to the square, or to a piece on it.
    pub fn path(self, with_piece: bool) -> Vec<NodeId> {
        let mut path = vec![BOARD, self.node()];
        if with_piece {
            path.push(self.piece_node());
        }
        path
    }

    fn from_index(index: u64) -> Self {
        Self {
            file: u8::try_from(index / 8).unwrap_or(0),
            rank: u8::try_from(index % 8).unwrap_or(0),
        }
    }
}

/// Geometry of the board; pieces fill their square.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChessLayout;

impl NodeGeometry for ChessLayout {
    fn client_rect(&self, node: NodeId) -> Option<Rect> {
        match node.0 {
            1 => Some(Rect::new(0.0, 0.0, 8.0 * SQUARE_SIZE, 8.0 * SQUARE_SIZE)),
            n @ 100..164 => Some(Square::from_index(n - 100).rect()),
            n @ 200..264 => Some(Square::from_index(n - 200).rect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_parse_and_lay_out() {
        let c3 = Square::parse("c3").unwrap();
        assert_eq!(c3.rect(), Rect::new(100.0, 250.0, 150.0, 300.0));
        assert_eq!(ChessLayout.client_rect(c3.piece_node()), Some(c3.rect()));
        assert_eq!(Square::parse("i1"), None);
        assert_eq!(Square::parse("a9"), None);
        assert_eq!(c3.name(), "c3");
        assert_eq!(Square::all().count(), 64);
        let b1 = Square::parse("b1").unwrap();
        assert!(b1.is_knight_move(c3));
        assert!(!b1.is_knight_move(Square::parse("b3").unwrap()));
    }
}
