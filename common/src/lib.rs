//! An automated minesweeper player built on a knowledge base of constraints.
//!
//! After each move the board reports how many mines neighbour the revealed
//! cell. [`KnowledgeBase`] turns every such report into a [`Constraint`],
//! propagates known facts through all held constraints, and derives new
//! constraints from overlapping ones. Moves it returns from
//! [`KnowledgeBase::safe_move`] are provably mine-free.
//!
//! [`Board`] and [`Session`] are the surrounding game: a hidden grid of
//! mines and a loop that plays the knowledge base against it.

mod board;
mod config;
mod constraint;
mod error;
mod knowledge;
mod session;

pub use board::Board;
pub use config::GameConfig;
pub use constraint::Constraint;
pub use error::{Contradiction, KnowledgeError};
pub use knowledge::KnowledgeBase;
pub use session::{GameState, Outcome, PlayerView, Session, Turn};

use itertools::Itertools;
use std::fmt;

/// A cell coordinate on the board. Points order row-major.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }

    /// Whether the point lies on a `height` x `width` grid.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// All in-bounds points within one row and column, excluding `self`.
    /// Board edges and corners yield fewer than eight.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Point> {
        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let row = self.row as isize + dr;
                let col = self.col as isize + dc;

                if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                    Some(Point {
                        row: row as usize,
                        col: col as usize,
                    })
                } else {
                    None
                }
            })
        })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Every point of a `height` x `width` grid, row-major.
pub fn grid_points(height: usize, width: usize) -> impl Iterator<Item = Point> {
    (0..height)
        .cartesian_product(0..width)
        .map(|(row, col)| Point { row, col })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        // Corner cell should have 3 neighbours
        assert_eq!(Point::new(0, 0).neighbors(3, 3).count(), 3);

        // Center cell should have 8 neighbours
        let center: Vec<Point> = Point::new(1, 1).neighbors(3, 3).collect();
        assert_eq!(center.len(), 8);
        assert!(!center.contains(&Point::new(1, 1)));

        // Edge cell should have 5 neighbours
        assert_eq!(Point::new(0, 1).neighbors(3, 3).count(), 5);
    }

    #[test]
    fn test_neighbors_row_major() {
        let ns: Vec<Point> = Point::new(1, 1).neighbors(3, 3).collect();
        let mut sorted = ns.clone();
        sorted.sort();
        assert_eq!(ns, sorted);
    }

    #[test]
    fn test_point_order_is_row_major() {
        assert!(Point::new(0, 5) < Point::new(1, 0));
        assert!(Point::new(2, 1) < Point::new(2, 3));
    }

    #[test]
    fn test_grid_points() {
        let points: Vec<Point> = grid_points(2, 3).collect();
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], Point::new(0, 0));
        assert_eq!(points[3], Point::new(1, 0));
        assert!(points.iter().all(|p| p.in_bounds(2, 3)));
    }
}
