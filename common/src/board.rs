use crate::{Point, grid_points};
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;
use std::fmt;

/// The hidden puzzle: a grid with mines placed on it.
///
/// The player never looks inside; it only learns the adjacent mine count of
/// each cell it reveals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub height: usize,
    pub width: usize,
    /// Where the mines are.
    mines: BTreeSet<Point>,
    /// Mines the player has flagged so far.
    mines_found: BTreeSet<Point>,
}

impl Board {
    /// Places `total_mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        total_mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            total_mines < height * width,
            "total mines must be less than the number of cells on the board"
        );
        let mines = grid_points(height, width).choose_multiple(rng, total_mines);
        Self::with_mines(height, width, mines)
    }

    /// Builds a board with mines at fixed places.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> anyhow::Result<Self> {
        let mines: BTreeSet<Point> = mines.into_iter().collect();
        if let Some(outside) = mines.iter().find(|p| !p.in_bounds(height, width)) {
            anyhow::bail!("mine {outside} is outside the {height}x{width} board");
        }
        Ok(Board {
            height,
            width,
            mines,
            mines_found: BTreeSet::new(),
        })
    }

    pub fn total_mines(&self) -> usize {
        self.mines.len()
    }

    pub fn mines(&self) -> &BTreeSet<Point> {
        &self.mines
    }

    /// How many cells hold no mine.
    pub fn safe_cells(&self) -> usize {
        self.height * self.width - self.mines.len()
    }

    pub fn is_mine(&self, cell: Point) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines within one row and column of `cell`, not counting `cell`.
    pub fn nearby_mines(&self, cell: Point) -> u8 {
        cell.neighbors(self.height, self.width)
            .filter(|n| self.mines.contains(n))
            .count() as u8
    }

    /// Records that the player has identified `cell` as a mine.
    pub fn flag(&mut self, cell: Point) {
        self.mines_found.insert(cell);
    }

    pub fn mines_found(&self) -> &BTreeSet<Point> {
        &self.mines_found
    }

    /// The game is won once every mine, and nothing else, has been flagged.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }
}

/// Shows where the mines are: `X` for a mine, blank otherwise.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = format!("{}-", "--".repeat(self.width));
        for row in 0..self.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.width {
                let mark = if self.is_mine(Point { row, col }) { "X" } else { " " };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_board_initialization() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::new(5, 6, 7, &mut rng).unwrap();
        assert_eq!(board.height, 5);
        assert_eq!(board.width, 6);
        assert_eq!(board.total_mines(), 7);
        assert_eq!(board.safe_cells(), 23);
        assert!(board.mines().iter().all(|p| p.in_bounds(5, 6)));
        assert!(board.mines_found().is_empty());
        assert!(!board.won());
    }

    #[test]
    fn test_board_too_many_mines() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Board::new(3, 3, 9, &mut rng).is_err());
    }

    #[test]
    fn test_board_placement_is_seeded() {
        let a = Board::new(8, 8, 10, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = Board::new(8, 8, 10, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_mines_rejects_out_of_bounds() {
        assert!(Board::with_mines(2, 2, [Point::new(2, 0)]).is_err());
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::with_mines(3, 3, [Point::new(0, 0), Point::new(2, 2)]).unwrap();
        assert_eq!(board.nearby_mines(Point::new(1, 1)), 2);
        assert_eq!(board.nearby_mines(Point::new(0, 1)), 1);
        assert_eq!(board.nearby_mines(Point::new(2, 0)), 0);
        // A mine does not count itself.
        assert_eq!(board.nearby_mines(Point::new(0, 0)), 0);
    }

    #[test]
    fn test_won_requires_exact_flags() {
        let mut board = Board::with_mines(2, 2, [Point::new(0, 0)]).unwrap();
        board.flag(Point::new(1, 1));
        assert!(!board.won());

        let mut board = Board::with_mines(2, 2, [Point::new(0, 0)]).unwrap();
        board.flag(Point::new(0, 0));
        assert!(board.won());
    }

    #[test]
    fn test_display() {
        let board = Board::with_mines(2, 2, [Point::new(0, 1)]).unwrap();
        assert_eq!(board.to_string(), "-----\n| |X|\n-----\n| | |\n-----\n");
    }
}
