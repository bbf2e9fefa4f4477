use crate::{Contradiction, Point};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// For example, a revealed '1' with three hidden neighbours becomes
/// `{(0, 1), (1, 0), (1, 1)} = 1`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    /// The unresolved cells the statement is about.
    cells: BTreeSet<Point>,
    /// How many of `cells` are mines. Never exceeds `cells.len()`.
    count: usize,
}

impl Constraint {
    /// Builds a constraint, rejecting a count that cannot fit in the cells.
    pub fn new(
        cells: impl IntoIterator<Item = Point>,
        count: usize,
    ) -> Result<Self, Contradiction> {
        let cells: BTreeSet<Point> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(Contradiction::CountOutOfRange {
                cells: cells.len(),
                count: count as isize,
            });
        }
        Ok(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when there are exactly as many mines as cells.
    pub fn known_mines(&self) -> BTreeSet<Point> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the statement holds no mines.
    pub fn known_safes(&self) -> BTreeSet<Point> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell proven to be a mine, taking its mine out of the count.
    ///
    /// Returns whether the constraint changed. Absent cells are a no-op.
    pub fn mark_mine(&mut self, cell: Point) -> Result<bool, Contradiction> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        let Some(count) = self.count.checked_sub(1) else {
            return Err(Contradiction::CountOutOfRange {
                cells: self.cells.len() - 1,
                count: -1,
            });
        };
        self.cells.remove(&cell);
        self.count = count;
        Ok(true)
    }

    /// Removes a cell proven to be safe. The count is unchanged.
    ///
    /// Returns whether the constraint changed. Absent cells are a no-op.
    pub fn mark_safe(&mut self, cell: Point) -> Result<bool, Contradiction> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count >= self.cells.len() {
            return Err(Contradiction::CountOutOfRange {
                cells: self.cells.len() - 1,
                count: self.count as isize,
            });
        }
        self.cells.remove(&cell);
        Ok(true)
    }

    /// True when `self.cells` is a strict subset of `other.cells`.
    pub fn is_strict_subset_of(&self, other: &Constraint) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// Derives the statement about the cells `self` holds beyond `subset`.
    ///
    /// `subset` must be a strict subset of `self`.
    pub fn difference(&self, subset: &Constraint) -> Result<Constraint, Contradiction> {
        let cells: BTreeSet<Point> = self.cells.difference(&subset.cells).copied().collect();
        let Some(count) = self.count.checked_sub(subset.count) else {
            return Err(Contradiction::CountOutOfRange {
                cells: cells.len(),
                count: self.count as isize - subset.count as isize,
            });
        };
        Constraint::new(cells, count)
    }
}

/// Renders a cell set as `{(r, c), ...}`.
pub(crate) fn format_cells(cells: &BTreeSet<Point>) -> String {
    format!("{{{}}}", cells.iter().join(", "))
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", format_cells(&self.cells), self.count)
    }
}
