use crate::constraint::format_cells;
use crate::{Constraint, Contradiction, KnowledgeError, Point, grid_points};
use itertools::Itertools;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// The player's knowledge about one game.
///
/// Facts only accumulate: `moves_made`, `safes` and `mines` never shrink, and
/// held constraints only lose cells or disappear. A cell is never in both
/// `safes` and `mines`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    height: usize,
    width: usize,
    /// Cells that have been revealed.
    moves_made: BTreeSet<Point>,
    /// Cells proven mine-free.
    safes: BTreeSet<Point>,
    /// Cells proven to be mines.
    mines: BTreeSet<Point>,
    /// Live constraints. Order is stable within a pass.
    knowledge: Vec<Constraint>,
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        KnowledgeBase {
            height,
            width,
            moves_made: BTreeSet::new(),
            safes: BTreeSet::new(),
            mines: BTreeSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &BTreeSet<Point> {
        &self.moves_made
    }

    pub fn safes(&self) -> &BTreeSet<Point> {
        &self.safes
    }

    pub fn mines(&self) -> &BTreeSet<Point> {
        &self.mines
    }

    pub fn knowledge(&self) -> &[Constraint] {
        &self.knowledge
    }

    /// Marks `cell` as a mine and removes it from every held constraint.
    ///
    /// Returns whether the fact was new. On a contradiction nothing changes.
    pub fn mark_mine(&mut self, cell: Point) -> Result<bool, Contradiction> {
        self.commit(|kb| kb.record_mine(cell))
    }

    /// Marks `cell` as safe and removes it from every held constraint.
    ///
    /// Returns whether the fact was new. On a contradiction nothing changes.
    pub fn mark_safe(&mut self, cell: Point) -> Result<bool, Contradiction> {
        self.commit(|kb| kb.record_safe(cell))
    }

    /// Ingests the report that the revealed `cell` has `count` adjacent mines.
    ///
    /// This function:
    /// 1. Records the move and marks the cell safe.
    /// 2. Adds a constraint over the cell's still-unresolved neighbours.
    /// 3. Runs the closure pass, prunes, and applies subset inference, until
    ///    inference derives nothing new.
    ///
    /// Invalid input is rejected before anything is touched. A contradiction
    /// discards the whole call, so the knowledge base keeps its prior state.
    pub fn add_knowledge(&mut self, cell: Point, count: u8) -> Result<(), KnowledgeError> {
        if !cell.in_bounds(self.height, self.width) {
            return Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        if count > 8 {
            return Err(KnowledgeError::InvalidCount { cell, count });
        }
        if self.moves_made.contains(&cell) {
            return Err(KnowledgeError::AlreadyRevealed { cell });
        }

        self.commit(|kb| kb.ingest(cell, count)).map_err(|err| {
            warn!(%cell, count, %err, "discarding contradictory knowledge");
            KnowledgeError::from(err)
        })
    }

    /// A revealed-safe cell that has not been played yet, lowest row-major first.
    pub fn safe_move(&self) -> Option<Point> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// Any unplayed cell not known to be a mine, chosen with `rng`.
    ///
    /// There is no safety proof behind this move.
    pub fn fallback_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        let candidates: Vec<Point> = grid_points(self.height, self.width)
            .filter(|p| !self.mines.contains(p) && !self.moves_made.contains(p))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Runs `f` against a copy and keeps the copy only if `f` succeeds.
    fn commit<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Contradiction>,
    ) -> Result<T, Contradiction> {
        let mut next = self.clone();
        let value = f(&mut next)?;
        *self = next;
        Ok(value)
    }

    fn record_mine(&mut self, cell: Point) -> Result<bool, Contradiction> {
        if self.safes.contains(&cell) {
            return Err(Contradiction::SafeAndMine { cell });
        }
        let learned = self.mines.insert(cell);
        for constraint in &mut self.knowledge {
            constraint.mark_mine(cell)?;
        }
        if learned {
            trace!(%cell, "marked mine");
        }
        Ok(learned)
    }

    fn record_safe(&mut self, cell: Point) -> Result<bool, Contradiction> {
        if self.mines.contains(&cell) {
            return Err(Contradiction::SafeAndMine { cell });
        }
        let learned = self.safes.insert(cell);
        for constraint in &mut self.knowledge {
            constraint.mark_safe(cell)?;
        }
        if learned {
            trace!(%cell, "marked safe");
        }
        Ok(learned)
    }

    fn ingest(&mut self, cell: Point, count: u8) -> Result<(), Contradiction> {
        self.moves_made.insert(cell);
        self.record_safe(cell)?;

        let constraint = self.neighborhood_constraint(cell, count)?;
        debug!(%cell, count, %constraint, "adding knowledge");
        self.knowledge.push(constraint);

        loop {
            self.close()?;
            self.prune()?;
            let derived = self.infer()?;
            if derived.is_empty() {
                return Ok(());
            }
            self.knowledge.extend(derived);
        }
    }

    /// The constraint a revealed `cell` contributes over its unresolved neighbours.
    ///
    /// Known mines are taken out of the count. Known safes (every played cell
    /// among them) are dropped with the count unchanged.
    fn neighborhood_constraint(
        &self,
        cell: Point,
        count: u8,
    ) -> Result<Constraint, Contradiction> {
        let mut remaining = count as isize;
        let mut cells = BTreeSet::new();

        for neighbor in cell.neighbors(self.height, self.width) {
            if self.mines.contains(&neighbor) {
                remaining -= 1;
            } else if !self.safes.contains(&neighbor) {
                cells.insert(neighbor);
            }
        }

        if remaining < 0 {
            return Err(Contradiction::CountOutOfRange {
                cells: cells.len(),
                count: remaining,
            });
        }
        Constraint::new(cells, remaining as usize)
    }

    /// Marks every cell any constraint settles, until a full scan settles none.
    ///
    /// Marking touches all constraints, so later constraints in the same scan
    /// already see the facts earlier ones produced.
    fn close(&mut self) -> Result<(), Contradiction> {
        loop {
            let mut learned = false;
            for i in 0..self.knowledge.len() {
                for mine in self.knowledge[i].known_mines() {
                    self.record_mine(mine)?;
                    learned = true;
                }
                for safe in self.knowledge[i].known_safes() {
                    self.record_safe(safe)?;
                    learned = true;
                }
            }
            if !learned {
                return Ok(());
            }
        }
    }

    /// Drops empty constraints and all but the first constraint over a cell set.
    fn prune(&mut self) -> Result<(), Contradiction> {
        let held = std::mem::take(&mut self.knowledge);
        let mut kept: Vec<Constraint> = Vec::with_capacity(held.len());

        for constraint in held {
            if constraint.is_empty() {
                continue;
            }
            let existing = kept
                .iter()
                .find(|k| k.cells() == constraint.cells())
                .map(Constraint::count);
            match existing {
                Some(first) if first != constraint.count() => {
                    return Err(Contradiction::ConflictingCounts {
                        cells: format_cells(constraint.cells()),
                        first,
                        second: constraint.count(),
                    });
                }
                Some(_) => {}
                None => kept.push(constraint),
            }
        }

        self.knowledge = kept;
        Ok(())
    }

    /// Derives `(big - small, big.count - small.count)` for every pair where
    /// one cell set strictly contains the other.
    ///
    /// Only constraints over cell sets not yet held are returned.
    fn infer(&self) -> Result<Vec<Constraint>, Contradiction> {
        let mut derived: Vec<Constraint> = Vec::new();

        for (a, b) in self.knowledge.iter().tuple_combinations() {
            let inferred = if a.is_strict_subset_of(b) {
                b.difference(a)?
            } else if b.is_strict_subset_of(a) {
                a.difference(b)?
            } else {
                continue;
            };

            let existing = self
                .knowledge
                .iter()
                .chain(&derived)
                .find(|c| c.cells() == inferred.cells())
                .map(Constraint::count);
            match existing {
                Some(first) if first != inferred.count() => {
                    return Err(Contradiction::ConflictingCounts {
                        cells: format_cells(inferred.cells()),
                        first,
                        second: inferred.count(),
                    });
                }
                Some(_) => {}
                None => {
                    debug!(constraint = %inferred, "inferred constraint");
                    derived.push(inferred);
                }
            }
        }

        Ok(derived)
    }
}
