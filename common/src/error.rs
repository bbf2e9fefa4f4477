use crate::Point;
use thiserror::Error;

/// Internal inconsistency in the knowledge base.
///
/// Consistent board input never produces one of these. When one shows up,
/// some fact fed to the player disagrees with an earlier fact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Contradiction {
    #[error("cell {cell} is known to be both safe and a mine")]
    SafeAndMine { cell: Point },

    #[error("{count} mines cannot be placed among {cells} cells")]
    CountOutOfRange { cells: usize, count: isize },

    #[error("cells {cells} hold {first} mines and {second} mines at the same time")]
    ConflictingCounts {
        cells: String,
        first: usize,
        second: usize,
    },
}

/// Errors returned by [`crate::KnowledgeBase::add_knowledge`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeError {
    #[error("cell {cell} is outside the {height}x{width} grid")]
    OutOfBounds {
        cell: Point,
        height: usize,
        width: usize,
    },

    #[error("cell {cell} reports {count} adjacent mines, at most 8 are possible")]
    InvalidCount { cell: Point, count: u8 },

    #[error("cell {cell} has already been revealed")]
    AlreadyRevealed { cell: Point },

    #[error("contradiction: {0}")]
    Contradiction(#[from] Contradiction),
}

impl KnowledgeError {
    /// True for internal-consistency failures, false for caller errors.
    pub fn is_contradiction(&self) -> bool {
        matches!(self, KnowledgeError::Contradiction(_))
    }
}
