use crate::{Board, GameConfig, KnowledgeBase, Point};
use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// One move made by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// A provably safe cell was revealed.
    Safe { cell: Point, count: u8 },
    /// No safe cell was known; an unknown cell was revealed and held no mine.
    Guess { cell: Point, count: u8 },
    /// A guess hit a mine.
    Exploded { cell: Point },
}

/// How a finished game went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub state: GameState,
    pub moves: usize,
    pub guesses: usize,
}

/// One game of the knowledge-base player against a board.
pub struct Session {
    board: Board,
    player: KnowledgeBase,
    rng: StdRng,
    /// Seed behind the board and every guess, when the session made its own board.
    seed: Option<u64>,
    state: GameState,
    /// Revealed cells and their adjacent mine counts.
    revealed: BTreeMap<Point, u8>,
    moves: usize,
    guesses: usize,
}

impl Session {
    /// Starts a game on a freshly generated board.
    ///
    /// Uses `config.seed`, or a fresh one when unset. The same seed
    /// reproduces both the board and every guess.
    pub fn new(config: &GameConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let seed = config.seed_or_random();
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::new(config.height, config.width, config.mines, &mut rng)
            .context("failed to generate board")?;
        info!(seed, "generated board");
        Ok(Session {
            seed: Some(seed),
            ..Session::with_board(board, rng)
        })
    }

    /// Starts a game on a prepared board.
    pub fn with_board(board: Board, rng: StdRng) -> Self {
        let player = KnowledgeBase::new(board.height, board.width);
        Session {
            board,
            player,
            rng,
            seed: None,
            state: GameState::Playing,
            revealed: BTreeMap::new(),
            moves: 0,
            guesses: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> &KnowledgeBase {
        &self.player
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn revealed(&self) -> &BTreeMap<Point, u8> {
        &self.revealed
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            state: self.state,
            moves: self.moves,
            guesses: self.guesses,
        }
    }

    /// Makes one move: a safe one if the player knows any, a guess otherwise.
    ///
    /// Returns `None` once the game is over or no move is left.
    pub fn step(&mut self) -> anyhow::Result<Option<Turn>> {
        if self.state != GameState::Playing {
            return Ok(None);
        }

        let (cell, guessed) = match self.player.safe_move() {
            Some(cell) => (cell, false),
            None => match self.player.fallback_move(&mut self.rng) {
                Some(cell) => (cell, true),
                None => {
                    info!("no moves left");
                    return Ok(None);
                }
            },
        };
        self.moves += 1;
        if guessed {
            self.guesses += 1;
        }

        if self.board.is_mine(cell) {
            info!(%cell, moves = self.moves, "hit a mine");
            self.state = GameState::Lost;
            return Ok(Some(Turn::Exploded { cell }));
        }

        let count = self.board.nearby_mines(cell);
        self.player
            .add_knowledge(cell, count)
            .with_context(|| format!("player rejected the report for {cell}"))?;
        self.revealed.insert(cell, count);
        info!(%cell, count, guessed, "revealed cell");

        for &mine in self.player.mines() {
            self.board.flag(mine);
        }
        if self.board.won() || self.revealed.len() == self.board.safe_cells() {
            info!(moves = self.moves, guesses = self.guesses, "board cleared");
            self.state = GameState::Won;
        }

        Ok(Some(if guessed {
            Turn::Guess { cell, count }
        } else {
            Turn::Safe { cell, count }
        }))
    }

    /// Plays until the game ends.
    pub fn run(&mut self) -> anyhow::Result<Outcome> {
        while self.step()?.is_some() {}
        Ok(self.outcome())
    }

    /// The player's view of the board.
    pub fn view(&self) -> PlayerView<'_> {
        PlayerView { session: self }
    }
}

/// Renders what the player knows: numbers for revealed cells, `F` for known
/// mines, `■` for everything else.
pub struct PlayerView<'a> {
    session: &'a Session,
}

impl fmt::Display for PlayerView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Session {
            board,
            player,
            revealed,
            ..
        } = self.session;

        write!(f, "   ")?;
        for col in 0..board.width {
            write!(f, "{:^3}", col)?;
        }
        writeln!(f, "\n  +{}", "---".repeat(board.width))?;

        for row in 0..board.height {
            write!(f, "{:^2}|", row)?;
            for col in 0..board.width {
                let cell = Point { row, col };
                match revealed.get(&cell) {
                    Some(n) => write!(f, " {} ", n)?,
                    None if player.mines().contains(&cell) => write!(f, " F ")?,
                    None => write!(f, " ■ ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_moves_are_preferred() {
        let board = Board::with_mines(3, 3, [Point::new(2, 2)]).unwrap();
        let mut session = Session::with_board(board, StdRng::seed_from_u64(0));
        session.player.add_knowledge(Point::new(0, 0), 0).unwrap();

        let turn = session.step().unwrap();
        assert_eq!(
            turn,
            Some(Turn::Safe {
                cell: Point::new(0, 1),
                count: 0
            })
        );
        assert_eq!(session.outcome().guesses, 0);
    }

    #[test]
    fn test_mine_free_board_is_won_on_first_move() {
        let board = Board::with_mines(3, 3, Vec::<Point>::new()).unwrap();
        let mut session = Session::with_board(board, StdRng::seed_from_u64(5));

        let outcome = session.run().unwrap();
        assert_eq!(outcome.state, GameState::Won);
        assert_eq!(outcome.moves, 1);
        assert_eq!(session.step().unwrap(), None);
    }

    #[test]
    fn test_guessing_a_mine_loses() {
        // (0, 0) shows 1, which pins (0, 1). The only cell left to guess is
        // (0, 2), and it is a mine.
        let board = Board::with_mines(1, 3, [Point::new(0, 1), Point::new(0, 2)]).unwrap();
        let mut session = Session::with_board(board, StdRng::seed_from_u64(11));
        session.player.add_knowledge(Point::new(0, 0), 1).unwrap();
        assert!(session.player.mines().contains(&Point::new(0, 1)));

        let turn = session.step().unwrap();
        assert_eq!(
            turn,
            Some(Turn::Exploded {
                cell: Point::new(0, 2)
            })
        );
        assert_eq!(session.state(), GameState::Lost);
        assert_eq!(session.outcome().guesses, 1);
        assert_eq!(session.step().unwrap(), None);
    }

    #[test]
    fn test_seeded_games_are_sound() {
        for seed in 0..40 {
            let config = GameConfig {
                height: 8,
                width: 8,
                mines: 10,
                seed: Some(seed),
            };
            let mut session = Session::new(&config).unwrap();
            assert_eq!(session.seed(), Some(seed));
            while session.step().unwrap().is_some() {
                let player = session.player();
                let mines = session.board().mines();
                assert!(player.safes().is_disjoint(player.mines()));
                assert!(player.safes().is_disjoint(mines), "seed {seed}");
                assert!(player.mines().is_subset(mines), "seed {seed}");
            }
            assert_ne!(session.state(), GameState::Playing);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let config = GameConfig {
            seed: Some(17),
            ..GameConfig::default()
        };
        let a = Session::new(&config).unwrap().run().unwrap();
        let b = Session::new(&config).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unseeded_config_records_its_seed() {
        let session = Session::new(&GameConfig::default()).unwrap();
        assert!(session.seed().is_some());
    }

    #[test]
    fn test_view_marks_revealed_and_flagged() {
        let board = Board::with_mines(1, 3, [Point::new(0, 2)]).unwrap();
        let mut session = Session::with_board(board, StdRng::seed_from_u64(0));
        session.player.add_knowledge(Point::new(0, 0), 0).unwrap();
        session.revealed.insert(Point::new(0, 0), 0);
        session.step().unwrap();

        let view = session.view().to_string();
        assert_eq!(view, "    0  1  2 \n  +---------\n0 | 0  1  F \n");
    }
}
