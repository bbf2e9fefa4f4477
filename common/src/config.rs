/// Settings for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
    /// Seed for mine placement and guesses. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            height: 8,
            width: 8,
            mines: 8,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.height > 0 && self.width > 0,
            "board must be at least 1x1, got {}x{}",
            self.height,
            self.width
        );
        anyhow::ensure!(
            self.mines < self.height * self.width,
            "{} mines do not fit on a {}x{} board",
            self.mines,
            self.height,
            self.width
        );
        Ok(())
    }

    /// The configured seed, or a fresh one.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
