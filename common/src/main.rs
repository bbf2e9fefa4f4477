use clap::Parser;
use minesweeper_ai::*;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Autonomous minesweeper bot: plays provably safe moves, guesses otherwise.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Board height in rows
    #[arg(long, default_value_t = GameConfig::default().height)]
    height: usize,

    /// Board width in columns
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: usize,

    /// Number of mines to place
    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: usize,

    /// Seed for mine placement and guesses
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, to make the game watchable
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Only print the result
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("minesweeper_ai=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = GameConfig {
        height: cli.height,
        width: cli.width,
        mines: cli.mines,
        seed: cli.seed,
    };

    // --- 1. Initialization ---
    let mut session = Session::new(&config)?;
    let delay = Duration::from_millis(cli.delay_ms);

    if !cli.quiet {
        println!("--- Autonomous Minesweeper Bot ---");
        println!("Strategy: Prioritize logically safe moves, guess randomly otherwise.");
        print!("{}", session.view());
    }

    // --- 2. Game Loop ---
    while let Some(turn) = session.step()? {
        if cli.quiet {
            continue;
        }
        println!("\n--- Move #{} ---", session.outcome().moves);
        match turn {
            Turn::Safe { cell, count } => {
                println!("Logic found a guaranteed safe cell: {cell} shows {count}.");
            }
            Turn::Guess { cell, count } => {
                println!("No logically safe move found. Guessed {cell}, it shows {count}.");
            }
            Turn::Exploded { cell } => {
                println!("Guessed {cell} and hit a mine.");
            }
        }
        print!("{}", session.view());
        thread::sleep(delay);
    }

    // --- 3. Final Result ---
    let outcome = session.outcome();
    println!("\n--- Game Over ---");
    match outcome.state {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The bot ran out of moves."),
    }
    println!(
        "Moves: {}, guesses: {}, seed: {}",
        outcome.moves,
        outcome.guesses,
        session.seed().unwrap_or_default()
    );
    if !cli.quiet {
        println!("Mines:");
        print!("{}", session.board());
    }
    Ok(())
}
