use clap::Parser;
use minesweeper::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

/// Autonomous minesweeper bot that plays by logical deduction.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board height
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Board width
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of mines
    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Seed for mine placement and guesses (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Delay between moves in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Cross-check the knowledge base with a SAT solver after every move
    #[arg(long)]
    audit: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.mines > args.height * args.width {
        anyhow::bail!(
            "{} mines do not fit on a {}x{} board",
            args.mines,
            args.height,
            args.width
        );
    }

    // --- 1. Initialization ---
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut session = Session::new(Game::new(args.height, args.width, args.mines, &mut rng));

    println!("--- Knowledge-Based Minesweeper Bot ---");
    println!("Strategy: Play cells proven safe, guess randomly otherwise.");
    print_board(&session.game);

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while session.game.game_state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match session.step(&mut rng)? {
            StepOutcome::Revealed { mv, count, report } => {
                match mv {
                    Move::Safe(cell) => println!("Bot reveals safe cell {} -> {}", cell, count),
                    Move::Guess(cell) => {
                        println!("No safe move known. Guessed {} -> {}", cell, count)
                    }
                }
                println!(
                    "Learned {} safe, {} mines, {} inferred sentences in {} passes.",
                    report.new_safes.len(),
                    report.new_mines.len(),
                    report.inferred,
                    report.passes
                );
            }
            StepOutcome::HitMine(cell) => println!("Bot guessed {} and hit a mine.", cell),
            StepOutcome::NoMoves => {
                println!("No valid moves left for the bot to make.");
                break;
            }
        }

        if args.audit {
            audit(&session)?;
        }

        print_board(&session.game);
        thread::sleep(Duration::from_millis(args.delay_ms));
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    println!(
        "Known safe: {}, known mines: {}, live sentences: {}",
        session.ai.known_safes().len(),
        session.ai.known_mines().len(),
        session.ai.constraints().len()
    );

    match session.game.game_state {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    Ok(())
}

fn audit(session: &Session) -> anyhow::Result<()> {
    let missed = oracle::missed_deductions(session.ai.knowledge())?;
    if missed.is_empty() {
        println!("Audit: knowledge base is consistent, nothing missed.");
        return Ok(());
    }
    for (cell, state) in missed {
        println!("Audit: {} is {:?} but the bot cannot tell yet.", cell, state);
    }
    Ok(())
}

fn print_board(game: &Game) {
    // Print header
    print!("   ");
    for col in 0..game.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(game.width));

    // Print rows
    for (row, tiles) in game.board.iter().enumerate() {
        print!("{:^2}|", row);
        for tile in tiles {
            let display = match tile {
                Tile::Hidden => " ■ ".to_string(),
                Tile::Flagged => " F ".to_string(),
                Tile::Revealed(n) => format!(" {} ", n),
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
