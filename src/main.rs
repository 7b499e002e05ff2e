//! Two-Phase Cube Solver
//!
//! Solves 3x3x3 Rubik's Cube positions given as 54-letter facelet strings.
//! Move and pruning tables are generated on first use and cached on disk,
//! so later runs start solving immediately.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use twophase::{
    cache, cubie, facelet, solve, tables, verify, SolveOptions, SolveOutcome,
};

/// Solves Rubik's Cube positions with the two-phase algorithm.
#[derive(Parser)]
#[command(name = "twophase")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding the cached move and pruning tables.
    #[arg(long, default_value = cache::DEFAULT_DIR, global = true)]
    tables_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a facelet string and print the maneuver.
    Solve {
        /// 54 facelets in URFDLB order, e.g. the solved cube is
        /// UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB.
        facelets: String,
        /// Upper bound on the solution length.
        #[arg(long, default_value_t = 22)]
        max_depth: u8,
        /// Search time budget in milliseconds.
        #[arg(long, default_value_t = 6000)]
        timeout_ms: u64,
        /// Print a '.' between the phase-1 and phase-2 moves.
        #[arg(long)]
        separator: bool,
    },
    /// Check a facelet string without solving it.
    Verify {
        facelets: String,
    },
    /// Print random solvable facelet strings.
    Random {
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Generate the tables and write them to the cache directory.
    Tables,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Solve {
            facelets,
            max_depth,
            timeout_ms,
            separator,
        } => run_solve(&cli.tables_dir, &facelets, max_depth, timeout_ms, separator),
        Command::Verify { facelets } => run_verify(&facelets),
        Command::Random { count } => run_random(count),
        Command::Tables => run_tables(&cli.tables_dir),
    }
}

fn run_solve(
    tables_dir: &std::path::Path,
    facelets: &str,
    max_depth: u8,
    timeout_ms: u64,
    separator: bool,
) -> ExitCode {
    let tables = match tables::Tables::load_or_generate(tables_dir) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("Failed to build tables: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let options = SolveOptions {
        max_depth,
        timeout: Duration::from_millis(timeout_ms),
        use_separator: separator,
    };

    match solve(facelets, &tables, &options) {
        Ok(SolveOutcome::Solved(solution)) => {
            if options.use_separator {
                println!("{}", solution.separated_string());
            } else {
                println!("{}", solution);
            }
            eprintln!("{}", solution.diagnostics());
            ExitCode::SUCCESS
        }
        Ok(SolveOutcome::NoSolutionWithinBudget) => {
            eprintln!("No solution within {} moves. Raise --max-depth.", max_depth);
            ExitCode::FAILURE
        }
        Ok(SolveOutcome::Timeout) => {
            eprintln!("Search timed out after {} ms. Raise --timeout-ms.", timeout_ms);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Invalid cube: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_verify(facelets: &str) -> ExitCode {
    match verify(facelets) {
        Ok(_) => {
            println!("OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid cube: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_random(count: usize) -> ExitCode {
    let mut rng = rand::rng();
    for _ in 0..count {
        let cube = cubie::random_cube(&mut rng);
        println!("{}", facelet::FaceCube::from(&cube));
    }
    ExitCode::SUCCESS
}

fn run_tables(tables_dir: &std::path::Path) -> ExitCode {
    let tables = match tables::Tables::generate() {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("Failed to build tables: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match tables.save(tables_dir) {
        Ok(()) => {
            println!("Wrote tables to {}", tables_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write tables: {}", e);
            ExitCode::FAILURE
        }
    }
}
