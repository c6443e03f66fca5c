//! Command-line interface for the tic-tac-toe runner.

use clap::{Parser, Subcommand};

/// Tic-tac-toe against a timer-driven opponent
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Headless tic-tac-toe against a timer-driven opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Override the automated mover's tick interval (milliseconds)
    #[arg(long, global = true)]
    pub tick_ms: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively: type `<row> <col>`, `clear`, `new`, `state` or `quit`
    Play,

    /// Let a scripted human play against the automated side
    Simulate {
        /// Number of rounds to play
        #[arg(short, long, default_value = "3")]
        rounds: u32,
    },
}
