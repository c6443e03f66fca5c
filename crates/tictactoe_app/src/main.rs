//! Tic-tac-toe runner
//!
//! Wires the move store, the task queue and the automated mover together
//! and drives them from stdin or from a scripted player.

#![warn(missing_docs)]

mod cli;
mod runtime;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use runtime::{GameRuntime, parse_position, scripted_choice};
use std::sync::Arc;
use tictactoe_core::{BoardEvent, BoardStateManager, GameConfig, Phase, Side};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Command::Play => run_play(config).await,
        Command::Simulate { rounds } => run_simulate(config, rounds).await,
    }
}

/// Builds the config from the optional file and command-line overrides.
#[instrument(skip_all)]
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let config = match &cli.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    let config = match cli.tick_ms {
        Some(ms) => config.with_tick_interval_ms(ms)?,
        None => config,
    };
    debug!(?config, "Configuration resolved");
    Ok(config)
}

/// Interactive play on stdin.
async fn run_play(config: GameConfig) -> Result<()> {
    let (runtime, mut frames) = GameRuntime::start(&config)?;
    let manager = Arc::clone(runtime.manager());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Enter `<row> <col>` (0-2 each), `clear`, `new`, `state` or `quit`.");
    runtime.bridge().post_render();

    loop {
        tokio::select! {
            Some(frame) = frames.recv() => {
                println!("\n{}", frame);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match line.trim() {
                    "" => {}
                    "quit" | "exit" => break,
                    "clear" => manager.clear_game(),
                    "new" => manager.new_game(),
                    "state" => {
                        println!("{}", serde_json::to_string_pretty(&manager.snapshot())?);
                    }
                    input => match parse_position(input) {
                        Some(position) => {
                            if let Err(e) = runtime.submit(position) {
                                debug!(error = %e, "Move rejected");
                            }
                        }
                        None => runtime
                            .bridge()
                            .post_message(Some(format!("Could not read `{}` as `<row> <col>`", input))),
                    },
                }
            }
        }
    }

    runtime.shutdown().await
}

/// A scripted human plays `rounds` rounds against the timer.
async fn run_simulate(config: GameConfig, rounds: u32) -> Result<()> {
    let (runtime, mut frames) = GameRuntime::start(&config)?;
    let manager = Arc::clone(runtime.manager());
    let mut events = manager.subscribe();

    info!(rounds, "Starting simulation");
    let play = |manager: &BoardStateManager| {
        let moves = manager.get_all_current_moves();
        if let Some(position) = scripted_choice(&moves)
            && let Err(e) = runtime.submit(position)
        {
            warn!(error = %e, %position, "Scripted move rejected");
        }
    };

    if rounds > 0 {
        play(&manager);
        while let Some(event) = events.recv().await {
            match event {
                BoardEvent::MoveStored(mv) if mv.side() == Side::Automated => play(&manager),
                BoardEvent::ScoreUpdated(scores) if manager.phase() == Phase::RoundOver => {
                    info!(%scores, "Round finished");
                    if scores.rounds() >= rounds {
                        break;
                    }
                    manager.clear_game();
                    play(&manager);
                }
                _ => {}
            }
            while let Ok(frame) = frames.try_recv() {
                println!("\n{}", frame);
            }
        }
    }

    runtime.shutdown().await?;
    while let Ok(frame) = frames.try_recv() {
        println!("\n{}", frame);
    }
    println!("\nFinal scores: {}", manager.scores());
    Ok(())
}
