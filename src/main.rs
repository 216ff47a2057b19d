//! Bricker entry point
//!
//! Runs rounds headless with the autopilot on the paddle, printing one JSON
//! summary line per finished round, and asks "play again?" in between.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;

use bricker::Settings;
use bricker::consts::SIM_DT;
use bricker::platform::{Prompt, ScriptedPrompt, StdinPrompt};
use bricker::sim::{GameState, RoundPhase, TickInput, tick};

#[derive(Parser, Debug)]
#[command(name = "bricker")]
#[command(about = "Brick-breaking round simulator with randomized brick effects")]
struct Cli {
    /// Brick grid rows (give together with COLS)
    #[arg(requires = "cols", value_parser = clap::value_parser!(u32).range(1..))]
    rows: Option<u32>,
    /// Brick grid columns
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    cols: Option<u32>,
    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Play this many rounds without prompting
    #[arg(long)]
    rounds: Option<u32>,
    /// Frames a single round may run before giving up
    #[arg(long, default_value_t = 36_000)]
    max_frames: u64,
    /// Print a JSON snapshot of each finished round
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let (Some(rows), Some(cols)) = (cli.rows, cli.cols) {
        settings.brick_rows = rows;
        settings.brick_cols = cols;
    }
    settings.validate().context("invalid brick grid")?;

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("Bricker starting with seed {}", seed);

    let mut prompt: Box<dyn Prompt> = match cli.rounds {
        Some(rounds) => Box::new(ScriptedPrompt::for_rounds(rounds)),
        None => Box::new(StdinPrompt),
    };

    let mut state = GameState::new(settings, seed);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    loop {
        let mut phase = RoundPhase::Playing;
        for _ in 0..cli.max_frames {
            phase = tick(&mut state, &input, SIM_DT);
            if phase != RoundPhase::Playing {
                break;
            }
        }

        println!("{}", serde_json::to_string(&state.summary())?);
        if cli.dump {
            println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
        }

        if phase == RoundPhase::Playing {
            log::warn!(
                "Round {} still running after {} frames, stopping",
                state.round,
                cli.max_frames
            );
            return Ok(());
        }

        if !state.resolve_round_end(prompt.as_mut()) {
            return Ok(());
        }
    }
}
