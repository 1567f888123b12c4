#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Skyfall progression engine headless.

mod autopilot;
mod config;
mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use autopilot::Autopilot;
use clap::{Parser, Subcommand};
use config::SessionConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use report::{ParameterLine, Report};
use skyfall_core::{
    Command, Event, Level, PlatformProfile, ProgressRecord, ProgressStore, TransitionChoice,
    MAX_LEVEL, WELCOME_BANNER,
};
use skyfall_storage::{FileStore, KeyValueProgressStore};
use skyfall_system_wave_parameters::compute_parameters;
use skyfall_world::{query, Config, Phase, ProgressionController};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Frames a single wave may take before the session is abandoned.
const MAX_FRAMES_PER_WAVE: u64 = 1_000_000;

/// Separates the autopilot's random stream from the engine's.
const AUTOPILOT_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Headless host for the Skyfall wave progression engine.
#[derive(Debug, Parser)]
#[command(name = "skyfall", version, about)]
struct Cli {
    /// TOML file with session settings.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Progress file, overriding the configured save path.
    #[arg(long, global = true, value_name = "PATH")]
    save: Option<PathBuf>,
    /// Balance waves for the mobile profile.
    #[arg(long, global = true)]
    mobile: bool,
    /// Width of the play field in world units.
    #[arg(long, global = true, value_name = "UNITS")]
    viewport_width: Option<f32>,
    /// Print machine-readable JSON lines instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Play waves with the autopilot, resuming from the saved level.
    Play {
        /// Number of waves to play before stopping.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        waves: u32,
        /// Seed for the engine and the autopilot.
        #[arg(long)]
        seed: Option<u64>,
        /// Probability that an autopilot bullet hits.
        #[arg(long)]
        accuracy: Option<f64>,
    },
    /// Print the wave parameters of every level.
    Params,
    /// Wipe saved campaign progress.
    Reset {
        /// Also forget the highest score.
        #[arg(long)]
        forget_highest: bool,
    },
}

/// Entry point for the Skyfall command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut session = SessionConfig::load(cli.config.as_deref())?;
    apply_overrides(&cli, &mut session);
    session.validate()?;

    match cli.command {
        CliCommand::Play { waves, .. } => play(&session, waves, cli.json),
        CliCommand::Params => print_parameters(&session.platform, cli.json),
        CliCommand::Reset { forget_highest } => reset(&session, forget_highest),
    }
}

fn apply_overrides(cli: &Cli, session: &mut SessionConfig) {
    if let Some(save) = &cli.save {
        session.save_path = save.clone();
    }
    if cli.mobile {
        session.platform.is_mobile = true;
    }
    if let Some(width) = cli.viewport_width {
        session.platform.viewport_width = width;
    }
    if let CliCommand::Play { seed, accuracy, .. } = cli.command {
        if let Some(seed) = seed {
            session.seed = seed;
        }
        if let Some(accuracy) = accuracy {
            session.autopilot.accuracy = accuracy;
        }
    }
}

fn open_store(session: &SessionConfig) -> Result<KeyValueProgressStore<FileStore>> {
    let file = FileStore::open(&session.save_path).with_context(|| {
        format!(
            "failed to open progress file {}",
            session.save_path.display()
        )
    })?;
    Ok(KeyValueProgressStore::new(file))
}

fn play(session: &SessionConfig, waves: u32, json: bool) -> Result<()> {
    if !json {
        println!("{WELCOME_BANNER}");
    }

    let mut controller = ProgressionController::new(
        Config::for_profile(session.platform),
        open_store(session)?,
        ChaCha8Rng::seed_from_u64(session.seed),
    );
    let mut autopilot = Autopilot::new(
        session.autopilot,
        ChaCha8Rng::seed_from_u64(session.seed ^ AUTOPILOT_STREAM),
    );
    let frame = session.frame();
    info!(
        level = query::record(&controller).current_level().get(),
        seed = session.seed,
        "session started"
    );

    let mut events = Vec::new();
    let mut waves_played = 0;
    let mut frames = 0;
    controller.begin_session(&mut events);

    loop {
        autopilot.observe(&events);
        for event in &events {
            if matches!(event, Event::WaveResolved { .. }) {
                waves_played += 1;
                frames = 0;
            }
            if let Some(report) = Report::from_event(event) {
                emit(&report, json)?;
            }
        }
        events.clear();

        let choice = match query::phase(&controller) {
            Phase::WaveActive => {
                frames += 1;
                if frames > MAX_FRAMES_PER_WAVE {
                    bail!("wave did not resolve within {MAX_FRAMES_PER_WAVE} frames");
                }
                let commands = autopilot.plan(frame);
                controller.frame(frame, commands, &mut events);
                continue;
            }
            Phase::Completed => break,
            _ if waves_played >= waves => break,
            Phase::LevelTransition(_) => TransitionChoice::Continue,
            Phase::FailureTransition(_) => TransitionChoice::Restart,
            phase @ (Phase::Idle | Phase::WaveResolving) => {
                bail!("controller stalled in {phase:?}")
            }
        };
        debug!(?choice, "autopilot chose");
        controller.apply(Command::Choose { choice }, &mut events);
    }

    let record = query::record(&controller);
    info!(
        waves_played,
        level = record.current_level().get(),
        total_score = record.total_score(),
        highest_score = record.highest_score(),
        "session finished"
    );
    Ok(())
}

fn emit(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn print_parameters(profile: &PlatformProfile, json: bool) -> Result<()> {
    let table: Vec<_> = (Level::FIRST.get()..=MAX_LEVEL.get())
        .filter_map(Level::try_new)
        .map(|level| compute_parameters(level, profile))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }
    for parameters in &table {
        println!(
            "level {:>2}: {}",
            parameters.level().get(),
            ParameterLine(parameters)
        );
    }
    Ok(())
}

fn reset(session: &SessionConfig, forget_highest: bool) -> Result<()> {
    let mut store = open_store(session)?;
    let mut record = store.load();
    if forget_highest {
        record = ProgressRecord::default();
    } else {
        record.reset_campaign();
    }
    store.commit(&record).with_context(|| {
        format!(
            "failed to write progress file {}",
            session.save_path.display()
        )
    })?;
    info!(
        path = %session.save_path.display(),
        highest_score = record.highest_score(),
        "progress reset"
    );
    Ok(())
}
