//! `huddle` CLI — find common free time and check bookings against a calendar file.
//!
//! ## Usage
//!
//! ```sh
//! # Every free 30-minute slot shared by participants 1 and 2
//! huddle free-slots -c calendar.json -p 1,2 --from 2026-03-16T08:00:00Z --to 2026-03-16T18:00:00Z
//!
//! # Earliest free hour, times read in the configured timezone
//! huddle first-slot -c calendar.json -p 1,2 --from 2026-03-16T09:00 --to 2026-03-16T17:00 -d 60
//!
//! # Merged busy timeline plus free slots
//! huddle busy -c calendar.json -p 1,2,3 --from 2026-03-16T08:00:00Z --to 2026-03-16T18:00:00Z
//!
//! # Would moving event 7 to 10:00-11:00 collide with anything? (exit code 2 if so)
//! huddle check -c calendar.json -p 1,2 --start 2026-03-16T10:00:00Z --end 2026-03-16T11:00:00Z --exclude 7
//! ```

mod config;
mod input;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use huddle_engine::{EventId, ParticipantId, ParticipantSet, TimeInterval};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Exit code of `check` when the candidate time is taken.
const EXIT_CONFLICT: i32 = 2;

#[derive(Parser)]
#[command(
    name = "huddle",
    version,
    about = "Group availability and booking conflict checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./huddle.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every free slot shared by the participants
    FreeSlots(WindowArgs),
    /// Print the earliest free slot shared by the participants (or null)
    FirstSlot(WindowArgs),
    /// Show the merged busy timeline and the free slots
    Busy(WindowArgs),
    /// Check a candidate event time for conflicts
    Check(CheckArgs),
}

#[derive(Args)]
struct WindowArgs {
    /// JSON calendar file
    #[arg(short, long)]
    calendar: String,
    /// Comma-separated participant ids
    #[arg(short, long, value_delimiter = ',')]
    participants: Vec<u64>,
    /// Window start (RFC 3339, or local time in the configured timezone)
    #[arg(long)]
    from: String,
    /// Window end (exclusive)
    #[arg(long)]
    to: String,
    /// Slot length in minutes (defaults to engine.default_slot_minutes)
    #[arg(short, long, allow_negative_numbers = true)]
    duration: Option<i64>,
}

#[derive(Args)]
struct CheckArgs {
    /// JSON calendar file
    #[arg(short, long)]
    calendar: String,
    /// Comma-separated participant ids
    #[arg(short, long, value_delimiter = ',')]
    participants: Vec<u64>,
    /// Candidate start
    #[arg(long)]
    start: String,
    /// Candidate end (exclusive)
    #[arg(long)]
    end: String,
    /// Event being edited; its own time is not a conflict
    #[arg(long)]
    exclude: Option<u64>,
}

#[derive(Serialize)]
struct ConflictDto {
    event_id: EventId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    overlap_minutes: i64,
}

#[derive(Serialize)]
struct CheckReport {
    conflict: bool,
    conflicts: Vec<ConflictDto>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config);

    let tz = config.timezone()?;
    match cli.command {
        Commands::FreeSlots(args) => {
            let window = Window::resolve(&args, &config, tz)?;
            let store = input::load_calendar(&args.calendar, tz)?;
            let slots = huddle_engine::find_free_slots(
                &window.participants,
                window.from,
                window.to,
                window.slot,
                &store,
            )
            .context("Failed to find free slots")?;
            print_json(&slots)?;
        }
        Commands::FirstSlot(args) => {
            let window = Window::resolve(&args, &config, tz)?;
            let store = input::load_calendar(&args.calendar, tz)?;
            let slot = huddle_engine::find_first_free_slot(
                &window.participants,
                window.from,
                window.to,
                window.slot,
                &store,
            )
            .context("Failed to find a free slot")?;
            print_json(&slot)?;
        }
        Commands::Busy(args) => {
            let window = Window::resolve(&args, &config, tz)?;
            let store = input::load_calendar(&args.calendar, tz)?;
            let report = huddle_engine::group_availability(
                &window.participants,
                window.from,
                window.to,
                window.slot,
                &store,
            )
            .context("Failed to compute availability")?;
            print_json(&report)?;
        }
        Commands::Check(args) => {
            let candidate = TimeInterval::new(
                input::parse_instant(&args.start, tz)?,
                input::parse_instant(&args.end, tz)?,
            )
            .context("Invalid candidate time")?;
            let participants = participant_set(&args.participants);
            let exclude = args.exclude.map(EventId);
            let store = input::load_calendar(&args.calendar, tz)?;

            let conflict = huddle_engine::has_conflict(&participants, &candidate, &store, exclude)
                .context("Failed to check for conflicts")?;
            let conflicts = if conflict {
                huddle_engine::find_conflicts(&participants, &candidate, &store, exclude)
                    .context("Failed to list conflicts")?
                    .into_iter()
                    .map(|c| ConflictDto {
                        event_id: c.commitment.event_id,
                        start: c.commitment.interval.start(),
                        end: c.commitment.interval.end(),
                        overlap_minutes: c.overlap.num_minutes(),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            print_json(&CheckReport {
                conflict,
                conflicts,
            })?;
            if conflict {
                process::exit(EXIT_CONFLICT);
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` beats the config.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parsed arguments shared by the window-based subcommands.
struct Window {
    participants: ParticipantSet,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    slot: Duration,
}

impl Window {
    fn resolve(args: &WindowArgs, config: &Config, tz: Tz) -> Result<Self> {
        let minutes = args.duration.unwrap_or(config.engine.default_slot_minutes);
        let slot = Duration::try_minutes(minutes)
            .with_context(|| format!("Slot duration out of range: {} minutes", minutes))?;
        Ok(Self {
            participants: participant_set(&args.participants),
            from: input::parse_instant(&args.from, tz)?,
            to: input::parse_instant(&args.to, tz)?,
            slot,
        })
    }
}

fn participant_set(ids: &[u64]) -> ParticipantSet {
    ids.iter().copied().map(ParticipantId).collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
