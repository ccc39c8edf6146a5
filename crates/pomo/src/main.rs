//! pomo - Pomodoro timer for the terminal
//!
//! Usage:
//!   pomo [run]                          Interactive timer
//!   pomo status [--json]                Durations, completed count, preferences
//!   pomo adjust SEGMENT up|down [-n N]  Change a duration by whole steps
//!   pomo set SEGMENT MINUTES            Set a duration directly
//!   pomo reset                          Reset the completed counter
//!   pomo notifications on|off           Enable or disable alerts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pomo_core::{format, Config, Paths};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pomo::settings::{Defaults, Direction, Settings};
use pomo::store::JsonFileStore;
use pomo::Segment;

/// pomo - Pomodoro timer for the terminal
#[derive(Parser)]
#[command(name = "pomo")]
#[command(about = "Pomodoro timer with persistent durations and session counts")]
#[command(version)]
#[command(after_help = r#"SEGMENTS:
    focus         25 min by default
    short         5 min by default, after each focus segment
    long          15 min by default, after every 4th focus segment

KEYS (interactive):
    space, enter  Start / pause / resume
    f / s / l     Pick focus, short or long for + / -
    + / -         Lengthen / shorten the picked segment (default: current) by one step
    r             Reset the completed count
    n             Toggle notifications
    q, esc        Quit

EXAMPLES:
    pomo                        # Start the interactive timer
    pomo adjust focus down -n 5 # Focus 5 minutes shorter
    pomo set long 20            # 20 minute long breaks
    pomo notifications off      # Silence segment-end alerts
    pomo reset                  # Start counting from zero

FILES:
    Settings live in <data dir>/pomo/settings.json
    Config lives in <config dir>/pomo/config.json
"#)]
struct Cli {
    /// Config file (default: <config dir>/pomo/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Settings directory (default: <data dir>/pomo)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive timer
    #[command(alias = "start")]
    Run,

    /// Show durations, completed count and preferences
    #[command(alias = "st")]
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lengthen or shorten a segment by whole steps
    Adjust {
        /// focus, short or long
        #[arg(value_parser = parse_segment)]
        segment: Segment,

        direction: AdjustDirection,

        /// Number of steps
        #[arg(short = 'n', long, default_value = "1")]
        times: u32,
    },

    /// Set a segment duration in minutes (at least one step)
    Set {
        /// focus, short or long
        #[arg(value_parser = parse_segment)]
        segment: Segment,

        minutes: u64,
    },

    /// Reset the completed focus segment count
    Reset,

    /// Turn segment-end alerts on or off
    Notifications { state: Toggle },
}

#[derive(Clone, Copy, ValueEnum)]
enum AdjustDirection {
    Up,
    Down,
}

impl From<AdjustDirection> for Direction {
    fn from(d: AdjustDirection) -> Self {
        match d {
            AdjustDirection::Up => Direction::Up,
            AdjustDirection::Down => Direction::Down,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn parse_segment(s: &str) -> Result<Segment, String> {
    Segment::parse(s)
        .ok_or_else(|| format!("unknown segment '{}' (expected focus, short or long)", s))
}

#[derive(Serialize)]
struct SegmentReport {
    segment: Segment,
    seconds: u64,
}

#[derive(Serialize)]
struct StatusReport {
    segments: Vec<SegmentReport>,
    completed: u64,
    notifications: bool,
    step_seconds: u64,
    long_break_every: u64,
    settings_file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config_path = cli.config.unwrap_or_else(|| paths.config_file());
    let config = Config::load(&config_path)?;

    let settings_path = match cli.data_dir {
        Some(dir) => dir.join("settings.json"),
        None => paths.settings_file(),
    };
    let store = JsonFileStore::open(&settings_path)
        .with_context(|| format!("Failed to open settings: {}", settings_path.display()))?;
    let mut settings = Settings::new(store, Defaults::from(&config));

    match cli.command {
        None | Some(Commands::Run) => cmd_run(settings, &config),
        Some(Commands::Status { json }) => cmd_status(&settings, &config, json),
        Some(Commands::Adjust {
            segment,
            direction,
            times,
        }) => cmd_adjust(&mut settings, segment, direction.into(), times),
        Some(Commands::Set { segment, minutes }) => cmd_set(&mut settings, segment, minutes),
        Some(Commands::Reset) => cmd_reset(&mut settings),
        Some(Commands::Notifications { state }) => cmd_notifications(&mut settings, state),
    }
}

/// Interactive timer on a single-threaded runtime
fn cmd_run(settings: Settings<JsonFileStore>, config: &Config) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    rt.block_on(pomo::app::run(settings, config))
}

fn cmd_status(settings: &Settings<JsonFileStore>, config: &Config, json: bool) -> Result<()> {
    if json {
        let report = StatusReport {
            segments: Segment::ALL
                .iter()
                .map(|&segment| SegmentReport {
                    segment,
                    seconds: settings.duration(segment),
                })
                .collect(),
            completed: settings.completed_count(),
            notifications: settings.notifications_enabled(),
            step_seconds: settings.step(),
            long_break_every: config.long_break_every,
            settings_file: settings.store().path().to_path_buf(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Durations:");
    for segment in Segment::ALL {
        println!(
            "  {:<12} {}",
            segment.label(),
            format::duration(settings.duration(segment))
        );
    }
    println!();
    println!("Completed:     {}", settings.completed_count());
    println!(
        "Notifications: {}",
        if settings.notifications_enabled() { "on" } else { "off" }
    );
    println!(
        "Long break:    every {} focus segments",
        config.long_break_every
    );
    println!("Step:          {}", format::duration(settings.step()));
    println!("Settings:      {}", settings.store().path().display());

    Ok(())
}

fn cmd_adjust(
    settings: &mut Settings<JsonFileStore>,
    segment: Segment,
    direction: Direction,
    times: u32,
) -> Result<()> {
    let mut seconds = settings.duration(segment);
    for _ in 0..times {
        seconds = settings.adjust_duration(segment, direction);
    }
    println!("{}: {}", segment.label(), format::duration(seconds));
    Ok(())
}

fn cmd_set(settings: &mut Settings<JsonFileStore>, segment: Segment, minutes: u64) -> Result<()> {
    let seconds = settings.set_duration(segment, minutes.saturating_mul(60));
    println!("{}: {}", segment.label(), format::duration(seconds));
    Ok(())
}

fn cmd_reset(settings: &mut Settings<JsonFileStore>) -> Result<()> {
    let previous = settings.completed_count();
    settings.reset_completed_count();
    println!("Completed count reset (was {})", previous);
    Ok(())
}

fn cmd_notifications(settings: &mut Settings<JsonFileStore>, state: Toggle) -> Result<()> {
    let enabled = matches!(state, Toggle::On);
    settings.set_notifications_enabled(enabled);
    println!("Notifications {}", if enabled { "on" } else { "off" });
    Ok(())
}
