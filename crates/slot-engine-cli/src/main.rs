//! `slots` CLI — query a barber's availability from a JSON shop snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Bookable start times for a 30-minute cut
//! slots slots --snapshot shop.json --barber b1 --date 2026-03-16 --duration 30
//!
//! # Why is 10:15 rejected?
//! slots check --snapshot shop.json --barber b1 --date 2026-03-16 --time 10:15 --duration 30
//!
//! # Does the date have any slot at all?
//! slots day --snapshot shop.json --barber b1 --date 2026-03-20 --duration 30
//!
//! # Date picker: two weeks of open/closed flags (snapshot on stdin)
//! cat shop.json | slots range --barber b1 --from 2026-03-16 --days 14 --duration 45
//!
//! # First date with an opening in the next 30 days
//! slots next --snapshot shop.json --barber b1 --from 2026-03-16 --duration 60
//! ```
//!
//! Engine tunables come from `--config <file.json>`, then the environment
//! (`SLOTS_STEP_MINUTES`, `SLOTS_MAX_CONCURRENT_DAYS`, `SLOTS_HORIZON_DAYS`).
//! Logs go to stderr; set `RUST_LOG` or pass `--verbose`.

use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use slot_engine::{AvailabilityEngine, DateRange, EngineConfig, InMemorySource, Service, ShopSnapshot};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Barbershop availability from a JSON shop snapshot"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config file (JSON); missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Where the shop data comes from and whose calendar to read.
#[derive(Args)]
struct Target {
    /// Shop snapshot file (reads from stdin if omitted)
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
    /// Barber identifier
    #[arg(short, long)]
    barber: String,
}

#[derive(Args)]
struct ServiceArgs {
    /// Service length in minutes
    #[arg(long)]
    duration: i64,
    /// Service identifier, part of the cache key
    #[arg(long, default_value = "service")]
    service_id: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable start times for one date
    Slots {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        service: ServiceArgs,
        /// Date to query (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Validate one proposed start time and explain a rejection
    Check {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(long)]
        date: NaiveDate,
        /// Proposed start time (HH:MM)
        #[arg(long)]
        time: String,
    },
    /// Print whether a date has at least one bookable slot
    Day {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Map every date in a window to whether it has a bookable slot
    Range {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        service: ServiceArgs,
        /// First date of the window
        #[arg(long)]
        from: NaiveDate,
        /// Window length in days (defaults to the configured horizon)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Print the first date with a bookable slot, or null
    Next {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        service: ServiceArgs,
        #[arg(long)]
        from: NaiveDate,
        /// Search horizon in days (defaults to the configured horizon)
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "engine config");

    match cli.command {
        Commands::Slots {
            target,
            service,
            date,
        } => {
            let (engine, service) = build(&target, &service, config)?;
            let slots = engine
                .compute_available_slots(&target.barber, date, &service)
                .await
                .with_context(|| format!("Failed to compute slots for {}", date))?;
            println!("{}", serde_json::to_string(&slots)?);
        }
        Commands::Check {
            target,
            service,
            date,
            time,
        } => {
            let (engine, service) = build(&target, &service, config)?;
            let decision = engine
                .check_start_time(&target.barber, date, &time, &service)
                .await
                .with_context(|| format!("Failed to check {} on {}", time, date))?;
            println!("{}", serde_json::to_string(&decision)?);
        }
        Commands::Day {
            target,
            service,
            date,
        } => {
            let (engine, service) = build(&target, &service, config)?;
            let available = engine
                .is_date_available(&target.barber, date, &service)
                .await
                .with_context(|| format!("Failed to check {}", date))?;
            println!("{}", available);
        }
        Commands::Range {
            target,
            service,
            from,
            days,
        } => {
            let days = days.unwrap_or(config.default_horizon_days);
            let range = DateRange::starting(from, days).context("Invalid date window")?;
            let (engine, service) = build(&target, &service, config)?;
            let resolved = engine
                .resolve_availability_for_range(&target.barber, range, &service)
                .await
                .context("Failed to resolve date window")?;
            let by_date: serde_json::Map<String, serde_json::Value> = resolved
                .into_iter()
                .map(|(date, available)| (date.to_string(), available.into()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&by_date)?);
        }
        Commands::Next {
            target,
            service,
            from,
            days,
        } => {
            let (engine, service) = build(&target, &service, config)?;
            let first = engine
                .first_available_date(&target.barber, from, days, &service)
                .await
                .context("Failed to search for the next available date")?;
            println!("{}", serde_json::to_string(&first.map(|d| d.to_string()))?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("slot_engine=debug,slots=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .context("Failed to initialize tracing subscriber")?;
    Ok(())
}

/// Config file first, then environment overrides, then validation.
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Ok(val) = env::var("SLOTS_STEP_MINUTES") {
        config.step_minutes = val.parse().context("Failed to parse SLOTS_STEP_MINUTES")?;
    }
    if let Ok(val) = env::var("SLOTS_MAX_CONCURRENT_DAYS") {
        config.max_concurrent_days = val
            .parse()
            .context("Failed to parse SLOTS_MAX_CONCURRENT_DAYS")?;
    }
    if let Ok(val) = env::var("SLOTS_HORIZON_DAYS") {
        config.default_horizon_days = val.parse().context("Failed to parse SLOTS_HORIZON_DAYS")?;
    }

    config.validate().context("Invalid engine config")?;
    Ok(config)
}

fn build(
    target: &Target,
    service: &ServiceArgs,
    config: EngineConfig,
) -> Result<(AvailabilityEngine<InMemorySource>, Service)> {
    let json = read_input(target.snapshot.as_deref())?;
    let snapshot = ShopSnapshot::from_json(&json).context("Failed to parse shop snapshot")?;
    debug!(
        opening_hours = snapshot.opening_hours.len(),
        lunch_breaks = snapshot.lunch_breaks.len(),
        holidays = snapshot.holidays.len(),
        bookings = snapshot.bookings.len(),
        "loaded snapshot"
    );

    let service = Service::new(service.service_id.as_str(), service.duration).context("Invalid service")?;
    let engine = AvailabilityEngine::new(InMemorySource::new(snapshot), config)?;
    Ok((engine, service))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
