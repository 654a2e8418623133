//! # Lunar Practitioner Application Entry Point
//!
//! This binary is a thin terminal front end over the core library: it reads
//! the configuration, resolves the observer location and instant, calls the
//! engines and prints the result as text or JSON.
//!
//! Logs go to stderr (filter with `RUST_LOG`, default `info`) so stdout only
//! carries the report.

// Test modules
#[cfg(test)]
mod tests;

mod report;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use lunar_core_lib::audio::ToneEngine;
use lunar_core_lib::calendar::compute_calendar_window;
use lunar_core_lib::canvas::GrayCanvas;
use lunar_core_lib::config::Config;
use lunar_core_lib::ephemeris::{compute_moon_state, next_phase_transition};
use lunar_core_lib::renderer::{draw_ascii, draw_moon, draw_moon_mono, ShadingOptions};
use lunar_core_lib::zodiac::ZodiacLocator;
use lunar_core_lib::Location;
use report::Snapshot;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "lunar-practitioner",
    version,
    about = "Moon phase, zodiac and session guidance for sound practitioners"
)]
struct Cli {
    /// Latitude in degrees north (overrides the config file)
    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Longitude in degrees east (overrides the config file)
    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,
    /// Instant to evaluate, RFC 3339 (default: now)
    #[arg(long, global = true)]
    at: Option<DateTime<Utc>>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// Configuration file
    #[arg(long, global = true, default_value = lunar_core_lib::config::CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Phase, illumination, sky position and rise/set
    Now,
    /// Zodiac sign and ecliptic position
    Zodiac,
    /// Full session recommendation
    Session,
    /// Draw the moon disk
    Render {
        /// Disk radius in terminal rows
        #[arg(long)]
        radius: Option<u32>,
        /// Also write a grayscale PGM image
        #[arg(long)]
        pgm: Option<PathBuf>,
        /// Also write a monochrome PBM image
        #[arg(long)]
        pbm: Option<PathBuf>,
        /// Skip the soft terminator edge
        #[arg(long)]
        no_penumbra: bool,
    },
    /// Day-by-day calendar
    Calendar {
        /// First day (default: the day of --at)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Number of days
        #[arg(long)]
        days: Option<u32>,
    },
    /// When the phase changes next
    NextPhase,
    /// Re-print the session every poll interval
    Watch {
        /// Seconds between refreshes
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Synthesize the drone or a single tone to raw 32-bit float PCM
    Tone {
        /// Tone frequency; the drone is rendered when omitted
        #[arg(long)]
        hz: Option<f64>,
        /// Length in seconds
        #[arg(long, default_value_t = 10.0)]
        secs: f64,
        /// Output file (mono, little-endian f32)
        #[arg(long)]
        out: PathBuf,
    },
}

/// Resolved inputs shared by every subcommand.
struct Invocation {
    config: Config,
    location: Location,
    at: DateTime<Utc>,
    json: bool,
}

impl Invocation {
    fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load_from_path(&cli.config);
        let location = Location::new(
            cli.lat.unwrap_or(config.location.latitude),
            cli.lon.unwrap_or(config.location.longitude),
        )
        .context("invalid observer location")?;
        Ok(Self {
            config,
            location,
            at: cli.at.unwrap_or_else(Utc::now),
            json: cli.json,
        })
    }

    fn print<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let ctx = Invocation::resolve(&cli)?;
    debug!(
        "Observer at ({:.4}, {:.4}), instant {}",
        ctx.location.latitude, ctx.location.longitude, ctx.at
    );

    let locator = Arc::new(ZodiacLocator::new());

    match cli.command.clone().unwrap_or(Command::Now) {
        Command::Now => {
            let moon = compute_moon_state(ctx.location.latitude, ctx.location.longitude, ctx.at);
            ctx.print(&moon, report::moon_text)
        }
        Command::Zodiac => {
            let zodiac = locator.compute_zodiac_state(ctx.at).await?;
            ctx.print(&zodiac, report::zodiac_text)
        }
        Command::Session => {
            let snapshot = Snapshot::compute(locator.as_ref(), ctx.location, ctx.at).await?;
            ctx.print(&snapshot, report::snapshot_text)
        }
        Command::NextPhase => {
            let transition = next_phase_transition(ctx.at);
            ctx.print(&transition, report::transition_text)
        }
        Command::Render {
            radius,
            pgm,
            pbm,
            no_penumbra,
        } => render(&ctx, radius, pgm, pbm, no_penumbra),
        Command::Calendar { start, days } => {
            let start = start.unwrap_or_else(|| ctx.at.date_naive());
            let days = days.unwrap_or(ctx.config.calendar.days);
            let calendar = compute_calendar_window(
                locator,
                ctx.location.latitude,
                ctx.location.longitude,
                start,
                days,
                None,
            )
            .await;
            ctx.print(&calendar, |days| report::calendar_text(days))
        }
        Command::Watch { interval } => {
            let secs = interval.unwrap_or(ctx.config.session.poll_interval_secs);
            watch(&ctx, locator, secs).await
        }
        Command::Tone { hz, secs, out } => tone(&ctx, hz, secs, out),
    }
}

fn render(
    ctx: &Invocation,
    radius: Option<u32>,
    pgm: Option<PathBuf>,
    pbm: Option<PathBuf>,
    no_penumbra: bool,
) -> anyhow::Result<()> {
    let moon = compute_moon_state(ctx.location.latitude, ctx.location.longitude, ctx.at);
    let radius = radius.unwrap_or(ctx.config.display.moon_radius);

    if ctx.json {
        let path = lunar_core_lib::terminator::terminator_path(moon.phase, radius as f64);
        println!("{}", serde_json::to_string_pretty(&path)?);
    } else {
        println!("{}", draw_ascii(&moon, radius));
        println!(
            "{}  {:.1} % lit",
            moon.phase_name.display_name(),
            moon.illumination * 100.0
        );
    }

    let size = ctx.config.display.canvas_size.max(8);
    let disk_radius = size / 2 - 2;
    let center = Point::new(size as i32 / 2, size as i32 / 2);

    if let Some(path) = pgm {
        let options = ShadingOptions {
            penumbra: ctx.config.display.show_penumbra && !no_penumbra,
            ..ShadingOptions::default()
        };
        let mut canvas = GrayCanvas::new(size, size);
        draw_moon(&mut canvas, center, disk_radius, &moon, &options)?;
        std::fs::write(&path, canvas.to_pgm())
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    if let Some(path) = pbm {
        // leave room for the caption under the disk
        let mut canvas = GrayCanvas::new(size, size + 16);
        draw_moon_mono(
            &mut canvas.color_converted::<BinaryColor>(),
            center,
            disk_radius,
            &moon,
            Some(moon.phase_name.display_name()),
        )?;
        std::fs::write(&path, canvas.to_pbm(128))
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Poll forever, printing only the newest result.
///
/// Each tick starts a fresh computation; a result that arrives after a newer
/// tick has started is dropped.
async fn watch(ctx: &Invocation, locator: Arc<ZodiacLocator>, secs: u64) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel(4);
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    let mut generation: u64 = 0;
    info!("Watching every {} s, Ctrl-C to stop", secs.max(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                generation += 1;
                let tick = generation;
                let tx = tx.clone();
                let locator = Arc::clone(&locator);
                let location = ctx.location;
                tokio::spawn(async move {
                    let result = Snapshot::compute(locator.as_ref(), location, Utc::now()).await;
                    // the receiver only goes away on shutdown
                    let _ = tx.send((tick, result)).await;
                });
            }
            Some((tick, result)) = rx.recv() => {
                if tick != generation {
                    debug!("Discarding stale result from tick {}", tick);
                    continue;
                }
                match result {
                    Ok(snapshot) => ctx.print(&snapshot, report::snapshot_text)?,
                    Err(e) => warn!("Refresh failed: {}", e),
                }
            }
        }
    }
}

fn tone(ctx: &Invocation, hz: Option<f64>, secs: f64, out: PathBuf) -> anyhow::Result<()> {
    let audio = &ctx.config.audio;
    let mut engine = ToneEngine::with_volume(audio.sample_rate, audio.volume);
    match hz {
        Some(hz) => engine.play_tone(hz),
        None => engine.start_drone(),
    }

    let total = (secs.max(0.0) * engine.sample_rate() as f64) as usize;
    let mut samples = vec![0.0f32; total];
    engine.render(&mut samples);

    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    std::fs::write(&out, bytes).with_context(|| format!("writing {}", out.display()))?;
    info!(
        "Wrote {} samples at {} Hz to {}",
        total,
        engine.sample_rate(),
        out.display()
    );
    Ok(())
}
