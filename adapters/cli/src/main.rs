#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a wave manifest headlessly.

mod audio;
mod manifest;
mod overlay;
mod report;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    manifest::Chaining,
    session::{PauseWindow, Session, SessionSettings},
};

/// Runs a wave manifest against a simulated defender and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "horde", version, about)]
struct Cli {
    /// Path to the TOML wave manifest.
    #[arg(long, default_value = "assets/waves.toml")]
    manifest: PathBuf,
    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Enemies the defender kills per second.
    #[arg(long, default_value_t = 6.0)]
    kill_rate: f64,
    /// Seed for the defender's target selection.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Overrides the chaining policy declared by the manifest.
    #[arg(long, value_enum)]
    chaining: Option<Chaining>,
    /// Aborts the run after this many simulated seconds.
    #[arg(long, default_value_t = 600.0)]
    max_secs: f64,
    /// Logs the debug overlay while the run progresses.
    #[arg(long)]
    debug: bool,
    /// How often the debug overlay is logged, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    debug_every_ms: u64,
    /// Pauses the game after this many simulated seconds.
    #[arg(long, requires = "pause_for_secs")]
    pause_at_secs: Option<f64>,
    /// Length of the pause in simulated seconds.
    #[arg(long, requires = "pause_at_secs")]
    pause_for_secs: Option<f64>,
    /// Writes the JSON run report to this path instead of stdout.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Result<SessionSettings> {
        if self.tick_ms == 0 {
            bail!("--tick-ms must be greater than zero");
        }
        if !self.kill_rate.is_finite() || self.kill_rate < 0.0 {
            bail!("--kill-rate must be a finite, non-negative number");
        }

        let pause = match (self.pause_at_secs, self.pause_for_secs) {
            (Some(at), Some(length)) => Some(PauseWindow {
                at: seconds(at, "--pause-at-secs")?,
                length: seconds(length, "--pause-for-secs")?,
            }),
            _ => None,
        };

        Ok(SessionSettings {
            tick: Duration::from_millis(self.tick_ms),
            max_duration: seconds(self.max_secs, "--max-secs")?,
            kill_rate: self.kill_rate,
            seed: self.seed,
            overlay_every: self
                .debug
                .then(|| Duration::from_millis(self.debug_every_ms.max(self.tick_ms))),
            pause,
        })
    }
}

fn seconds(value: f64, flag: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{flag} must be a finite, non-negative number of seconds"))
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")
}

/// Entry point for the horde command-line interface.
fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let settings = cli.settings()?;

    let mut plan = manifest::load(&cli.manifest)?;
    if let Some(chaining) = cli.chaining {
        plan = plan.with_chaining(chaining);
    }
    info!(
        manifest = %cli.manifest.display(),
        waves = plan.waves.len(),
        "loaded wave manifest"
    );

    let report = Session::new(plan, settings).run()?;
    info!(
        outcome = ?report.outcome,
        cleared = report.cleared_waves(),
        total = report.waves.len(),
        "run ended"
    );
    report.write(cli.report.as_deref())
}
