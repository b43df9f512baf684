//! Post-run statistics.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use horde_core::{DirectorFault, RunOutcome, WaveIndex, WaveList};
use serde::Serialize;

/// Summary of a finished session, serialised as JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RunReport {
    pub(crate) outcome: RunOutcome,
    pub(crate) elapsed_secs: f64,
    pub(crate) enemies_spawned: u64,
    pub(crate) enemies_killed: u64,
    pub(crate) faults: Vec<DirectorFault>,
    pub(crate) waves: Vec<WaveReport>,
}

/// Per-wave line of a [`RunReport`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct WaveReport {
    pub(crate) index: WaveIndex,
    pub(crate) enemies: u32,
    pub(crate) finished: bool,
    pub(crate) time_secs: Option<f64>,
}

impl RunReport {
    /// Collects the report from the final state of a session.
    pub(crate) fn collect(
        outcome: RunOutcome,
        elapsed: Duration,
        waves: &WaveList,
        enemies_spawned: u64,
        enemies_killed: u64,
        faults: Vec<DirectorFault>,
    ) -> Self {
        let waves = waves
            .iter()
            .enumerate()
            .map(|(index, wave)| WaveReport {
                index: WaveIndex::new(index),
                enemies: wave.total_enemy_count(),
                finished: wave.is_finished(),
                time_secs: wave.time().map(|time| time.as_secs_f64()),
            })
            .collect();

        Self {
            outcome,
            elapsed_secs: elapsed.as_secs_f64(),
            enemies_spawned,
            enemies_killed,
            faults,
            waves,
        }
    }

    /// Number of waves that were cleared.
    pub(crate) fn cleared_waves(&self) -> usize {
        self.waves.iter().filter(|wave| wave.finished).count()
    }

    /// Writes the report as pretty JSON to the path, or to stdout without one.
    pub(crate) fn write(&self, path: Option<&Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialise run report")?;
        match path {
            Some(path) => fs::write(path, json)
                .with_context(|| format!("failed to write run report to {}", path.display())),
            None => {
                println!("{json}");
                Ok(())
            }
        }
    }
}
