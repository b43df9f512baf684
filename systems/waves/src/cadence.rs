//! Proportional multi-type spawn cadence for a single wave.
//!
//! Every enemy type gets a period of `floor(max_target / target)` passes, so
//! the most numerous type spawns on every pass and rarer types are spread
//! across the wave. The floor biases rarer types slightly ahead of perfectly
//! proportional pacing.

use std::time::Duration;

use horde_core::{Command, EnemyTypeId, Wave};
use tracing::debug;

/// Limits applied while spawning.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SpawnLimits {
    pub(crate) max_enemies_alive: u32,
    pub(crate) spawn_interval: Duration,
}

impl SpawnLimits {
    /// Spawning pauses once the live count reaches the cap and resumes at half of it.
    fn may_resume(&self, live_enemies: u32) -> bool {
        u64::from(live_enemies) * 2 <= u64::from(self.max_enemies_alive)
    }
}

/// Outcome of resuming the cadence for a slice of simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Progress {
    pub(crate) spawned: u32,
    pub(crate) complete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Gate {
    Ready,
    Delay(Duration),
    Throttled,
}

#[derive(Clone, Debug)]
struct CadenceEntry {
    enemy: EnemyTypeId,
    target: u32,
    period: u32,
    countdown: u32,
    spawned: u32,
}

impl CadenceEntry {
    fn step(&mut self) -> bool {
        if self.spawned >= self.target {
            return false;
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            return false;
        }

        self.spawned += 1;
        self.countdown = self.period;
        true
    }
}

/// Suspendable spawn loop for the active wave.
#[derive(Clone, Debug)]
pub(crate) struct Cadence {
    entries: Vec<CadenceEntry>,
    cursor: usize,
    gate: Gate,
    spawned_total: u32,
    total: u32,
}

impl Cadence {
    pub(crate) fn for_wave(wave: &Wave) -> Self {
        let max_target = wave
            .enemies()
            .iter()
            .map(|entry| entry.count)
            .max()
            .unwrap_or(0);

        let entries = wave
            .enemies()
            .iter()
            .filter(|entry| entry.count > 0)
            .map(|entry| {
                let period = max_target / entry.count;
                CadenceEntry {
                    enemy: entry.enemy.clone(),
                    target: entry.count,
                    period,
                    countdown: period,
                    spawned: 0,
                }
            })
            .collect();

        Self {
            entries,
            cursor: 0,
            gate: Gate::Ready,
            spawned_total: 0,
            total: wave.total_enemy_count(),
        }
    }

    pub(crate) fn spawned_total(&self) -> u32 {
        self.spawned_total
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.spawned_total >= self.total
    }

    /// Runs spawn passes until the next suspension point.
    ///
    /// `elapsed` is the simulated time available for inter-pass delays and
    /// `live_enemies` the live count including spawns already requested this
    /// frame.
    pub(crate) fn resume(
        &mut self,
        elapsed: Duration,
        live_enemies: u32,
        limits: SpawnLimits,
        out: &mut Vec<Command>,
    ) -> Progress {
        let mut budget = elapsed;
        let mut live = live_enemies;
        let mut progress = Progress::default();

        loop {
            if self.is_complete() {
                progress.complete = true;
                return progress;
            }

            match self.gate {
                Gate::Delay(remaining) => {
                    if budget < remaining {
                        self.gate = Gate::Delay(remaining - budget);
                        return progress;
                    }
                    budget -= remaining;
                    self.gate = Gate::Ready;
                }
                Gate::Throttled => {
                    if !limits.may_resume(live) {
                        return progress;
                    }
                    debug!(live, "live enemies dropped to half the cap, resuming spawns");
                    // The delay after the resumed pass starts in this frame.
                    budget = Duration::ZERO;
                    self.gate = Gate::Ready;
                }
                Gate::Ready => {
                    while self.cursor < self.entries.len() {
                        if live >= limits.max_enemies_alive {
                            debug!(
                                live,
                                cap = limits.max_enemies_alive,
                                "live enemy cap reached, holding spawns"
                            );
                            self.gate = Gate::Throttled;
                            return progress;
                        }

                        let entry = &mut self.entries[self.cursor];
                        self.cursor += 1;
                        if entry.step() {
                            out.push(Command::SpawnEnemy {
                                enemy: entry.enemy.clone(),
                            });
                            live = live.saturating_add(1);
                            progress.spawned += 1;
                            self.spawned_total += 1;
                        }

                        if self.is_complete() {
                            progress.complete = true;
                            return progress;
                        }
                    }

                    self.cursor = 0;
                    self.gate = Gate::Delay(limits.spawn_interval);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cadence, Gate, SpawnLimits};
    use horde_core::{Command, EnemyTypeId, Wave, WaveEntry};
    use std::time::Duration;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn limits(cap: u32) -> SpawnLimits {
        SpawnLimits {
            max_enemies_alive: cap,
            spawn_interval: INTERVAL,
        }
    }

    fn wave(entries: &[(&str, u32)]) -> Wave {
        Wave::new(
            entries
                .iter()
                .map(|(name, count)| WaveEntry::new(EnemyTypeId::new(*name), *count))
                .collect(),
            Duration::ZERO,
        )
    }

    fn names(commands: &[Command]) -> Vec<&str> {
        commands
            .iter()
            .map(|command| match command {
                Command::SpawnEnemy { enemy } => enemy.as_str(),
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn periods_are_floored() {
        let cadence = Cadence::for_wave(&wave(&[("a", 10), ("b", 3), ("c", 0)]));
        let periods: Vec<_> = cadence.entries.iter().map(|entry| entry.period).collect();
        assert_eq!(periods, vec![1, 3], "zero-count types are skipped");
    }

    #[test]
    fn first_pass_runs_without_waiting() {
        let mut cadence = Cadence::for_wave(&wave(&[("a", 2)]));
        let mut out = Vec::new();
        let progress = cadence.resume(Duration::ZERO, 0, limits(10), &mut out);
        assert_eq!(names(&out), vec!["a"]);
        assert_eq!(progress.spawned, 1);
        assert!(!progress.complete);
        assert_eq!(cadence.gate, Gate::Delay(INTERVAL));
    }

    #[test]
    fn cap_holds_cursor_mid_pass() {
        let mut cadence = Cadence::for_wave(&wave(&[("a", 3), ("b", 3)]));
        let mut out = Vec::new();
        let _ = cadence.resume(Duration::ZERO, 1, limits(2), &mut out);
        assert_eq!(names(&out), vec!["a"]);
        assert_eq!(cadence.gate, Gate::Throttled);
        assert_eq!(cadence.cursor, 1, "the pass resumes at the next type");

        out.clear();
        let _ = cadence.resume(Duration::ZERO, 1, limits(2), &mut out);
        assert_eq!(names(&out), vec!["b"], "resumes once live <= cap / 2");
    }

    #[test]
    fn resumed_pass_waits_a_full_interval() {
        let mut cadence = Cadence::for_wave(&wave(&[("a", 10)]));
        let mut out = Vec::new();
        let _ = cadence.resume(Duration::ZERO, 1, limits(2), &mut out);
        let _ = cadence.resume(INTERVAL, 2, limits(2), &mut out);
        assert_eq!(cadence.gate, Gate::Throttled);

        out.clear();
        let progress = cadence.resume(INTERVAL, 1, limits(2), &mut out);
        assert_eq!(progress.spawned, 1, "one pass on the frame the cap releases");
        assert_eq!(cadence.gate, Gate::Delay(INTERVAL));
    }

    #[test]
    fn completes_mid_pass() {
        let mut cadence = Cadence::for_wave(&wave(&[("a", 1), ("b", 1), ("c", 1)]));
        let mut out = Vec::new();
        let progress = cadence.resume(Duration::ZERO, 0, limits(10), &mut out);
        assert!(progress.complete);
        assert_eq!(cadence.spawned_total(), 3);
        assert_eq!(names(&out), vec!["a", "b", "c"]);
    }
}
