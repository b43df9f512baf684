//! Headless game controller that runs a wave plan against a simulated defender.

use std::{cell::RefCell, mem, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use horde_core::{Command, DirectorFault, Event, PhaseKind, RunOutcome, WaveNotification};
use horde_system_waves::WaveDirector;
use horde_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::{audio::ConsoleAudio, manifest::WavePlan, overlay, report::RunReport};

/// Window during which the controller holds the game paused.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PauseWindow {
    pub(crate) at: Duration,
    pub(crate) length: Duration,
}

/// Knobs of a headless session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionSettings {
    pub(crate) tick: Duration,
    pub(crate) max_duration: Duration,
    pub(crate) kill_rate: f64,
    pub(crate) seed: u64,
    pub(crate) overlay_every: Option<Duration>,
    pub(crate) pause: Option<PauseWindow>,
}

/// Kills live enemies at a steady, seeded rate.
#[derive(Debug)]
struct Defender {
    kill_rate: f64,
    budget: f64,
    rng: ChaCha8Rng,
}

impl Defender {
    fn new(kill_rate: f64, seed: u64) -> Self {
        Self {
            kill_rate: kill_rate.max(0.0),
            budget: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn engage(&mut self, world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
        if query::is_paused(world) {
            return;
        }

        self.budget += self.kill_rate * dt.as_secs_f64();
        while self.budget >= 1.0 {
            let enemies = query::enemies(world);
            if enemies.is_empty() {
                self.budget = 0.0;
                return;
            }

            let target = enemies[self.rng.gen_range(0..enemies.len())].id();
            world::apply(world, Command::KillEnemy { enemy_id: target }, out_events);
            self.budget -= 1.0;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PauseState {
    Pending,
    Holding,
    Done,
}

/// Owns the world, the director and the collaborators for one run.
#[derive(Debug)]
pub(crate) struct Session {
    settings: SessionSettings,
    world: World,
    director: WaveDirector,
    audio: ConsoleAudio,
    defender: Defender,
    pause_state: PauseState,
    faults: Vec<DirectorFault>,
}

impl Session {
    /// Prepares a session for the provided plan.
    pub(crate) fn new(plan: WavePlan, settings: SessionSettings) -> Self {
        Self {
            settings,
            world: World::new(),
            director: WaveDirector::new(plan.config, plan.waves),
            audio: ConsoleAudio::default(),
            defender: Defender::new(settings.kill_rate, settings.seed),
            pause_state: PauseState::Pending,
            faults: Vec::new(),
        }
    }

    /// Runs until the director reports victory or the time limit is reached.
    pub(crate) fn run(mut self) -> Result<RunReport> {
        self.director
            .start()
            .context("failed to start the wave run")?;

        let notifications = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notifications);
        let _ = self
            .director
            .subscribe(move |notification| sink.borrow_mut().push(*notification));

        let mut clock = Duration::ZERO;
        let mut since_overlay = Duration::ZERO;
        let mut pending = Vec::new();
        let mut commands = Vec::new();
        let mut outcome = None;

        while outcome.is_none() && clock < self.settings.max_duration {
            let mut events = mem::take(&mut pending);
            self.update_pause(clock, &mut events);
            world::apply(
                &mut self.world,
                Command::Tick {
                    dt: self.settings.tick,
                },
                &mut events,
            );
            clock += self.settings.tick;
            self.defender
                .engage(&mut self.world, self.settings.tick, &mut events);

            self.director
                .handle(&events, query::spawner_view(&self.world), &mut commands);
            for command in commands.drain(..) {
                match command {
                    Command::PlayCue { cue } => self.audio.play(cue.name()),
                    Command::EndRun { outcome: ended } => outcome = Some(ended),
                    Command::ReportFault { fault } => {
                        warn!(%fault, "director reported a fault");
                        self.faults.push(fault);
                    }
                    other => world::apply(&mut self.world, other, &mut pending),
                }
            }

            let delivered: Vec<WaveNotification> = notifications.borrow_mut().drain(..).collect();
            for notification in delivered {
                self.react(notification)?;
            }

            if let Some(every) = self.settings.overlay_every {
                since_overlay += self.settings.tick;
                if since_overlay >= every {
                    since_overlay = Duration::ZERO;
                    self.draw_overlay();
                }
            }
        }

        let outcome = outcome.unwrap_or_else(|| {
            warn!(limit = ?self.settings.max_duration, "time limit reached, aborting the run");
            RunOutcome::Aborted
        });

        self.director.teardown();
        self.audio.stop_all();

        Ok(RunReport::collect(
            outcome,
            clock,
            self.director.waves(),
            query::spawned_total(&self.world),
            query::killed_total(&self.world),
            self.faults,
        ))
    }

    fn react(&mut self, notification: WaveNotification) -> Result<()> {
        match notification {
            WaveNotification::WaveStarted { wave } => {
                info!(wave = %wave, "controller saw wave start");
            }
            WaveNotification::WaveFinished { wave } => {
                if self.director.phase() == PhaseKind::Finished {
                    info!(wave = %wave, "requesting the next wave");
                    self.director
                        .start_next_wave()
                        .context("failed to request the next wave")?;
                }
            }
            WaveNotification::RunCompleted => {
                info!("controller saw the run complete");
            }
        }
        Ok(())
    }

    fn update_pause(&mut self, clock: Duration, out_events: &mut Vec<Event>) {
        let Some(window) = self.settings.pause else {
            return;
        };

        match self.pause_state {
            PauseState::Pending if clock >= window.at => {
                info!(length = ?window.length, "pausing the game");
                world::apply(
                    &mut self.world,
                    Command::SetPaused { paused: true },
                    out_events,
                );
                self.audio.pause();
                self.pause_state = PauseState::Holding;
            }
            PauseState::Holding if clock >= window.at + window.length => {
                info!("resuming the game");
                world::apply(
                    &mut self.world,
                    Command::SetPaused { paused: false },
                    out_events,
                );
                self.audio.resume();
                self.pause_state = PauseState::Done;
            }
            _ => {}
        }
    }

    fn draw_overlay(&self) {
        let snapshot = self.director.snapshot();
        for line in overlay::overlay_lines(&snapshot, query::live_enemy_count(&self.world)) {
            info!(target: "horde::overlay", "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PauseWindow, Session, SessionSettings};
    use crate::manifest::WavePlan;
    use horde_core::{EnemyTypeId, RunOutcome, Wave, WaveEntry, WaveList};
    use horde_system_waves::{ChainPolicy, Config};
    use std::time::Duration;

    fn plan() -> WavePlan {
        let wave = |count| {
            Wave::new(
                vec![WaveEntry::new(EnemyTypeId::new("walker"), count)],
                Duration::from_secs(1),
            )
        };
        WavePlan {
            config: Config::new(
                Duration::from_secs(1),
                10,
                Duration::from_millis(100),
                ChainPolicy::Manual,
            ),
            waves: WaveList::new(vec![wave(5), wave(8)]),
        }
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            tick: Duration::from_millis(20),
            max_duration: Duration::from_secs(120),
            kill_rate: 20.0,
            seed: 7,
            overlay_every: None,
            pause: None,
        }
    }

    #[test]
    fn defender_clears_every_wave() {
        let report = Session::new(plan(), settings()).run().expect("run");

        assert_eq!(report.outcome, RunOutcome::Victory);
        assert_eq!(report.cleared_waves(), 2);
        assert_eq!(report.enemies_spawned, 13);
        assert_eq!(report.enemies_killed, 13);
        assert!(report.faults.is_empty());
    }

    #[test]
    fn idle_defender_runs_out_the_clock() {
        let mut settings = settings();
        settings.kill_rate = 0.0;
        settings.max_duration = Duration::from_secs(10);

        let report = Session::new(plan(), settings).run().expect("run");

        assert_eq!(report.outcome, RunOutcome::Aborted);
        assert_eq!(report.cleared_waves(), 0);
        assert_eq!(report.enemies_spawned, 5);
        assert_eq!(report.enemies_killed, 0);
    }

    #[test]
    fn pause_delays_the_run() {
        let unpaused = Session::new(plan(), settings()).run().expect("run");

        let mut paused = settings();
        paused.pause = Some(PauseWindow {
            at: Duration::from_millis(500),
            length: Duration::from_secs(3),
        });
        let delayed = Session::new(plan(), paused).run().expect("run");

        assert_eq!(delayed.outcome, RunOutcome::Victory);
        assert!(delayed.elapsed_secs >= unpaused.elapsed_secs + 2.9);
    }
}
