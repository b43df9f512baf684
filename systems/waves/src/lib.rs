#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director: schedules enemy spawns across timed waves.
//!
//! The director is a pure system. Each frame it consumes the world's events
//! together with a [`SpawnerView`] and answers with commands: spawn requests
//! for the enemy spawner, audio cues, and run-level requests for the game
//! controller. Cooldowns, the delay between spawn passes and the live enemy
//! cap are suspension points of the director's own state machine, so the
//! whole schedule advances only through `Event::TimeAdvanced`.

mod cadence;
mod listeners;

use std::time::Duration;

use horde_core::{
    AudioCue, Command, ConfigurationError, CountdownTimer, DirectorAction, DirectorError,
    DirectorFault, DirectorSnapshot, Event, PhaseKind, RunOutcome, SpawnerView, Timer, Wave,
    WaveIndex, WaveList, WaveNotification,
};
use tracing::{debug, info, warn};

use self::cadence::{Cadence, SpawnLimits};
use self::listeners::Listeners;

pub use self::listeners::ListenerId;

const DEFAULT_INITIAL_COOLDOWN: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ENEMIES_ALIVE: u32 = 100;
const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(100);

/// What happens after a wave other than the last one is cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChainPolicy {
    /// The next wave's cooldown starts as soon as the wave is cleared.
    Automatic,
    /// The director waits for [`WaveDirector::start_next_wave`].
    #[default]
    Manual,
}

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    initial_cooldown: Duration,
    max_enemies_alive: u32,
    spawn_interval: Duration,
    chain_policy: ChainPolicy,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        initial_cooldown: Duration,
        max_enemies_alive: u32,
        spawn_interval: Duration,
        chain_policy: ChainPolicy,
    ) -> Self {
        Self {
            initial_cooldown,
            max_enemies_alive,
            spawn_interval,
            chain_policy,
        }
    }

    /// Cooldown before the first wave.
    #[must_use]
    pub const fn initial_cooldown(&self) -> Duration {
        self.initial_cooldown
    }

    /// Ceiling on live enemies.
    #[must_use]
    pub const fn max_enemies_alive(&self) -> u32 {
        self.max_enemies_alive
    }

    /// Delay between spawn passes.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Behaviour after a wave is cleared.
    #[must_use]
    pub const fn chain_policy(&self) -> ChainPolicy {
        self.chain_policy
    }

    fn limits(&self) -> SpawnLimits {
        SpawnLimits {
            max_enemies_alive: self.max_enemies_alive,
            spawn_interval: self.spawn_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_INITIAL_COOLDOWN,
            DEFAULT_MAX_ENEMIES_ALIVE,
            DEFAULT_SPAWN_INTERVAL,
            ChainPolicy::default(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Cooldown { wave: WaveIndex },
    Active { wave: WaveIndex },
    Finished { wave: WaveIndex },
    RunComplete,
    TornDown,
}

impl Phase {
    const fn kind(self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::Cooldown { .. } => PhaseKind::Cooldown,
            Self::Active { .. } => PhaseKind::Active,
            Self::Finished { .. } => PhaseKind::Finished,
            Self::RunComplete => PhaseKind::RunComplete,
            Self::TornDown => PhaseKind::TornDown,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct RunState {
    is_wave_running: bool,
    all_enemies_spawned: bool,
    enemies_spawned_in_current_wave: u32,
    wave_timer: Timer,
    cooldown_timer: CountdownTimer,
}

/// Pure system that runs waves of enemies from cooldown to completion.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    waves: WaveList,
    phase: Phase,
    cursor: Option<WaveIndex>,
    run: RunState,
    cadence: Option<Cadence>,
    paused: bool,
    spawner_fault_reported: bool,
    listeners: Listeners,
}

impl WaveDirector {
    /// Creates an idle director for the provided waves.
    #[must_use]
    pub fn new(config: Config, waves: WaveList) -> Self {
        Self {
            config,
            waves,
            phase: Phase::Idle,
            cursor: None,
            run: RunState::default(),
            cadence: None,
            paused: false,
            spawner_fault_reported: false,
            listeners: Listeners::default(),
        }
    }

    /// Starts the run by entering the cooldown before the first wave.
    ///
    /// Fails without changing any state when the configuration cannot drive
    /// a run or when the director has already been started.
    pub fn start(&mut self) -> Result<(), DirectorError> {
        if self.phase != Phase::Idle {
            return Err(self.rejected(DirectorAction::Start));
        }

        if self.config.max_enemies_alive == 0 {
            return Err(ConfigurationError::ZeroEnemyCap.into());
        }
        self.waves.validate()?;

        info!(
            waves = self.waves.len(),
            cooldown = ?self.config.initial_cooldown,
            "starting wave run"
        );
        self.cursor = Some(WaveIndex::FIRST);
        self.run = RunState::default();
        self.enter_cooldown(WaveIndex::FIRST, self.config.initial_cooldown);
        Ok(())
    }

    /// Starts the cooldown for the wave after the one just cleared.
    ///
    /// Only valid while the director is parked between waves, which happens
    /// under [`ChainPolicy::Manual`].
    pub fn start_next_wave(&mut self) -> Result<(), DirectorError> {
        let Phase::Finished { wave } = self.phase else {
            return Err(self.rejected(DirectorAction::StartNextWave));
        };

        let cooldown = self
            .waves
            .get(wave)
            .map_or(Duration::ZERO, Wave::cooldown_after_wave);
        self.enter_cooldown(wave.next(), cooldown);
        Ok(())
    }

    /// Cancels any pending cooldown or spawn pass and drops every listener.
    ///
    /// After teardown the director ignores all events and emits nothing.
    pub fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }

        info!(phase = %self.phase.kind(), "tearing down wave director");
        self.phase = Phase::TornDown;
        self.cadence = None;
        self.run.is_wave_running = false;
        self.run.wave_timer.stop();
        self.run.cooldown_timer.stop();
        self.listeners.clear();
    }

    /// Registers a listener for wave notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&WaveNotification) + 'static) -> ListenerId {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Removes a listener. Returns whether it was still registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Wave the cursor points at, or `None` when there is none.
    #[must_use]
    pub fn current_wave(&self) -> Option<&Wave> {
        self.cursor.and_then(|index| self.waves.get(index))
    }

    /// Index of the wave the cursor points at.
    #[must_use]
    pub fn current_wave_index(&self) -> Option<WaveIndex> {
        self.cursor
    }

    /// All waves of the run, including recorded completion times.
    #[must_use]
    pub fn waves(&self) -> &WaveList {
        &self.waves
    }

    /// Coarse phase of the state machine.
    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Read-only snapshot of the run state.
    #[must_use]
    pub fn snapshot(&self) -> DirectorSnapshot {
        let cooldown_remaining = match self.phase {
            Phase::Cooldown { .. } => self.run.cooldown_timer.remaining(),
            _ => Duration::ZERO,
        };

        DirectorSnapshot {
            phase: self.phase.kind(),
            current_wave: self.cursor,
            is_wave_running: self.run.is_wave_running,
            all_enemies_spawned: self.run.all_enemies_spawned,
            enemies_spawned_in_current_wave: self.run.enemies_spawned_in_current_wave,
            current_wave_total: self.current_wave().map_or(0, Wave::total_enemy_count),
            wave_elapsed: self.run.wave_timer.elapsed(),
            cooldown_remaining,
            max_enemies_alive: self.config.max_enemies_alive,
            spawn_interval: self.config.spawn_interval,
        }
    }

    /// Consumes world events and emits spawn, audio and controller commands.
    ///
    /// A `NoEnemiesLeft` event that follows spawn requests emitted earlier in
    /// the same call is stale, because the world has not applied those spawns
    /// yet, and is ignored.
    pub fn handle(&mut self, events: &[Event], spawner: SpawnerView, out: &mut Vec<Command>) {
        let mut requested = 0u32;

        for event in events {
            if self.phase == Phase::TornDown {
                return;
            }

            match event {
                Event::TimeAdvanced { dt } => {
                    if !self.paused {
                        requested = requested.saturating_add(self.advance(
                            *dt,
                            spawner,
                            requested,
                            out,
                        ));
                    }
                }
                Event::NoEnemiesLeft => {
                    if requested > 0 {
                        debug!(requested, "ignoring stale no-enemies-left signal");
                        continue;
                    }
                    self.finish_wave(out);
                }
                Event::PauseChanged { paused } => {
                    self.paused = *paused;
                }
                _ => {}
            }
        }
    }

    fn rejected(&self, action: DirectorAction) -> DirectorError {
        DirectorError::InvalidStateTransition {
            action,
            phase: self.phase.kind(),
        }
    }

    fn enter_cooldown(&mut self, wave: WaveIndex, duration: Duration) {
        debug!(wave = %wave, cooldown = ?duration, "wave cooldown started");
        self.phase = Phase::Cooldown { wave };
        self.run.cooldown_timer.start(duration);
    }

    fn advance(
        &mut self,
        dt: Duration,
        spawner: SpawnerView,
        requested: u32,
        out: &mut Vec<Command>,
    ) -> u32 {
        match self.phase {
            Phase::Cooldown { wave } => {
                let remaining = self.run.cooldown_timer.remaining();
                if dt < remaining {
                    self.run.cooldown_timer.advance(dt);
                    return 0;
                }

                self.run.cooldown_timer.advance(remaining);
                self.run.cooldown_timer.stop();
                debug!(
                    wave = %wave,
                    cooldown = ?self.run.cooldown_timer.duration(),
                    "wave cooldown over"
                );
                self.begin_wave(wave);
                let leftover = dt - remaining;
                self.run.wave_timer.advance(leftover);
                let spawned = self.spawn(wave, leftover, spawner, requested, out);
                self.announce_wave_start(wave, out);
                spawned
            }
            Phase::Active { wave } => {
                self.run.wave_timer.advance(dt);
                self.spawn(wave, dt, spawner, requested, out)
            }
            Phase::Idle | Phase::Finished { .. } | Phase::RunComplete | Phase::TornDown => 0,
        }
    }

    fn begin_wave(&mut self, wave: WaveIndex) {
        self.cursor = Some(wave);
        self.phase = Phase::Active { wave };
        self.run.is_wave_running = true;
        self.run.all_enemies_spawned = false;
        self.run.enemies_spawned_in_current_wave = 0;
        self.run.wave_timer.start();
        self.cadence = self.waves.get(wave).map(Cadence::for_wave);
    }

    fn announce_wave_start(&mut self, wave: WaveIndex, out: &mut Vec<Command>) {
        info!(
            wave = %wave,
            enemies = self.current_wave().map_or(0, Wave::total_enemy_count),
            "wave started"
        );
        out.push(Command::PlayCue {
            cue: AudioCue::WaveStart,
        });
        self.listeners
            .notify(WaveNotification::WaveStarted { wave });
    }

    fn spawn(
        &mut self,
        wave: WaveIndex,
        elapsed: Duration,
        spawner: SpawnerView,
        requested: u32,
        out: &mut Vec<Command>,
    ) -> u32 {
        let Some(cadence) = self.cadence.as_mut() else {
            return 0;
        };

        let Some(live_enemies) = spawner.live_enemies() else {
            if !self.spawner_fault_reported {
                let fault = DirectorFault::SpawnerUnavailable { wave };
                warn!(%fault, "holding spawns until the enemy spawner returns");
                out.push(Command::ReportFault { fault });
                self.spawner_fault_reported = true;
            }
            return 0;
        };
        if self.spawner_fault_reported {
            info!(wave = %wave, "enemy spawner is back, resuming spawns");
            self.spawner_fault_reported = false;
        }

        let progress = cadence.resume(
            elapsed,
            live_enemies.saturating_add(requested),
            self.config.limits(),
            out,
        );
        self.run.enemies_spawned_in_current_wave = cadence.spawned_total();
        if progress.spawned > 0 {
            debug!(
                wave = %wave,
                spawned = progress.spawned,
                total = self.run.enemies_spawned_in_current_wave,
                "spawn passes ran"
            );
        }

        if progress.complete {
            info!(wave = %wave, "all enemies of the wave spawned");
            self.run.all_enemies_spawned = true;
            self.cadence = None;
        }

        progress.spawned
    }

    fn finish_wave(&mut self, out: &mut Vec<Command>) {
        let Phase::Active { wave } = self.phase else {
            return;
        };
        if !self.run.all_enemies_spawned {
            debug!(wave = %wave, "enemies cleared while spawning is still in progress");
            return;
        }

        self.run.is_wave_running = false;
        self.run.wave_timer.stop();
        let time = self.run.wave_timer.elapsed();
        if let Some(finished) = self.waves.get_mut(wave) {
            finished.record_completion(time);
        }

        if self.waves.is_last(wave) {
            info!(wave = %wave, time = ?time, "final wave cleared, run won");
            self.phase = Phase::RunComplete;
            out.push(Command::EndRun {
                outcome: RunOutcome::Victory,
            });
            self.listeners.notify(WaveNotification::RunCompleted);
            return;
        }

        info!(wave = %wave, time = ?time, "wave cleared");
        out.push(Command::PlayCue {
            cue: AudioCue::WaveFinish,
        });
        self.phase = Phase::Finished { wave };
        self.listeners
            .notify(WaveNotification::WaveFinished { wave });

        if self.config.chain_policy == ChainPolicy::Automatic {
            let cooldown = self
                .waves
                .get(wave)
                .map_or(Duration::ZERO, Wave::cooldown_after_wave);
            self.enter_cooldown(wave.next(), cooldown);
        }
    }
}
