#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde wave director.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`SpawnerView`], and respond exclusively with new command
//! batches.

pub mod timer;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use timer::{CountdownTimer, Timer};

/// Name of the audio cue played when a wave begins.
pub const WAVE_START_CUE: &str = "WaveStart";
/// Name of the audio cue played when a wave is cleared.
pub const WAVE_FINISH_CUE: &str = "WaveFinish";

/// Commands that express all permissible mutations and collaborator requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the enemy spawner materialise one enemy of the given type.
    SpawnEnemy {
        /// Type of enemy to create.
        enemy: EnemyTypeId,
    },
    /// Requests removal of a live enemy, typically because it was killed.
    KillEnemy {
        /// Identifier of the enemy to remove.
        enemy_id: EnemyId,
    },
    /// Toggles the global pause flag owned by the game controller.
    SetPaused {
        /// Whether simulation time should be frozen.
        paused: bool,
    },
    /// Brings the enemy spawner online or takes it offline.
    SetSpawnerOnline {
        /// Whether spawn requests should be honoured.
        online: bool,
    },
    /// Asks the audio service to play a feedback cue.
    PlayCue {
        /// Cue to play.
        cue: AudioCue,
    },
    /// Tells the game controller that the run is over.
    EndRun {
        /// How the run ended.
        outcome: RunOutcome,
    },
    /// Reports a mid-run fault to the game controller.
    ReportFault {
        /// Fault observed by the director.
        fault: DirectorFault,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the scene.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy_id: EnemyId,
        /// Type of the new enemy.
        enemy: EnemyTypeId,
    },
    /// Confirms that an enemy was removed from the scene.
    EnemyKilled {
        /// Identifier of the removed enemy.
        enemy_id: EnemyId,
        /// Type of the removed enemy.
        enemy: EnemyTypeId,
    },
    /// Fired once when the live enemy count drops to zero.
    NoEnemiesLeft,
    /// Announces that the global pause flag changed.
    PauseChanged {
        /// Whether simulation time is now frozen.
        paused: bool,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnRejected {
        /// Type of enemy that was requested.
        enemy: EnemyTypeId,
        /// Why the request was rejected.
        reason: SpawnRejection,
    },
}

/// Reasons the enemy spawner may refuse a spawn request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRejection {
    /// The spawner is currently offline.
    SpawnerOffline,
}

/// Audio feedback cues emitted by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// A wave has started.
    WaveStart,
    /// A wave has been cleared.
    WaveFinish,
}

impl AudioCue {
    /// Name under which the audio service knows the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WaveStart => WAVE_START_CUE,
            Self::WaveFinish => WAVE_FINISH_CUE,
        }
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every wave was cleared.
    Victory,
    /// The game controller stopped the run before the last wave was cleared.
    Aborted,
}

/// Faults the director reports to the game controller without aborting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectorFault {
    /// The enemy spawner could not be reached while the wave still had
    /// enemies left to spawn.
    SpawnerUnavailable {
        /// Wave whose spawning was held back.
        wave: WaveIndex,
    },
}

impl fmt::Display for DirectorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnerUnavailable { wave } => {
                write!(f, "enemy spawner unavailable during wave {wave}")
            }
        }
    }
}

/// Identifier of an enemy type, as named by the wave configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyTypeId(String);

impl EnemyTypeId {
    /// Creates a new enemy type identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrowed name of the enemy type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnemyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier assigned to a live enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based position of a wave within the wave list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveIndex(usize);

impl WaveIndex {
    /// Index of the first wave in a run.
    pub const FIRST: Self = Self(0);

    /// Creates a new wave index.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Index of the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WaveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of enemies of a single type a wave asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveEntry {
    /// Type of enemy to spawn.
    pub enemy: EnemyTypeId,
    /// How many enemies of this type the wave spawns.
    pub count: u32,
}

impl WaveEntry {
    /// Creates a new wave entry.
    #[must_use]
    pub fn new(enemy: EnemyTypeId, count: u32) -> Self {
        Self { enemy, count }
    }
}

/// One scripted batch of enemies followed by a cooldown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    enemies: Vec<WaveEntry>,
    cooldown_after_wave: Duration,
    finished: bool,
    time: Option<Duration>,
}

impl Wave {
    /// Creates a wave from its per-type counts and the cooldown that follows it.
    ///
    /// Entries are spawned in the order they are listed.
    #[must_use]
    pub fn new(enemies: Vec<WaveEntry>, cooldown_after_wave: Duration) -> Self {
        Self {
            enemies,
            cooldown_after_wave,
            finished: false,
            time: None,
        }
    }

    /// Per-type counts in spawn order.
    #[must_use]
    pub fn enemies(&self) -> &[WaveEntry] {
        &self.enemies
    }

    /// Pause between clearing this wave and starting the next one.
    #[must_use]
    pub const fn cooldown_after_wave(&self) -> Duration {
        self.cooldown_after_wave
    }

    /// Sum of all per-type counts.
    #[must_use]
    pub fn total_enemy_count(&self) -> u32 {
        self.enemies
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.count))
    }

    /// Whether the wave has been cleared.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Time the wave took to clear, once finished.
    #[must_use]
    pub const fn time(&self) -> Option<Duration> {
        self.time
    }

    /// Marks the wave as cleared after the provided amount of time.
    pub fn record_completion(&mut self, time: Duration) {
        self.finished = true;
        self.time = Some(time);
    }

    fn validate(&self, index: WaveIndex) -> Result<(), ConfigurationError> {
        for (position, entry) in self.enemies.iter().enumerate() {
            let duplicated = self.enemies[..position]
                .iter()
                .any(|earlier| earlier.enemy == entry.enemy);
            if duplicated {
                return Err(ConfigurationError::DuplicateEnemyType {
                    wave: index,
                    enemy: entry.enemy.clone(),
                });
            }
        }

        if self.total_enemy_count() == 0 {
            return Err(ConfigurationError::DegenerateWave { wave: index });
        }

        Ok(())
    }
}

/// Ordered sequence of waves making up one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveList {
    waves: Vec<Wave>,
}

impl WaveList {
    /// Creates a wave list. Validation is deferred to [`WaveList::validate`]
    /// so that an empty list can still be inspected safely.
    #[must_use]
    pub fn new(waves: Vec<Wave>) -> Self {
        Self { waves }
    }

    /// Number of waves in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the list contains no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Wave stored at the provided index, if any.
    #[must_use]
    pub fn get(&self, index: WaveIndex) -> Option<&Wave> {
        self.waves.get(index.get())
    }

    /// Mutable access to the wave stored at the provided index, if any.
    pub fn get_mut(&mut self, index: WaveIndex) -> Option<&mut Wave> {
        self.waves.get_mut(index.get())
    }

    /// Reports whether the index refers to the final wave.
    #[must_use]
    pub fn is_last(&self, index: WaveIndex) -> bool {
        index.get() + 1 >= self.waves.len()
    }

    /// Iterator over the waves in run order.
    pub fn iter(&self) -> impl Iterator<Item = &Wave> {
        self.waves.iter()
    }

    /// Checks that the list can drive a run.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.waves.is_empty() {
            return Err(ConfigurationError::EmptyWaveList);
        }

        for (index, wave) in self.waves.iter().enumerate() {
            wave.validate(WaveIndex::new(index))?;
        }

        Ok(())
    }
}

/// Notifications delivered synchronously to director listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveNotification {
    /// A wave entered its active phase.
    WaveStarted {
        /// Wave that started.
        wave: WaveIndex,
    },
    /// A wave other than the last one was cleared.
    WaveFinished {
        /// Wave that was cleared.
        wave: WaveIndex,
    },
    /// The final wave was cleared and the run is won.
    RunCompleted,
}

/// Coarse phase of the wave director, used for diagnostics and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// The run has not been started.
    Idle,
    /// Waiting for the cooldown before the next wave.
    Cooldown,
    /// A wave is spawning or waiting for its enemies to be cleared.
    Active,
    /// A wave was cleared and the next cooldown awaits an explicit trigger.
    Finished,
    /// Every wave was cleared.
    RunComplete,
    /// The director was torn down.
    TornDown,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Cooldown => "cooling down",
            Self::Active => "running a wave",
            Self::Finished => "between waves",
            Self::RunComplete => "done with the run",
            Self::TornDown => "torn down",
        };
        f.write_str(label)
    }
}

/// Read-only snapshot of the director's run state for debug overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectorSnapshot {
    /// Current phase.
    pub phase: PhaseKind,
    /// Wave the cursor points at; `None` before a run or with no waves.
    pub current_wave: Option<WaveIndex>,
    /// Whether a wave is between its start and its finish.
    pub is_wave_running: bool,
    /// Whether the current wave reached its spawn target.
    pub all_enemies_spawned: bool,
    /// Enemies spawned so far in the current wave.
    pub enemies_spawned_in_current_wave: u32,
    /// Spawn target of the current wave.
    pub current_wave_total: u32,
    /// Time spent in the current wave.
    pub wave_elapsed: Duration,
    /// Time left before the next wave starts.
    pub cooldown_remaining: Duration,
    /// Ceiling on live enemies.
    pub max_enemies_alive: u32,
    /// Delay between spawn passes.
    pub spawn_interval: Duration,
}

/// Read-only view of the enemy spawner supplied to systems each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnerView {
    live_enemies: Option<u32>,
}

impl SpawnerView {
    /// View of a reachable spawner with the provided number of live enemies.
    #[must_use]
    pub const fn online(live_enemies: u32) -> Self {
        Self {
            live_enemies: Some(live_enemies),
        }
    }

    /// View of a spawner that cannot currently be reached.
    #[must_use]
    pub const fn offline() -> Self {
        Self { live_enemies: None }
    }

    /// Live enemy count, or `None` while the spawner is unreachable.
    #[must_use]
    pub const fn live_enemies(&self) -> Option<u32> {
        self.live_enemies
    }
}

/// Problems with the wave configuration that prevent a run from starting.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No waves were configured.
    #[error("the wave list is empty")]
    EmptyWaveList,
    /// A wave would spawn no enemies at all.
    #[error("wave {wave} spawns no enemies")]
    DegenerateWave {
        /// Offending wave.
        wave: WaveIndex,
    },
    /// A wave names the same enemy type twice.
    #[error("wave {wave} lists enemy type `{enemy}` more than once")]
    DuplicateEnemyType {
        /// Offending wave.
        wave: WaveIndex,
        /// Enemy type that appears more than once.
        enemy: EnemyTypeId,
    },
    /// The live enemy cap would prevent any spawn.
    #[error("the live enemy cap must be greater than zero")]
    ZeroEnemyCap,
}

/// Operations that may be rejected by the director's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectorAction {
    /// Starting the run.
    Start,
    /// Triggering the cooldown for the next wave.
    StartNextWave,
}

impl fmt::Display for DirectorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start the run"),
            Self::StartNextWave => f.write_str("start the next wave"),
        }
    }
}

/// Errors returned by the wave director's control operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DirectorError {
    /// The run configuration is unusable.
    #[error("invalid wave configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The requested operation does not apply to the current phase.
    #[error("cannot {action} while the director is {phase}")]
    InvalidStateTransition {
        /// Rejected operation.
        action: DirectorAction,
        /// Phase the director was in.
        phase: PhaseKind,
    },
}
