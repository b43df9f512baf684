//! Wave manifest loading.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use horde_core::{EnemyTypeId, Wave, WaveEntry, WaveList};
use horde_system_waves::{ChainPolicy, Config};
use serde::Deserialize;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const DEFAULT_INITIAL_COOLDOWN_SECS: f64 = 5.0;
const DEFAULT_MAX_ENEMIES_ALIVE: u32 = 100;
const DEFAULT_SPAWN_INTERVAL_SECS: f64 = 0.1;

/// Whether the next wave's cooldown starts on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Chaining {
    /// Start the next cooldown as soon as a wave is cleared.
    Automatic,
    /// Wait for the controller to request the next wave.
    #[default]
    Manual,
}

impl Chaining {
    pub(crate) const fn policy(self) -> ChainPolicy {
        match self {
            Self::Automatic => ChainPolicy::Automatic,
            Self::Manual => ChainPolicy::Manual,
        }
    }
}

/// Director configuration and waves read from a manifest.
#[derive(Debug)]
pub(crate) struct WavePlan {
    pub(crate) config: Config,
    pub(crate) waves: WaveList,
}

impl WavePlan {
    /// Replaces the chaining policy declared by the manifest.
    #[must_use]
    pub(crate) fn with_chaining(self, chaining: Chaining) -> Self {
        let config = Config::new(
            self.config.initial_cooldown(),
            self.config.max_enemies_alive(),
            self.config.spawn_interval(),
            chaining.policy(),
        );
        Self {
            config,
            waves: self.waves,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    #[serde(default = "default_initial_cooldown_secs")]
    initial_cooldown_secs: f64,
    #[serde(default = "default_max_enemies_alive")]
    max_enemies_alive: u32,
    #[serde(default = "default_spawn_interval_secs")]
    spawn_interval_secs: f64,
    #[serde(default)]
    chaining: Chaining,
    #[serde(default)]
    waves: Vec<ManifestWave>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestWave {
    #[serde(default)]
    cooldown_after_secs: f64,
    enemies: Vec<ManifestEnemy>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEnemy {
    enemy: String,
    count: u32,
}

fn default_initial_cooldown_secs() -> f64 {
    DEFAULT_INITIAL_COOLDOWN_SECS
}

fn default_max_enemies_alive() -> u32 {
    DEFAULT_MAX_ENEMIES_ALIVE
}

fn default_spawn_interval_secs() -> f64 {
    DEFAULT_SPAWN_INTERVAL_SECS
}

/// Loads the wave manifest located at the provided path.
pub(crate) fn load(path: &Path) -> Result<WavePlan> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read wave manifest at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid wave manifest at {}", path.display()))
}

fn parse(contents: &str) -> Result<WavePlan> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse wave manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported wave manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let config = Config::new(
        seconds(manifest.initial_cooldown_secs, "initial_cooldown_secs")?,
        manifest.max_enemies_alive,
        seconds(manifest.spawn_interval_secs, "spawn_interval_secs")?,
        manifest.chaining.policy(),
    );

    let mut waves = Vec::with_capacity(manifest.waves.len());
    for (index, wave) in manifest.waves.into_iter().enumerate() {
        let cooldown = seconds(wave.cooldown_after_secs, "cooldown_after_secs")
            .with_context(|| format!("wave {index}"))?;
        let entries = wave
            .enemies
            .into_iter()
            .map(|entry| WaveEntry::new(EnemyTypeId::new(entry.enemy), entry.count))
            .collect();
        waves.push(Wave::new(entries, cooldown));
    }

    Ok(WavePlan {
        config,
        waves: WaveList::new(waves),
    })
}

fn seconds(value: f64, field: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("`{field}` must be a finite, non-negative number of seconds"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_core::WaveIndex;

    #[test]
    fn parses_waves_in_declared_order() {
        let manifest = r#"
            version = 1
            initial_cooldown_secs = 3.0
            max_enemies_alive = 40
            spawn_interval_secs = 0.25
            chaining = "automatic"

            [[waves]]
            cooldown_after_secs = 10.0
            enemies = [{ enemy = "walker", count = 12 }, { enemy = "runner", count = 3 }]

            [[waves]]
            enemies = [{ enemy = "brute", count = 1 }]
        "#;

        let plan = parse(manifest).expect("valid manifest");
        assert_eq!(plan.config.initial_cooldown(), Duration::from_secs(3));
        assert_eq!(plan.config.max_enemies_alive(), 40);
        assert_eq!(plan.config.spawn_interval(), Duration::from_millis(250));
        assert_eq!(plan.config.chain_policy(), ChainPolicy::Automatic);
        assert_eq!(plan.waves.len(), 2);

        let first = plan.waves.get(WaveIndex::FIRST).expect("first wave");
        let names: Vec<_> = first
            .enemies()
            .iter()
            .map(|entry| entry.enemy.as_str())
            .collect();
        assert_eq!(names, vec!["walker", "runner"]);
        assert_eq!(first.cooldown_after_wave(), Duration::from_secs(10));

        let second = plan.waves.get(WaveIndex::new(1)).expect("second wave");
        assert_eq!(second.cooldown_after_wave(), Duration::ZERO);
    }

    #[test]
    fn omitted_settings_fall_back_to_defaults() {
        let plan = parse("version = 1").expect("minimal manifest");
        assert_eq!(plan.config.initial_cooldown(), Duration::from_secs(5));
        assert_eq!(plan.config.max_enemies_alive(), 100);
        assert_eq!(plan.config.spawn_interval(), Duration::from_millis(100));
        assert_eq!(plan.config.chain_policy(), ChainPolicy::Manual);
        assert!(plan.waves.is_empty(), "emptiness is reported when the run starts");
    }

    #[test]
    fn rejects_unknown_version() {
        let error = parse("version = 2").expect_err("version 2 is unsupported");
        assert!(error.to_string().contains("unsupported wave manifest version 2"));
    }

    #[test]
    fn rejects_negative_durations() {
        let manifest = r#"
            version = 1
            [[waves]]
            cooldown_after_secs = -1.0
            enemies = [{ enemy = "walker", count = 1 }]
        "#;
        assert!(parse(manifest).is_err());
    }

    #[test]
    fn chaining_override_keeps_other_settings() {
        let plan = parse("version = 1\nmax_enemies_alive = 7")
            .expect("valid manifest")
            .with_chaining(Chaining::Automatic);
        assert_eq!(plan.config.chain_policy(), ChainPolicy::Automatic);
        assert_eq!(plan.config.max_enemies_alive(), 7);
    }
}
