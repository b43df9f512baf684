#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Horde: the live enemy registry that plays the
//! enemy spawner collaborator.

use horde_core::{Command, EnemyId, EnemyTypeId, Event, SpawnRejection};

/// Enemy currently alive in the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyTypeId,
}

impl Enemy {
    /// Identifier assigned by the world.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Type of the enemy.
    #[must_use]
    pub fn kind(&self) -> &EnemyTypeId {
        &self.kind
    }
}

/// Represents the authoritative Horde world state.
#[derive(Debug)]
pub struct World {
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
    spawned_total: u64,
    killed_total: u64,
    paused: bool,
    spawner_online: bool,
}

impl World {
    /// Creates an empty world with an online spawner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_enemy_id: 0,
            spawned_total: 0,
            killed_total: 0,
            paused: false,
            spawner_online: true,
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn enemy_index(&self, enemy_id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id == enemy_id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands addressed to the audio service or the game controller are not
/// world mutations and are ignored here; adapters route them.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { enemy } => {
            if !world.spawner_online {
                out_events.push(Event::SpawnRejected {
                    enemy,
                    reason: SpawnRejection::SpawnerOffline,
                });
                return;
            }

            let enemy_id = world.allocate_enemy_id();
            world.enemies.push(Enemy {
                id: enemy_id,
                kind: enemy.clone(),
            });
            world.spawned_total = world.spawned_total.saturating_add(1);
            out_events.push(Event::EnemySpawned { enemy_id, enemy });
        }
        Command::KillEnemy { enemy_id } => {
            let Some(index) = world.enemy_index(enemy_id) else {
                return;
            };

            let enemy = world.enemies.remove(index);
            world.killed_total = world.killed_total.saturating_add(1);
            out_events.push(Event::EnemyKilled {
                enemy_id,
                enemy: enemy.kind,
            });

            if world.enemies.is_empty() {
                out_events.push(Event::NoEnemiesLeft);
            }
        }
        Command::SetPaused { paused } => {
            if world.paused != paused {
                world.paused = paused;
                out_events.push(Event::PauseChanged { paused });
            }
        }
        Command::SetSpawnerOnline { online } => {
            world.spawner_online = online;
        }
        Command::PlayCue { .. } | Command::EndRun { .. } | Command::ReportFault { .. } => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use horde_core::SpawnerView;

    use super::{Enemy, World};

    /// Enemies currently alive, in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> &[Enemy] {
        &world.enemies
    }

    /// Number of enemies currently alive.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> u32 {
        u32::try_from(world.enemies.len()).unwrap_or(u32::MAX)
    }

    /// Captures the spawner view handed to systems each frame.
    #[must_use]
    pub fn spawner_view(world: &World) -> SpawnerView {
        if world.spawner_online {
            SpawnerView::online(live_enemy_count(world))
        } else {
            SpawnerView::offline()
        }
    }

    /// Total number of enemies spawned since the world was created.
    #[must_use]
    pub fn spawned_total(world: &World) -> u64 {
        world.spawned_total
    }

    /// Total number of enemies removed since the world was created.
    #[must_use]
    pub fn killed_total(world: &World) -> u64 {
        world.killed_total
    }

    /// Reports whether the game controller paused the simulation.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use horde_core::{Command, EnemyId, EnemyTypeId, Event, SpawnRejection, SpawnerView};

    fn spawn(world: &mut World, name: &str) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                enemy: EnemyTypeId::new(name),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::EnemySpawned { enemy_id, .. }] => *enemy_id,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn no_enemies_left_fires_on_last_kill_only() {
        let mut world = World::new();
        let first = spawn(&mut world, "walker");
        let second = spawn(&mut world, "runner");

        let mut events = Vec::new();
        apply(&mut world, Command::KillEnemy { enemy_id: first }, &mut events);
        assert!(!events.contains(&Event::NoEnemiesLeft));

        events.clear();
        apply(
            &mut world,
            Command::KillEnemy { enemy_id: second },
            &mut events,
        );
        assert_eq!(events.last(), Some(&Event::NoEnemiesLeft));
        assert_eq!(query::live_enemy_count(&world), 0);
        assert_eq!(query::killed_total(&world), 2);
    }

    #[test]
    fn killing_unknown_enemy_is_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::KillEnemy {
                enemy_id: EnemyId::new(7),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn offline_spawner_rejects_spawns() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetSpawnerOnline { online: false },
            &mut events,
        );
        assert_eq!(query::spawner_view(&world), SpawnerView::offline());

        apply(
            &mut world,
            Command::SpawnEnemy {
                enemy: EnemyTypeId::new("walker"),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                enemy: EnemyTypeId::new("walker"),
                reason: SpawnRejection::SpawnerOffline,
            }]
        );
        assert_eq!(query::spawned_total(&world), 0);
    }

    #[test]
    fn pause_changes_are_broadcast_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        apply(&mut world, Command::SetPaused { paused: true }, &mut events);
        assert_eq!(events, vec![Event::PauseChanged { paused: true }]);
        assert!(query::is_paused(&world));
    }
}
