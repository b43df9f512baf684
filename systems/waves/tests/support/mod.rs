#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, time::Duration};

use horde_core::{
    AudioCue, Command, EnemyTypeId, Event, RunOutcome, Wave, WaveEntry, WaveList,
    WaveNotification,
};
use horde_system_waves::{ChainPolicy, Config, WaveDirector};
use horde_world::{self as world, query, World};

pub const SPAWN_INTERVAL: Duration = Duration::from_millis(100);

pub fn wave(entries: &[(&str, u32)], cooldown_after: Duration) -> Wave {
    Wave::new(
        entries
            .iter()
            .map(|(name, count)| WaveEntry::new(EnemyTypeId::new(*name), *count))
            .collect(),
        cooldown_after,
    )
}

pub fn config(initial_cooldown: Duration, cap: u32, chain_policy: ChainPolicy) -> Config {
    Config::new(initial_cooldown, cap, SPAWN_INTERVAL, chain_policy)
}

/// Drives a director against a real world, frame by frame.
pub struct Harness {
    pub world: World,
    pub director: WaveDirector,
    pub pending: Vec<Event>,
    pub notifications: Rc<RefCell<Vec<WaveNotification>>>,
}

impl Harness {
    pub fn new(config: Config, waves: Vec<Wave>) -> Self {
        let mut director = WaveDirector::new(config, WaveList::new(waves));
        let notifications = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notifications);
        let _ = director.subscribe(move |notification| sink.borrow_mut().push(*notification));
        Self {
            world: World::new(),
            director,
            pending: Vec::new(),
            notifications,
        }
    }

    pub fn started(config: Config, waves: Vec<Wave>) -> Self {
        let mut harness = Self::new(config, waves);
        harness.director.start().expect("valid configuration");
        harness
    }

    /// Ticks the world, lets the director react and applies its commands.
    pub fn frame(&mut self, dt: Duration) -> Vec<Command> {
        let mut events = std::mem::take(&mut self.pending);
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.dispatch(&events)
    }

    /// Hands the provided events to the director and applies its commands.
    pub fn dispatch(&mut self, events: &[Event]) -> Vec<Command> {
        let mut commands = Vec::new();
        self.director
            .handle(events, query::spawner_view(&self.world), &mut commands);
        for command in &commands {
            world::apply(&mut self.world, command.clone(), &mut self.pending);
        }
        commands
    }

    pub fn kill(&mut self, count: usize) {
        let ids: Vec<_> = query::enemies(&self.world)
            .iter()
            .take(count)
            .map(|enemy| enemy.id())
            .collect();
        for enemy_id in ids {
            world::apply(
                &mut self.world,
                Command::KillEnemy { enemy_id },
                &mut self.pending,
            );
        }
    }

    pub fn kill_all(&mut self) {
        self.kill(usize::MAX);
    }

    pub fn live(&self) -> u32 {
        query::live_enemy_count(&self.world)
    }

    pub fn notifications(&self) -> Vec<WaveNotification> {
        self.notifications.borrow().clone()
    }

    /// Runs frames until every enemy of the current wave has spawned,
    /// clearing the scene whenever the cap holds spawning back.
    pub fn spawn_out_wave(&mut self) -> Vec<Command> {
        let mut emitted = Vec::new();
        for _ in 0..10_000 {
            emitted.extend(self.frame(SPAWN_INTERVAL));
            if self.director.snapshot().all_enemies_spawned {
                return emitted;
            }
            if self.live() >= self.director.snapshot().max_enemies_alive {
                self.kill_all();
            }
        }
        panic!("wave never finished spawning");
    }

    /// Spawns out the current wave, then clears the scene and lets the
    /// director observe it.
    pub fn clear_wave(&mut self) -> Vec<Command> {
        let mut emitted = self.spawn_out_wave();
        self.kill_all();
        emitted.extend(self.frame(Duration::ZERO));
        emitted
    }
}

pub fn spawned_names(commands: &[Command]) -> Vec<String> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { enemy } => Some(enemy.as_str().to_owned()),
            _ => None,
        })
        .collect()
}

pub fn count_cue(commands: &[Command], cue: AudioCue) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::PlayCue { cue: played } if *played == cue))
        .count()
}

pub fn ended_with(commands: &[Command]) -> Option<RunOutcome> {
    commands.iter().find_map(|command| match command {
        Command::EndRun { outcome } => Some(*outcome),
        _ => None,
    })
}
