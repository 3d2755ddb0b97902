use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use bulwark_core::{
    BuildStage, CellCoord, Command, CreepId, CreepPhase, Direction, Event, PlacementError,
    ProjectileId, TowerId, TowerKind,
};
use bulwark_world::{self as world, query, SimulationConfig, World};

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(7, scripted_commands());
    let second = replay(7, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first
            .events
            .iter()
            .any(|record| matches!(record, EventRecord::WaveSpawned { wave: 1, .. })),
        "the first wave should have been released"
    );
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let mut config = SimulationConfig::default();
    config.waves.seed = seed;
    let mut world = World::from_config(&config).expect("stock config is valid");
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        log.extend(events.iter().map(EventRecord::from));
    }

    let creeps = query::creep_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| CreepState {
            id: snapshot.id,
            position: (snapshot.position.x.to_bits(), snapshot.position.y.to_bits()),
            health: snapshot.health.to_bits(),
            facing: snapshot.facing,
            phase: snapshot.phase,
        })
        .collect();

    ReplayOutcome {
        creeps,
        gold: query::gold(&world),
        health: query::player_health(&world),
        events: log,
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::QueueBuild {
            kind: TowerKind::Ballista,
            cell: CellCoord::new(4, 3),
        },
        Command::QueueBuild {
            kind: TowerKind::Arcane,
            cell: CellCoord::new(6, 6),
        },
        Command::QueueBuild {
            kind: TowerKind::Ballista,
            cell: CellCoord::new(10, 5),
        },
    ];
    commands.extend((0..400).map(|_| Command::Tick {
        dt: Duration::from_millis(50),
    }));
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    creeps: Vec<CreepState>,
    gold: u32,
    health: u32,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CreepState {
    id: CreepId,
    position: (u32, u32),
    health: u32,
    facing: Direction,
    phase: CreepPhase,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced {
        dt_micros: u128,
    },
    CreepSpawned {
        creep: CreepId,
        position: (u32, u32),
    },
    CreepEscaped {
        creep: CreepId,
        damage: u32,
    },
    CreepKilled {
        creep: CreepId,
        gold_reward: u32,
    },
    BuildQueued {
        kind: TowerKind,
        cell: CellCoord,
    },
    BuildRejected {
        cell: CellCoord,
        reason: PlacementError,
    },
    BuildStageAdvanced {
        cell: CellCoord,
        stage: BuildStage,
    },
    TowerPlaced {
        tower: TowerId,
        cell: CellCoord,
    },
    TowerFired {
        tower: TowerId,
    },
    ProjectileLaunched {
        projectile: ProjectileId,
        tower: TowerId,
    },
    ProjectileImpacted {
        projectile: ProjectileId,
        creep: Option<CreepId>,
    },
    WaveSpawned {
        wave: u32,
        creeps: u32,
    },
    GoldChanged {
        gold: u32,
    },
    PlayerHealthChanged {
        health: u32,
    },
    PlayerDefeated,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match *event {
            Event::TimeAdvanced { dt } => Self::TimeAdvanced {
                dt_micros: dt.as_micros(),
            },
            Event::CreepSpawned { creep, position } => Self::CreepSpawned {
                creep,
                position: (position.x.to_bits(), position.y.to_bits()),
            },
            Event::CreepEscaped { creep, damage } => Self::CreepEscaped { creep, damage },
            Event::CreepKilled { creep, gold_reward } => Self::CreepKilled { creep, gold_reward },
            Event::BuildQueued { kind, cell } => Self::BuildQueued { kind, cell },
            Event::BuildRejected { cell, reason, .. } => Self::BuildRejected { cell, reason },
            Event::BuildStageAdvanced { cell, stage } => Self::BuildStageAdvanced { cell, stage },
            Event::TowerPlaced { tower, cell, .. } => Self::TowerPlaced { tower, cell },
            Event::TowerFired { tower } => Self::TowerFired { tower },
            Event::ProjectileLaunched {
                projectile, tower, ..
            } => Self::ProjectileLaunched { projectile, tower },
            Event::ProjectileImpacted { projectile, creep } => {
                Self::ProjectileImpacted { projectile, creep }
            }
            Event::WaveSpawned { wave, creeps } => Self::WaveSpawned { wave, creeps },
            Event::GoldChanged { gold } => Self::GoldChanged { gold },
            Event::PlayerHealthChanged { health } => Self::PlayerHealthChanged { health },
            Event::PlayerDefeated => Self::PlayerDefeated,
        }
    }
}
