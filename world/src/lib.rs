#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bulwark.
//!
//! The [`World`] owns every system collection plus the economy. Adapters drive
//! it exclusively through [`apply`], which runs one [`Command`] to completion
//! and reports what happened as [`Event`] values. Renderers read state through
//! the [`query`] module.

mod config;
mod economy;

use std::fmt;
use std::time::Duration;

use bulwark_core::{
    AnimationCatalog, CellCoord, Command, Event, MapBounds, Path, PlacementError, ProjectileLaunch,
    StandardCatalog, TowerKind,
};
use bulwark_system_builder::{BuildCompletion, BuildQueue};
use bulwark_system_movement::{CreepBlueprint, Creeps};
use bulwark_system_projectiles::Projectiles;
use bulwark_system_spawning::{SpawnOrder, Spawning};
use bulwark_system_tower_combat::Towers;
use bulwark_system_tower_targeting::{TargetCandidate, TargetScan};
use tracing::{debug, info, warn};

pub use config::{
    ConfigError, CreepConfig, EconomyConfig, MapConfig, SimulationConfig, TowerPlacement,
    WaveConfig,
};

use economy::Economy;

/// Stats stamped onto every creep the world spawns.
#[derive(Clone, Copy, Debug)]
struct CreepStats {
    max_health: f32,
    escape_damage: u32,
    kill_reward: u32,
}

impl CreepStats {
    fn blueprint(self, speed: f32, start_delay: Duration) -> CreepBlueprint {
        CreepBlueprint {
            max_health: self.max_health,
            speed,
            start_delay,
            escape_damage: self.escape_damage,
            kill_reward: self.kill_reward,
        }
    }
}

/// Represents the authoritative Bulwark world state.
pub struct World {
    bounds: MapBounds,
    path: Path,
    catalog: Box<dyn AnimationCatalog>,
    creeps: Creeps,
    builds: BuildQueue,
    towers: Towers,
    projectiles: Projectiles,
    spawning: Option<Spawning>,
    economy: Economy,
    creep_stats: CreepStats,
    scan: TargetScan,
    completions: Vec<BuildCompletion>,
    launches: Vec<ProjectileLaunch>,
    spawn_orders: Vec<SpawnOrder>,
    elapsed: Duration,
}

impl World {
    /// Creates a world with the stock configuration and animation assets.
    #[must_use]
    pub fn new() -> Self {
        let config = SimulationConfig::default();
        Self::assemble(
            &config,
            Box::new(StandardCatalog::new()),
            config.spawning().ok(),
            config.income_interval().unwrap_or_default(),
        )
    }

    /// Creates a world from a configuration, validating it first.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_catalog(config, Box::new(StandardCatalog::new()))
    }

    /// Creates a world that reads animation assets from `catalog`.
    pub fn with_catalog(
        config: &SimulationConfig,
        catalog: Box<dyn AnimationCatalog>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawning = config.spawning()?;
        let income_interval = config.income_interval()?;
        Ok(Self::assemble(config, catalog, Some(spawning), income_interval))
    }

    fn assemble(
        config: &SimulationConfig,
        catalog: Box<dyn AnimationCatalog>,
        spawning: Option<bulwark_system_spawning::Config>,
        income_interval: Duration,
    ) -> Self {
        let spawning = spawning
            .filter(|_| config.waves.enabled)
            .map(Spawning::new);
        Self {
            bounds: MapBounds::new(config.map.width, config.map.height),
            path: Path::new(config.map.path.clone()),
            catalog,
            creeps: Creeps::new(),
            builds: BuildQueue::new(),
            towers: Towers::new(),
            projectiles: Projectiles::new(),
            spawning,
            economy: Economy::new(
                config.economy.starting_gold,
                config.economy.starting_health,
                config.economy.tower_cost,
                config.economy.income_amount,
                income_interval,
            ),
            creep_stats: CreepStats {
                max_health: config.creeps.max_health,
                escape_damage: config.creeps.escape_damage,
                kill_reward: config.creeps.kill_reward,
            },
            scan: TargetScan::new(),
            completions: Vec::new(),
            launches: Vec::new(),
            spawn_orders: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("bounds", &self.bounds)
            .field("path", &self.path)
            .field("creeps", &self.creeps)
            .field("builds", &self.builds)
            .field("towers", &self.towers)
            .field("projectiles", &self.projectiles)
            .field("spawning", &self.spawning)
            .field("economy", &self.economy)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMap { width, height } => {
            world.bounds = MapBounds::new(width, height);
            debug!(width, height, "map configured");
        }
        Command::SetPath { waypoints } => {
            world.path = Path::new(waypoints);
            debug!(waypoints = world.path.len(), "path replaced");
        }
        Command::SpawnCreep { speed, start_delay } => {
            let blueprint = world.creep_stats.blueprint(speed, start_delay);
            let creep = world
                .creeps
                .spawn(&world.path, blueprint, world.catalog.as_ref(), out_events);
            debug!(creep = creep.get(), speed, "creep spawned");
        }
        Command::QueueBuild { kind, cell } => queue_build(world, kind, cell, out_events),
        Command::Tick { dt } => {
            if world.economy.is_defeated() {
                return;
            }
            tick(world, dt, out_events);
        }
    }
}

fn queue_build(world: &mut World, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
    let verdict = if !world.bounds.contains_cell(cell) {
        Err(PlacementError::OutOfBounds)
    } else if world.towers.is_occupied(cell) || world.builds.is_pending(cell) {
        Err(PlacementError::Occupied)
    } else if !world.economy.can_afford_tower() {
        Err(PlacementError::InsufficientGold)
    } else {
        world.builds.queue(cell, kind, world.catalog.as_ref())
    };

    match verdict {
        Ok(()) => {
            let gold = world.economy.spend_on_tower();
            debug!(
                kind = kind.name(),
                column = cell.column(),
                row = cell.row(),
                gold,
                "build queued"
            );
            out_events.push(Event::BuildQueued { kind, cell });
            out_events.push(Event::GoldChanged { gold });
        }
        Err(reason) => {
            debug!(
                kind = kind.name(),
                column = cell.column(),
                row = cell.row(),
                ?reason,
                "build rejected"
            );
            out_events.push(Event::BuildRejected { kind, cell, reason });
        }
    }
}

fn tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    let tick_start = out_events.len();
    world.elapsed = world.elapsed.saturating_add(dt);
    out_events.push(Event::TimeAdvanced { dt });

    let catalog = world.catalog.as_ref();
    world.creeps.tick(dt, world.bounds, catalog, out_events);
    world
        .builds
        .tick(dt, catalog, &mut world.completions, out_events);

    for completion in world.completions.drain(..) {
        match world.towers.place(completion.kind, completion.cell, catalog) {
            Ok(tower) => {
                debug!(
                    tower = tower.get(),
                    kind = completion.kind.name(),
                    column = completion.cell.column(),
                    row = completion.cell.row(),
                    "tower placed"
                );
                out_events.push(Event::TowerPlaced {
                    tower,
                    kind: completion.kind,
                    cell: completion.cell,
                });
            }
            Err(reason) => warn!(?reason, "finished construction could not be placed"),
        }
    }

    world
        .scan
        .prepare(world.creeps.targetable().map(|creep| TargetCandidate {
            id: creep.id(),
            position: creep.position(),
        }));
    world
        .towers
        .tick(dt, &world.scan, &mut world.launches, out_events);
    for launch in world.launches.drain(..) {
        let _ = world.projectiles.spawn(launch, catalog, out_events);
    }
    world
        .projectiles
        .tick(dt, catalog, &mut world.creeps, out_events);

    let _ = world.creeps.reap();
    let _ = world.projectiles.reap();

    settle_economy(world, tick_start, out_events);
    if world.economy.is_defeated() {
        return;
    }

    if let Some(gold) = world.economy.accrue(dt) {
        out_events.push(Event::GoldChanged { gold });
    }

    direct_waves(world, tick_start, out_events);
}

fn settle_economy(world: &mut World, tick_start: usize, out_events: &mut Vec<Event>) {
    let tick_end = out_events.len();
    for index in tick_start..tick_end {
        match out_events[index] {
            Event::CreepEscaped { creep, damage } => {
                let change = world.economy.damage(damage);
                debug!(
                    creep = creep.get(),
                    damage,
                    health = change.health,
                    "creep escaped"
                );
                out_events.push(Event::PlayerHealthChanged {
                    health: change.health,
                });
                if change.defeated_now {
                    info!(elapsed = ?world.elapsed, "player defeated");
                    out_events.push(Event::PlayerDefeated);
                }
            }
            Event::CreepKilled { creep, gold_reward } => {
                let gold = world.economy.reward(gold_reward);
                debug!(creep = creep.get(), gold_reward, gold, "creep killed");
                out_events.push(Event::GoldChanged { gold });
            }
            _ => {}
        }
    }
}

fn direct_waves(world: &mut World, tick_start: usize, out_events: &mut Vec<Event>) {
    let Some(spawning) = world.spawning.as_mut() else {
        return;
    };

    world.spawn_orders.clear();
    let Some(release) = spawning.handle(
        &out_events[tick_start..],
        world.creeps.len(),
        &mut world.spawn_orders,
    ) else {
        return;
    };

    info!(wave = release.wave, creeps = release.creeps, "wave spawned");
    out_events.push(Event::WaveSpawned {
        wave: release.wave,
        creeps: release.creeps,
    });
    for order in world.spawn_orders.drain(..) {
        let blueprint = world.creep_stats.blueprint(order.speed, order.start_delay);
        let creep = world
            .creeps
            .spawn(&world.path, blueprint, world.catalog.as_ref(), out_events);
        debug!(creep = creep.get(), speed = order.speed, "creep spawned");
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use bulwark_core::{BuildSnapshot, CreepView, MapBounds, Path, ProjectileSnapshot, TowerView};

    use super::World;

    /// Captures a read-only view of the creeps on the map.
    #[must_use]
    pub fn creep_view(world: &World) -> CreepView {
        CreepView::from_snapshots(world.creeps.snapshots())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots())
    }

    /// Construction sites in the order they were queued.
    #[must_use]
    pub fn builds(world: &World) -> Vec<BuildSnapshot> {
        world.builds.snapshots()
    }

    /// Projectiles in flight or playing their impact, in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.snapshots()
    }

    /// Current gold balance.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.economy.gold()
    }

    /// Remaining player health.
    #[must_use]
    pub fn player_health(world: &World) -> u32 {
        world.economy.health()
    }

    /// Reports whether the player has been defeated.
    #[must_use]
    pub fn is_defeated(world: &World) -> bool {
        world.economy.is_defeated()
    }

    /// Number of waves released so far; zero when waves are disabled.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world
            .spawning
            .as_ref()
            .map_or(0, |spawning| spawning.waves_released())
    }

    /// Playable map bounds.
    #[must_use]
    pub fn bounds(world: &World) -> MapBounds {
        world.bounds
    }

    /// Path handed to newly spawned creeps.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.path
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}
