#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bulwark combat simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the per-collection systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values that
//! were raised synchronously while the command ran. Systems own their entity
//! collections and exchange read-only snapshots with each other.

use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;

pub mod angle;
pub mod animation;

pub use animation::{
    AnimationCatalog, AnimationClock, AnimationFrame, AnimationKey, AnimationSpec, CreepPose,
    ProjectilePhase, SpriteView, StandardCatalog, WeaponState,
};

/// Distance travelled by a projectile per second, in tiles.
pub const PROJECTILE_SPEED: f32 = 12.0;
/// Distance after which a projectile gives up and plays its impact, in tiles.
pub const PROJECTILE_MAX_RANGE: f32 = 5.0;
/// Collision radius of a projectile, in tiles.
pub const PROJECTILE_COLLISION_RADIUS: f32 = 0.3;
/// Collision radius of a creep, in tiles.
pub const CREEP_COLLISION_RADIUS: f32 = 0.4;
/// Gold deducted when a build order is accepted.
pub const TOWER_COST: u32 = 75;
/// Outward tolerance applied to the map bounds before a creep counts as escaped.
pub const ESCAPE_MARGIN: f32 = 1.0;
/// Heading assigned to freshly placed weapons (pointing up the screen).
pub const INITIAL_WEAPON_HEADING: f32 = -std::f32::consts::FRAC_PI_2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the playable map dimensions.
    ConfigureMap {
        /// Number of tile columns.
        width: u32,
        /// Number of tile rows.
        height: u32,
    },
    /// Replaces the waypoint path handed to creeps spawned from now on.
    ///
    /// Creeps already on the map keep the copy they received at spawn time.
    SetPath {
        /// Ordered waypoints forming the new path.
        waypoints: Vec<Waypoint>,
    },
    /// Spawns a single creep at the start of the current path.
    SpawnCreep {
        /// Movement speed in tiles per second.
        speed: f32,
        /// Time the creep waits before it starts walking.
        start_delay: Duration,
    },
    /// Requests construction of a tower on the provided cell.
    QueueBuild {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the finished tower will occupy.
        cell: CellCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events raised by the world while processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a creep entered the map.
    CreepSpawned {
        /// Identifier assigned to the creep.
        creep: CreepId,
        /// Position the creep starts from.
        position: Vec2,
    },
    /// Reports that a creep walked off the map.
    CreepEscaped {
        /// Identifier of the creep that escaped.
        creep: CreepId,
        /// Damage dealt to the player by the escape.
        damage: u32,
    },
    /// Reports that a creep's health reached zero.
    CreepKilled {
        /// Identifier of the creep that was killed.
        creep: CreepId,
        /// Gold awarded for the kill.
        gold_reward: u32,
    },
    /// Confirms that a build order was accepted.
    BuildQueued {
        /// Type of tower under construction.
        kind: TowerKind,
        /// Cell reserved for the tower.
        cell: CellCoord,
    },
    /// Reports that a build order was refused.
    BuildRejected {
        /// Type of tower requested.
        kind: TowerKind,
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the order failed.
        reason: PlacementError,
    },
    /// Announces that a construction site moved to a new stage.
    BuildStageAdvanced {
        /// Cell of the construction site.
        cell: CellCoord,
        /// Stage the site entered.
        stage: BuildStage,
    },
    /// Confirms that a finished tower joined the map.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
    },
    /// Reports that a tower started its firing animation.
    TowerFired {
        /// Identifier of the tower that fired.
        tower: TowerId,
    },
    /// Reports that a firing animation released its projectile.
    ProjectileLaunched {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Tower type the projectile originates from.
        kind: TowerKind,
        /// Tower that released the projectile.
        tower: TowerId,
    },
    /// Reports that a projectile stopped flying.
    ProjectileImpacted {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Creep that was hit, or `None` when the projectile ran out of range.
        creep: Option<CreepId>,
    },
    /// Announces that a new wave of creeps entered the map.
    WaveSpawned {
        /// One-based wave number.
        wave: u32,
        /// Number of creeps in the wave.
        creeps: u32,
    },
    /// Reports the player's gold balance after it changed.
    GoldChanged {
        /// Gold available after the change.
        gold: u32,
    },
    /// Reports the player's health after it changed.
    PlayerHealthChanged {
        /// Health remaining after the change.
        health: u32,
    },
    /// Announces that the player ran out of health.
    PlayerDefeated,
}

/// Unique identifier assigned to a creep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CreepId(u32);

impl CreepId {
    /// Creates a new creep identifier with the provided numeric value.
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

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Continuous coordinate of the cell's centre, in tiles.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Fixed grid coordinate that forms one step of a creep path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Waypoint {
    /// Column of the waypoint. May lie outside the map for off-screen entries.
    pub x: i32,
    /// Row of the waypoint. May lie outside the map for off-screen entries.
    pub y: i32,
}

impl Waypoint {
    /// Creates a new waypoint.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Waypoint expressed as a continuous position.
    #[must_use]
    pub fn position(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Ordered, immutable list of waypoints followed by creeps.
///
/// Creeps receive their own copy when they spawn, so replacing the world's
/// path never redirects creeps that are already walking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    /// Creates a path from the provided waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Number of waypoints in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint stored at the provided index, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Waypoint> {
        self.waypoints.get(index).copied()
    }

    /// Position a creep spawned on this path starts from.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints
            .first()
            .map_or(Vec2::ZERO, |waypoint| waypoint.position())
    }

    /// Unit direction creeps keep walking in once the last waypoint is reached.
    ///
    /// This extrapolates the final segment. Paths with fewer than two points, or
    /// whose final segment has zero length, exit to the right.
    #[must_use]
    pub fn exit_direction(&self) -> Vec2 {
        let [.., previous, last] = self.waypoints.as_slice() else {
            return Vec2::X;
        };
        (last.position() - previous.position())
            .try_normalize()
            .unwrap_or(Vec2::X)
    }
}

/// Cardinal directions a creep can face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Facing toward decreasing row indices.
    North,
    /// Facing toward increasing column indices.
    East,
    /// Facing toward increasing row indices.
    South,
    /// Facing toward decreasing column indices.
    West,
}

impl Direction {
    /// Picks the facing that best matches a movement delta.
    ///
    /// The axis with the larger magnitude wins; horizontal wins ties.
    #[must_use]
    pub fn from_delta(delta: Vec2) -> Self {
        if delta.x.abs() >= delta.y.abs() {
            if delta.x > 0.0 {
                Self::East
            } else {
                Self::West
            }
        } else if delta.y > 0.0 {
            Self::South
        } else {
            Self::North
        }
    }

    /// Frame set used to draw a creep facing this direction.
    #[must_use]
    pub const fn sprite_view(self) -> SpriteView {
        match self {
            Self::North => SpriteView::Up,
            Self::South => SpriteView::Down,
            Self::East | Self::West => SpriteView::Side,
        }
    }
}

/// Playable map size measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapBounds {
    columns: u32,
    rows: u32,
}

impl MapBounds {
    /// Creates bounds spanning the provided number of columns and rows.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies on the map.
    #[must_use]
    pub const fn contains_cell(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether a position lies beyond the map plus [`ESCAPE_MARGIN`].
    #[must_use]
    pub fn is_escaped(&self, position: Vec2) -> bool {
        let width = self.columns as f32;
        let height = self.rows as f32;
        position.x < -ESCAPE_MARGIN
            || position.y < -ESCAPE_MARGIN
            || position.x > width + ESCAPE_MARGIN
            || position.y > height + ESCAPE_MARGIN
    }
}

/// Types of towers that can be constructed.
///
/// Every per-type constant lives in this lookup table so the systems never
/// branch on raw identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Rotating crossbow that shoots bolts along its heading.
    Ballista,
    /// Stationary crystal that lobs orbs at the creep it locked onto.
    Arcane,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 2] = [Self::Ballista, Self::Arcane];

    /// Returns the tower's targeting range measured in tiles.
    #[must_use]
    pub const fn range_in_tiles(self) -> f32 {
        match self {
            Self::Ballista | Self::Arcane => 5.0,
        }
    }

    /// Square of [`Self::range_in_tiles`], compared against squared distances.
    #[must_use]
    pub fn range_squared(self) -> f32 {
        let range = self.range_in_tiles();
        range * range
    }

    /// Time the tower waits between firing cycles.
    #[must_use]
    pub const fn fire_delay(self) -> Duration {
        match self {
            Self::Ballista | Self::Arcane => Duration::from_millis(1_500),
        }
    }

    /// Reports whether the weapon turns toward its target.
    #[must_use]
    pub const fn rotates(self) -> bool {
        matches!(self, Self::Ballista)
    }

    /// Damage applied by a projectile fired from this tower type.
    #[must_use]
    pub const fn projectile_damage(self) -> f32 {
        match self {
            Self::Ballista => 25.0,
            Self::Arcane => 20.0,
        }
    }

    /// Position a projectile leaves the weapon from.
    ///
    /// `center` is the centre of the tower's cell and `heading` the weapon
    /// heading in radians. Ballista bolts leave from the tip of the bow, which
    /// sits on a circle around the pivot raised one tile above the base. Arcane
    /// orbs leave from the crystal above the tower regardless of heading.
    #[must_use]
    pub fn muzzle(self, center: Vec2, heading: f32) -> Vec2 {
        match self {
            Self::Ballista => {
                let (sin, cos) = heading.sin_cos();
                center + Vec2::new(cos, sin) * 0.4 + Vec2::new(0.0, -1.0)
            }
            Self::Arcane => center + Vec2::new(0.0, -1.3),
        }
    }

    /// Lower-case name used in configuration files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ballista => "ballista",
            Self::Arcane => "arcane",
        }
    }
}

/// Reasons a build order may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The requested cell lies outside the map.
    OutOfBounds,
    /// A tower or a construction site already holds the cell.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientGold,
}

/// Construction sub-state preceding a tower becoming active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuildStage {
    /// Scaffolding is being raised.
    Building,
    /// Scaffolding turns into the finished tower.
    Transitioning,
}

/// Lifecycle of a creep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreepPhase {
    /// Waiting for its start delay; position is frozen.
    Spawning,
    /// Walking the path or walking off the map.
    Moving,
    /// Playing the death animation; health and position are frozen.
    Dying,
    /// Escaped or finished dying; awaiting removal.
    Inactive,
}

/// Flight state of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileMode {
    /// Travelling along its velocity.
    Flying,
    /// Playing the impact animation in place.
    Impacting,
}

/// Projectile released by a tower when its firing animation ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileLaunch {
    /// Tower that released the projectile.
    pub tower: TowerId,
    /// Tower type, which decides damage and visuals.
    pub kind: TowerKind,
    /// Muzzle position the projectile starts from.
    pub origin: Vec2,
    /// Launch angle in radians.
    pub angle: f32,
}

/// Immutable representation of a single creep's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CreepSnapshot {
    /// Unique identifier assigned to the creep.
    pub id: CreepId,
    /// Continuous position in tiles.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Health the creep spawned with.
    pub max_health: f32,
    /// Direction the creep faces.
    pub facing: Direction,
    /// Current lifecycle phase.
    pub phase: CreepPhase,
    /// Index of the last waypoint reached.
    pub path_index: usize,
    /// Frame a renderer should draw, if any.
    pub frame: Option<AnimationFrame>,
}

/// Read-only snapshot describing all creeps on the map.
#[derive(Clone, Debug, Default)]
pub struct CreepView {
    snapshots: Vec<CreepSnapshot>,
}

impl CreepView {
    /// Creates a new creep view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CreepSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured creep snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CreepSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CreepSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Weapon heading in radians, normalised to (−π, π].
    pub heading: f32,
    /// Time remaining before the tower may fire again.
    pub cooldown: Duration,
    /// Indicates a firing animation that has not released its projectile yet.
    pub shot_pending: bool,
    /// Weapon frame a renderer should draw, if any.
    pub weapon_frame: Option<AnimationFrame>,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a construction site.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildSnapshot {
    /// Cell reserved for the tower.
    pub cell: CellCoord,
    /// Tower that will be placed once construction finishes.
    pub kind: TowerKind,
    /// Current construction stage.
    pub stage: BuildStage,
    /// Frame a renderer should draw, if any.
    pub frame: Option<AnimationFrame>,
}

/// Immutable representation of a projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower type the projectile originates from.
    pub kind: TowerKind,
    /// Continuous position in tiles.
    pub position: Vec2,
    /// Sprite orientation derived from the velocity, in radians.
    pub heading: f32,
    /// Distance travelled so far, in tiles.
    pub traveled: f32,
    /// Flight state.
    pub mode: ProjectileMode,
    /// Frame a renderer should draw, if any.
    pub frame: Option<AnimationFrame>,
}
