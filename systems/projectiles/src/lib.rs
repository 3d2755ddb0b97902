#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile flight, collision and impact playback.
//!
//! Projectiles fly in a straight line at a fixed speed. Before each move a
//! flying projectile tests its collision circle against the targetable creeps
//! and damages the first one it touches. A hit, or reaching the maximum range,
//! switches it to its impact animation; when that ends, or when no impact
//! asset exists, the projectile is flagged for [`Projectiles::reap`].

use std::time::Duration;

use bulwark_core::{
    AnimationCatalog, AnimationClock, AnimationKey, CreepId, Event, ProjectileId,
    ProjectileLaunch, ProjectileMode, ProjectilePhase, ProjectileSnapshot, TowerKind,
    PROJECTILE_COLLISION_RADIUS, PROJECTILE_MAX_RANGE, PROJECTILE_SPEED,
};
use bulwark_system_movement::Creeps;
use glam::Vec2;

/// Projectile in flight or playing its impact.
#[derive(Clone, Debug)]
pub struct Projectile {
    id: ProjectileId,
    kind: TowerKind,
    position: Vec2,
    velocity: Vec2,
    heading: f32,
    traveled: f32,
    mode: ProjectileMode,
    animation: Option<AnimationClock>,
    removed: bool,
}

impl Projectile {
    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Tower type that fired the projectile.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Continuous position in tiles.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity in tiles per second; zero once impacting.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Distance travelled so far.
    #[must_use]
    pub const fn traveled(&self) -> f32 {
        self.traveled
    }

    /// Current flight state.
    #[must_use]
    pub const fn mode(&self) -> ProjectileMode {
        self.mode
    }

    /// Reports whether the projectile is waiting to be reaped.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    fn advance_animation(&mut self, dt: Duration) {
        if let Some(clock) = self.animation.as_mut() {
            clock.advance(dt);
        }
    }

    fn fly(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        self.position += self.velocity * seconds;
        self.traveled += PROJECTILE_SPEED * seconds;
        self.heading = self.velocity.y.atan2(self.velocity.x);
    }

    fn begin_impact(
        &mut self,
        creep: Option<CreepId>,
        catalog: &dyn AnimationCatalog,
        out_events: &mut Vec<Event>,
    ) {
        self.mode = ProjectileMode::Impacting;
        self.velocity = Vec2::ZERO;
        self.animation = AnimationClock::from_catalog(
            catalog,
            AnimationKey::Projectile {
                kind: self.kind,
                phase: ProjectilePhase::Impact,
            },
            false,
        );
        self.removed = self.animation.is_none();
        out_events.push(Event::ProjectileImpacted {
            projectile: self.id,
            creep,
        });
    }

    /// Captures an immutable snapshot of the projectile.
    #[must_use]
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            heading: self.heading,
            traveled: self.traveled,
            mode: self.mode,
            frame: self.animation.as_ref().and_then(AnimationClock::frame),
        }
    }
}

/// Manager that owns every projectile.
#[derive(Debug, Default)]
pub struct Projectiles {
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
}

impl Projectiles {
    /// Creates an empty projectile collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a projectile from a tower launch.
    pub fn spawn(
        &mut self,
        launch: ProjectileLaunch,
        catalog: &dyn AnimationCatalog,
        out_events: &mut Vec<Event>,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);

        let (sin, cos) = launch.angle.sin_cos();
        self.projectiles.push(Projectile {
            id,
            kind: launch.kind,
            position: launch.origin,
            velocity: Vec2::new(cos, sin) * PROJECTILE_SPEED,
            heading: launch.angle,
            traveled: 0.0,
            mode: ProjectileMode::Flying,
            animation: AnimationClock::from_catalog(
                catalog,
                AnimationKey::Projectile {
                    kind: launch.kind,
                    phase: ProjectilePhase::Flight,
                },
                true,
            ),
            removed: false,
        });
        out_events.push(Event::ProjectileLaunched {
            projectile: id,
            kind: launch.kind,
            tower: launch.tower,
        });
        id
    }

    /// Advances every projectile, resolving collisions against `creeps`.
    pub fn tick(
        &mut self,
        dt: Duration,
        catalog: &dyn AnimationCatalog,
        creeps: &mut Creeps,
        out_events: &mut Vec<Event>,
    ) {
        for projectile in &mut self.projectiles {
            if projectile.removed {
                continue;
            }
            projectile.advance_animation(dt);

            match projectile.mode {
                ProjectileMode::Impacting => {
                    if !projectile
                        .animation
                        .as_ref()
                        .is_some_and(AnimationClock::is_playing)
                    {
                        projectile.removed = true;
                    }
                }
                ProjectileMode::Flying => {
                    let hit = creeps.strike_first_within(
                        projectile.position,
                        PROJECTILE_COLLISION_RADIUS,
                        projectile.kind.projectile_damage(),
                        catalog,
                        out_events,
                    );
                    if hit.is_some() {
                        projectile.begin_impact(hit, catalog, out_events);
                        continue;
                    }

                    projectile.fly(dt);
                    if projectile.traveled >= PROJECTILE_MAX_RANGE {
                        projectile.begin_impact(None, catalog, out_events);
                    }
                }
            }
        }
    }

    /// Drops projectiles whose impact has finished, returning how many went.
    pub fn reap(&mut self) -> usize {
        let before = self.projectiles.len();
        self.projectiles.retain(|projectile| !projectile.removed);
        before - self.projectiles.len()
    }

    /// Iterator over projectiles in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.projectiles.iter()
    }

    /// Looks up a projectile by identifier.
    #[must_use]
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|projectile| projectile.id == id)
    }

    /// Number of projectiles held, including those awaiting removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Reports whether no projectiles are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Captures snapshots of the projectiles that are still visible.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.projectiles
            .iter()
            .filter(|projectile| !projectile.removed)
            .map(Projectile::snapshot)
            .collect()
    }
}
