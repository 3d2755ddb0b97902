//! Single creep: path follower plus lifecycle state machine.

use std::time::Duration;

use bulwark_core::{
    AnimationCatalog, AnimationClock, AnimationKey, CreepId, CreepPhase, CreepPose,
    CreepSnapshot, Direction, MapBounds, Path,
};
use glam::Vec2;

/// Health assigned to creeps unless configured otherwise.
pub const DEFAULT_MAX_HEALTH: f32 = 20.0;
/// Player damage dealt by an escaping creep unless configured otherwise.
pub const DEFAULT_ESCAPE_DAMAGE: u32 = 2;
/// Gold awarded for a kill unless configured otherwise.
pub const DEFAULT_KILL_REWARD: u32 = 15;

/// Parameters applied to a creep when it spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreepBlueprint {
    /// Health the creep starts with.
    pub max_health: f32,
    /// Movement speed in tiles per second.
    pub speed: f32,
    /// Time spent waiting at the spawn point before walking.
    pub start_delay: Duration,
    /// Player damage dealt when the creep escapes.
    pub escape_damage: u32,
    /// Gold awarded when the creep is killed.
    pub kill_reward: u32,
}

impl CreepBlueprint {
    /// Creates a blueprint with the stock health, escape damage and reward.
    #[must_use]
    pub const fn new(speed: f32, start_delay: Duration) -> Self {
        Self {
            max_health: DEFAULT_MAX_HEALTH,
            speed,
            start_delay,
            escape_damage: DEFAULT_ESCAPE_DAMAGE,
            kill_reward: DEFAULT_KILL_REWARD,
        }
    }
}

/// Result of applying damage to a creep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The creep was dying or gone, or the amount was not positive.
    Ignored,
    /// Health dropped but the creep survived.
    Wounded,
    /// Health reached zero and the creep started dying.
    Killed,
}

/// Result of a single creep update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CreepStep {
    Stayed,
    Escaped,
}

/// Creep walking a private copy of the path.
#[derive(Clone, Debug)]
pub struct Creep {
    id: CreepId,
    path: Path,
    path_index: usize,
    position: Vec2,
    speed: f32,
    health: f32,
    max_health: f32,
    facing: Direction,
    phase: CreepPhase,
    start_delay: Duration,
    elapsed: Duration,
    escape_damage: u32,
    kill_reward: u32,
    animation: Option<AnimationClock>,
}

impl Creep {
    /// Creates a creep standing on the first waypoint of `path`.
    #[must_use]
    pub fn new(
        id: CreepId,
        path: Path,
        blueprint: CreepBlueprint,
        catalog: &dyn AnimationCatalog,
    ) -> Self {
        let facing = Direction::East;
        let max_health = sanitize(blueprint.max_health);
        Self {
            id,
            position: path.start(),
            path,
            path_index: 0,
            speed: sanitize(blueprint.speed),
            health: max_health,
            max_health,
            facing,
            phase: CreepPhase::Spawning,
            start_delay: blueprint.start_delay,
            elapsed: Duration::ZERO,
            escape_damage: blueprint.escape_damage,
            kill_reward: blueprint.kill_reward,
            animation: AnimationClock::from_catalog(
                catalog,
                pose_key(CreepPose::Idle, facing),
                true,
            ),
        }
    }

    /// Identifier of the creep.
    #[must_use]
    pub const fn id(&self) -> CreepId {
        self.id
    }

    /// Continuous position in tiles.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> CreepPhase {
        self.phase
    }

    /// Index of the last waypoint reached.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Direction the creep faces.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Player damage dealt when the creep escapes.
    #[must_use]
    pub const fn escape_damage(&self) -> u32 {
        self.escape_damage
    }

    /// Gold awarded when the creep is killed.
    #[must_use]
    pub const fn kill_reward(&self) -> u32 {
        self.kill_reward
    }

    /// Animation currently attached to the creep, if any.
    #[must_use]
    pub fn animation(&self) -> Option<&AnimationClock> {
        self.animation.as_ref()
    }

    /// Reports whether towers may aim at and projectiles may hit the creep.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        matches!(self.phase, CreepPhase::Spawning | CreepPhase::Moving)
    }

    /// Applies damage, entering the dying phase when health reaches zero.
    pub fn take_damage(&mut self, amount: f32, catalog: &dyn AnimationCatalog) -> DamageOutcome {
        if !self.is_targetable() || amount.is_nan() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - amount).max(0.0);
        if self.health > 0.0 {
            return DamageOutcome::Wounded;
        }

        self.phase = CreepPhase::Dying;
        self.animation = AnimationClock::from_catalog(
            catalog,
            pose_key(CreepPose::Death, self.facing),
            false,
        );
        DamageOutcome::Killed
    }

    pub(crate) fn tick(
        &mut self,
        dt: Duration,
        bounds: MapBounds,
        catalog: &dyn AnimationCatalog,
    ) -> CreepStep {
        match self.phase {
            CreepPhase::Inactive => return CreepStep::Stayed,
            CreepPhase::Dying => {
                self.advance_animation(dt);
                if !self.animation.as_ref().is_some_and(AnimationClock::is_playing) {
                    self.phase = CreepPhase::Inactive;
                }
                return CreepStep::Stayed;
            }
            CreepPhase::Spawning => {
                self.elapsed = self.elapsed.saturating_add(dt);
                if self.elapsed < self.start_delay {
                    self.advance_animation(dt);
                    return CreepStep::Stayed;
                }
                self.phase = CreepPhase::Moving;
            }
            CreepPhase::Moving => {}
        }

        if self.path.is_empty() {
            self.advance_animation(dt);
            return CreepStep::Stayed;
        }

        self.walk(dt.as_secs_f32() * self.speed);

        if bounds.is_escaped(self.position) {
            self.phase = CreepPhase::Inactive;
            return CreepStep::Escaped;
        }

        self.select_animation(catalog);
        self.advance_animation(dt);
        CreepStep::Stayed
    }

    fn walk(&mut self, distance: f32) {
        // Zero-length segments are skipped without spending any of `distance`.
        loop {
            let Some(target) = self.path.get(self.path_index + 1) else {
                self.position += self.path.exit_direction() * distance;
                return;
            };

            let delta = target.position() - self.position;
            let remaining = delta.length();
            if remaining <= 0.0 {
                self.path_index += 1;
                continue;
            }

            if distance >= remaining {
                self.position = target.position();
                self.path_index += 1;
            } else {
                self.position += delta / remaining * distance;
            }
            self.facing = Direction::from_delta(delta);
            return;
        }
    }

    // Swaps clocks only when the frame set changes so a running cycle is not
    // restarted. A missing asset keeps whatever was playing.
    fn select_animation(&mut self, catalog: &dyn AnimationCatalog) {
        let key = pose_key(CreepPose::Walk, self.facing);
        if self.animation.as_ref().map(AnimationClock::key) == Some(key) {
            return;
        }
        if let Some(clock) = AnimationClock::from_catalog(catalog, key, true) {
            self.animation = Some(clock);
        }
    }

    fn advance_animation(&mut self, dt: Duration) {
        if let Some(clock) = self.animation.as_mut() {
            clock.advance(dt);
        }
    }

    /// Captures an immutable snapshot of the creep.
    #[must_use]
    pub fn snapshot(&self) -> CreepSnapshot {
        CreepSnapshot {
            id: self.id,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            facing: self.facing,
            phase: self.phase,
            path_index: self.path_index,
            frame: self.animation.as_ref().and_then(AnimationClock::frame),
        }
    }
}

fn pose_key(pose: CreepPose, facing: Direction) -> AnimationKey {
    AnimationKey::Creep {
        pose,
        view: facing.sprite_view(),
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::{SpriteView, StandardCatalog, Waypoint};

    fn straight_path() -> Path {
        Path::new(vec![Waypoint::new(0, 0), Waypoint::new(5, 0)])
    }

    #[test]
    fn damage_is_clamped_and_kills_once() {
        let catalog = StandardCatalog::new();
        let mut creep = Creep::new(
            CreepId::new(0),
            straight_path(),
            CreepBlueprint::new(2.0, Duration::ZERO),
            &catalog,
        );

        assert_eq!(creep.take_damage(15.0, &catalog), DamageOutcome::Wounded);
        assert_eq!(creep.take_damage(15.0, &catalog), DamageOutcome::Killed);
        assert_eq!(creep.health(), 0.0);
        assert_eq!(creep.phase(), CreepPhase::Dying);
        assert_eq!(creep.take_damage(15.0, &catalog), DamageOutcome::Ignored);
        assert_eq!(creep.health(), 0.0);
    }

    #[test]
    fn non_positive_damage_is_ignored() {
        let catalog = StandardCatalog::new();
        let mut creep = Creep::new(
            CreepId::new(0),
            straight_path(),
            CreepBlueprint::new(2.0, Duration::ZERO),
            &catalog,
        );
        assert_eq!(creep.take_damage(-4.0, &catalog), DamageOutcome::Ignored);
        assert_eq!(creep.take_damage(f32::NAN, &catalog), DamageOutcome::Ignored);
        assert_eq!(creep.health(), DEFAULT_MAX_HEALTH);
    }

    #[test]
    fn spawning_creep_plays_idle_frames_in_place() {
        let catalog = StandardCatalog::new();
        let mut creep = Creep::new(
            CreepId::new(0),
            straight_path(),
            CreepBlueprint::new(2.0, Duration::from_secs(1)),
            &catalog,
        );
        let bounds = MapBounds::new(5, 5);

        let step = creep.tick(Duration::from_millis(400), bounds, &catalog);
        assert_eq!(step, CreepStep::Stayed);
        assert_eq!(creep.position(), Vec2::ZERO);
        assert_eq!(creep.phase(), CreepPhase::Spawning);
        let frame = creep.snapshot().frame.expect("idle frame");
        assert_eq!(
            frame.key,
            AnimationKey::Creep {
                pose: CreepPose::Idle,
                view: SpriteView::Side
            }
        );
        assert_eq!(frame.frame, 2);
    }

    #[test]
    fn dying_without_death_asset_ends_on_next_update() {
        let catalog = StandardCatalog::new().without(AnimationKey::Creep {
            pose: CreepPose::Death,
            view: SpriteView::Side,
        });
        let mut creep = Creep::new(
            CreepId::new(0),
            straight_path(),
            CreepBlueprint::new(2.0, Duration::ZERO),
            &catalog,
        );
        assert_eq!(creep.take_damage(50.0, &catalog), DamageOutcome::Killed);
        assert!(creep.animation().is_none());

        let _ = creep.tick(Duration::from_millis(16), MapBounds::new(5, 5), &catalog);
        assert_eq!(creep.phase(), CreepPhase::Inactive);
    }

    #[test]
    fn duplicate_waypoints_do_not_stall() {
        let catalog = StandardCatalog::new();
        let path = Path::new(vec![
            Waypoint::new(0, 0),
            Waypoint::new(0, 0),
            Waypoint::new(2, 0),
        ]);
        let mut creep = Creep::new(
            CreepId::new(0),
            path,
            CreepBlueprint::new(1.0, Duration::ZERO),
            &catalog,
        );
        let bounds = MapBounds::new(5, 5);

        let _ = creep.tick(Duration::from_millis(500), bounds, &catalog);
        assert_eq!(creep.path_index(), 1);
        assert!((creep.position().x - 0.5).abs() < 1e-6);
        let _ = creep.tick(Duration::from_millis(500), bounds, &catalog);
        assert_eq!(creep.path_index(), 1);
        assert!((creep.position().x - 1.0).abs() < 1e-6);
    }
}
