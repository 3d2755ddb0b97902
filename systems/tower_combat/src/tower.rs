//! Placed tower state and its fire-control cycle.

use std::time::Duration;

use bulwark_core::{
    angle::bearing, AnimationCatalog, AnimationClock, AnimationFrame, AnimationKey, AnimationSpec,
    CellCoord, ProjectileLaunch, TowerId, TowerKind, TowerSnapshot, WeaponState,
    INITIAL_WEAPON_HEADING,
};
use bulwark_system_tower_targeting::{AimController, TargetScan};
use glam::Vec2;

/// Outcome of a single tower update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct FireCycle {
    pub(crate) fired: bool,
    pub(crate) launch: Option<ProjectileLaunch>,
}

/// Tower occupying a single cell.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    cell: CellCoord,
    heading: f32,
    cooldown: Duration,
    weapon: Option<AnimationSpec>,
    firing: Option<AnimationClock>,
    idle: Option<AnimationClock>,
    shot_pending: bool,
    latched_target: Option<Vec2>,
}

impl Tower {
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        catalog: &dyn AnimationCatalog,
    ) -> Self {
        let weapon = catalog
            .spec(weapon_key(kind, WeaponState::Fire))
            .filter(|spec| spec.frame_count > 0);
        Self {
            id,
            kind,
            cell,
            heading: INITIAL_WEAPON_HEADING,
            cooldown: Duration::ZERO,
            weapon,
            firing: None,
            idle: AnimationClock::from_catalog(catalog, weapon_key(kind, WeaponState::Idle), true),
            shot_pending: false,
            latched_target: None,
        }
    }

    /// Identifier of the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Type of the tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Cell the tower occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Weapon heading in radians.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Time left before the tower may fire again.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Reports whether a firing animation still owes a projectile.
    #[must_use]
    pub const fn shot_pending(&self) -> bool {
        self.shot_pending
    }

    /// Reports whether the tower has a weapon it can fire.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.weapon.is_some()
    }

    /// Centre of the tower's cell.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.cell.center()
    }

    pub(crate) fn update(
        &mut self,
        dt: Duration,
        scan: &TargetScan,
        aim: &AimController,
    ) -> FireCycle {
        let mut cycle = FireCycle::default();
        self.cooldown = self.cooldown.saturating_sub(dt);

        if let Some(clock) = self.firing.as_mut() {
            clock.advance(dt);
            if !clock.is_playing() {
                self.firing = None;
                cycle.launch = self.release();
            }
        }

        if let Some(clock) = self.idle.as_mut() {
            clock.advance(dt);
        }

        let Some(weapon) = self.weapon else {
            return cycle;
        };
        let center = self.center();
        let Some(target) = scan.nearest(center) else {
            return cycle;
        };

        if self.kind.rotates() {
            self.heading = aim.step(self.heading, bearing(center, target.position), dt);
        }

        if target.distance_sq <= self.kind.range_squared()
            && self.cooldown.is_zero()
            && !self.shot_pending
        {
            let key = weapon_key(self.kind, WeaponState::Fire);
            if let Some(clock) = AnimationClock::new(key, weapon, false) {
                self.firing = Some(clock);
                self.shot_pending = true;
                self.cooldown = self.kind.fire_delay();
                self.latched_target = Some(target.position);
                cycle.fired = true;
            }
        }

        cycle
    }

    fn release(&mut self) -> Option<ProjectileLaunch> {
        if !self.shot_pending {
            return None;
        }
        self.shot_pending = false;

        let origin = self.kind.muzzle(self.center(), self.heading);
        let angle = if self.kind.rotates() {
            self.heading
        } else {
            self.latched_target
                .map_or(self.heading, |target| bearing(self.center(), target))
        };
        Some(ProjectileLaunch {
            tower: self.id,
            kind: self.kind,
            origin,
            angle,
        })
    }

    fn weapon_frame(&self) -> Option<AnimationFrame> {
        if let Some(clock) = &self.firing {
            return clock.frame();
        }
        if let Some(clock) = &self.idle {
            return clock.frame();
        }
        self.weapon.map(|_| AnimationFrame {
            key: weapon_key(self.kind, WeaponState::Fire),
            frame: 0,
        })
    }

    /// Captures an immutable snapshot of the tower.
    #[must_use]
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            heading: self.heading,
            cooldown: self.cooldown,
            shot_pending: self.shot_pending,
            weapon_frame: self.weapon_frame(),
        }
    }
}

fn weapon_key(kind: TowerKind, state: WeaponState) -> AnimationKey {
    AnimationKey::Weapon { kind, state }
}
