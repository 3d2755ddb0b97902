#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Creep locomotion along waypoint paths and the creep lifecycle.
//!
//! [`Creeps`] owns every creep on the map. Each tick it moves them along their
//! private path copies, reports escapes, and lets other systems damage them
//! through [`Creeps::strike_first_within`] and [`Creeps::damage`]. Inactive
//! creeps stay in the collection until [`Creeps::reap`] compacts it so the
//! scan order stays stable within a tick.

mod creep;

use std::time::Duration;

use bulwark_core::{
    AnimationCatalog, CreepId, CreepPhase, CreepSnapshot, Event, MapBounds, Path,
    CREEP_COLLISION_RADIUS,
};
use glam::Vec2;

pub use creep::{
    Creep, CreepBlueprint, DamageOutcome, DEFAULT_ESCAPE_DAMAGE, DEFAULT_KILL_REWARD,
    DEFAULT_MAX_HEALTH,
};

use creep::CreepStep;

/// Manager that owns the live creep collection.
#[derive(Debug, Default)]
pub struct Creeps {
    creeps: Vec<Creep>,
    next_creep_id: u32,
}

impl Creeps {
    /// Creates an empty creep collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a creep at the start of `path`, copying the path into it.
    pub fn spawn(
        &mut self,
        path: &Path,
        blueprint: CreepBlueprint,
        catalog: &dyn AnimationCatalog,
        out_events: &mut Vec<Event>,
    ) -> CreepId {
        let id = CreepId::new(self.next_creep_id);
        self.next_creep_id = self.next_creep_id.wrapping_add(1);

        let creep = Creep::new(id, path.clone(), blueprint, catalog);
        out_events.push(Event::CreepSpawned {
            creep: id,
            position: creep.position(),
        });
        self.creeps.push(creep);
        id
    }

    /// Advances every creep by `dt`, reporting escapes.
    pub fn tick(
        &mut self,
        dt: Duration,
        bounds: MapBounds,
        catalog: &dyn AnimationCatalog,
        out_events: &mut Vec<Event>,
    ) {
        for creep in &mut self.creeps {
            if creep.tick(dt, bounds, catalog) == CreepStep::Escaped {
                out_events.push(Event::CreepEscaped {
                    creep: creep.id(),
                    damage: creep.escape_damage(),
                });
            }
        }
    }

    /// Damages the creep with the provided identifier.
    pub fn damage(
        &mut self,
        id: CreepId,
        amount: f32,
        catalog: &dyn AnimationCatalog,
        out_events: &mut Vec<Event>,
    ) -> DamageOutcome {
        let Some(creep) = self.creeps.iter_mut().find(|creep| creep.id() == id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = creep.take_damage(amount, catalog);
        if outcome == DamageOutcome::Killed {
            out_events.push(Event::CreepKilled {
                creep: id,
                gold_reward: creep.kill_reward(),
            });
        }
        outcome
    }

    /// Damages the first targetable creep overlapping a circle.
    ///
    /// Creeps are scanned in collection order and the first one whose
    /// collision circle touches the provided one is hit. Returns the creep that
    /// was struck, if any.
    pub fn strike_first_within(
        &mut self,
        point: Vec2,
        radius: f32,
        amount: f32,
        catalog: &dyn AnimationCatalog,
        out_events: &mut Vec<Event>,
    ) -> Option<CreepId> {
        let reach = radius + CREEP_COLLISION_RADIUS;
        let reach_sq = reach * reach;
        let creep = self.creeps.iter_mut().find(|creep| {
            creep.is_targetable() && creep.position().distance_squared(point) <= reach_sq
        })?;

        if creep.take_damage(amount, catalog) == DamageOutcome::Killed {
            out_events.push(Event::CreepKilled {
                creep: creep.id(),
                gold_reward: creep.kill_reward(),
            });
        }
        Some(creep.id())
    }

    /// Removes creeps that escaped or finished dying, returning how many went.
    pub fn reap(&mut self) -> usize {
        let before = self.creeps.len();
        self.creeps.retain(|creep| creep.phase() != CreepPhase::Inactive);
        before - self.creeps.len()
    }

    /// Iterator over creeps that may be targeted or hit, in scan order.
    pub fn targetable(&self) -> impl Iterator<Item = &Creep> + '_ {
        self.creeps.iter().filter(|creep| creep.is_targetable())
    }

    /// Iterator over every creep in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &Creep> + '_ {
        self.creeps.iter()
    }

    /// Looks up a creep by identifier.
    #[must_use]
    pub fn get(&self, id: CreepId) -> Option<&Creep> {
        self.creeps.iter().find(|creep| creep.id() == id)
    }

    /// Number of creeps held, including those awaiting removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.creeps.len()
    }

    /// Reports whether no creeps are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creeps.is_empty()
    }

    /// Captures snapshots of every creep.
    #[must_use]
    pub fn snapshots(&self) -> Vec<CreepSnapshot> {
        self.creeps.iter().map(Creep::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::{StandardCatalog, Waypoint};

    #[test]
    fn identifiers_increase_per_spawn() {
        let catalog = StandardCatalog::new();
        let mut creeps = Creeps::new();
        let mut events = Vec::new();
        let path = Path::new(vec![Waypoint::new(1, 2)]);
        let blueprint = CreepBlueprint::new(2.0, Duration::ZERO);

        let first = creeps.spawn(&path, blueprint, &catalog, &mut events);
        let second = creeps.spawn(&path, blueprint, &catalog, &mut events);

        assert_eq!(first, CreepId::new(0));
        assert_eq!(second, CreepId::new(1));
        assert_eq!(
            events.first(),
            Some(&Event::CreepSpawned {
                creep: first,
                position: Vec2::new(1.0, 2.0),
            })
        );
    }

    #[test]
    fn strike_misses_creeps_outside_summed_radii() {
        let catalog = StandardCatalog::new();
        let mut creeps = Creeps::new();
        let mut events = Vec::new();
        let path = Path::new(vec![Waypoint::new(0, 0)]);
        let blueprint = CreepBlueprint::new(2.0, Duration::ZERO);
        let _ = creeps.spawn(&path, blueprint, &catalog, &mut events);

        assert_eq!(
            creeps.strike_first_within(Vec2::new(0.71, 0.0), 0.3, 5.0, &catalog, &mut events),
            None
        );
        assert_eq!(
            creeps.strike_first_within(Vec2::new(0.69, 0.0), 0.3, 5.0, &catalog, &mut events),
            Some(CreepId::new(0))
        );
    }
}
