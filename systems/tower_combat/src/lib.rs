#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower registry and fire control.
//!
//! Each tick every armed tower looks up its nearest creep in the prepared
//! [`TargetScan`], turns toward it when its type rotates, and starts a firing
//! animation once the creep is in range and the cooldown has elapsed. The
//! projectile is released only when that animation finishes, so simulation
//! timing follows the visuals rather than the cooldown.

mod tower;

use std::collections::BTreeMap;
use std::time::Duration;

use bulwark_core::{
    AnimationCatalog, CellCoord, Event, PlacementError, ProjectileLaunch, TowerId, TowerKind,
    TowerSnapshot,
};
use bulwark_system_tower_targeting::{AimController, TargetScan};

pub use tower::Tower;

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub struct Towers {
    entries: BTreeMap<TowerId, Tower>,
    cells: BTreeMap<CellCoord, TowerId>,
    next_tower_id: TowerId,
    aim: AimController,
}

impl Towers {
    /// Creates an empty registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_aim(AimController::default())
    }

    /// Creates an empty registry whose weapons turn with `aim`.
    #[must_use]
    pub fn with_aim(aim: AimController) -> Self {
        Self {
            entries: BTreeMap::new(),
            cells: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
            aim,
        }
    }

    /// Places a tower on `cell`, failing if another tower holds it.
    pub fn place(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        catalog: &dyn AnimationCatalog,
    ) -> Result<TowerId, PlacementError> {
        if self.cells.contains_key(&cell) {
            return Err(PlacementError::Occupied);
        }

        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.cells.insert(cell, id);
        let _ = self.entries.insert(id, Tower::new(id, kind, cell, catalog));
        Ok(id)
    }

    /// Runs fire control for every tower in identifier order.
    ///
    /// `scan` must hold the creeps that may be targeted this tick. Projectiles
    /// released by finished firing animations are appended to `out_launches`.
    pub fn tick(
        &mut self,
        dt: Duration,
        scan: &TargetScan,
        out_launches: &mut Vec<ProjectileLaunch>,
        out_events: &mut Vec<Event>,
    ) {
        for tower in self.entries.values_mut() {
            let cycle = tower.update(dt, scan, &self.aim);
            if let Some(launch) = cycle.launch {
                out_launches.push(launch);
            }
            if cycle.fired {
                out_events.push(Event::TowerFired { tower: tower.id() });
            }
        }
    }

    /// Reports whether a tower occupies `cell`.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    /// Iterator over towers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.entries.values()
    }

    /// Number of placed towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no towers are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captures snapshots of every tower.
    #[must_use]
    pub fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries.values().map(Tower::snapshot).collect()
    }
}

impl Default for Towers {
    fn default() -> Self {
        Self::new()
    }
}
