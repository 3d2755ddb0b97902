#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Two-stage tower construction.
//!
//! A build task first plays the building animation, then the transition
//! animation, and finally hands a [`BuildCompletion`] to the caller which turns
//! it into a placed tower. A task that completes is dropped in the same tick,
//! so there is never a frame where both the site and the tower exist.

use std::time::Duration;

use bulwark_core::{
    AnimationCatalog, AnimationClock, AnimationKey, BuildSnapshot, BuildStage, CellCoord, Event,
    PlacementError, TowerKind,
};

/// Finished construction ready to become a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildCompletion {
    /// Cell reserved for the tower.
    pub cell: CellCoord,
    /// Type of tower to place.
    pub kind: TowerKind,
}

/// Construction site waiting on its animations.
#[derive(Clone, Debug)]
struct BuildTask {
    cell: CellCoord,
    kind: TowerKind,
    stage: BuildStage,
    clock: Option<AnimationClock>,
}

impl BuildTask {
    fn finished(&self) -> bool {
        !self.clock.as_ref().is_some_and(AnimationClock::is_playing)
    }
}

/// Queue of construction sites in the order they were accepted.
#[derive(Debug, Default)]
pub struct BuildQueue {
    tasks: Vec<BuildTask>,
    scratch: Vec<BuildTask>,
}

impl BuildQueue {
    /// Creates an empty build queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts construction of a tower on `cell`.
    ///
    /// Fails with [`PlacementError::Occupied`] when a site already holds the
    /// cell. Other placement rules are the caller's concern.
    pub fn queue(
        &mut self,
        cell: CellCoord,
        kind: TowerKind,
        catalog: &dyn AnimationCatalog,
    ) -> Result<(), PlacementError> {
        if self.is_pending(cell) {
            return Err(PlacementError::Occupied);
        }
        self.tasks.push(BuildTask {
            cell,
            kind,
            stage: BuildStage::Building,
            clock: stage_clock(BuildStage::Building, catalog),
        });
        Ok(())
    }

    /// Reports whether a construction site holds `cell`.
    #[must_use]
    pub fn is_pending(&self, cell: CellCoord) -> bool {
        self.tasks.iter().any(|task| task.cell == cell)
    }

    /// Advances every site, moving finished stages along.
    ///
    /// Sites that finish their transition are removed and reported through
    /// `out_completions`. A stage without an animation asset counts as
    /// finished on its first update.
    pub fn tick(
        &mut self,
        dt: Duration,
        catalog: &dyn AnimationCatalog,
        out_completions: &mut Vec<BuildCompletion>,
        out_events: &mut Vec<Event>,
    ) {
        self.scratch.clear();
        self.scratch.reserve(self.tasks.len());

        for mut task in self.tasks.drain(..) {
            if let Some(clock) = task.clock.as_mut() {
                clock.advance(dt);
            }
            if !task.finished() {
                self.scratch.push(task);
                continue;
            }

            match task.stage {
                BuildStage::Building => {
                    task.stage = BuildStage::Transitioning;
                    task.clock = stage_clock(BuildStage::Transitioning, catalog);
                    out_events.push(Event::BuildStageAdvanced {
                        cell: task.cell,
                        stage: task.stage,
                    });
                    self.scratch.push(task);
                }
                BuildStage::Transitioning => out_completions.push(BuildCompletion {
                    cell: task.cell,
                    kind: task.kind,
                }),
            }
        }

        std::mem::swap(&mut self.tasks, &mut self.scratch);
    }

    /// Number of active construction sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Reports whether no construction is under way.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Captures snapshots of every construction site.
    #[must_use]
    pub fn snapshots(&self) -> Vec<BuildSnapshot> {
        self.tasks
            .iter()
            .map(|task| BuildSnapshot {
                cell: task.cell,
                kind: task.kind,
                stage: task.stage,
                frame: task.clock.as_ref().and_then(AnimationClock::frame),
            })
            .collect()
    }
}

fn stage_clock(stage: BuildStage, catalog: &dyn AnimationCatalog) -> Option<AnimationClock> {
    AnimationClock::from_catalog(catalog, AnimationKey::Construction(stage), false)
}
