//! Timed frame selection and the animation asset contract.
//!
//! The simulation never touches pixel data. It asks an [`AnimationCatalog`]
//! for the frame count and total duration of a keyed animation and drives an
//! [`AnimationClock`] with simulated time. Renderers read the resulting
//! [`AnimationFrame`] from the query snapshots.

use std::collections::HashMap;
use std::time::Duration;

use crate::{BuildStage, TowerKind};

/// Pose a creep animation depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreepPose {
    /// Standing still while waiting to start.
    Idle,
    /// Walking along the path.
    Walk,
    /// Collapsing after lethal damage.
    Death,
}

/// Frame set used for a creep's facing direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteView {
    /// Profile frames shared by east and west facings.
    Side,
    /// Frames showing the creep's back.
    Up,
    /// Frames showing the creep's front.
    Down,
}

/// State a tower weapon animation depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponState {
    /// Ambient loop played between shots.
    Idle,
    /// One-shot firing cycle that releases the projectile when it ends.
    Fire,
}

/// Phase a projectile animation depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectilePhase {
    /// Looping in-flight frames.
    Flight,
    /// One-shot impact frames.
    Impact,
}

/// Identifies a single animation asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    /// Creep animation for a pose and view.
    Creep {
        /// Pose being depicted.
        pose: CreepPose,
        /// Frame set matching the creep's facing.
        view: SpriteView,
    },
    /// Weapon animation mounted on a tower.
    Weapon {
        /// Tower the weapon belongs to.
        kind: TowerKind,
        /// Weapon state being depicted.
        state: WeaponState,
    },
    /// Projectile animation.
    Projectile {
        /// Tower type that fired the projectile.
        kind: TowerKind,
        /// Flight phase being depicted.
        phase: ProjectilePhase,
    },
    /// Construction site animation.
    Construction(BuildStage),
}

/// Frame count and total playback length of an animation asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationSpec {
    /// Number of frames in the sheet.
    pub frame_count: u32,
    /// Time taken to play every frame once.
    pub duration: Duration,
}

impl AnimationSpec {
    /// Creates a new animation spec.
    #[must_use]
    pub const fn new(frame_count: u32, duration: Duration) -> Self {
        Self {
            frame_count,
            duration,
        }
    }
}

/// Supplies animation metadata to the simulation.
pub trait AnimationCatalog {
    /// Looks up the asset registered for `key`, or `None` if there is none.
    fn spec(&self, key: AnimationKey) -> Option<AnimationSpec>;
}

/// Catalog carrying the stock game assets with optional per-key overrides.
#[derive(Clone, Debug, Default)]
pub struct StandardCatalog {
    overrides: HashMap<AnimationKey, Option<AnimationSpec>>,
}

impl StandardCatalog {
    /// Creates a catalog with the stock assets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the asset registered for `key`.
    #[must_use]
    pub fn with_override(mut self, key: AnimationKey, spec: AnimationSpec) -> Self {
        let _ = self.overrides.insert(key, Some(spec));
        self
    }

    /// Removes the asset registered for `key`.
    #[must_use]
    pub fn without(mut self, key: AnimationKey) -> Self {
        let _ = self.overrides.insert(key, None);
        self
    }

    fn stock(key: AnimationKey) -> Option<AnimationSpec> {
        let second = Duration::from_secs(1);
        let half = Duration::from_millis(500);
        let spec = match key {
            AnimationKey::Creep { pose, .. } => match pose {
                CreepPose::Idle => AnimationSpec::new(5, second),
                CreepPose::Walk => AnimationSpec::new(7, second),
                CreepPose::Death => AnimationSpec::new(10, second),
            },
            AnimationKey::Weapon { kind, state } => match (kind, state) {
                (TowerKind::Ballista, WeaponState::Idle) => return None,
                (TowerKind::Ballista, WeaponState::Fire) => AnimationSpec::new(6, half),
                (TowerKind::Arcane, WeaponState::Idle) => AnimationSpec::new(8, second),
                (TowerKind::Arcane, WeaponState::Fire) => AnimationSpec::new(27, half),
            },
            AnimationKey::Projectile { kind, phase } => match (kind, phase) {
                (TowerKind::Ballista, ProjectilePhase::Flight) => AnimationSpec::new(3, half),
                (TowerKind::Ballista, ProjectilePhase::Impact) => AnimationSpec::new(6, half),
                (TowerKind::Arcane, ProjectilePhase::Flight) => AnimationSpec::new(12, half),
                (TowerKind::Arcane, ProjectilePhase::Impact) => AnimationSpec::new(11, half),
            },
            AnimationKey::Construction(BuildStage::Building) => AnimationSpec::new(6, second),
            AnimationKey::Construction(BuildStage::Transitioning) => {
                AnimationSpec::new(5, Duration::from_millis(750))
            }
        };
        Some(spec)
    }
}

impl AnimationCatalog for StandardCatalog {
    fn spec(&self, key: AnimationKey) -> Option<AnimationSpec> {
        match self.overrides.get(&key) {
            Some(entry) => *entry,
            None => Self::stock(key),
        }
    }
}

/// Frame a renderer should draw for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationFrame {
    /// Asset the frame belongs to.
    pub key: AnimationKey,
    /// Zero-based frame index, always below the asset's frame count.
    pub frame: u32,
}

/// Maps accumulated simulated time onto a frame index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationClock {
    key: AnimationKey,
    frame_count: u32,
    frame_duration: Duration,
    current_frame: u32,
    timer: Duration,
    playing: bool,
    looping: bool,
}

impl AnimationClock {
    /// Creates a playing clock for the provided asset.
    ///
    /// Returns `None` for assets without frames, which callers treat the same
    /// way as a missing asset.
    #[must_use]
    pub fn new(key: AnimationKey, spec: AnimationSpec, looping: bool) -> Option<Self> {
        if spec.frame_count == 0 {
            return None;
        }
        Some(Self {
            key,
            frame_count: spec.frame_count,
            frame_duration: spec.duration / spec.frame_count,
            current_frame: 0,
            timer: Duration::ZERO,
            playing: true,
            looping,
        })
    }

    /// Creates a playing clock for `key` if the catalog holds a usable asset.
    #[must_use]
    pub fn from_catalog(
        catalog: &dyn AnimationCatalog,
        key: AnimationKey,
        looping: bool,
    ) -> Option<Self> {
        catalog
            .spec(key)
            .and_then(|spec| Self::new(key, spec, looping))
    }

    /// Restarts playback from the first frame.
    pub fn play(&mut self) {
        self.current_frame = 0;
        self.timer = Duration::ZERO;
        self.playing = true;
    }

    /// Advances the clock by `dt`, skipping as many frames as the time covers.
    pub fn advance(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }

        if self.frame_count <= 1 || self.frame_duration.is_zero() {
            self.advance_degenerate(dt);
            return;
        }

        self.timer = self.timer.saturating_add(dt);
        if self.looping {
            let cycle = self.frame_duration * self.frame_count;
            if self.timer >= cycle {
                self.timer = duration_rem(self.timer, cycle);
            }
        }

        while self.timer >= self.frame_duration {
            self.timer -= self.frame_duration;
            self.current_frame += 1;
            if self.current_frame >= self.frame_count {
                if self.looping {
                    self.current_frame = 0;
                } else {
                    self.finish();
                    break;
                }
            }
        }
    }

    // Single-frame and zero-length clocks never change frame; non-looping ones
    // still stop once their whole duration has elapsed.
    fn advance_degenerate(&mut self, dt: Duration) {
        if self.looping {
            return;
        }
        self.timer = self.timer.saturating_add(dt);
        if self.timer >= self.frame_duration * self.frame_count {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.current_frame = self.frame_count - 1;
        self.timer = Duration::ZERO;
        self.playing = false;
    }

    /// Index of the active frame, or `None` if it is out of range.
    #[must_use]
    pub fn current_frame(&self) -> Option<u32> {
        (self.current_frame < self.frame_count).then_some(self.current_frame)
    }

    /// Active frame tagged with the asset key.
    #[must_use]
    pub fn frame(&self) -> Option<AnimationFrame> {
        self.current_frame().map(|frame| AnimationFrame {
            key: self.key,
            frame,
        })
    }

    /// Asset the clock plays.
    #[must_use]
    pub const fn key(&self) -> AnimationKey {
        self.key
    }

    /// Number of frames in the asset.
    #[must_use]
    pub const fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Time each frame stays on screen.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Reports whether the clock is still consuming time.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Reports whether the clock wraps after its last frame.
    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }
}

fn duration_rem(value: Duration, modulus: Duration) -> Duration {
    let nanos = value.as_nanos() % modulus.as_nanos();
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
