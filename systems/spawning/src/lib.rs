#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded wave director that decides when creeps enter the map.
//!
//! The first wave is released on the first tick that advances time. Once the
//! field is clear a respawn countdown starts and the next wave follows when it
//! runs out. Wave sizes, creep speeds and start delays are drawn from a seeded
//! ChaCha stream so a seed always reproduces the same waves.

use std::time::Duration;

use bulwark_core::Event;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Inclusive bounds a random value is drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span<T> {
    /// Smallest value that may be drawn.
    pub min: T,
    /// Largest value that may be drawn.
    pub max: T,
}

impl<T> Span<T> {
    /// Creates a new span.
    #[must_use]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    wave_size: Span<u32>,
    speed: Span<f32>,
    start_delay: Span<Duration>,
    respawn_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the stock wave parameters and the seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            wave_size: Span::new(5, 10),
            speed: Span::new(2.0, 4.0),
            start_delay: Span::new(Duration::from_secs(1), Duration::from_secs(5)),
            respawn_delay: Duration::from_secs(5),
            rng_seed,
        }
    }

    /// Overrides the number of creeps per wave.
    #[must_use]
    pub fn with_wave_size(mut self, wave_size: Span<u32>) -> Self {
        self.wave_size = wave_size;
        self
    }

    /// Overrides the creep speed range, in tiles per second.
    #[must_use]
    pub fn with_speed(mut self, speed: Span<f32>) -> Self {
        self.speed = speed;
        self
    }

    /// Overrides the per-creep start delay range.
    #[must_use]
    pub fn with_start_delay(mut self, start_delay: Span<Duration>) -> Self {
        self.start_delay = start_delay;
        self
    }

    /// Overrides the pause between a cleared field and the next wave.
    #[must_use]
    pub fn with_respawn_delay(mut self, respawn_delay: Duration) -> Self {
        self.respawn_delay = respawn_delay;
        self
    }
}

/// Request to spawn one creep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnOrder {
    /// Movement speed in tiles per second.
    pub speed: f32,
    /// Time the creep waits before it starts walking.
    pub start_delay: Duration,
}

/// Wave released by [`Spawning::handle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveRelease {
    /// One-based wave number.
    pub wave: u32,
    /// Number of creeps in the wave.
    pub creeps: u32,
}

/// Pure system that turns elapsed time into creep waves.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
    waves_released: u32,
    countdown: Option<Duration>,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            waves_released: 0,
            countdown: None,
        }
    }

    /// Number of waves released so far.
    #[must_use]
    pub const fn waves_released(&self) -> u32 {
        self.waves_released
    }

    /// Time left before the next wave, if a countdown is running.
    #[must_use]
    pub const fn countdown(&self) -> Option<Duration> {
        self.countdown
    }

    /// Consumes tick events and the live creep count to emit spawn orders.
    ///
    /// Returns the wave that was released, if any. Orders for every creep of
    /// that wave are appended to `out`.
    pub fn handle(
        &mut self,
        events: &[Event],
        creeps_remaining: usize,
        out: &mut Vec<SpawnOrder>,
    ) -> Option<WaveRelease> {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return None;
        }

        if self.waves_released == 0 {
            return Some(self.release_wave(out));
        }

        match self.countdown {
            Some(remaining) => {
                let remaining = remaining.saturating_sub(accumulated);
                if remaining.is_zero() {
                    self.countdown = None;
                    return Some(self.release_wave(out));
                }
                self.countdown = Some(remaining);
            }
            None if creeps_remaining == 0 => {
                self.countdown = Some(self.config.respawn_delay);
            }
            None => {}
        }
        None
    }

    fn release_wave(&mut self, out: &mut Vec<SpawnOrder>) -> WaveRelease {
        let size = self.config.wave_size;
        let creeps = self.rng.gen_range(size.min.min(size.max)..=size.max.max(size.min));
        out.reserve(creeps as usize);
        for _ in 0..creeps {
            let speed = self.sample_speed();
            let start_delay = self.sample_start_delay();
            out.push(SpawnOrder { speed, start_delay });
        }
        self.waves_released = self.waves_released.saturating_add(1);
        WaveRelease {
            wave: self.waves_released,
            creeps,
        }
    }

    fn sample_speed(&mut self) -> f32 {
        let Span { min, max } = self.config.speed;
        sample_between(&mut self.rng, min, max)
    }

    fn sample_start_delay(&mut self) -> Duration {
        let Span { min, max } = self.config.start_delay;
        let seconds = sample_between(&mut self.rng, min.as_secs_f32(), max.as_secs_f32());
        Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
    }
}

// Draws from [low, high), collapsing to `low` when the range is empty or not
// finite.
fn sample_between(rng: &mut ChaCha8Rng, low: f32, high: f32) -> f32 {
    if !(low.is_finite() && high.is_finite()) || high <= low {
        return if low.is_finite() { low } else { 0.0 };
    }
    rng.gen_range(low..high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_ranges_collapse_to_lower_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(sample_between(&mut rng, 3.0, 3.0), 3.0);
        assert_eq!(sample_between(&mut rng, 3.0, 1.0), 3.0);
        assert_eq!(sample_between(&mut rng, f32::NAN, 1.0), 0.0);
    }

    #[test]
    fn swapped_wave_size_bounds_do_not_panic() {
        let config = Config::new(1).with_wave_size(Span::new(4, 2));
        let mut spawning = Spawning::new(config);
        let mut orders = Vec::new();
        let wave = spawning.release_wave(&mut orders);
        assert!((2..=4).contains(&wave.creeps));
        assert_eq!(orders.len(), wave.creeps as usize);
    }
}
