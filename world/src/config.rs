//! Simulation configuration loaded from TOML.
//!
//! Every section falls back to the stock game values, so an empty document is
//! a valid configuration. Durations are written in seconds.

use std::time::Duration;

use bulwark_core::{CellCoord, TowerKind, Waypoint, TOWER_COST};
use bulwark_system_movement::{DEFAULT_ESCAPE_DAMAGE, DEFAULT_KILL_REWARD, DEFAULT_MAX_HEALTH};
use bulwark_system_spawning::{Config as SpawningConfig, Span};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_WAVE_SEED: u64 = 0x5eed_b01d_a7c3_9e21;

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A `min`/`max` pair has its bounds reversed.
    #[error("`{field}` has a minimum above its maximum")]
    EmptyRange {
        /// Name of the offending setting.
        field: &'static str,
    },
    /// The map has no tiles.
    #[error("map must be at least one tile wide and tall, got {width}x{height}")]
    InvalidDimensions {
        /// Configured number of columns.
        width: u32,
        /// Configured number of rows.
        height: u32,
    },
    /// A duration is negative or not a finite number of seconds.
    #[error("`{field}` must be a finite, non-negative number of seconds, got {value}")]
    NegativeDuration {
        /// Name of the offending setting.
        field: &'static str,
        /// Value that was rejected.
        value: f32,
    },
    /// A creep speed is negative or not finite.
    #[error("`{field}` must be a finite, non-negative speed, got {value}")]
    InvalidSpeed {
        /// Name of the offending setting.
        field: &'static str,
        /// Value that was rejected.
        value: f32,
    },
}

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Map size and creep path.
    pub map: MapConfig,
    /// Gold and player health.
    pub economy: EconomyConfig,
    /// Creep stats and spawn rolls.
    pub creeps: CreepConfig,
    /// Automatic wave director.
    pub waves: WaveConfig,
    /// Build orders queued before the first tick, as `[[towers]]` entries.
    pub towers: Vec<TowerPlacement>,
}

/// Tower requested by the configuration or the command line.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TowerPlacement {
    /// Tower to build.
    pub kind: TowerKind,
    /// Cell to build it on.
    pub cell: CellCoord,
}

/// `[map]` section.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Waypoints creeps walk along, in order.
    pub path: Vec<Waypoint>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 10,
            path: vec![
                Waypoint::new(0, 2),
                Waypoint::new(5, 2),
                Waypoint::new(5, 7),
                Waypoint::new(11, 7),
                Waypoint::new(11, 3),
                Waypoint::new(16, 3),
            ],
        }
    }
}

/// `[economy]` section.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyConfig {
    /// Gold available at the start of the run.
    pub starting_gold: u32,
    /// Gold deducted for every accepted build order.
    pub tower_cost: u32,
    /// Gold granted by each passive income payment.
    pub income_amount: u32,
    /// Simulated seconds between passive income payments; zero disables it.
    pub income_interval_secs: f32,
    /// Player health at the start of the run.
    pub starting_health: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 350,
            tower_cost: TOWER_COST,
            income_amount: 1,
            income_interval_secs: 2.0,
            starting_health: 100,
        }
    }
}

/// `[creeps]` section.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CreepConfig {
    /// Health each creep spawns with.
    pub max_health: f32,
    /// Player damage dealt by an escaping creep.
    pub escape_damage: u32,
    /// Gold awarded per kill.
    pub kill_reward: u32,
    /// Slowest rolled speed, in tiles per second.
    pub speed_min: f32,
    /// Fastest rolled speed, in tiles per second.
    pub speed_max: f32,
    /// Shortest rolled wait before walking.
    pub start_delay_min_secs: f32,
    /// Longest rolled wait before walking.
    pub start_delay_max_secs: f32,
}

impl Default for CreepConfig {
    fn default() -> Self {
        Self {
            max_health: DEFAULT_MAX_HEALTH,
            escape_damage: DEFAULT_ESCAPE_DAMAGE,
            kill_reward: DEFAULT_KILL_REWARD,
            speed_min: 2.0,
            speed_max: 4.0,
            start_delay_min_secs: 1.0,
            start_delay_max_secs: 5.0,
        }
    }
}

/// `[waves]` section.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    /// Whether the wave director runs at all.
    pub enabled: bool,
    /// Seed of the wave random stream.
    pub seed: u64,
    /// Smallest wave.
    pub size_min: u32,
    /// Largest wave.
    pub size_max: u32,
    /// Pause between a cleared field and the next wave.
    pub respawn_delay_secs: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: DEFAULT_WAVE_SEED,
            size_min: 5,
            size_max: 10,
            respawn_delay_secs: 5.0,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting describes a playable run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.map.width,
                height: self.map.height,
            });
        }

        let _ = seconds("economy.income_interval_secs", self.economy.income_interval_secs)?;

        speed("creeps.speed_min", self.creeps.speed_min)?;
        speed("creeps.speed_max", self.creeps.speed_max)?;
        if self.creeps.speed_min > self.creeps.speed_max {
            return Err(ConfigError::EmptyRange {
                field: "creeps.speed",
            });
        }

        let delay_min = seconds("creeps.start_delay_min_secs", self.creeps.start_delay_min_secs)?;
        let delay_max = seconds("creeps.start_delay_max_secs", self.creeps.start_delay_max_secs)?;
        if delay_min > delay_max {
            return Err(ConfigError::EmptyRange {
                field: "creeps.start_delay",
            });
        }

        if self.waves.size_min > self.waves.size_max {
            return Err(ConfigError::EmptyRange {
                field: "waves.size",
            });
        }
        let _ = seconds("waves.respawn_delay_secs", self.waves.respawn_delay_secs)?;
        Ok(())
    }

    /// Builds the wave director configuration.
    pub(crate) fn spawning(&self) -> Result<SpawningConfig, ConfigError> {
        let delay_min = seconds("creeps.start_delay_min_secs", self.creeps.start_delay_min_secs)?;
        let delay_max = seconds("creeps.start_delay_max_secs", self.creeps.start_delay_max_secs)?;
        let respawn = seconds("waves.respawn_delay_secs", self.waves.respawn_delay_secs)?;
        Ok(SpawningConfig::new(self.waves.seed)
            .with_wave_size(Span::new(self.waves.size_min, self.waves.size_max))
            .with_speed(Span::new(self.creeps.speed_min, self.creeps.speed_max))
            .with_start_delay(Span::new(delay_min, delay_max))
            .with_respawn_delay(respawn))
    }

    /// Interval between passive income payments.
    pub(crate) fn income_interval(&self) -> Result<Duration, ConfigError> {
        seconds("economy.income_interval_secs", self.economy.income_interval_secs)
    }
}

fn seconds(field: &'static str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::NegativeDuration { field, value })
}

fn speed(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSpeed { field, value })
    }
}
