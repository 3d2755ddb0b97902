#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Bulwark simulation.

use std::{fmt, fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use bulwark_core::{CellCoord, Command, Event, TowerKind};
use bulwark_world::{self as world, query, SimulationConfig, TowerPlacement, World};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs the combat simulation without a renderer and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "bulwark")]
#[command(about = "Headless Bulwark tower-defence simulation")]
struct Args {
    /// TOML file with `[map]`, `[economy]`, `[creeps]`, `[waves]` and `[[towers]]` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Length of a single tick in milliseconds
    #[arg(long, default_value_t = 50)]
    step_ms: u64,

    /// Overrides the wave seed from the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Queues a tower before the first tick, after any `[[towers]]` from the config, e.g. `ballista@4,3`
    #[arg(long = "tower", value_name = "KIND@X,Y", value_parser = parse_tower)]
    towers: Vec<TowerPlacement>,

    /// Disables the automatic wave director
    #[arg(long)]
    no_waves: bool,
}

fn parse_tower(value: &str) -> Result<TowerPlacement, String> {
    let (kind, cell) = value
        .split_once('@')
        .ok_or_else(|| format!("expected KIND@X,Y, got `{value}`"))?;
    let kind = TowerKind::ALL
        .into_iter()
        .find(|candidate| candidate.name().eq_ignore_ascii_case(kind.trim()))
        .ok_or_else(|| format!("unknown tower kind `{kind}`"))?;
    let (column, row) = cell
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y cell coordinates, got `{cell}`"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(TowerPlacement {
        kind,
        cell: CellCoord::new(column, row),
    })
}

/// Tally of what happened during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Summary {
    simulated: Duration,
    waves: u32,
    creeps_spawned: u32,
    creeps_killed: u32,
    creeps_escaped: u32,
    towers_placed: u32,
    builds_rejected: u32,
    shots_fired: u32,
    gold: u32,
    health: u32,
    defeated: bool,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.simulated += *dt,
                Event::WaveSpawned { wave, .. } => self.waves = *wave,
                Event::CreepSpawned { .. } => self.creeps_spawned += 1,
                Event::CreepKilled { .. } => self.creeps_killed += 1,
                Event::CreepEscaped { .. } => self.creeps_escaped += 1,
                Event::TowerPlaced { .. } => self.towers_placed += 1,
                Event::BuildRejected { .. } => self.builds_rejected += 1,
                Event::TowerFired { .. } => self.shots_fired += 1,
                Event::GoldChanged { gold } => self.gold = *gold,
                Event::PlayerHealthChanged { health } => self.health = *health,
                Event::PlayerDefeated => self.defeated = true,
                _ => {}
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "simulated:      {:.2}s", self.simulated.as_secs_f64())?;
        writeln!(f, "waves:          {}", self.waves)?;
        writeln!(
            f,
            "creeps:         {} spawned, {} killed, {} escaped",
            self.creeps_spawned, self.creeps_killed, self.creeps_escaped
        )?;
        writeln!(
            f,
            "towers:         {} placed, {} rejected, {} shots",
            self.towers_placed, self.builds_rejected, self.shots_fired
        )?;
        writeln!(f, "gold:           {}", self.gold)?;
        write!(
            f,
            "player health:  {}{}",
            self.health,
            if self.defeated { " (defeated)" } else { "" }
        )
    }
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            SimulationConfig::from_toml_str(&source)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.waves.seed = seed;
    }
    if args.no_waves {
        config.waves.enabled = false;
    }
    config.towers.extend(args.towers.iter().copied());
    Ok(config)
}

fn run(args: &Args, config: &SimulationConfig) -> Result<Summary> {
    if args.step_ms == 0 {
        bail!("--step-ms must be at least 1");
    }
    let total = Duration::try_from_secs_f64(args.seconds)
        .with_context(|| format!("--seconds must be a non-negative number, got {}", args.seconds))?;
    let step = Duration::from_millis(args.step_ms);

    let mut world = World::from_config(config).context("failed to build the simulation")?;
    let mut summary = Summary {
        gold: query::gold(&world),
        health: query::player_health(&world),
        ..Summary::default()
    };
    let mut events = Vec::new();

    for order in &config.towers {
        world::apply(
            &mut world,
            Command::QueueBuild {
                kind: order.kind,
                cell: order.cell,
            },
            &mut events,
        );
        if let Some(Event::BuildRejected { reason, .. }) = events.last() {
            warn!(
                kind = order.kind.name(),
                column = order.cell.column(),
                row = order.cell.row(),
                ?reason,
                "tower order rejected"
            );
        }
        summary.record(&events);
        events.clear();
    }

    let mut elapsed = Duration::ZERO;
    while elapsed < total && !query::is_defeated(&world) {
        let dt = step.min(total - elapsed);
        world::apply(&mut world, Command::Tick { dt }, &mut events);
        summary.record(&events);
        events.clear();
        elapsed += dt;
    }

    info!(elapsed = ?elapsed, "simulation finished");
    Ok(summary)
}

/// Entry point for the Bulwark command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let summary = run(&args, &config)?;
    println!("{summary}");
    Ok(())
}
