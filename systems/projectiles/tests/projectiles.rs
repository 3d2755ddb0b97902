use std::time::Duration;

use bulwark_core::{
    AnimationKey, CreepPhase, Event, Path, ProjectileLaunch, ProjectileMode, ProjectilePhase,
    StandardCatalog, TowerId, TowerKind, Waypoint,
};
use bulwark_system_movement::{CreepBlueprint, Creeps};
use bulwark_system_projectiles::Projectiles;
use glam::Vec2;

const STEP: Duration = Duration::from_millis(100);

fn launch(kind: TowerKind, origin: Vec2, angle: f32) -> ProjectileLaunch {
    ProjectileLaunch {
        tower: TowerId::new(0),
        kind,
        origin,
        angle,
    }
}

fn creep_at(creeps: &mut Creeps, x: i32, y: i32, max_health: f32, catalog: &StandardCatalog) {
    let mut blueprint = CreepBlueprint::new(0.0, Duration::from_secs(60));
    blueprint.max_health = max_health;
    let mut events = Vec::new();
    let _ = creeps.spawn(
        &Path::new(vec![Waypoint::new(x, y)]),
        blueprint,
        catalog,
        &mut events,
    );
}

#[test]
fn projectile_impacts_at_max_range_without_damage() {
    let catalog = StandardCatalog::new();
    let mut creeps = Creeps::new();
    let mut projectiles = Projectiles::new();
    let mut events = Vec::new();
    let id = projectiles.spawn(
        launch(TowerKind::Ballista, Vec2::ZERO, 0.0),
        &catalog,
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::ProjectileLaunched {
            projectile: id,
            kind: TowerKind::Ballista,
            tower: TowerId::new(0),
        }]
    );

    for _ in 0..4 {
        let mut events = Vec::new();
        projectiles.tick(STEP, &catalog, &mut creeps, &mut events);
        assert!(events.is_empty());
    }
    let mut events = Vec::new();
    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);
    assert_eq!(
        events,
        vec![Event::ProjectileImpacted {
            projectile: id,
            creep: None,
        }]
    );
    let projectile = projectiles.get(id).expect("projectile impacting");
    assert_eq!(projectile.mode(), ProjectileMode::Impacting);
    assert_eq!(projectile.velocity(), Vec2::ZERO);
    let resting = projectile.position();

    for _ in 0..4 {
        projectiles.tick(STEP, &catalog, &mut creeps, &mut events);
        assert_eq!(projectiles.reap(), 0);
    }
    assert_eq!(projectiles.get(id).map(|p| p.position()), Some(resting));

    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);
    assert_eq!(projectiles.reap(), 1);
    assert!(projectiles.is_empty());
}

#[test]
fn collision_damages_first_creep_and_reports_kill() {
    let catalog = StandardCatalog::new();
    let mut creeps = Creeps::new();
    creep_at(&mut creeps, 3, 0, 20.0, &catalog);
    let mut projectiles = Projectiles::new();
    let mut events = Vec::new();
    let id = projectiles.spawn(
        launch(TowerKind::Ballista, Vec2::ZERO, 0.0),
        &catalog,
        &mut events,
    );
    let creep = creeps.iter().next().map(|creep| creep.id()).expect("creep spawned");

    let mut log = Vec::new();
    for _ in 0..3 {
        projectiles.tick(STEP, &catalog, &mut creeps, &mut log);
    }

    assert_eq!(
        log,
        vec![
            Event::CreepKilled {
                creep,
                gold_reward: 15,
            },
            Event::ProjectileImpacted {
                projectile: id,
                creep: Some(creep),
            },
        ]
    );
    let projectile = projectiles.get(id).expect("projectile impacting");
    assert!((projectile.traveled() - 2.4).abs() < 1e-4);
    assert_eq!(
        projectile.snapshot().frame.map(|frame| frame.key),
        Some(AnimationKey::Projectile {
            kind: TowerKind::Ballista,
            phase: ProjectilePhase::Impact,
        })
    );
    assert_eq!(creeps.get(creep).map(|c| c.phase()), Some(CreepPhase::Dying));
}

#[test]
fn damage_depends_on_source_tower() {
    let catalog = StandardCatalog::new();
    let mut creeps = Creeps::new();
    creep_at(&mut creeps, 0, 0, 50.0, &catalog);
    creep_at(&mut creeps, 0, 4, 50.0, &catalog);
    let mut projectiles = Projectiles::new();
    let mut events = Vec::new();
    let _ = projectiles.spawn(launch(TowerKind::Arcane, Vec2::ZERO, 0.0), &catalog, &mut events);
    let _ = projectiles.spawn(
        launch(TowerKind::Ballista, Vec2::new(0.0, 4.0), 0.0),
        &catalog,
        &mut events,
    );

    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);

    let health: Vec<f32> = creeps.iter().map(|creep| creep.health()).collect();
    assert_eq!(health, vec![30.0, 25.0]);
}

#[test]
fn overlapping_creeps_resolve_in_scan_order() {
    let catalog = StandardCatalog::new();
    let mut creeps = Creeps::new();
    creep_at(&mut creeps, 1, 0, 50.0, &catalog);
    creep_at(&mut creeps, 1, 0, 50.0, &catalog);
    let mut projectiles = Projectiles::new();
    let mut events = Vec::new();
    let _ = projectiles.spawn(
        launch(TowerKind::Ballista, Vec2::new(1.2, 0.0), 0.0),
        &catalog,
        &mut events,
    );

    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);

    let health: Vec<f32> = creeps.iter().map(|creep| creep.health()).collect();
    assert_eq!(health, vec![25.0, 50.0]);
}

#[test]
fn dying_creeps_are_not_hit() {
    let catalog = StandardCatalog::new();
    let mut creeps = Creeps::new();
    creep_at(&mut creeps, 2, 0, 10.0, &catalog);
    let creep = creeps.iter().next().map(|creep| creep.id()).expect("creep spawned");
    let mut events = Vec::new();
    let _ = creeps.damage(creep, 10.0, &catalog, &mut events);

    let mut projectiles = Projectiles::new();
    let id = projectiles.spawn(
        launch(TowerKind::Ballista, Vec2::new(1.8, 0.0), 0.0),
        &catalog,
        &mut events,
    );
    events.clear();
    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);

    assert!(events.is_empty());
    assert_eq!(
        projectiles.get(id).map(|p| p.mode()),
        Some(ProjectileMode::Flying)
    );
}

#[test]
fn missing_impact_asset_removes_projectile_immediately() {
    let catalog = StandardCatalog::new().without(AnimationKey::Projectile {
        kind: TowerKind::Arcane,
        phase: ProjectilePhase::Impact,
    });
    let mut creeps = Creeps::new();
    creep_at(&mut creeps, 0, 0, 100.0, &catalog);
    let mut projectiles = Projectiles::new();
    let mut events = Vec::new();
    let id = projectiles.spawn(launch(TowerKind::Arcane, Vec2::ZERO, 1.0), &catalog, &mut events);

    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);

    assert!(projectiles.get(id).is_some_and(|p| p.is_removed()));
    assert!(projectiles.snapshots().is_empty());
    assert_eq!(projectiles.reap(), 1);
    assert!(projectiles.is_empty());
}

#[test]
fn heading_follows_velocity() {
    let catalog = StandardCatalog::new();
    let mut creeps = Creeps::new();
    let mut projectiles = Projectiles::new();
    let mut events = Vec::new();
    let angle = 2.0_f32;
    let id = projectiles.spawn(launch(TowerKind::Arcane, Vec2::ZERO, angle), &catalog, &mut events);

    projectiles.tick(STEP, &catalog, &mut creeps, &mut events);

    let snapshot = projectiles.get(id).expect("projectile flying").snapshot();
    assert!((snapshot.heading - angle).abs() < 1e-5);
    let expected = Vec2::new(angle.cos(), angle.sin()) * 1.2;
    assert!((snapshot.position - expected).length() < 1e-4);
}
