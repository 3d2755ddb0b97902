use std::time::Duration;

use bulwark_core::{
    angle::bearing, AnimationKey, CellCoord, CreepId, Event, ProjectileLaunch, StandardCatalog,
    TowerKind, WeaponState, INITIAL_WEAPON_HEADING,
};
use bulwark_system_tower_combat::Towers;
use bulwark_system_tower_targeting::{TargetCandidate, TargetScan};
use glam::Vec2;

const STEP: Duration = Duration::from_millis(100);

fn scan_with(position: Vec2) -> TargetScan {
    let mut scan = TargetScan::new();
    scan.prepare([TargetCandidate {
        id: CreepId::new(0),
        position,
    }]);
    scan
}

fn run(
    towers: &mut Towers,
    scan: &TargetScan,
    ticks: usize,
) -> Vec<(usize, Vec<ProjectileLaunch>, Vec<Event>)> {
    (1..=ticks)
        .map(|tick| {
            let mut launches = Vec::new();
            let mut events = Vec::new();
            towers.tick(STEP, scan, &mut launches, &mut events);
            (tick, launches, events)
        })
        .collect()
}

#[test]
fn projectile_appears_only_after_firing_animation_ends() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Ballista, CellCoord::new(2, 2), &catalog)
        .expect("cell is free");
    let scan = scan_with(Vec2::new(4.5, 2.5));

    let history = run(&mut towers, &scan, 20);

    let fired: Vec<usize> = history
        .iter()
        .filter(|(_, _, events)| events.contains(&Event::TowerFired { tower: id }))
        .map(|(tick, _, _)| *tick)
        .collect();
    assert_eq!(fired, vec![1, 16]);

    let launched: Vec<usize> = history
        .iter()
        .filter(|(_, launches, _)| !launches.is_empty())
        .map(|(tick, launches, _)| {
            assert_eq!(launches.len(), 1);
            *tick
        })
        .collect();
    assert_eq!(launched, vec![6]);
}

#[test]
fn cooldown_resets_to_fire_delay_when_firing() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Arcane, CellCoord::new(0, 0), &catalog)
        .expect("cell is free");
    let scan = scan_with(Vec2::new(1.0, 3.0));

    let _ = run(&mut towers, &scan, 1);
    let tower = towers.get(id).expect("tower placed");
    assert_eq!(tower.cooldown(), TowerKind::Arcane.fire_delay());
    assert!(tower.shot_pending());
    assert_eq!(
        tower.snapshot().weapon_frame.map(|frame| frame.key),
        Some(AnimationKey::Weapon {
            kind: TowerKind::Arcane,
            state: WeaponState::Fire,
        })
    );
}

#[test]
fn out_of_range_creep_is_tracked_but_not_fired_upon() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Ballista, CellCoord::new(0, 0), &catalog)
        .expect("cell is free");
    let scan = scan_with(Vec2::new(9.5, 0.5));

    let history = run(&mut towers, &scan, 30);
    assert!(history
        .iter()
        .all(|(_, launches, events)| launches.is_empty() && events.is_empty()));

    let heading = towers.get(id).expect("tower placed").heading();
    assert!(heading.abs() < 0.05, "weapon should face east, got {heading}");
}

#[test]
fn ballista_releases_along_its_heading_from_the_muzzle() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Ballista, CellCoord::new(2, 2), &catalog)
        .expect("cell is free");
    let scan = scan_with(Vec2::new(2.5, -1.5));

    let history = run(&mut towers, &scan, 6);
    let launch = history
        .iter()
        .flat_map(|(_, launches, _)| launches.iter().copied())
        .next()
        .expect("one projectile released");

    let heading = towers.get(id).expect("tower placed").heading();
    assert_eq!(launch.tower, id);
    assert_eq!(launch.kind, TowerKind::Ballista);
    assert!((launch.angle - heading).abs() < 1e-5);
    let muzzle = TowerKind::Ballista.muzzle(Vec2::new(2.5, 2.5), heading);
    assert!((launch.origin - muzzle).length() < 1e-4);
}

#[test]
fn arcane_weapon_stays_put_and_aims_at_latched_target() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Arcane, CellCoord::new(2, 2), &catalog)
        .expect("cell is free");
    let target = Vec2::new(5.0, 4.0);
    let scan = scan_with(target);

    let history = run(&mut towers, &scan, 6);
    let launch = history
        .iter()
        .flat_map(|(_, launches, _)| launches.iter().copied())
        .next()
        .expect("one projectile released");

    assert_eq!(towers.get(id).expect("tower placed").heading(), INITIAL_WEAPON_HEADING);
    let origin = Vec2::new(2.5, 1.2);
    assert!((launch.origin - origin).length() < 1e-5);
    assert!((launch.angle - bearing(Vec2::new(2.5, 2.5), target)).abs() < 1e-5);
}

#[test]
fn arcane_orb_flies_along_the_bearing_from_the_tower_centre() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let _ = towers
        .place(TowerKind::Arcane, CellCoord::new(2, 3), &catalog)
        .expect("cell is free");
    let scan = scan_with(Vec2::new(5.0, 3.0));

    let launch = run(&mut towers, &scan, 6)
        .iter()
        .flat_map(|(_, launches, _)| launches.iter().copied())
        .next()
        .expect("one projectile released");

    assert!((launch.origin - Vec2::new(2.5, 2.2)).length() < 1e-5);
    assert!((launch.angle - (-0.5f32).atan2(2.5)).abs() < 1e-5);
}

#[test]
fn tower_without_weapon_asset_is_inert() {
    let catalog = StandardCatalog::new().without(AnimationKey::Weapon {
        kind: TowerKind::Ballista,
        state: WeaponState::Fire,
    });
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Ballista, CellCoord::new(1, 1), &catalog)
        .expect("cell is free");
    let scan = scan_with(Vec2::new(3.5, 1.5));

    let history = run(&mut towers, &scan, 30);
    assert!(history
        .iter()
        .all(|(_, launches, events)| launches.is_empty() && events.is_empty()));

    let tower = towers.get(id).expect("tower placed");
    assert!(!tower.is_armed());
    assert_eq!(tower.heading(), INITIAL_WEAPON_HEADING);
    assert_eq!(tower.snapshot().weapon_frame, None);
}

#[test]
fn empty_scan_keeps_towers_idle() {
    let catalog = StandardCatalog::new();
    let mut towers = Towers::new();
    let id = towers
        .place(TowerKind::Arcane, CellCoord::new(1, 1), &catalog)
        .expect("cell is free");

    let history = run(&mut towers, &TargetScan::new(), 12);
    assert!(history
        .iter()
        .all(|(_, launches, events)| launches.is_empty() && events.is_empty()));

    let frame = towers
        .get(id)
        .and_then(|tower| tower.snapshot().weapon_frame)
        .expect("idle frame");
    assert_eq!(
        frame.key,
        AnimationKey::Weapon {
            kind: TowerKind::Arcane,
            state: WeaponState::Idle,
        }
    );
    assert_eq!(frame.frame, 1);
}
