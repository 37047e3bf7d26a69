//! Domain-specific assertions for brgen harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* report invariant was violated.

use brgen_core::{CanonicalReport, SideSummary};

/// Assert that a side contains `count` ships of `ship_type`.
///
/// ```rust
/// assert_ship_group!(report.enemy, "Rifter", 2);
/// ```
#[macro_export]
macro_rules! assert_ship_group {
    ($side:expr, $ship_type:expr, $count:expr) => {{
        let side: &brgen_core::SideSummary = &$side;
        let ship_type: &str = $ship_type;
        let expected: u32 = $count;
        match side.ships.iter().find(|g| g.ship_type == ship_type) {
            Some(g) if g.count == expected => {}
            Some(g) => panic!(
                "assert_ship_group! failed on {} side:\n  ship: {:?}\n  expected count: {}\n  actual count:   {}",
                side.name, ship_type, expected, g.count
            ),
            None => panic!(
                "assert_ship_group! failed: {:?} not on {} side.\n  Ships present: {:?}",
                ship_type,
                side.name,
                side.ships.iter().map(|g| &g.ship_type).collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert a side's total ISK lost.
#[macro_export]
macro_rules! assert_isk_lost {
    ($side:expr, $expected:expr) => {{
        let side: &brgen_core::SideSummary = &$side;
        let expected: f64 = $expected;
        if side.total_isk_lost != expected {
            panic!(
                "assert_isk_lost! failed on {} side:\n  expected: {}\n  actual:   {}",
                side.name, expected, side.total_isk_lost
            );
        }
    }};
}

/// Check the invariants every report must hold, whatever its input.
pub fn assert_report_invariants(report: &CanonicalReport) {
    assert_eq!(
        report.total_value_destroyed,
        (report.friendly.total_isk_lost + report.enemy.total_isk_lost).min(f64::MAX),
        "totalValueDestroyed must equal the sum of both sides"
    );
    for (field, x) in [
        ("totalValueDestroyed", report.total_value_destroyed),
        ("efficiency", report.efficiency),
        ("enemyEfficiency", report.enemy_efficiency),
    ] {
        assert!(x.is_finite(), "{field} is not finite: {x}");
    }
    for side in [&report.friendly, &report.enemy] {
        assert_side_invariants(side);
    }
    assert!(report.efficiency >= 0.0, "efficiency negative: {}", report.efficiency);
    assert!(
        report.enemy_efficiency >= 0.0,
        "enemyEfficiency negative: {}",
        report.enemy_efficiency
    );
    assert_two_decimals(report.efficiency);
    assert_two_decimals(report.enemy_efficiency);
    if report.enemy.total_isk_lost == 0.0 {
        assert_eq!(report.efficiency, 0.0, "efficiency must be 0 when enemy lost nothing");
    }
    if report.friendly.total_isk_lost == 0.0 {
        assert_eq!(
            report.enemy_efficiency, 0.0,
            "enemyEfficiency must be 0 when friendly lost nothing"
        );
    }
}

fn assert_side_invariants(side: &SideSummary) {
    assert!(side.total_isk_lost >= 0.0, "{} side lost negative ISK", side.name);
    assert!(side.total_isk_lost.is_finite(), "{} side total is not finite", side.name);
    let mut seen = std::collections::HashSet::new();
    for group in &side.ships {
        assert!(group.count >= 1, "{} side has an empty ship group", side.name);
        assert!(
            seen.insert(group.ship_type.as_str()),
            "{} side lists {:?} twice",
            side.name,
            group.ship_type
        );
    }
}

fn assert_two_decimals(x: f64) {
    let scaled = x * 100.0;
    // Values this large have no fractional digits left to round.
    if !scaled.is_finite() {
        return;
    }
    assert!(
        (scaled - scaled.round()).abs() < 1e-6,
        "{x} is not rounded to two decimals"
    );
}
