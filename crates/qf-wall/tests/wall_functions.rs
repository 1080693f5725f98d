//! Wall-function integration checks against textbook values.

use qf_core::constants::{B_PLUS_SMOOTH, KARMAN, ROUGHNESS_C_R};
use qf_wall::{cf_moody, g_plus, kays_crawford_default, spalding, spalding_e, spalding_y};

#[test]
fn spalding_scenario() {
    let e = spalding_e(B_PLUS_SMOOTH, KARMAN);
    let mut seed = None;
    for y_plus in [0.5, 5.0, 30.0, 100.0, 500.0] {
        let f = spalding(B_PLUS_SMOOTH, KARMAN, e, y_plus, seed).unwrap();
        assert!((spalding_y(B_PLUS_SMOOTH, KARMAN, e, f) - y_plus).abs() < 1e-9);
        seed = Some(f);
    }
}

#[test]
fn rough_wall_shifts_log_law_down() {
    let k_plus = 50.0;
    let b_rough = B_PLUS_SMOOTH - (1.0 + k_plus / ROUGHNESS_C_R).ln() / KARMAN;
    let smooth = spalding(B_PLUS_SMOOTH, KARMAN, spalding_e(B_PLUS_SMOOTH, KARMAN), 2000.0, None)
        .unwrap();
    let rough = spalding(b_rough, KARMAN, spalding_e(b_rough, KARMAN), 2000.0, None).unwrap();
    assert!(rough < smooth);
    assert!((smooth - rough - (B_PLUS_SMOOTH - b_rough)).abs() < 0.5);
}

#[test]
fn centreline_velocity_with_wake() {
    // u⁺ at the centre with a mild wake exceeds the log law by 2Π/κ.
    let pi = 0.2;
    assert!((g_plus(KARMAN, pi, 1.0) - 2.0 * pi / KARMAN).abs() < 1e-12);
}

#[test]
fn kays_crawford_scenario() {
    assert!((kays_crawford_default(0.72, 2e-5, 0.0) - 1.7).abs() < 1e-12);
    let far = kays_crawford_default(0.72, 2e-5, 2e-3);
    assert!((far - 0.85).abs() < 0.02);
}

#[test]
fn moody_scenario() {
    let cf = cf_moody(1e6, 0.05, 1e-5).unwrap();
    assert!((cf - 3.671e-3).abs() < 1e-5, "cf = {cf}");
}
