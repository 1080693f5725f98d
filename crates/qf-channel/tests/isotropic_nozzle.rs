//! Isentropic nozzle with boundary-layer wall loads.

use approx::assert_relative_eq;
use qf_boundary::{BoundaryLayer, ChannelKind, FrictionMethod, SigmaMode};
use qf_channel::{
    AxisymmetricContour, Direction, IsotropicChannel, IsotropicConfig, MeshField, MocProfile, Strategy,
};
use qf_fluids::{Composition, Mixture, Species};

const T_TOTAL: f64 = 1500.0;
const P_TOTAL: f64 = 10e5;

fn air() -> Mixture {
    Mixture::ideal(Composition::from_mole_fractions(vec![(Species::N2, 0.79), (Species::O2, 0.21)]).unwrap())
}

/// Cylinder, converging cone to the throat at x = 0.1 m, diverging cone.
fn nozzle(direction: Direction) -> IsotropicChannel {
    let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
        .unwrap();
    let contour = AxisymmetricContour::new(&[(0.0, 0.04), (0.05, 0.04), (0.1, 0.02), (0.2, 0.03)]).unwrap();
    let mut ch = IsotropicChannel::new(
        Box::new(contour),
        bl,
        Strategy::Nozzle,
        IsotropicConfig {
            direction,
            ..IsotropicConfig::default()
        },
    )
    .unwrap();
    ch.set_total(T_TOTAL, P_TOTAL).unwrap();
    ch
}

#[test]
fn nozzle_passes_through_sonic_throat() {
    let mut ch = nozzle(Direction::Forward);
    let mut mesh = ch.mesh(600.0);
    ch.run(&mut mesh).unwrap();

    let crit = *ch.critical().unwrap();
    let gas = air();
    let total = gas.caloric(T_TOTAL, P_TOTAL).unwrap();
    let segs = ch.segments();
    assert_eq!(segs.len(), 41);
    let throat = 20;
    assert_relative_eq!(segs[throat].x, 0.1, max_relative = 1e-12);

    for (i, seg) in segs.iter().enumerate() {
        let f = seg.flow().unwrap();
        if i < throat {
            assert!(f.ma < 1.0, "Ma[{i}] = {}", f.ma);
        } else if i > throat {
            assert!(f.ma > 1.0, "Ma[{i}] = {}", f.ma);
        }
        assert_relative_eq!(f.mass_flow(), crit.mass_flow, max_relative = 1e-6);
        assert_relative_eq!(f.h_t, total.h, max_relative = 1e-8);
        assert_relative_eq!(f.s, total.s, max_relative = 1e-8);
    }
    assert_relative_eq!(segs[throat].flow().unwrap().ma, 1.0, max_relative = 1e-6);
    let exit = segs[40].flow().unwrap();
    assert!(exit.ma > 2.0 && exit.ma < 2.6, "Ma_exit = {}", exit.ma);

    // hot gas heats the wall; the throat sees the largest load
    let q = mesh.column(MeshField::HeatFlux);
    assert!(q.iter().all(|&v| v > 0.0));
    assert!(q[throat] > q[0]);
    assert!(q[throat] > q[40]);
    assert_eq!(ch.tables().len(), 41);
    assert_relative_eq!(mesh.column(MeshField::FluidMach)[40], exit.ma);
}

#[test]
fn wall_pass_order_does_not_change_results() {
    let mut fwd = nozzle(Direction::Forward);
    let mut rev = nozzle(Direction::Reverse);
    let (mut a, mut b) = (fwd.mesh(600.0), rev.mesh(600.0));
    fwd.run(&mut a).unwrap();
    rev.run(&mut b).unwrap();
    for (qa, qb) in a.column(MeshField::HeatFlux).iter().zip(b.column(MeshField::HeatFlux)) {
        assert_relative_eq!(*qa, *qb, max_relative = 1e-9);
    }
}

#[test]
fn moc_profile_sets_station_mach() {
    let mut ch = nozzle(Direction::Forward);
    // profile on its own axis, stretched onto [0, 0.2]
    let moc = MocProfile::parse("0 0.1\n5 1.0\n10 2.2\n").unwrap();
    ch.apply_moc(&moc).unwrap();
    let total = air().caloric(T_TOTAL, P_TOTAL).unwrap();
    for seg in ch.segments() {
        let f = seg.flow().unwrap();
        let expected = moc.project(seg.x, 0.0, 0.2);
        assert_relative_eq!(f.ma, expected, max_relative = 1e-6);
        assert_relative_eq!(f.s, total.s, max_relative = 1e-8);
        assert_relative_eq!(f.h_t, total.h, max_relative = 1e-8);
    }
}

#[test]
fn throat_area_override_keeps_chamber_subsonic() {
    let bl = BoundaryLayer::new(air(), ChannelKind::Axisymmetric, FrictionMethod::Eckert, SigmaMode::Petukhov)
        .unwrap();
    let contour = AxisymmetricContour::new(&[(0.0, 0.04), (0.2, 0.04)]).unwrap();
    let a_t = std::f64::consts::PI * 0.02 * 0.02;
    let mut ch = IsotropicChannel::new(
        Box::new(contour),
        bl,
        Strategy::Chamber,
        IsotropicConfig {
            stations: 5,
            throat_area: Some(a_t),
            ..IsotropicConfig::default()
        },
    )
    .unwrap();
    ch.set_total(T_TOTAL, P_TOTAL).unwrap();
    ch.solve_static().unwrap();
    let crit = *ch.critical().unwrap();
    assert_relative_eq!(crit.area, a_t);
    for seg in ch.segments() {
        let f = seg.flow().unwrap();
        // area ratio 4: Ma ≈ 0.15
        assert!(f.ma > 0.1 && f.ma < 0.2, "Ma = {}", f.ma);
        assert_relative_eq!(f.mass_flow(), crit.mass_flow, max_relative = 1e-6);
    }
}
