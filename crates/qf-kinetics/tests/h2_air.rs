//! Stoichiometric hydrogen/air, adiabatic at constant pressure.

use approx::assert_relative_eq;
use qf_fluids::{Composition, Mixture, Species};
use qf_kinetics::{Mechanism, RateLaw, ReactionScheme, SchemeConfig};

const MECHANISM: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/h2_air.inp");
const P: f64 = 20e5;
/// Δx/u = 10 μs
const U: f64 = 100.0;
const DX: f64 = 1e-3;

fn mixture() -> Mixture {
    Mixture::ideal(
        Composition::from_mole_fractions(vec![
            (Species::H2, 2.0),
            (Species::O2, 1.0),
            (Species::N2, 3.727),
            (Species::Ar, 0.0463),
            (Species::H2O, 0.0),
            (Species::OH, 0.0),
            (Species::H, 0.0),
            (Species::O, 0.0),
            (Species::HO2, 0.0),
            (Species::H2O2, 0.0),
        ])
        .unwrap(),
    )
}

#[test]
fn mechanism_file_parses() {
    let m = Mechanism::from_file(MECHANISM).unwrap();
    assert_eq!(m.reactions().len(), 23);
    assert_eq!(m.active().count(), 21);
    assert_eq!(m.species().len(), 9);
    assert!(m.index_of(Species::N2).is_none());
    assert_eq!(
        m.active().filter(|r| matches!(r.rate, RateLaw::Troe { .. })).count(),
        2
    );
    assert_eq!(
        m.active().filter(|r| matches!(r.rate, RateLaw::Duplicate(..))).count(),
        2
    );
}

/// Mass fractions after ten default steps from the quenched state, in
/// mixture order.
const TRAJECTORY_END: [f64; 10] = [
    1.811584e-4, 1.273572e-3, 7.337721e-1, 1.299906e-2, 2.514220e-1, 3.473027e-4, 1.152805e-6,
    3.142841e-6, 3.986493e-7, 9.013672e-8,
];

/// The stoichiometric charge burnt to its dissociated equilibrium at
/// 3400 K, then quenched to 2000 K.
fn quenched_charge() -> Mixture {
    let mut mix = mixture();
    mix.remix_to_equilibrium(3400.0, P).unwrap();
    mix
}

#[test]
fn hot_mixture_burns_towards_equilibrium() {
    let mech = Mechanism::from_file(MECHANISM).unwrap();
    let mut mix = quenched_charge();
    let mut scheme = ReactionScheme::new(mech, &mix, SchemeConfig::default()).unwrap();
    let h2 = 0;
    let h2o = 4;

    let t0 = 2000.0;
    let y_h2o_0 = mix.mass_fractions()[h2o];
    let (mut t, mut y_h2) = (t0, mix.mass_fractions()[h2]);
    for _ in 0..10 {
        let out = scheme.step(&mut mix, t, P, U, DX).unwrap();
        assert!(out.mass_fractions[h2] < y_h2, "H2 rose to {}", out.mass_fractions[h2]);
        assert!(out.t > t, "T fell from {t} to {}", out.t);
        assert_relative_eq!(out.mass_fractions.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(out.mass_fractions.iter().all(|y| *y >= 0.0));
        t = out.t;
        y_h2 = out.mass_fractions[h2];
    }
    assert!(mix.mass_fractions()[h2o] > y_h2o_0);
    assert_relative_eq!(t, 2076.21, epsilon = 0.5);
    for (k, sp) in mix.species().iter().enumerate() {
        let y = mix.mass_fractions()[k];
        assert!(
            (y - TRAJECTORY_END[k]).abs() < 1e-3,
            "{}: {y} against {}",
            sp.key(),
            TRAJECTORY_END[k]
        );
    }

    // relax to the chemical equilibrium of the final temperature
    for _ in 0..400 {
        t = scheme.step(&mut mix, t, P, U, DX).unwrap().t;
    }
    assert!(t > t0 && t < 3400.0, "T = {t}");
    let eq = mix.equilibrium_mass_fractions(t, P).unwrap();
    for (k, sp) in mix.species().iter().enumerate() {
        let y = mix.mass_fractions()[k];
        assert!((y - eq[k]).abs() < 2e-3, "{}: kinetic {y}, equilibrium {}", sp.key(), eq[k]);
    }
}

#[test]
fn finer_steps_stay_on_the_same_path() {
    let mech = Mechanism::from_file(MECHANISM).unwrap();
    let mut coarse = quenched_charge();
    let mut fine = quenched_charge();
    let mut a = ReactionScheme::new(mech.clone(), &coarse, SchemeConfig::default()).unwrap();
    let mut b = ReactionScheme::new(mech, &fine, SchemeConfig::default()).unwrap();

    let (mut ta, mut tb) = (2000.0, 2000.0);
    for _ in 0..10 {
        ta = a.step(&mut coarse, ta, P, U, DX).unwrap().t;
        for _ in 0..2 {
            tb = b.step(&mut fine, tb, P, U, DX / 2.0).unwrap().t;
        }
    }
    for (ya, yb) in coarse.mass_fractions().iter().zip(fine.mass_fractions()) {
        assert!((ya - yb).abs() < 1e-3, "{ya} against {yb}");
    }
    assert!((ta - tb).abs() < 20.0, "{ta} against {tb}");
}

#[test]
fn inert_mixture_does_not_react() {
    let mech = Mechanism::from_file(MECHANISM).unwrap();
    let mut mix = Mixture::ideal(
        Composition::from_mole_fractions(vec![
            (Species::H2, 0.0),
            (Species::O2, 0.0),
            (Species::H2O, 0.0),
            (Species::OH, 0.0),
            (Species::H, 0.0),
            (Species::O, 0.0),
            (Species::HO2, 0.0),
            (Species::H2O2, 0.0),
            (Species::Ar, 1.0),
        ])
        .unwrap(),
    );
    let mut scheme = ReactionScheme::new(mech, &mix, SchemeConfig::default()).unwrap();
    let out = scheme.step(&mut mix, 1000.0, 1e5, U, DX).unwrap();
    assert_relative_eq!(out.t, 1000.0, max_relative = 1e-12);
    assert_relative_eq!(out.mass_fractions[8], 1.0, max_relative = 1e-12);
}
