//! End-to-end properties of the stability analyzers on the classroom cases.

use std::f64::consts::{PI, TAU};
use tops_algo::numeric::{QuadratureKind, QuadratureSettings, RootFinderSettings};
use tops_algo::small_signal::{eigenvalues, ModeClass};
use tops_algo::*;
use tops_core::{EigenSolverKind, MachineSwingParameters, ThreePhaseQuantity, TopsError};

/// A balanced set maps to a space vector whose length is the peak value.
#[test]
fn test_balanced_abc_has_peak_magnitude_in_alphabeta() {
    for magnitude in [0.5, 1.0, 325.0] {
        for k in 0..12 {
            let wt = k as f64 * PI / 6.0;
            let ab = abc_to_alphabeta(&ThreePhaseQuantity::balanced(magnitude, wt, 0.0));
            assert!((ab.magnitude() - magnitude).abs() < 1e-9 * magnitude);
        }
    }
}

/// Rotating by θ and then by −θ gives back the original αβ vector.
#[test]
fn test_park_rotation_then_inverse_is_identity() {
    let ab = abc_to_alphabeta(&ThreePhaseQuantity::new(0.9, -0.2, -0.7));
    for theta in [0.0, 0.3, -2.0, 12.5] {
        let dq = alphabeta_to_dq(&ab, theta);
        let back = alphabeta_to_dq(&tops_core::AlphaBetaQuantity::new(dq.d, dq.q), -theta);
        assert!((back.d - ab.alpha).abs() < 1e-12);
        assert!((back.q - ab.beta).abs() < 1e-12);
    }
}

/// H = 6.5, D = 0, K = 1, f_N = 50: an undamped electromechanical oscillation.
#[test]
fn test_undamped_kundur_machine() {
    let params = MachineSwingParameters::new(6.5, 0.0, 1.0, 50.0);
    for solver in [EigenSolverKind::ClosedForm, EigenSolverKind::Faer] {
        let analyzer = SmallSignalStabilityAnalyzer::new().with_solver(solver);
        let report = analyzer.analyze(&params).unwrap();
        for mode in &report.modes {
            let lambda = mode.eigenvalue;
            assert!(lambda.re().abs() < 1e-9, "{solver:?}: {lambda}");
            let damping = mode.damping_ratio.unwrap();
            let frequency = mode.frequency.unwrap().value();
            assert!(damping.abs() < 1e-7);
            assert!((frequency - lambda.im().abs() / TAU).abs() < 1e-12);
        }
        assert_eq!(
            report.dominant_mode().unwrap().class,
            ModeClass::PoorlyDampedElectromechanical
        );
    }
}

/// Adding damping moves both roots into the left half-plane.
#[test]
fn test_damped_kundur_machine() {
    let params = MachineSwingParameters::new(6.5, 2.0, 1.0, 50.0);
    let values = eigenvalues(&build_state_matrix(&params).unwrap()).unwrap();
    for lambda in &values {
        assert!(lambda.re() < 0.0);
        let (damping, _) = damping_and_frequency(lambda).unwrap();
        assert!(damping > 0.0);
    }
}

/// Repeating an analysis gives bit-identical results.
#[test]
fn test_analyses_are_idempotent() {
    let params = MachineSwingParameters::new(6.5, 2.0, 1.0, 50.0);
    let analyzer = SmallSignalStabilityAnalyzer::new();
    assert_eq!(analyzer.analyze(&params).unwrap(), analyzer.analyze(&params).unwrap());

    let eac = EqualAreaCriterion::new(0.8, 1.1, 1.0, 0.3).unwrap();
    assert_eq!(eac.assess(1.2, 0.0).unwrap(), eac.assess(1.2, 0.0).unwrap());
}

/// P_m = 0.8, |E| = 1.1, |Vs| = 1.0, x_dt = 0.3, δ_clear = 1.2.
#[test]
fn test_classroom_equal_area_scenario() {
    let eac = EqualAreaCriterion::new(0.8, 1.1, 1.0, 0.3).unwrap();
    let result = eac.assess(1.2, 0.0).unwrap();

    assert!(result.delta_0.abs() < 0.5);
    let delta_end = result.delta_end.unwrap();
    assert!(delta_end < PI && delta_end > PI / 2.0);

    let areas = result.areas.unwrap();
    assert!(areas.a1.is_finite() && areas.a1 > 0.0);
    assert!(areas.a2.is_finite() && areas.a2 > 0.0);
    assert_eq!(result.verdict.is_stable(), areas.a2 >= areas.a1);
}

/// Both quadrature rules agree on the decelerating area.
#[test]
fn test_quadrature_rules_agree_on_areas() {
    let gauss = EqualAreaCriterion::new(0.8, 1.1, 1.0, 0.3).unwrap();
    let simpson = gauss.clone().with_quadrature(
        QuadratureSettings::default()
            .with_kind(QuadratureKind::Simpson)
            .with_max_subdivisions(1000),
    );
    let a = gauss.assess(1.2, 0.2).unwrap().areas.unwrap();
    let b = simpson.assess(1.2, 0.2).unwrap().areas.unwrap();
    assert!((a.a2 - b.a2).abs() < 1e-6);
    assert_eq!(a.a1, b.a1);
}

/// A zero reactance never reaches the solvers.
#[test]
fn test_zero_reactance_is_domain_error_everywhere() {
    assert!(matches!(
        power_curve(0.5, 1.1, 1.0, 0.0),
        Err(TopsError::Domain(_))
    ));
    assert!(matches!(
        EqualAreaCriterion::new(0.8, 1.1, 1.0, 0.0),
        Err(TopsError::Domain(_))
    ));
}

/// A starved root finder reports non-convergence instead of a wrong angle.
#[test]
fn test_root_budget_exhaustion_is_reported() {
    let eac = EqualAreaCriterion::new(0.8, 1.1, 1.0, 0.3)
        .unwrap()
        .with_root_finder(
            RootFinderSettings::default()
                .with_tolerance(1e-15)
                .with_max_iterations(1),
        );
    assert!(matches!(eac.find_delta_0(), Err(TopsError::Convergence(_))));
}

/// The governor's right-half-plane zero reduces the phase margin of the loop.
#[test]
fn test_governor_erodes_phase_margin() {
    let open_loop = open_loop_transfer_function(6.5, 2.0, 50.0, 1.0).unwrap();
    let governor = governor_transfer_function(2.0, 1.0).unwrap();
    let with_governor = combined(&open_loop, &governor).unwrap();

    let omegas = logspace(-2.0, 2.0, 2000);
    let plain = open_loop.bode(&omegas).unwrap();
    let governed = with_governor.bode(&omegas).unwrap();

    // the governor only ever adds phase lag
    for (a, b) in plain.iter().zip(&governed) {
        assert!(b.phase_deg <= a.phase_deg + 1e-9);
    }
    let margins = stability_margins(&governed);
    assert!(margins.phase_crossover.is_some());
}
