//! End-to-end tests of the `tops` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

/// Run `tops` with an empty home directory so no user config leaks in.
fn tops_json(args: &[&str]) -> Value {
    let home = tempdir().unwrap();
    let output = cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "tops {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_transform_balanced_sample() {
    let json = tops_json(&["transform", "--a", "1", "--b", "-0.5", "--c", "-0.5"]);
    assert!((json["alphabeta"]["alpha"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    assert!(json["alphabeta"]["beta"].as_f64().unwrap().abs() < 1e-12);
    assert!((json["dq"]["d"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    assert!(json["dq"]["q"].as_f64().unwrap().abs() < 1e-12);
}

#[test]
fn test_transform_table_lists_components() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["transform", "--a", "1", "--b", "-0.5", "--c", "-0.5", "--theta", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPONENT"))
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("1.0000"));
}

#[test]
fn test_snapshot_dq_is_constant_in_time() {
    let early = tops_json(&["snapshot", "--time", "0.0"]);
    let late = tops_json(&["snapshot", "--time", "0.0137"]);
    for axis in ["d", "q"] {
        let a = early["voltage"]["dq"][axis].as_f64().unwrap();
        let b = late["voltage"]["dq"][axis].as_f64().unwrap();
        assert!((a - b).abs() < 1e-9, "{axis}: {a} vs {b}");
    }
}

#[test]
fn test_eigen_undamped_machine_is_poorly_damped() {
    let json = tops_json(&["eigen"]);
    let modes = json["modes"].as_array().unwrap();
    assert_eq!(modes.len(), 2);
    assert_eq!(modes[0]["class"], "poorly-damped-electromechanical");
    // ω = sqrt(2π·50 / 13) ≈ 4.916 rad/s
    let freq = modes[0]["frequency"].as_f64().unwrap();
    assert!((freq - 0.7824).abs() < 1e-3, "frequency {freq}");
}

#[test]
fn test_eigen_faer_solver_flag() {
    let json = tops_json(&["eigen", "--d", "2", "--solver", "faer"]);
    let damping = json["modes"][0]["damping_ratio"].as_f64().unwrap();
    assert!(damping > 0.0);
}

#[test]
fn test_eigen_rejects_unknown_solver() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["eigen", "--solver", "lapack"])
        .assert()
        .failure();
}

#[test]
fn test_eigen_rejects_non_positive_inertia() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["eigen", "--h", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inertia"));
}

#[test]
fn test_locus_sweeps_damping() {
    let json = tops_json(&["locus", "--sweep", "D", "--from", "0", "--to", "10", "--steps", "5"]);
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[0]["value"].as_f64().unwrap(), 0.0);
    assert_eq!(points[4]["value"].as_f64().unwrap(), 10.0);
    assert!(!json["band_boundary"].as_array().unwrap().is_empty());
}

#[test]
fn test_locus_rejects_unknown_parameter() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["locus", "--sweep", "X", "--from", "0", "--to", "1"])
        .assert()
        .failure();
}

#[test]
fn test_eac_classroom_case_is_stable() {
    let json = tops_json(&["eac"]);
    assert_eq!(json["verdict"]["verdict"], "stable");
    assert!((json["delta_0"].as_f64().unwrap() - 0.2200).abs() < 1e-3);
    assert!((json["delta_end"].as_f64().unwrap() - 2.9216).abs() < 1e-3);
    let critical = json["critical_clearing_angle"].as_f64().unwrap();
    assert!((critical - 1.9676).abs() < 1e-3, "critical angle {critical}");
    assert!(json.get("curve").is_none());
}

#[test]
fn test_eac_late_clearing_is_unstable() {
    let json = tops_json(&["eac", "--delta-clear", "2.5"]);
    assert_eq!(json["verdict"]["verdict"], "unstable");
    assert_eq!(json["verdict"]["reason"], "insufficient-decelerating-area");
}

#[test]
fn test_eac_fails_without_operating_point() {
    // P_m above P_max = 1.1 / 0.6
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["eac", "--p-m", "2.0", "--x-dt", "0.6"])
        .assert()
        .failure();
}

#[test]
fn test_eac_table_with_curve() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["eac", "--curve", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict"))
        .stdout(predicate::str::contains("stable"))
        .stdout(predicate::str::contains("DELTA [rad]"));
}

#[test]
fn test_bode_margins_only() {
    let json = tops_json(&["bode", "--d", "2", "--margins-only"]);
    assert!(json["open_loop"].get("response").is_none());
    assert!(json["with_governor"]["margins"]["phase_crossover"].is_f64());
    assert!(json["governor"].as_str().unwrap().starts_with("GOV"));
}

#[test]
fn test_bode_sweep_flags_override_defaults() {
    let json = tops_json(&["bode", "--start-exp", "-1", "--stop-exp", "1", "--points", "21"]);
    let response = json["open_loop"]["response"].as_array().unwrap();
    assert_eq!(response.len(), 21);
    assert!((response[0]["omega"].as_f64().unwrap() - 0.1).abs() < 1e-12);
}

#[test]
fn test_bode_rejects_inverted_sweep() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["bode", "--start-exp", "2", "--stop-exp", "-2"])
        .assert()
        .failure();
}

#[test]
fn test_phasor_table() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["phasor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PHASOR"))
        .stdout(predicate::str::contains("Eq_t"))
        .stdout(predicate::str::contains("delta"));
}

#[test]
fn test_phasor_json_has_every_phasor() {
    let json = tops_json(&["phasor"]);
    assert_eq!(json["phasors"].as_array().unwrap().len(), 8);
    let delta = json["load_angle_deg"].as_f64().unwrap();
    assert!(delta > 0.0 && delta < 90.0);
}

#[test]
fn test_config_file_sets_solver_and_sweep() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tops.toml");
    fs::write(&path, "[eigen]\nsolver = \"faer\"\n\n[bode]\npoints = 11\n").unwrap();

    let json = tops_json(&["bode", "--config", path.to_str().unwrap()]);
    assert_eq!(json["open_loop"]["response"].as_array().unwrap().len(), 11);
}

#[test]
fn test_default_config_location_is_home() {
    let home = tempdir().unwrap();
    fs::create_dir_all(home.path().join(".tops")).unwrap();
    fs::write(home.path().join(".tops/config.toml"), "[bode]\npoints = 7\n").unwrap();

    let output = cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["bode", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["open_loop"]["response"].as_array().unwrap().len(), 7);
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[band]\nmin_frequency = 5.0\nmax_frequency = 1.0\n").unwrap();

    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["eigen", "--config", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file_fails() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tops")
        .env("HOME", home.path())
        .args(["eigen", "--config", "/nonexistent/tops.toml"])
        .assert()
        .failure();
}
