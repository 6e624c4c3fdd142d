//! Tests for the gliss command-line front end
//!
//! Each test runs the binary in an empty temporary directory so a stray
//! `./gliss.toml` cannot leak into the results.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn gliss(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gliss").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("GLISS_DIVISIONS")
        .env_remove("GLISS_LOW_HZ")
        .env_remove("GLISS_HIGH_HZ")
        .env_remove("GLISS_MAX_SUBHARMONICS")
        .env_remove("GLISS_MAX_SIDEBANDS")
        .env_remove("GLISS_TIEBREAK")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn names_frequencies_and_note_names() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["notes", "440", "133", "E4b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A4"))
        .stdout(predicate::str::contains("C3+"))
        .stdout(predicate::str::contains("D4#"));
}

#[test]
fn semitone_grid_from_flag() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["--divisions", "12", "grid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entries: 97"));

    gliss(&dir)
        .args(["--divisions", "12", "notes", "133"])
        .assert()
        .success()
        .stdout(predicate::str::contains("C3 "));
}

#[test]
fn grid_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tuning.toml");
    fs::write(&path, "[grid]\ndivisions = 12\n").unwrap();

    let output = gliss(&dir)
        .args(["--json", "--config"])
        .arg(&path)
        .arg("grid")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["divisions"], 12);
    assert_eq!(summary["entries"], 97);
    assert_eq!(summary["reference_hz"], 440.0);
}

#[test]
fn unison_is_not_rough() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["roughness", "440", "440"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0.000000"));
}

#[test]
fn overtone_finds_fundamental() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["overtone", "110", "220", "330", "--max-sub", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fundamental: 110.00 Hz (A2)"))
        .stdout(predicate::str::contains("steps off: 0"));
}

#[test]
fn fm_json_lists_solutions() {
    let dir = TempDir::new().unwrap();
    let output = gliss(&dir)
        .env("GLISS_MAX_SIDEBANDS", "3")
        .args(["--json", "fm", "440", "550", "660", "--limit", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let solutions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let solutions = solutions.as_array().unwrap();
    assert!(!solutions.is_empty() && solutions.len() <= 5);
    assert_eq!(solutions[0]["distance"], 0);
}

#[test]
fn fm_rejects_too_many_sidebands() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .env("GLISS_MAX_SIDEBANDS", "2")
        .args(["fm", "440", "550", "--sidebands", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sideband count 9"));
}

#[test]
fn inharmonic_needs_two_notes() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["inharmonic", "440"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 notes"));
}

#[test]
fn inharmonic_dyad() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["inharmonic", "A3", "A4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance: 0"));
}

#[test]
fn config_prints_toml() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .env("GLISS_TIEBREAK", "lowest")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[grid]"))
        .stdout(predicate::str::contains("divisions = 24"))
        .stdout(predicate::str::contains("# env: GLISS_TIEBREAK"))
        .stdout(predicate::str::contains("tiebreak = \"lowest\""));
}

#[test]
fn rejects_out_of_range_octave() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["notes", "C99999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse note name: C99999999"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn rejects_unknown_pitch() {
    let dir = TempDir::new().unwrap();
    gliss(&dir)
        .args(["notes", "H9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither a frequency nor a note name"));
}
