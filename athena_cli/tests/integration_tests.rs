//! Integration tests for the athena binary.
//!
//! These tests verify end-to-end behavior including:
//! - Playing sessions in simulated time
//! - Scripted voice commands
//! - History logging and CSV export
//! - Program tracking

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    // Point the default config lookup at a directory that never exists
    let isolated = std::env::temp_dir().join("athena-tests-no-config");
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("athena"));
    cmd.env("XDG_CONFIG_HOME", &isolated).env("HOME", &isolated);
    cmd
}

fn play(data_dir: &std::path::Path, name: &str) -> Command {
    let mut cmd = cli();
    cmd.arg("play")
        .arg(name)
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--no-jitter")
        .arg("--seed")
        .arg("42");
    cmd
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Athena guided workout player"));
}

#[test]
fn test_list_shows_sessions_and_programs() {
    cli()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Full Body Ignition"))
        .stdout(predicate::str::contains("12:35"))
        .stdout(predicate::str::contains("fat-burn-challenge-4w"));
}

#[test]
fn test_play_session_to_completion() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    play(data_dir, "HIIT Blast")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[cue] Get ready for HIIT Blast. The first exercise is Butt Kicks.",
        ))
        .stdout(predicate::str::contains("[cue] Rest. Next up: Burpees"))
        .stdout(predicate::str::contains("[coach] Workout complete. Great job."))
        .stdout(predicate::str::contains("Finished HIIT Blast in 10:30"))
        .stdout(predicate::str::contains("Saved to history"));

    let history = fs::read_to_string(data_dir.join("history.jsonl")).unwrap();
    assert_eq!(history.lines().count(), 1);

    let record: serde_json::Value = serde_json::from_str(history.trim()).unwrap();
    assert_eq!(record["workout_name"], "HIIT Blast");
    assert_eq!(record["duration_seconds"], 630);
}

#[test]
fn test_session_name_is_case_insensitive() {
    let temp_dir = setup_test_dir();

    play(temp_dir.path(), "core crusher")
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing Core Crusher"));
}

#[test]
fn test_unknown_session_fails() {
    let temp_dir = setup_test_dir();

    play(temp_dir.path(), "Yoga Nidra")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown session"));
}

#[test]
fn test_play_without_name_or_program_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("play")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no active program"));
}

#[test]
fn test_no_save_leaves_history_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    play(data_dir, "Mindful Mobility")
        .arg("--no-save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not saved"));

    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_voice_pause_and_resume() {
    let temp_dir = setup_test_dir();

    play(temp_dir.path(), "HIIT Blast")
        .arg("--say")
        .arg("10:Pause workout")
        .arg("--say")
        .arg("40:resume")
        .assert()
        .success()
        .stdout(predicate::str::contains("> \"Pause workout\""))
        .stdout(predicate::str::contains("> \"resume\""))
        // Paused time does not count towards the workout
        .stdout(predicate::str::contains("Finished HIIT Blast in 10:30"));
}

#[test]
fn test_unresumed_pause_stops_without_record() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    play(data_dir, "Cardio Surge")
        .arg("--say")
        .arg("5:pause")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout left paused"))
        .stdout(predicate::str::contains("Workout stopped before the end"));

    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_unrecognized_utterance_is_reported() {
    let temp_dir = setup_test_dir();

    play(temp_dir.path(), "Mindful Mobility")
        .arg("--say")
        .arg("3:tell me a joke")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not understood)"));
}

#[test]
fn test_malformed_say_argument_rejected() {
    let temp_dir = setup_test_dir();

    play(temp_dir.path(), "HIIT Blast")
        .arg("--say")
        .arg("soon:pause")
        .assert()
        .failure();
}

#[test]
fn test_play_authored_session_file() {
    let temp_dir = setup_test_dir();
    let session_path = temp_dir.path().join("lunch.json");
    fs::write(
        &session_path,
        r#"{
            "name": "Lunch Express",
            "description": "Quick one",
            "intensity": "low",
            "blocks": [
                {"type": "work", "rounds": 2, "restBetweenRounds": null,
                 "exercises": [{"name": "Step Jacks", "duration": 20}]}
            ]
        }"#,
    )
    .unwrap();

    cli()
        .arg("play")
        .arg("--session-file")
        .arg(&session_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--no-jitter")
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing Lunch Express (0:40)"))
        .stdout(predicate::str::contains("Finished Lunch Express in 0:40"));
}

#[test]
fn test_invalid_session_file_falls_back() {
    let temp_dir = setup_test_dir();
    let session_path = temp_dir.path().join("broken.json");
    fs::write(&session_path, r#"{"name": "Broken", "blocks": []}"#).unwrap();

    cli()
        .arg("play")
        .arg("--session-file")
        .arg(&session_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--no-jitter")
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing Full Body Ignition"));
}

#[test]
fn test_history_lists_and_exports() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts yet."));

    play(data_dir, "Core Crusher").assert().success();
    play(data_dir, "HIIT Blast").assert().success();

    let csv_path = data_dir.join("export").join("history.csv");
    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Core Crusher"))
        .stdout(predicate::str::contains("HIIT Blast"))
        .stdout(predicate::str::contains("Exported 2 workouts"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("id,date,workout_name,duration_seconds"));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn test_program_lifecycle() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["program", "start", "fat-burn-challenge-4w"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: week 1 day 1 - Cardio Foundation"));

    for _ in 0..3 {
        cli()
            .args(["program", "complete"])
            .arg("--data-dir")
            .arg(data_dir)
            .assert()
            .success();
    }

    cli()
        .args(["program", "status"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress: 3/12 days"))
        .stdout(predicate::str::contains("Next: week 2 day 1 - HIIT Power"));

    cli()
        .args(["program", "quit"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .args(["program", "status"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No active program."));
}

#[test]
fn test_play_program_day_advances_program() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["program", "start", "fat-burn-challenge-4w"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();

    cli()
        .arg("play")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--no-jitter")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program day: Cardio Foundation"))
        .stdout(predicate::str::contains("Playing Cardio Surge"));

    cli()
        .args(["program", "status"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: week 1 day 2 - Full Body Strength"));
}

#[test]
fn test_unknown_program_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["program", "start", "couch-to-5k"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown program"));
}

fn long_run_file(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("long_run.json");
    fs::write(
        &path,
        r#"{
            "name": "Long Run",
            "description": "Steady effort",
            "intensity": "high",
            "blocks": [
                {"type": "work", "rounds": 1, "restBetweenRounds": null,
                 "exercises": [{"name": "Run", "duration": 120}]}
            ]
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_config_flag_overrides_default_location() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("from-config");
    let config_path = temp_dir.path().join("athena.toml");
    fs::write(
        &config_path,
        format!("[data]\ndata_dir = '{}'\n", data_dir.display()),
    )
    .unwrap();

    cli()
        .args(["play", "Mindful Mobility", "--no-jitter"])
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to history"));

    assert!(data_dir.join("history.jsonl").exists());
}

#[test]
fn test_invalid_config_file_rejected() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("athena.toml");
    fs::write(&config_path, "[engine]\ntick_interval_ms = 0\n").unwrap();

    cli()
        .arg("list")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_interval_ms"));
}

#[test]
fn test_discard_answer_skips_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    play(data_dir, "Mindful Mobility")
        .arg("--answer")
        .arg("Discard")
        .assert()
        .success()
        .stdout(predicate::str::contains("[cue] Save this workout?"))
        .stdout(predicate::str::contains("Discarded"));

    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_save_answer_records_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    play(data_dir, "Mindful Mobility")
        .arg("--answer")
        .arg("yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to history"));

    let history = fs::read_to_string(data_dir.join("history.jsonl")).unwrap();
    assert_eq!(history.lines().count(), 1);
}

#[test]
fn test_go_back_abandons_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    play(data_dir, "Core Crusher")
        .arg("--say")
        .arg("20:show history")
        .arg("--say")
        .arg("30:return to main")
        .assert()
        .success()
        .stdout(predicate::str::contains("(not available during a workout)"))
        .stdout(predicate::str::contains("Workout abandoned"))
        .stdout(predicate::str::contains("Workout stopped before the end"));

    assert!(!data_dir.join("history.jsonl").exists());
}

#[test]
fn test_utterance_during_recovery_is_heard_on_time() {
    let temp_dir = setup_test_dir();
    let session_path = long_run_file(temp_dir.path());

    // The fatigue window fills and spikes 60 seconds into the run
    let output = cli()
        .arg("play")
        .arg("--session-file")
        .arg(&session_path)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .args(["--no-jitter", "--no-save", "--recovery-secs", "100"])
        .arg("--say")
        .arg("80:show history")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let recovering = stdout.find("Recovering for 100s").unwrap();
    let heard = stdout.find("> \"show history\"").unwrap();
    let resumed = stdout.find("Recovered, resuming").unwrap();
    assert!(recovering < heard, "{}", stdout);
    assert!(heard < resumed, "{}", stdout);
}
