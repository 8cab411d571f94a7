#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli(plan: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("kenshoku-cli").unwrap();
    cmd.arg("--plan").arg(plan);
    cmd
}

#[test]
fn init_assign_and_export() {
    let dir = tempdir().unwrap();
    let plan = dir.path().join("plan.json");
    let out = dir.path().join("meals.csv");

    cli(&plan)
        .args(["init", "--year", "2025", "--month", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    cli(&plan)
        .args(["init", "--year", "2025", "--month", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cli(&plan)
        .arg("assign-meals")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `assign` first"));

    cli(&plan)
        .arg("assign")
        .assert()
        .success()
        .stdout(predicate::str::contains("30 day(s)"));
    cli(&plan).arg("assign-meals").assert().success();
    cli(&plan)
        .args(["export", "--kind", "meals", "--out"])
        .arg(&out)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("date,meal,slot,name\n2025-04-01,breakfast,1,"));
    assert_eq!(csv.lines().count(), 1 + 30 * 4);
}

#[test]
fn set_slot_rejects_unknown_staff() {
    let dir = tempdir().unwrap();
    let plan = dir.path().join("plan.json");

    cli(&plan)
        .args(["init", "--year", "2025", "--month", "4"])
        .assert()
        .success();
    cli(&plan).arg("assign").assert().success();
    cli(&plan)
        .args([
            "set-slot", "--day", "1", "--role", "nurse", "--shift", "night", "--slot", "1",
            "--name", "nobody",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown staff: nobody"));
    cli(&plan)
        .args([
            "set-slot", "--day", "1", "--role", "nurse", "--shift", "night", "--slot", "1",
            "--name", "nurse05",
        ])
        .assert()
        .success();
    cli(&plan)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(" 1 | nurse | night: nurse05"));
}

#[test]
fn stats_list_every_staff_member() {
    let dir = tempdir().unwrap();
    let plan = dir.path().join("plan.json");

    cli(&plan)
        .args(["init", "--year", "2025", "--month", "4"])
        .assert()
        .success();
    cli(&plan)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `assign` first"));
    cli(&plan).arg("assign").assert().success();

    let out = cli(&plan).arg("stats").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 40 + 11 + 6);
    assert!(stdout.contains("office06 | office |"));
}
