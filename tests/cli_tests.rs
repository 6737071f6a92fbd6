//! CLI smoke tests for the paths that need no API
//!
//! Lead commands operate purely on the local database, so they can run
//! end-to-end against a temp data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn crmkit(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("crmkit").unwrap();
    cmd.env("CRMKIT_DATA_DIR", data_dir.path());
    cmd.env("CRMKIT_API_URL", "http://127.0.0.1:1/api");
    cmd
}

#[test]
fn lead_add_list_rm_roundtrip() {
    let tmp = TempDir::new().unwrap();

    crmkit(&tmp)
        .args(["lead", "add", "--name", "Walk-in", "--source", "event"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded lead"));

    let output = crmkit(&tmp).args(["lead", "list"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Walk-in"));
    assert!(stdout.contains("event"));

    // Pull the id out of the table (first column of the data row)
    let id = stdout
        .lines()
        .find(|line| line.contains("Walk-in"))
        .and_then(|line| line.split('│').nth(1))
        .map(|cell| cell.trim().to_string())
        .expect("lead row present");
    // The table shows the full id; it is the handle for rm
    assert_eq!(id.len(), 26);

    crmkit(&tmp)
        .args(["lead", "rm", "not-a-real-id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No lead with id"));

    crmkit(&tmp)
        .args(["lead", "rm", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted lead"));

    crmkit(&tmp)
        .args(["lead", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No leads recorded."));
}

#[test]
fn import_dry_run_reports_rejects_without_network() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("companies.csv");
    std::fs::write(
        &csv,
        "Company Name,Industry,Email\nAcme,Robotics,sales@acme.example\n,Missing,\nGlobex,Energy,bad-email\n",
    )
    .unwrap();

    crmkit(&tmp)
        .args(["import", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 valid, 2 rejected"));
}

#[test]
fn completions_generate() {
    let tmp = TempDir::new().unwrap();
    crmkit(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("crmkit"));
}
