//! End-to-end tests running the `zit` binary against a temporary data directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn zit(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_zit"))
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("ZIT_DATA_DIR", home.join("data"))
        .env_remove("RUST_LOG")
        .current_dir(home)
        .args(args)
        .output()
        .expect("failed to run zit")
}

fn stdout(home: &Path, args: &[&str]) -> String {
    let output = zit(home, args);
    assert!(
        output.status.success(),
        "zit {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Records a full day with explicit times so the result does not depend on
/// the clock.
fn record_day(home: &Path) {
    assert_eq!(
        stdout(home, &["add", "Coding", "0900"]),
        "Added project: Coding at 09:00\n"
    );
    assert_eq!(stdout(home, &["lunch", "1200"]), "Started lunch at 12:00\n");
    stdout(home, &["add", "Review", "1300"]);
    stdout(home, &["add", "Email", "1330", "--subtask", "-n", "inbox"]);
    assert_eq!(
        stdout(home, &["stop", "1700"]),
        "Stopped tracking time at 17:00\n"
    );
}

#[test]
fn day_is_recorded_and_reported() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    record_day(home);

    let json: serde_json::Value = serde_json::from_str(&stdout(home, &["status", "--json"])).unwrap();
    assert_eq!(json["project_times"]["Coding"], 3 * 3600);
    assert_eq!(json["project_times"]["Review"], 4 * 3600);
    assert_eq!(json["totals"]["included"], 7 * 3600);
    assert_eq!(json["totals"]["excluded"], 3600);

    assert_eq!(
        stdout(home, &["verify"]),
        "✓ LUNCH event found\n✓ final STOP event found\n✓ DEFAULT project not used\n"
    );

    let listing = stdout(home, &["list"]);
    assert!(listing.contains("Review"));
    assert!(listing.contains("Email"));
    assert!(listing.contains("inbox"));

    assert!(home.join("data").read_dir().unwrap().count() >= 2);
}

#[test]
fn duplicate_time_is_not_added() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    stdout(home, &["add", "Coding", "0900"]);
    assert_eq!(
        stdout(home, &["add", "Review", "0900"]),
        "An event already exists at 09:00:00. Nothing added.\n"
    );
}

#[test]
fn invalid_index_lists_events() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    record_day(home);

    let out = stdout(home, &["remove", "9"]);
    assert!(out.starts_with("Invalid index. Operation aborted.\n0: Coding - 09:00:00\n"));

    assert_eq!(stdout(home, &["remove", "3"]), "Removed STOP at 17:00:00.\n");
    assert!(stdout(home, &["verify"]).contains("✗ final STOP event not found"));
}

#[test]
fn history_lists_recorded_day() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    assert_eq!(stdout(home, &["fm", "list"]), "No data files found.\n");

    record_day(home);
    let out = stdout(home, &["fm", "list", "--projects"]);
    assert!(out.contains("Total: 07:00:00 | ✔"));
    assert!(out.contains("    ├── Coding: 03:00:00"));
    assert!(out.contains("    └── Review: 04:00:00"));
}

#[test]
fn bad_input_fails() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    let output = zit(home, &["add", "Coding", "2561"]);
    assert!(!output.status.success());
    assert!(!home.join("data").exists());

    let output = zit(home, &["status", "--date", "04-03-2024"]);
    assert!(!output.status.success());
}

/// Writes a data file as `zit git import` or `zit sys import` would.
fn seed(home: &Path, relative: &str, rows: &str) {
    let path = home.join("data").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, rows).unwrap();
}

#[test]
fn git_projects_are_listed_and_removed() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    seed(
        home,
        "git/zit/2024-03-04.csv",
        "2024-03-04T10:00:00,1111111,Add parser,Ada,ada@example.com\n",
    );
    seed(
        home,
        "git/zit/2024-03-05.csv",
        "2024-03-05T12:00:00,3333333,Release,Bob,bob@example.com\n",
    );
    seed(
        home,
        "git/other/2024-03-04.csv",
        "2024-03-04T09:00:00,4444444,Init,Ada,ada@example.com\n",
    );

    assert_eq!(
        stdout(home, &["git", "list", "-d", "2024-03-04"]),
        "--- other ---\n09:00:00 4444444 Init (Ada)\n--- zit ---\n10:00:00 1111111 Add parser (Ada)\n"
    );
    assert_eq!(
        stdout(home, &["git", "list", "-p", "zit", "--all"]),
        "--- zit 2024-03-04 ---\n10:00:00 1111111 Add parser (Ada)\n\
         --- zit 2024-03-05 ---\n12:00:00 3333333 Release (Bob)\n"
    );

    assert_eq!(
        stdout(home, &["git", "remove", "zit"]),
        "Project 'zit' has been moved to the trash.\n"
    );
    assert_eq!(stdout(home, &["git", "projects"]), "other\n");
    assert!(home.join("data/git/zit/trash").is_dir());

    assert!(!zit(home, &["git", "remove"]).status.success());
    assert_eq!(
        stdout(home, &["git", "remove", "--all"]),
        "All git projects have been moved to the trash.\n"
    );
    assert_eq!(stdout(home, &["git", "projects"]), "No git projects found.\n");
}

#[test]
fn system_events_are_reported_and_removed() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    seed(
        home,
        "system/2024-03-04.csv",
        "2024-03-04T08:00:00,wake,,\n2024-03-04T12:00:00,sleep,,\n",
    );
    seed(
        home,
        "system/2024-03-05.csv",
        "2024-03-05T09:00:00,wake,,\n2024-03-05T10:30:00,shutdown,,\n",
    );

    assert_eq!(
        stdout(home, &["sys", "awake", "--all"]),
        "Awake intervals for 2024-03-04:\n08:00:00 -> 12:00:00  04:00:00\nTotal awake: 04:00:00\n\
         Awake intervals for 2024-03-05:\n09:00:00 -> 10:30:00  01:30:00\nTotal awake: 01:30:00\n"
    );

    assert_eq!(
        stdout(home, &["sys", "remove", "-d", "2024-03-04"]),
        "System event data for 2024-03-04 has been moved to the trash.\n"
    );
    assert_eq!(
        stdout(home, &["sys", "list", "-d", "2024-03-04"]),
        "No system events found for 2024-03-04.\n"
    );
    assert_eq!(
        stdout(home, &["sys", "remove", "--all"]),
        "All system event data has been moved to the trash.\n"
    );
    assert_eq!(stdout(home, &["sys", "awake", "--all"]), "No system events found.\n");
    assert!(home.join("data/system/trash").is_dir());
}
