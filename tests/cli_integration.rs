//! Integration tests for the weekboard binary.
//!
//! Each test works on a board file in its own temp directory, with HOME and
//! the config search paths pointed there so no user config leaks in.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Fixtures
// =============================================================================

/// A temp directory holding one board file.
struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    /// Create an empty week board for the week of 2026-10-14 (Mon 12th).
    fn new() -> Self {
        let board = Self::uninitialized();
        board
            .cmd()
            .args(["init", "--week", "2026-10-14"])
            .assert()
            .success();
        board
    }

    /// A temp directory without a board file.
    fn uninitialized() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn file(&self) -> PathBuf {
        self.dir.path().join("week.json")
    }

    /// A weekboard command bound to this board.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("weekboard").unwrap();
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env_remove("WEEKBOARD_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--file")
            .arg(self.file());
        cmd
    }

    fn add(&self, day: &str, id: &str, title: &str) {
        self.cmd()
            .args(["add", "--day", day, "--id", id, title])
            .assert()
            .success();
    }

    fn show(&self) -> String {
        let output = self.cmd().arg("show").output().unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    }
}

// =============================================================================
// init / add / show
// =============================================================================

#[test]
fn init_creates_seven_days() {
    let board = TestBoard::new();
    let shown = board.show();

    assert!(shown.starts_with("Monday (2026-10-12)\n  (empty)\n"));
    assert!(shown.contains("Sunday (2026-10-18)"));
    assert_eq!(shown.matches("(empty)").count(), 7);
}

#[test]
fn init_refuses_to_overwrite() {
    let board = TestBoard::new();

    board
        .cmd()
        .args(["init", "--week", "2026-10-20"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    board
        .cmd()
        .args(["init", "--week", "2026-10-20", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: replacing the board at"));
    assert!(board.show().contains("Monday (2026-10-19)"));
}

#[test]
fn add_appends_to_the_day() {
    let board = TestBoard::new();
    board.add("2026-10-13", "laundry", "Laundry");
    board.add("2026-10-13", "dentist", "Dentist");

    let shown = board.show();
    assert!(shown.contains("Tuesday (2026-10-13)\n  1. Laundry <laundry>\n  2. Dentist <dentist>\n"));
}

#[test]
fn add_generates_an_id() {
    let board = TestBoard::new();

    board
        .cmd()
        .args(["add", "--day", "2026-10-12", "Groceries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added c-"));
}

#[test]
fn add_outside_the_week_fails() {
    let board = TestBoard::new();

    board
        .cmd()
        .args(["add", "--day", "2026-11-02", "Late"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not on this week's board"));
}

#[test]
fn add_rejects_duplicate_ids() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "First");

    board
        .cmd()
        .args(["add", "--day", "2026-10-13", "--id", "a", "Second"])
        .assert()
        .failure();
    assert_eq!(board.show().matches("<a>").count(), 1);
}

// =============================================================================
// move / step
// =============================================================================

#[test]
fn move_reorders_within_a_day() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");
    board.add("2026-10-12", "b", "Beta");

    board
        .cmd()
        .args(["move", "b", "--to", "mon", "--index", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("->1. Beta <b>"));

    assert!(board
        .show()
        .contains("Monday (2026-10-12)\n  1. Beta <b>\n  2. Alpha <a>\n"));
}

#[test]
fn move_to_another_day_by_date() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");

    board
        .cmd()
        .args(["move", "a", "--to", "2026-10-15"])
        .assert()
        .success();

    let shown = board.show();
    assert!(shown.contains("Monday (2026-10-12)\n  (empty)\n"));
    assert!(shown.contains("Thursday (2026-10-15)\n  1. Alpha <a>\n"));
}

#[test]
fn move_in_place_changes_nothing() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");
    let before = std::fs::read_to_string(board.file()).unwrap();

    board
        .cmd()
        .args(["move", "a", "--to", "monday"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a is already there"));

    assert_eq!(std::fs::read_to_string(board.file()).unwrap(), before);
}

#[test]
fn pinned_card_stays_in_its_day() {
    let board = TestBoard::new();
    board
        .cmd()
        .args(["add", "--day", "2026-10-12", "--id", "p", "--pinned", "Standup"])
        .assert()
        .success();
    board.add("2026-10-12", "a", "Alpha");

    board
        .cmd()
        .args(["move", "p", "--to", "tue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("p is pinned to its day"));

    // reordering inside its own day is fine
    board
        .cmd()
        .args(["move", "p", "--to", "mon", "--index", "1"])
        .assert()
        .success();
    assert!(board
        .show()
        .contains("Monday (2026-10-12)\n  1. Alpha <a>\n  2. Standup <p> [pinned]\n"));
}

#[test]
fn move_unknown_card_fails() {
    let board = TestBoard::new();

    board
        .cmd()
        .args(["move", "ghost", "--to", "tue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn day_names_need_two_letters() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");

    board
        .cmd()
        .args(["move", "a", "--to", "t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no column named 't'"));

    board
        .cmd()
        .args(["move", "a", "--to", "th"])
        .assert()
        .success();
    assert!(board.show().contains("Thursday (2026-10-15)\n  1. Alpha <a>\n"));
}

#[test]
fn step_moves_by_keyboard() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");
    board.add("2026-10-12", "b", "Beta");

    // right to Tuesday, then back left and down below Beta
    board
        .cmd()
        .args(["step", "a", "right", "left", "down"])
        .assert()
        .success();

    assert!(board
        .show()
        .contains("Monday (2026-10-12)\n  1. Beta <b>\n  2. Alpha <a>\n"));
}

#[test]
fn step_rejects_unknown_direction() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");

    board
        .cmd()
        .args(["step", "a", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown direction"));
}

// =============================================================================
// check / errors
// =============================================================================

#[test]
fn check_reports_the_fingerprint() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");
    board.add("2026-10-14", "b", "Beta");

    board
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 7 columns, 2 cards, fingerprint "));
}

#[test]
fn check_lists_every_duplicate() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");
    board.add("2026-10-12", "b", "Beta");

    // copy Monday's cards into Tuesday by hand
    let text = std::fs::read_to_string(board.file()).unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let monday = json["columns"][0]["items"].clone();
    json["columns"][1]["items"] = monday;
    std::fs::write(board.file(), serde_json::to_string(&json).unwrap()).unwrap();

    board
        .cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("card a appears 2 times"))
        .stderr(predicate::str::contains("card b appears 2 times"))
        .stderr(predicate::str::contains("board has 2 problem(s)"));
}

#[test]
fn check_rejects_a_corrupt_board() {
    let board = TestBoard::new();
    std::fs::write(board.file(), "{ not json").unwrap();

    board.cmd().arg("check").assert().failure();
}

#[test]
fn missing_board_suggests_init() {
    let board = TestBoard::uninitialized();

    board
        .cmd()
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("weekboard init"));
}

#[test]
fn explicit_config_must_exist() {
    let board = TestBoard::new();

    board
        .cmd()
        .arg("--config")
        .arg(board.dir.path().join("nope.toml"))
        .arg("show")
        .assert()
        .failure();
}

#[test]
fn quiet_move_prints_nothing() {
    let board = TestBoard::new();
    board.add("2026-10-12", "a", "Alpha");

    board
        .cmd()
        .args(["--quiet", "move", "a", "--to", "wed"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
