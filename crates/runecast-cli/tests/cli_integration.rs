//! CLI Integration Tests
//!
//! These tests verify the CLI commands work correctly end-to-end.
//! They test the "wiring" between the CLI and the core library.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Create a CLI command with a temporary data directory and no remote services
fn cli_cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("runecast").expect("Failed to find runecast binary");
    for var in [
        "RUNECAST_INTERPRETATION_URL",
        "RUNECAST_BILLING_URL",
        "RUNECAST_PRICE_ID",
        "RUNECAST_REQUEST_TIMEOUT",
        "RUNECAST_LOG_DIR",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--data-dir").arg(data_dir.path());
    cmd
}

/// Same as `cli_cmd` but signed in as `user`
fn user_cmd(data_dir: &TempDir, user: &str) -> Command {
    let mut cmd = cli_cmd(data_dir);
    cmd.arg("--user").arg(user);
    cmd
}

/// Extract the reading ID from draw output ("Saved reading: <ulid>")
fn extract_reading_id(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Saved reading: "))
        .map(|id| id.trim().to_string())
}

fn draw_three(data_dir: &TempDir, user: &str) -> String {
    let output = user_cmd(data_dir, user)
        .args(["draw", "three_rune", "--question", "What should I focus on?"])
        .output()
        .unwrap();
    assert!(output.status.success());
    extract_reading_id(&String::from_utf8_lossy(&output.stdout)).expect("reading id in output")
}

// ============================================================================
// Catalog & Spread Tests
// ============================================================================

#[test]
fn test_catalog_list() {
    let data_dir = TempDir::new().unwrap();

    cli_cmd(&data_dir)
        .args(["catalog", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Runes (24):"))
        .stdout(predicate::str::contains("Fehu"))
        .stdout(predicate::str::contains("Othala"));
}

#[test]
fn test_catalog_show_by_name() {
    let data_dir = TempDir::new().unwrap();

    cli_cmd(&data_dir)
        .args(["catalog", "show", "Ansuz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID: ansuz"))
        .stdout(predicate::str::contains("Upright:"));
}

#[test]
fn test_catalog_show_unknown_rune() {
    let data_dir = TempDir::new().unwrap();

    cli_cmd(&data_dir)
        .args(["catalog", "show", "wyrd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rune not found"));
}

#[test]
fn test_spread_list_marks_premium() {
    let data_dir = TempDir::new().unwrap();

    cli_cmd(&data_dir)
        .args(["spread", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Three Rune"))
        .stdout(predicate::str::contains("(celtic_cross) [premium]"))
        .stdout(predicate::str::contains("The Answer"));
}

// ============================================================================
// Draw Tests
// ============================================================================

#[test]
fn test_draw_requires_user() {
    let data_dir = TempDir::new().unwrap();

    cli_cmd(&data_dir)
        .args(["draw", "three_rune", "--question", "Anyone there?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication required"));
}

#[test]
fn test_draw_three_rune() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["draw", "three-rune", "-q", "What should I focus on?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Past:"))
        .stdout(predicate::str::contains("The Present:"))
        .stdout(predicate::str::contains("The Future:"))
        .stdout(predicate::str::contains("Saved reading: "));
}

#[test]
fn test_draw_rejects_blank_question() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["draw", "three_rune", "--question", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_draw_premium_spread_without_subscription() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["draw", "celtic_cross", "--question", "What lies ahead?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Subscription required"));
}

#[test]
fn test_draw_unknown_spread() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["draw", "tarot", "--question", "What lies ahead?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown spread type"));
}

#[test]
fn test_draw_interpret_without_service() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["draw", "three_rune", "-q", "What now?", "--interpret"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Saved reading: "))
        .stderr(predicate::str::contains("Gateway unavailable"));
}

#[test]
fn test_yes_no() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["yes-no", "Should I take the job?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Answer:"))
        .stdout(predicate::str::is_match("Answer: (YES|NO|MAYBE)").unwrap());
}

// ============================================================================
// History Tests
// ============================================================================

#[test]
fn test_history_roundtrip() {
    let data_dir = TempDir::new().unwrap();
    let id = draw_three(&data_dir, "astrid");

    user_cmd(&data_dir, "astrid")
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Readings (1):"))
        .stdout(predicate::str::contains(id.as_str()));

    user_cmd(&data_dir, "astrid")
        .args(["history", "notes", &id, "It came true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes saved"));

    user_cmd(&data_dir, "astrid")
        .args(["history", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Three Rune"))
        .stdout(predicate::str::contains("Question: What should I focus on?"))
        .stdout(predicate::str::contains("Notes: It came true"));

    user_cmd(&data_dir, "astrid")
        .args(["history", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    user_cmd(&data_dir, "astrid")
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved readings."));
}

#[test]
fn test_history_is_per_user() {
    let data_dir = TempDir::new().unwrap();
    let id = draw_three(&data_dir, "astrid");

    user_cmd(&data_dir, "bjorn")
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved readings."));

    user_cmd(&data_dir, "bjorn")
        .args(["history", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Divination not found"));
}

#[test]
fn test_history_invalid_id() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["history", "show", "not-an-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid divination ID"));
}

// ============================================================================
// Daily & Favorites Tests
// ============================================================================

#[test]
fn test_daily_rune_stable_for_date() {
    let data_dir = TempDir::new().unwrap();

    let first = user_cmd(&data_dir, "astrid")
        .args(["daily", "--date", "2026-03-02"])
        .output()
        .unwrap();
    assert!(first.status.success());

    let second = user_cmd(&data_dir, "astrid")
        .args(["daily", "--date", "2026-03-02", "--reflect", "Stayed patient"])
        .output()
        .unwrap();
    assert!(second.status.success());

    let first = String::from_utf8_lossy(&first.stdout).to_string();
    let second = String::from_utf8_lossy(&second.stdout).to_string();
    assert!(second.starts_with(&first));
    assert!(second.contains("Reflection: Stayed patient"));
}

#[test]
fn test_favorites() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["favorite", "add", "Algiz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added favorite: algiz"));

    user_cmd(&data_dir, "astrid")
        .args(["favorite", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Favorites (1):"))
        .stdout(predicate::str::contains("Algiz"));

    user_cmd(&data_dir, "astrid")
        .args(["favorite", "remove", "algiz"])
        .assert()
        .success();

    user_cmd(&data_dir, "astrid")
        .args(["favorite", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorite runes."));
}

// ============================================================================
// Subscription Tests
// ============================================================================

#[test]
fn test_subscription_status_defaults_to_inactive() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["subscription", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Subscription: inactive"))
        .stdout(predicate::str::contains("Premium spreads: locked"));
}

#[test]
fn test_checkout_without_billing_service() {
    let data_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .args(["subscription", "checkout", "price_monthly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Gateway unavailable"));
}

// ============================================================================
// Logging Tests
// ============================================================================

#[test]
fn test_log_dir_writes_journal() {
    let data_dir = TempDir::new().unwrap();
    let log_dir = TempDir::new().unwrap();

    user_cmd(&data_dir, "astrid")
        .arg("-vv")
        .arg("--log-dir")
        .arg(log_dir.path())
        .args(["draw", "yes_no", "-q", "Will it rain?"])
        .assert()
        .success();

    let journal: Vec<_> = std::fs::read_dir(log_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "jsonl"))
        .collect();
    assert_eq!(journal.len(), 1);

    let content = std::fs::read_to_string(journal[0].path()).unwrap();
    assert!(content.contains("reading dealt"));
    assert!(content.contains("reading saved"));
}
