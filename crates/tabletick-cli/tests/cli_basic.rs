//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(home: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_tabletick"))
        .args(args)
        .env("TABLETICK_HOME", home.path())
        .env_remove("TABLETICK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("not JSON ({e}): {stdout}"))
}

#[test]
fn test_turn_start_and_status() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["turn", "start", "--players", "3", "--seconds", "30"]);
    assert_eq!(code, 0, "turn start failed");
    let started = json(&stdout);
    assert_eq!(started["type"], "TurnStarted");
    assert_eq!(started["player"], "Player 1");
    assert_eq!(started["player_count"], 3);

    let (code, stdout, _) = run_cli(&home, &["turn", "status"]);
    assert_eq!(code, 0, "turn status failed");
    let status = json(&stdout);
    assert_eq!(status["type"], "TurnSnapshot");
    assert_eq!(status["phase"], "running");
    assert!(status["remaining_ms"].as_u64().unwrap() <= 30_000);
}

#[test]
fn test_turn_next_rotates_players() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["turn", "start", "--players", "2", "--seconds", "60"]);

    let (code, stdout, _) = run_cli(&home, &["turn", "next"]);
    assert_eq!(code, 0);
    let advanced = json(&stdout);
    assert_eq!(advanced["type"], "TurnAdvanced");
    assert_eq!(advanced["player_index"], 1);

    let (_, stdout, _) = run_cli(&home, &["turn", "next"]);
    assert_eq!(json(&stdout)["player_index"], 0);
}

#[test]
fn test_turn_reset_returns_to_idle() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["turn", "start"]);
    let (code, stdout, _) = run_cli(&home, &["turn", "reset"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["type"], "TurnReset");

    let (_, stdout, _) = run_cli(&home, &["turn", "status"]);
    assert_eq!(json(&stdout)["phase"], "idle");
}

#[test]
fn test_turn_start_rejects_bad_player_count() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["turn", "start", "--players", "5"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "stderr was {stderr}");
}

#[test]
fn test_turn_history_starts_empty() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["turn", "history"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));

    let (code, stdout, _) = run_cli(&home, &["turn", "history", "--clear"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("history cleared"));
}

#[test]
fn test_rank_submit_and_show() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &home,
        &["rank", "submit", "--duration", "5", "--name", "  ann  ", "--score", "42"],
    );
    assert_eq!(code, 0, "rank submit failed");
    let registration = json(&stdout);
    assert_eq!(registration["rank"], 1);
    assert_eq!(registration["entry"]["name"], "ann");

    let (code, stdout, _) = run_cli(&home, &["rank", "show", "--duration", "5"]);
    assert_eq!(code, 0);
    let boards = json(&stdout);
    assert_eq!(boards["5s"][0]["score"], 42);

    let (_, stdout, _) = run_cli(&home, &["rank", "show"]);
    let boards = json(&stdout);
    assert_eq!(boards.as_object().unwrap().len(), 5);
    assert_eq!(boards["10s"], serde_json::json!([]));
}

#[test]
fn test_rank_clear() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["rank", "submit", "--duration", "3", "--name", "ben", "--score", "7"]);
    let (code, _, _) = run_cli(&home, &["rank", "clear", "--duration", "3"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&home, &["rank", "show", "--duration", "3"]);
    assert_eq!(json(&stdout)["3s"], serde_json::json!([]));
}

#[test]
fn test_rank_rejects_unknown_duration() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["rank", "show", "--duration", "7"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_get_set_list() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "turn.seconds_per_turn"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "15");

    let (code, _, _) = run_cli(&home, &["config", "set", "turn.seconds_per_turn", "20"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&home, &["config", "get", "turn.seconds_per_turn"]);
    assert_eq!(stdout.trim(), "20");

    let (code, stdout, _) = run_cli(&home, &["config", "list", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["ranking"]["backend"], "local");

    let (code, stdout, _) = run_cli(&home, &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[signals]"), "stdout was {stdout}");
    assert!(stdout.contains("output = \"bell\""), "stdout was {stdout}");
}

#[test]
fn test_config_selects_signal_output() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "set", "signals.output", "silent"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "signals.output = silent");

    let (code, _, _) = run_cli(&home, &["config", "set", "signals.output", "trumpet"]);
    assert_eq!(code, 1);

    let (code, _, _) = run_cli(&home, &["turn", "start", "--seconds", "30"]);
    assert_eq!(code, 0);
}

#[test]
fn test_turn_next_after_deadline_ends_game() {
    let home = TempDir::new().unwrap();
    run_cli(&home, &["config", "set", "signals.output", "silent"]);
    run_cli(&home, &["turn", "start", "--players", "2", "--seconds", "1"]);
    std::thread::sleep(std::time::Duration::from_millis(1_200));

    let (code, stdout, _) = run_cli(&home, &["turn", "next"]);
    assert_eq!(code, 0);
    let over = json(&stdout);
    assert_eq!(over["type"], "TurnOver");
    assert_eq!(over["loser"], "Player 1");

    let (_, stdout, _) = run_cli(&home, &["turn", "history"]);
    assert_eq!(json(&stdout)[0]["loser"], "Player 1");
}

#[test]
fn test_config_rejects_invalid_values() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "turn.player_count", "9"]);
    assert_eq!(code, 1);
    let (code, _, _) = run_cli(&home, &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("tabletick"));
}
