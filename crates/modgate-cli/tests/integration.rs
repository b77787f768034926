#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VALID: &str = r#"
panel:
  url: http://127.0.0.1:1
  server_id: abc123
  api_key: ptlc_test
  timeout_secs: 2
"#;

const ENV_KEYS: &[&str] = &[
    "MODGATE_CONFIG",
    "MODGATE_TOKEN",
    "RUST_LOG",
    "PTERODACTYL_API_URL",
    "PTERODACTYL_API_KEY",
    "PTERODACTYL_SERVER_ID",
    "ADMIN_ROLE",
    "ADMIN_ROLE_ID",
    "AUDIT_WEBHOOK_URL",
    "CMD_KILL",
    "CMD_KICK",
    "CMD_TEMPBAN",
    "CMD_BAN",
    "CMD_IPBAN",
    "CMD_MUTE",
    "CMD_WARN",
    "CMD_FREEZE",
    "CMD_UNFREEZE",
];

/// `modgate` running inside `dir` with a clean environment.
fn modgate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modgate").unwrap();
    cmd.current_dir(dir.path());
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::write(dir.path().join("modgate.yaml"), yaml).unwrap();
}

// ---------------------------------------------------------------------------
// modgate config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_lists_every_template_error() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        &format!("{VALID}commands:\n  kick: \"kick {{reason}}\"\n  mute: \"mute everyone\"\n"),
    );
    modgate(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] command template for 'kick'"))
        .stdout(predicate::str::contains("[error] command template for 'mute'"))
        .stderr(predicate::str::contains("found 2 error(s)"));
}

#[test]
fn config_validate_without_any_config_reports_panel_fields() {
    let dir = TempDir::new().unwrap();
    modgate(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("panel.url"))
        .stdout(predicate::str::contains("panel.server_id"))
        .stdout(predicate::str::contains("panel.api_key"));
}

#[test]
fn config_from_environment_only() {
    let dir = TempDir::new().unwrap();
    modgate(&dir)
        .env("PTERODACTYL_API_URL", "https://panel.example.com/")
        .env("PTERODACTYL_API_KEY", "ptlc_env")
        .env("PTERODACTYL_SERVER_ID", "srv")
        .args(["config", "validate"])
        .assert()
        .success();
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    modgate(&dir)
        .args(["--config", "nope.yaml", "config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn config_show_prints_effective_templates() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .env("CMD_IPBAN", "banip {target} {reason}")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tempban {target} {duration}m {reason}"))
        .stdout(predicate::str::contains("banip {target} {reason}"))
        .stdout(predicate::str::contains("tick freeze"));
}

#[test]
fn config_show_json() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    let output = modgate(&dir)
        .args(["--json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["panel"]["server_id"], "abc123");
    assert_eq!(json["templates"].as_array().unwrap().len(), 8);
}

// ---------------------------------------------------------------------------
// modgate exec
// ---------------------------------------------------------------------------

#[test]
fn exec_dry_run_renders_command() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .args(["exec", "kick", "--target", "Steve", "--reason", "Cheating", "--dry-run"])
        .assert()
        .success()
        .stdout("kick Steve Cheating\n");
}

#[test]
fn exec_dry_run_tempban_needs_duration() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .args(["exec", "tempban", "-t", "Steve", "-r", "Griefing", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration"));
}

#[test]
fn exec_unknown_action_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .args(["exec", "smite", "-t", "Steve", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown action: smite"));
}

#[test]
fn exec_refuses_invalid_config() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, &format!("{VALID}commands:\n  kill: \"kill\"\n"));
    modgate(&dir)
        .args(["exec", "kill", "-t", "Steve", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration is invalid"));
}

#[test]
fn exec_with_unknown_operator_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .args(["exec", "kill", "-t", "Steve", "--operator", "nobody", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no operator named 'nobody'"));
}

#[test]
fn rust_log_raises_verbosity_above_the_default() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .env("RUST_LOG", "debug")
        .args(["exec", "kill", "-t", "Steve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DEBUG"));
}

#[test]
fn exec_against_unreachable_panel_reports_network_failure() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .args(["exec", "kill", "-t", "Steve"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to execute command"))
        .stderr(predicate::str::contains("network_failure"));
}

#[test]
fn exec_json_output_carries_error_kind() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    let output = modgate(&dir)
        .args(["--json", "exec", "freeze"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["succeeded"], false);
    assert_eq!(json["error_kind"]["kind"], "network_failure");
}

// ---------------------------------------------------------------------------
// modgate status
// ---------------------------------------------------------------------------

#[test]
fn status_against_unreachable_panel_fails() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, VALID);
    modgate(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("status query failed"));
}
