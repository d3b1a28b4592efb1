//! Integration tests for the `lampwatch` CLI binary.
//!
//! Parsing, help and config tests need no server. Data commands run
//! against a wiremock lamp backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `lampwatch` binary with env isolation.
///
/// Clears all `LAMPWATCH_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn lampwatch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lampwatch");
    cmd.env("HOME", "/tmp/lampwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/lampwatch-cli-test-nonexistent")
        .env_remove("LAMPWATCH_API_URL")
        .env_remove("LAMPWATCH_DASHBOARD_URL")
        .env_remove("LAMPWATCH_OUTPUT")
        .env_remove("LAMPWATCH_TIMEOUT_MS")
        .env_remove("LAMPWATCH_INSECURE")
        .env_remove("RUST_LOG");
    cmd
}

/// Same, aimed at a mock server's `/api` root.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = lampwatch_cmd();
    cmd.args(["--api-url", &format!("{}/api", server.uri())]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = lampwatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    lampwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("posture")
            .and(predicate::str::contains("device"))
            .and(predicate::str::contains("monitor"))
            .and(predicate::str::contains("analysis")),
    );
}

#[test]
fn test_version_flag() {
    lampwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lampwatch"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    lampwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    lampwatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = lampwatch_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = lampwatch_cmd()
        .args(["--output", "invalid", "device", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("invalid"), "Expected value error:\n{text}");
}

#[test]
fn test_brightness_out_of_range_is_usage_error() {
    let output = lampwatch_cmd()
        .args(["light", "brightness", "150"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_device_set_without_fields_is_rejected_locally() {
    let output = lampwatch_cmd()
        .args(["device", "set"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--brightness"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    lampwatch_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:5000/api"));
}

#[test]
fn test_config_show_applies_flag_overrides() {
    lampwatch_cmd()
        .args([
            "--api-url",
            "http://lamp.local:5000/api",
            "-o",
            "json",
            "config",
            "show",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""api_url": "http://lamp.local:5000/api""#));
}

#[test]
fn test_config_path_points_into_config_home() {
    lampwatch_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let run = || {
        let mut cmd = lampwatch_cmd();
        cmd.env("HOME", dir.path())
            .env("XDG_CONFIG_HOME", dir.path())
            .args(["config", "init"]);
        cmd.output().unwrap()
    };

    assert!(run().status.success());
    let second = run();
    assert_eq!(second.status.code(), Some(2));
    assert!(combined_output(&second).contains("--force"));
}

// ── Dashboard ───────────────────────────────────────────────────────

#[test]
fn test_analysis_without_dashboard_url() {
    let output = lampwatch_cmd()
        .args(["analysis", "start"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("dashboard"), "Expected dashboard hint:\n{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analysis_status_prints_polled_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get_pose_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "is_running": true,
            "emotion_data": {"emotion": "HAPPY", "emotion_code": 0}
        })))
        .mount(&server)
        .await;

    lampwatch_cmd()
        .args(["--dashboard-url", &server.uri(), "analysis", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("运行中").and(predicate::str::contains("快乐")));
}

// ── Data commands ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_device_status_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "online": true,
            "batteryLevel": 64,
            "charging": false
        })))
        .mount(&server)
        .await;

    against(&server)
        .args(["-o", "json", "device", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""batteryLevel": 64"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_device_status_server_error_prints_fallback_with_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/device/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    against(&server)
        .args(["device", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("85%"))
        .stderr(predicate::str::contains("warning: 获取设备状态失败，使用模拟数据"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_light_brightness_posts_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/control/light/brightness"))
        .and(body_json(json!({"brightness": 40})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["light", "brightness", "40"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_light_refused_by_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/control/light/power"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "设备离线"
        })))
        .mount(&server)
        .await;

    let output = against(&server)
        .args(["light", "power", "off"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("设备离线"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remind_posture() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lamp/reminder/posture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    against(&server)
        .args(["remind", "posture"])
        .assert()
        .success()
        .stderr(predicate::str::contains("posture reminder sent"));
}

#[test]
fn test_unreachable_server_still_prints_fallback() {
    // Nothing listens on port 9; every store falls back.
    lampwatch_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9/api",
            "--timeout",
            "2000",
            "monitor",
            "emotion",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning"));
}
