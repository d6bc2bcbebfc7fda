//! Integration tests for the `erovinieta` CLI binary.
//!
//! Argument parsing, help, completions and error exit codes, plus one-shot
//! polling against a mock portal.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation: no `EROVINIETA_*` variables, and
/// config directories under a fresh temp dir.
fn erovinieta_cmd(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("erovinieta");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("EROVINIETA_PROFILE")
        .env_remove("EROVINIETA_USERNAME")
        .env_remove("EROVINIETA_PASSWORD")
        .env_remove("EROVINIETA_BASE_URL")
        .env_remove("EROVINIETA_OUTPUT")
        .env_remove("EROVINIETA_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_portal(login: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_spring_security_check"))
        .respond_with(login)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/client/getUserData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "utilizator": { "nume": "ION POPESCU" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/client/vehicle/getVehiclesPaginated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "view": [{
                "entity": { "vin": "V1", "plateNo": "B123XYZ", "certificateSeries": "C1" }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/anonymousUser/getCountries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/client/transaction/getTransactionsPaginated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "view": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/client/detection/getDetectionsForVehicle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "detectionList": [] })))
        .mount(&server)
        .await;
    server
}

fn login_ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("set-cookie", "JSESSIONID=abc; Path=/")
        .set_body_json(json!({}))
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = erovinieta_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("vignette")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("snapshot"))
            .and(predicate::str::contains("completions")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("erovinieta"));
}

#[test]
fn test_invalid_output_format_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home)
        .args(["--output", "xml", "status"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("erovinieta"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_status_without_config_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = erovinieta_cmd(&home).arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Configuration file not found"));
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let output = erovinieta_cmd(&home)
        .args(["--profile", "work", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Profile 'work' not found"));
}

#[test]
fn test_interval_out_of_range_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = erovinieta_cmd(&home)
        .env("EROVINIETA_PASSWORD", "pw")
        .args(["--username", "ion@example.com", "--interval", "10", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("update_interval"));
}

#[test]
fn test_history_years_out_of_range_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home)
        .env("EROVINIETA_PASSWORD", "pw")
        .args(["-u", "ion@example.com", "--history-years", "11", "status"])
        .assert()
        .code(2);
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let home = tempfile::tempdir().unwrap();
    erovinieta_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("update_interval = 3600"));
}

// ── Against a mock portal ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_status_prints_vehicle_values() {
    let server = mock_portal(login_ok()).await;
    let home = tempfile::tempdir().unwrap();

    let output = erovinieta_cmd(&home)
        .env("EROVINIETA_PASSWORD", "pw")
        .args([
            "--username",
            "ion@example.com",
            "--base-url",
            &server.uri(),
            "--output",
            "plain",
            "status",
        ])
        .output()
        .unwrap();

    let text = combined_output(&output);
    assert!(output.status.success(), "status failed:\n{text}");
    assert!(text.contains("erovinieta_active_vignette_b123xyz_default\tno"));
    assert!(text.contains("erovinieta_toll_balance_b123xyz_default\t0"));
    assert!(text.contains("erovinieta_user_profile_ion_popescu_default\t7"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_snapshot_dumps_json() {
    let server = mock_portal(login_ok()).await;
    let home = tempfile::tempdir().unwrap();

    let output = erovinieta_cmd(&home)
        .env("EROVINIETA_PASSWORD", "pw")
        .args([
            "-u",
            "ion@example.com",
            "--base-url",
            &server.uri(),
            "-o",
            "json-compact",
            "snapshot",
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["vehicles"][0]["plate"], "B123XYZ");
    assert_eq!(snapshot["history_years"], 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_login_without_cookie_exits_with_auth_code() {
    let server = mock_portal(ResponseTemplate::new(200).set_body_json(json!({}))).await;
    let home = tempfile::tempdir().unwrap();

    let output = erovinieta_cmd(&home)
        .env("EROVINIETA_PASSWORD", "pw")
        .args(["-u", "ion@example.com", "--base-url", &server.uri(), "status"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Authentication failed"));
}
