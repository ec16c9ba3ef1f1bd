//! CLI integration tests
//!
//! Runs the deploy-watch binary with assert_cmd, against a wiremock webhook
//! where a server is needed.

use assert_cmd::assert::{Assert, OutputAssertExt};
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn deploy_watch() -> Command {
    let mut cmd = Command::cargo_bin("deploy-watch")
        .expect("Failed to locate deploy-watch binary - ensure it's built before running tests");
    // Keep the developer's environment and config file out of the tests
    cmd.env_remove("WEBHOOK_ADDRESS")
        .env_remove("DEPLOY_AUTH_TOKEN")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("deploy-watch-tests"))
        .env("HOME", std::env::temp_dir().join("deploy-watch-tests"));
    cmd
}

/// Run a prepared command off the async runtime
async fn run(mut cmd: Command) -> Assert {
    tokio::task::spawn_blocking(move || cmd.timeout(std::time::Duration::from_secs(30)).output())
        .await
        .expect("command task panicked")
        .expect("failed to run deploy-watch")
        .assert()
}

fn status_body(status: &str, poll_id: &str) -> serde_json::Value {
    json!({
        "deploy": {
            "status": status,
            "status_time": {"secs": 2, "nanos": 500000000},
            "poll_id": poll_id
        }
    })
}

#[test]
fn test_cli_help() {
    deploy_watch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy-watch"))
        .stdout(predicate::str::contains("Deploy challenges and watch their status"));
}

#[test]
fn test_cli_version() {
    deploy_watch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy-watch"));
}

#[test]
fn test_cli_remove_help() {
    deploy_watch()
        .args(["remove", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("poll id"));
}

#[test]
fn test_cli_requires_challs() {
    deploy_watch().assert().failure();
}

#[test]
fn test_cli_missing_endpoint() {
    deploy_watch()
        .args(["--token", "t", "pwn-intro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("endpoint"));
}

#[test]
fn test_cli_missing_token() {
    deploy_watch()
        .args(["--endpoint", "http://127.0.0.1:1/webhook", "pwn-intro"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));
}

#[test]
fn test_cli_rejects_zero_interval() {
    deploy_watch()
        .args(["--endpoint", "http://127.0.0.1:1/", "--token", "t", "-i", "0", "a"])
        .assert()
        .failure();
}

#[tokio::test]
async fn test_cli_watch_until_settled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_partial_json(json!({"deploy": {"__type": "deploy"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("started", "p0")))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"deploy": {"__type": "poll", "id": "p0"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("success", "p1")))
        .expect(2)
        .mount(&server)
        .await;

    let mut cmd = deploy_watch();
    cmd.env("WEBHOOK_ADDRESS", format!("{}/webhook", server.uri()))
        .env("DEPLOY_AUTH_TOKEN", "s3cret")
        .args(["--interval", "1", "--until-settled", "pwn-intro,web-login"]);

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Update:"))
        .stdout(predicate::str::contains("pwn-intro:   success for 2.5 seconds"))
        .stdout(predicate::str::contains("web-login:   success for 2.5 seconds"))
        .stdout(predicate::str::contains("p1"));
}

#[tokio::test]
async fn test_cli_deploy_failure_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!("database issue")))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = deploy_watch();
    cmd.args([
        "--endpoint",
        &format!("{}/webhook", server.uri()),
        "--token",
        "t",
        "a,b",
    ]);

    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("Deploy of a failed"))
        .stderr(predicate::str::contains("database issue"));
}

#[tokio::test]
async fn test_cli_remove() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"deploy": {"__type": "remove", "chall": "p7"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = deploy_watch();
    cmd.args([
        "remove",
        "--endpoint",
        &format!("{}/webhook", server.uri()),
        "--token",
        "t",
        "p7",
    ]);

    run(cmd)
        .await
        .success()
        .stderr(predicate::str::contains("Removed p7"));
}
