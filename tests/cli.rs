// ABOUTME: Integration tests for the ebpush CLI commands.
// ABOUTME: Validates --help output, init, plan, and pre-flight failures of push.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn ebpush_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ebpush"));
    cmd.env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY")
        .env_remove("AWS_SESSION_TOKEN");
    cmd
}

fn write_config(dir: &Path, extra: &str) {
    let yaml = format!(
        r#"artifact: target/ROOT.war
bucket: releases
key: ROOT.war
application: shop
environment: shop-prod
version_label: "1.0"
credentials:
  environment: false
{extra}"#
    );
    fs::write(dir.join("ebpush.yml"), yaml).unwrap();
}

#[test]
fn help_shows_commands() {
    ebpush_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn push_help_lists_skip_flags() {
    ebpush_cmd()
        .args(["push", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-upload"))
        .stdout(predicate::str::contains("--skip-deploy"))
        .stdout(predicate::str::contains("--key-suffix"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ebpush.yml");

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--application", "shop"])
        .assert()
        .success();

    assert!(config_path.exists(), "ebpush.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("application: shop"));
    assert!(content.contains("key: shop.war"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("ebpush.yml");

    fs::write(&config_path, "existing: config").unwrap();

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn plan_shows_suffixed_key_and_version() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), "");

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .args(["plan", "--key-suffix", "-1.0-SNAPSHOT", "--version-suffix", "-b7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found file key suffix: -1.0-SNAPSHOT"))
        .stdout(predicate::str::contains(
            "s3://releases/ROOT##-1.0-SNAPSHOT.war -> 1.0-b7",
        ));
}

#[test]
fn plan_reports_missing_fields() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("ebpush.yml"), "key: ROOT.war\n").unwrap();

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: invalid configuration"))
        .stderr(predicate::str::contains("bucket"));
}

#[test]
fn plan_in_json_mode_emits_json_lines() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), "");

    let assert = ebpush_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "plan"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let last = stdout.lines().last().unwrap();
    let event: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(event["event"], "success");
    assert_eq!(event["message"], "s3://releases/ROOT.war -> 1.0");
}

#[test]
fn push_without_credentials_fails_before_any_upload() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), "");

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .arg("push")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to load credentials"))
        .stdout(predicate::str::contains("Transfer:").not());
}

#[test]
fn push_with_missing_artifact_names_the_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), "");

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .args(["push", "--access-key", "AKIATEST", "--secret-key", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "artifact 'target/ROOT.war' was not found",
        ));
}

#[test]
fn push_skipping_both_steps_needs_no_credentials() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_config(temp_dir.path(), "skip_upload: true\nskip_deploy: true\n");

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .arg("push")
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIPPING the upload step."))
        .stdout(predicate::str::contains("SKIPPING the deployment step"))
        .stdout(predicate::str::contains("Nothing to do"));
}

#[test]
fn explicit_config_path_is_used() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested = temp_dir.path().join("deploy");
    fs::create_dir(&nested).unwrap();
    write_config(&nested, "");

    ebpush_cmd()
        .current_dir(temp_dir.path())
        .args(["plan", "--config", "deploy/ebpush.yml", "--bucket", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3://staging/ROOT.war -> 1.0"));
}
