use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

const FLOW: &str = "tests/fixtures/search_flow.json";

fn flow_replay(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flow-replay").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("FLOW_REPLAY_TIMEOUT_MS")
        .env_remove("FLOW_REPLAY_LOG")
        .arg("--config")
        .arg(config_dir.join("replay.yaml"));
    cmd
}

#[test]
fn inspect_prints_human_summary() {
    let dir = tempfile::tempdir().unwrap();
    let assert = flow_replay(dir.path())
        .args(["inspect", FLOW])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Flow: Search boots (8 steps)"));
    assert!(stdout.contains("waitForExpression"));
}

#[test]
fn inspect_json_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let assert = flow_replay(dir.path())
        .args(["inspect", FLOW, "--json"])
        .assert()
        .success();

    let value: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(value["title"].as_str(), Some("Search boots"));
    assert_eq!(value["step_count"].as_u64(), Some(8));
    assert_eq!(value["steps"][6]["timeout_ms"].as_u64(), Some(1500));
}

#[test]
fn inspect_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    flow_replay(dir.path())
        .args(["inspect", "tests/fixtures/absent.json"])
        .assert()
        .failure();
}

#[test]
fn rehearse_prints_driver_journal() {
    let dir = tempfile::tempdir().unwrap();
    let assert = flow_replay(dir.path())
        .args(["rehearse", FLOW])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("page(https://shop.test/) navigate https://shop.test/"));
    assert!(stdout.contains("page(https://shop.test/) key_down Enter"));
    assert!(stdout.contains("browser wait_for_target https://shop.test/help"));
    assert!(stdout.contains("Rehearsal completed"));
}
