// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the repograph CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// repograph with its data directory and token file inside `dir`
fn repograph(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repograph").unwrap();
    cmd.env("REPOGRAPH_DATA_DIR", dir.path().join("data"))
        .env("REPOGRAPH_TOKEN_FILE", dir.path().join("credentials.json"))
        .env_remove("REPOGRAPH_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Helper to get stdout as string
fn stdout_str(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write_snapshot(dir: &TempDir) -> std::path::PathBuf {
    let snapshot = r#"{
        "repo": { "name": "b", "full_name": "a/b", "default_branch": "main" },
        "workflows": [],
        "commits": [],
        "deployments": [
            {
                "id": 17,
                "environment": "production",
                "state": "success",
                "created_at": "2024-01-01T00:00:00Z"
            }
        ],
        "languages": { "Rust": 900, "Shell": 100 },
        "branches": [
            { "name": "main", "commit": { "sha": "abc" }, "protected": true },
            { "name": "dev" }
        ]
    }"#;
    let path = dir.path().join("snapshot.json");
    fs::write(&path, snapshot).unwrap();
    path
}

#[test]
fn test_graph_from_snapshot_json() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let output = repograph(&dir)
        .args(["graph", "--snapshot"])
        .arg(&snapshot)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    let nodes = graph["nodes"].as_array().unwrap();
    let edges = graph["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(edges.len(), 2);
    assert_eq!(nodes[2]["data"]["environment"], "production");
    assert_eq!(nodes[2]["data"]["status"], "success");
    assert_eq!(nodes[2]["data"]["date"], "2024-01-01T00:00:00Z");
}

#[test]
fn test_graph_dot_to_file() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);
    let out_file = dir.path().join("graph.dot");

    repograph(&dir)
        .args(["graph", "--snapshot"])
        .arg(&snapshot)
        .arg("--output")
        .arg(&out_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote graph to"));

    let dot = fs::read_to_string(&out_file).unwrap();
    assert!(dot.contains("digraph repository"));
    assert!(dot.contains("\"branch-1\" -> \"deployment-0\""));
}

#[test]
fn test_graph_summary() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    repograph(&dir)
        .args(["graph", "--snapshot"])
        .arg(&snapshot)
        .args(["--format", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a/b (3 nodes, 2 edges)"))
        .stdout(predicate::str::contains("Rust 90.0%, Shell 10.0%"));
}

#[test]
fn test_graph_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    repograph(&dir)
        .args(["graph", "--snapshot"])
        .arg(&snapshot)
        .args(["--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown graph format"));
}

#[test]
fn test_graph_rejects_bad_repo_url() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["graph", "https://gitlab.com/a/b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a GitHub repository reference"));
}

#[test]
fn test_share_create_and_open() {
    let dir = TempDir::new().unwrap();

    let output = repograph(&dir)
        .env("REPOGRAPH_SHARE_ORIGIN", "https://graph.example.org")
        .args([
            "share",
            "create",
            "https://github.com/a/b",
            "--node",
            "branch-0",
            "--zoom",
            "1.5",
            "--x",
            "-120",
            "--y",
            "40",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let link = stdout_str(&output).trim().to_string();
    assert!(link.starts_with("https://graph.example.org/?share="), "{link}");

    let opened = repograph(&dir)
        .args(["--json", "share", "open", &link])
        .output()
        .unwrap();
    assert!(opened.status.success());
    let state: serde_json::Value = serde_json::from_str(&stdout_str(&opened)).unwrap();
    assert_eq!(state["repoUrl"], "https://github.com/a/b");
    assert_eq!(state["nodeId"], "branch-0");
    assert_eq!(state["zoom"], 1.5);
    assert_eq!(state["position"]["x"], -120.0);
}

#[test]
fn test_share_token_only() {
    let dir = TempDir::new().unwrap();

    let output = repograph(&dir)
        .args(["share", "create", "https://github.com/a/b", "--token-only"])
        .output()
        .unwrap();
    let token = stdout_str(&output).trim().to_string();
    assert!(!token.contains("://"));

    repograph(&dir)
        .args(["share", "open", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://github.com/a/b"));
}

#[test]
fn test_share_open_broken_link() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["share", "open", "http://localhost:3000/?share=not-valid-base64!!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No shared view state"));
}

#[test]
fn test_share_requires_both_coordinates() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["share", "create", "https://github.com/a/b", "--x", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--x and --y"));
}

#[test]
fn test_annotation_lifecycle() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["annotate", "set", "branch-0", "--text", "release train", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created annotation on branch-0"));

    repograph(&dir)
        .args(["annotate", "set", "branch-0", "--text", "frozen", "--box-color", "#bfdbfe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated annotation on branch-0"));

    let output = repograph(&dir)
        .args(["--json", "annotate", "list"])
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["text"], "frozen");
    assert_eq!(list[0]["box_color"], "#bfdbfe");
    assert_eq!(list[0]["user_id"], "alice");

    repograph(&dir)
        .args(["annotate", "remove", "branch-0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed annotation on branch-0"));

    repograph(&dir)
        .args(["annotate", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No annotations"));
}

#[test]
fn test_annotation_text_edit_keeps_style() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["annotate", "set", "branch-0", "--text", "a", "--box-color", "#ff0000", "--dx", "15"])
        .assert()
        .success();

    repograph(&dir)
        .args(["annotate", "set", "branch-0", "--text", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated annotation on branch-0"));

    repograph(&dir)
        .args(["annotate", "set", "branch-0", "--dy", "-8"])
        .assert()
        .success();

    let output = repograph(&dir)
        .args(["--json", "annotate", "list"])
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(list[0]["text"], "b");
    assert_eq!(list[0]["box_color"], "#ff0000");
    assert_eq!(list[0]["text_color"], "#1f2937");
    assert_eq!(list[0]["offset"]["x"], 15.0);
    assert_eq!(list[0]["offset"]["y"], -8.0);
}

#[test]
fn test_annotation_create_requires_text() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["annotate", "set", "branch-0", "--box-color", "#ff0000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--text is required"));
}

#[test]
fn test_annotate_unknown_action() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["annotate", "frobnicate", "branch-0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown action"));
}

#[test]
fn test_token_lifecycle() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["token", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token stored"));

    repograph(&dir)
        .args(["token", "set", "ghp_example1234"])
        .assert()
        .success();

    let stored = fs::read_to_string(dir.path().join("credentials.json")).unwrap();
    assert!(stored.contains("\"github_token\""));

    repograph(&dir)
        .args(["token", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("...1234"))
        .stdout(predicate::str::contains("ghp_example").not());

    repograph(&dir).args(["token", "clear"]).assert().success();

    repograph(&dir)
        .args(["token", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No token stored"));
}

#[test]
fn test_token_status_json() {
    let dir = TempDir::new().unwrap();

    let output = repograph(&dir)
        .args(["--json", "token", "status"])
        .output()
        .unwrap();
    let status: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(status["stored"], false);
    assert!(status["token"].is_null());

    repograph(&dir).args(["token", "set", "ghp_example1234"]).assert().success();

    let output = repograph(&dir)
        .args(["--json", "token", "status"])
        .output()
        .unwrap();
    let status: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(status["stored"], true);
    assert_eq!(status["token"], "...1234");
}

#[test]
fn test_token_help_mentions_visible_prompt() {
    let dir = TempDir::new().unwrap();

    repograph(&dir)
        .args(["token", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echoes the token"));
}

#[test]
fn test_graph_json_flag_overrides_format() {
    let dir = TempDir::new().unwrap();
    let snapshot = write_snapshot(&dir);

    let output = repograph(&dir)
        .args(["--json", "graph", "--snapshot"])
        .arg(&snapshot)
        .args(["--format", "summary"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let graph: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(graph["edges"].as_array().unwrap().len(), 2);
}

#[test]
fn test_config_json() {
    let dir = TempDir::new().unwrap();

    let output = repograph(&dir)
        .args(["--json", "config"])
        .output()
        .unwrap();
    let config: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(config["api_base"], "https://api.github.com");
    assert_eq!(config["max_reauth_attempts"], 1);

    repograph(&dir)
        .args(["--json", "config", "share_origin"])
        .assert()
        .success()
        .stdout(predicate::str::diff("\"http://localhost:3000\"\n"));
}

#[test]
fn test_config_env_and_file() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("repograph.toml");
    fs::write(&config_file, "api_base = \"https://ghe.example.com/api/v3\"\n").unwrap();

    repograph(&dir)
        .arg("--config")
        .arg(&config_file)
        .args(["config", "api_base"])
        .assert()
        .success()
        .stdout(predicate::str::diff("https://ghe.example.com/api/v3\n"));

    repograph(&dir)
        .env("REPOGRAPH_MAX_REAUTH_ATTEMPTS", "4")
        .args(["config", "max_reauth_attempts"])
        .assert()
        .success()
        .stdout(predicate::str::diff("4\n"));

    repograph(&dir)
        .args(["config", "no_such_key"])
        .assert()
        .failure();
}
