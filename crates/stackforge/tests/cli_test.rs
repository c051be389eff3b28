#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// 設定ファイルの探索が実行環境に左右されないよう、一時ディレクトリで実行する
fn stackforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stackforge").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("STACKFORGE_CONFIG_PATH")
        .env_remove("STACKFORGE_STACK_ID");
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    stackforge(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_cli_version() {
    let dir = tempfile::tempdir().unwrap();
    stackforge(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackforge"));
}

#[test]
fn test_synth_json_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = stackforge(&dir).args(["synth", "Test"]).output().unwrap();
    assert!(output.status.success());

    let template: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(template["stack_id"], "Test");

    let ids: Vec<&str> = template["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["Bucket", "TheVPC", "PublicBastion", "PrivateBastionWithEgress"]
    );

    assert_eq!(template["outputs"][0]["name"], "BucketName");
    assert_eq!(template["outputs"][0]["value"]["ref"], "Bucket");
    assert_eq!(template["outputs"][0]["value"]["attribute"], "bucket_name");
}

#[test]
fn test_synth_yaml() {
    let dir = tempfile::tempdir().unwrap();
    stackforge(&dir)
        .args(["synth", "Test", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stack_id: Test"))
        .stdout(predicate::str::contains("10.0.0.0/16"));
}

#[test]
fn test_synth_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = stackforge(&dir).args(["synth", "Test"]).output().unwrap();
    let second = stackforge(&dir)
        .args(["synth", "Test", "--custom-prop", "ignored"])
        .output()
        .unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_synth_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("template.json");

    stackforge(&dir)
        .args(["synth", "Test", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("4個のリソース"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"stack_id\": \"Test\""));
}

#[test]
fn test_synth_rejects_invalid_stack_id() {
    let dir = tempfile::tempdir().unwrap();
    stackforge(&dir)
        .args(["synth", "not valid"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("not valid"));
}

#[test]
fn test_default_stack_id_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("stack.yaml"),
        "stack_id: FromConfig\ndescription: from file\n",
    )
    .unwrap();

    stackforge(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("FromConfig"))
        .stdout(predicate::str::contains("from file"));

    // 引数が設定ファイルより優先される
    stackforge(&dir)
        .args(["list", "FromArgs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FromArgs"));
}

#[test]
fn test_explicit_config_with_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "stack_name: Oops\n").unwrap();

    stackforge(&dir)
        .args(["synth", "--config"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_list_shows_layout() {
    let dir = tempfile::tempdir().unwrap();
    stackforge(&dir)
        .args(["list", "Test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("リソース: 4個"))
        .stdout(predicate::str::contains("10.0.0.0/24"))
        .stdout(predicate::str::contains("10.0.1.0/24"))
        .stdout(predicate::str::contains("${Bucket.bucket_name}"));
}
