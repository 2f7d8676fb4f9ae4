use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const LEFT: &str = r#"{"2024-01": {"py": {"lines":10,"files":1,"additions":10,"deletions":0,"modifications":1,"repos":1}}}"#;
const RIGHT: &str = r#"{"2024-01": {"py": {"lines":5,"files":1,"additions":5,"deletions":0,"modifications":1,"repos":1}}}"#;

#[test]
fn merge_sums_overlapping_histories() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    let out = dir.path().join("merged.json");
    fs::write(&a, LEFT).unwrap();
    fs::write(&b, RIGHT).unwrap();

    let mut cmd = Command::cargo_bin("locmap").unwrap();
    cmd.args(["merge", "-o"])
        .arg(&out)
        .arg(&a)
        .arg(&b);
    cmd.assert().success();

    let merged: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let py = &merged["2024-01"]["py"];
    assert_eq!(py["lines"], 15);
    assert_eq!(py["files"], 2);
    assert_eq!(py["additions"], 15);
    assert_eq!(py["deletions"], 0);
    assert_eq!(py["modifications"], 2);
    assert_eq!(py["repos"], 2);
}

#[test]
fn merge_is_order_insensitive() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    fs::write(&a, LEFT).unwrap();
    fs::write(&b, RIGHT).unwrap();

    let forward = dir.path().join("forward.json");
    Command::cargo_bin("locmap")
        .unwrap()
        .args(["merge", "-o"])
        .arg(&forward)
        .arg(&a)
        .arg(&b)
        .assert()
        .success();

    let reverse = dir.path().join("reverse.json");
    Command::cargo_bin("locmap")
        .unwrap()
        .args(["merge", "-o"])
        .arg(&reverse)
        .arg(&b)
        .arg(&a)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&forward).unwrap(),
        fs::read_to_string(&reverse).unwrap()
    );
}

#[test]
fn merge_with_missing_field_fails_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.json");
    let bad = dir.path().join("bad.json");
    let out = dir.path().join("merged.json");
    fs::write(&good, LEFT).unwrap();
    // "repos" is absent; no default may be supplied.
    fs::write(
        &bad,
        r#"{"2024-01": {"py": {"lines":5,"files":1,"additions":5,"deletions":0,"modifications":1}}}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("locmap").unwrap();
    cmd.args(["merge", "-o"])
        .arg(&out)
        .arg(&good)
        .arg(&bad);
    cmd.assert().failure();
    assert!(!out.exists());
}

#[test]
fn merge_requires_at_least_one_input() {
    let mut cmd = Command::cargo_bin("locmap").unwrap();
    cmd.arg("merge");
    cmd.assert().failure();
}

#[test]
fn scan_requires_a_token() {
    let mut cmd = Command::cargo_bin("locmap").unwrap();
    cmd.arg("scan").env_remove("GITHUB_TOKEN");
    cmd.assert().failure();
}
