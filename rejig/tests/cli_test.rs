//! CLI integration tests for the `rejig-bin` binary.
#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const UNSORTED: &str = "package com.example;

import java.util.Map;
import java.util.List;

public class Holder {
    List items;
    Map index;
}
";

fn cmd() -> Command {
    Command::cargo_bin("rejig-bin").unwrap()
}

#[test]
fn list_shows_builtin_recipes() {
    cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("rename-method"))
        .stdout(predicate::str::contains("order-imports"));
}

#[test]
fn list_json_is_machine_readable() {
    let output = cmd().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed.as_array().unwrap().iter().any(|r| r["id"] == "change-type"));
}

#[test]
fn run_without_recipes_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .arg("run")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recipes selected"));
}

#[test]
fn dry_run_reports_changes_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Holder.java");
    fs::write(&file, UNSORTED).unwrap();

    cmd()
        .args(["run", "--recipe", "order-imports", "--dry-run"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("would change"));

    assert_eq!(fs::read_to_string(&file).unwrap(), UNSORTED);
}

#[test]
fn run_writes_changes_back() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Holder.java");
    fs::write(&file, UNSORTED).unwrap();

    cmd()
        .args(["run", "--recipe", "order-imports"])
        .arg(dir.path())
        .assert()
        .success();

    let rewritten = fs::read_to_string(&file).unwrap();
    let list = rewritten.find("import java.util.List;").unwrap();
    let map = rewritten.find("import java.util.Map;").unwrap();
    assert!(list < map);
}

#[test]
fn skip_pragma_leaves_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Holder.java");
    let source = format!("// rejig: skip-file\n{UNSORTED}");
    fs::write(&file, &source).unwrap();

    cmd()
        .args(["run", "--recipe", "order-imports"])
        .arg(dir.path())
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&file).unwrap(), source);
}

#[test]
fn parse_errors_are_isolated_per_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Broken.java"), "class {{{").unwrap();
    fs::write(dir.path().join("Holder.java"), UNSORTED).unwrap();

    cmd()
        .args(["run", "--recipe", "order-imports"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error"));

    // The healthy file was still processed and rewritten.
    let rewritten = fs::read_to_string(dir.path().join("Holder.java")).unwrap();
    let list = rewritten.find("import java.util.List;").unwrap();
    let map = rewritten.find("import java.util.Map;").unwrap();
    assert!(list < map);
}

#[test]
fn config_file_supplies_recipes_and_options() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".rejig.toml"),
        "[rejig]\nrecipes = [\"rename-method\"]\n\n[rejig.rename_method]\npattern = \"com.example.Holder touch(..)\"\nnew_name = \"poke\"\n",
    )
    .unwrap();
    let file = dir.path().join("Holder.java");
    fs::write(
        &file,
        "package com.example;

public class Holder {
    public void touch() {
    }

    void caller() {
        touch();
    }
}
",
    )
    .unwrap();

    cmd().arg("run").arg(dir.path()).assert().success();

    let rewritten = fs::read_to_string(&file).unwrap();
    assert!(!rewritten.contains("touch"));
    assert_eq!(rewritten.matches("poke").count(), 2);
}

#[test]
fn unknown_recipe_id_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["run", "--recipe", "does-not-exist"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown recipe id"));
}
