//! End-to-end tests of the `sqlcrud` binary against a temporary database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn sqlcrud(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sqlcrud").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("DB_DATABASE")
        .arg("--database")
        .arg(db);
    cmd
}

fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("cli.db");
    sqlcrud(&db)
        .args(["create-table", "items", "--column", "id:INTEGER", "--column", "v:TEXT"])
        .args(["--primary-key", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Table 'items' created successfully!"));
    (dir, db)
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("sqlcrud")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-table"))
        .stdout(predicate::str::contains("insert-many"));
}

#[test]
fn test_insert_and_select() {
    let (_dir, db) = setup();

    sqlcrud(&db)
        .args(["insert", "items", "--set", "id=1", "--set", "v=a"])
        .assert()
        .success();

    sqlcrud(&db)
        .args(["select", "items", "--where", "id", "=", "1"])
        .assert()
        .success()
        .stdout("id\tv\n1\ta\n");
}

#[test]
fn test_insert_many_from_stdin_and_json_output() {
    let (_dir, db) = setup();

    sqlcrud(&db)
        .args(["--json", "insert-many", "items"])
        .write_stdin(r#"[{"id": 1, "v": "x"}, {"id": 2, "v": "y"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""rows_affected":2"#));

    let output = sqlcrud(&db).args(["--json", "select", "items"]).output().unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        rows,
        serde_json::json!([{"id": 1, "v": "x"}, {"id": 2, "v": "y"}])
    );
}

#[test]
fn test_update_and_delete() {
    let (_dir, db) = setup();
    sqlcrud(&db)
        .args(["insert-many", "items"])
        .write_stdin(r#"[{"id": 1, "v": "x"}, {"id": 2, "v": "y"}]"#)
        .assert()
        .success();

    sqlcrud(&db)
        .args(["update", "items", "--id", "1", "--set", "v=z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data updated successfully!"));

    sqlcrud(&db)
        .args(["delete", "items", "--id", "2"])
        .assert()
        .success();

    sqlcrud(&db)
        .args(["select", "items"])
        .assert()
        .success()
        .stdout("id\tv\n1\tz\n");
}

#[test]
fn test_negative_ids_are_values() {
    let (_dir, db) = setup();
    sqlcrud(&db)
        .args(["insert-many", "items"])
        .write_stdin(r#"[{"id": -1, "v": "neg"}, {"id": 3, "v": "pos"}]"#)
        .assert()
        .success();

    sqlcrud(&db)
        .args(["select", "items", "--where", "id", "<", "-0.5"])
        .assert()
        .success()
        .stdout("id\tv\n-1\tneg\n");

    sqlcrud(&db)
        .args(["delete", "items", "--id", "-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted from 'items'."));

    sqlcrud(&db)
        .args(["select", "items", "--where", "id", ">", "-5"])
        .assert()
        .success()
        .stdout("id\tv\n3\tpos\n");
}

#[test]
fn test_invalid_filter_fails() {
    let (_dir, db) = setup();

    sqlcrud(&db)
        .args(["select", "items", "--where", "id", "!=", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filter '!='"));
}

#[test]
fn test_missing_database_is_reported() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("sqlcrud")
        .unwrap()
        .env_remove("DB_DATABASE")
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .current_dir(dir.path())
        .args(["select", "items"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no database configured"));
}

#[test]
fn test_database_from_environment() {
    let (_dir, db) = setup();

    Command::cargo_bin("sqlcrud")
        .unwrap()
        .env_remove("RUST_LOG")
        .env("DB_DATABASE", &db)
        .args(["select", "items"])
        .assert()
        .success()
        .stdout("id\tv\n");
}
