use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("twd")
        .env("TWD_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("twd")
        .env("TWD_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[twitch]"));
    assert!(contents.contains("# client_id ="));
    assert!(contents.contains("redirect_port = 3000"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("twd")
        .env("TWD_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_client_id_preserves_other_keys() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "# mine\n[auth]\nredirect_port = 4000\n\n[ui]\nlocale = \"pt-BR\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("twd")
        .env("TWD_HOME", dir.path())
        .args(["config", "set-client-id", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved client id"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("# mine"));
    assert!(contents.contains("redirect_port = 4000"));
    assert!(contents.contains("locale = \"pt-BR\""));
    assert!(contents.contains("client_id = \"abc123\""));
}

#[test]
fn test_config_commands_work_with_broken_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "[twitch\nnot toml").unwrap();

    cargo_bin_cmd!("twd")
        .env("TWD_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success();
}
