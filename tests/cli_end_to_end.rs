#![deny(clippy::all, clippy::pedantic)]

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

const SECRET: &str = "open-sesame";

fn folio(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("folio"));
    cmd.current_dir(dir.path())
        .env("FOLIO_ADMIN_SECRET", SECRET)
        .env_remove("FOLIO_CONFIG_FILE")
        .env_remove("FOLIO_STORE_TOKEN")
        .env_remove("RUST_LOG")
        .args([
            "--store-backend",
            "local",
            "--store-root",
            "store",
            "--session-file",
            "state/session",
            "--mirror-dir",
            "state/mirror",
        ]);
    cmd
}

fn login(dir: &TempDir) {
    folio(dir)
        .args(["login", "--secret", SECRET])
        .assert()
        .success()
        .stdout(contains("logged in"));
}

fn save_demo_project(dir: &TempDir) {
    folio(dir)
        .args([
            "projects",
            "save",
            "--title",
            "Demo",
            "--description",
            "A demo project",
            "--category",
            "web",
            "--url",
            "https://example.com/demo",
            "--tag",
            "rust",
        ])
        .assert()
        .success()
        .stdout(contains("\"id\": 1"))
        .stdout(contains("\"title\": \"Demo\""));
}

#[test]
fn wrong_secret_is_rejected_with_auth_exit_code() {
    let dir = TempDir::new().expect("tempdir");
    folio(&dir)
        .args(["login", "--secret", "guess"])
        .assert()
        .code(3)
        .stderr(contains("invalid admin secret"));
    assert!(!dir.path().join("state/session").exists());
}

#[test]
fn writes_require_a_session() {
    let dir = TempDir::new().expect("tempdir");
    folio(&dir)
        .args(["projects", "save", "--title", "Demo"])
        .assert()
        .code(3)
        .stderr(contains("folio login"));
    assert!(!dir.path().join("store/data/projects.json").exists());
}

#[test]
fn save_list_get_and_remove_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    login(&dir);
    save_demo_project(&dir);

    let stored = fs::read_to_string(dir.path().join("store/data/projects.json")).expect("stored");
    assert!(stored.contains("\"Demo\""));
    assert!(dir.path().join("state/mirror/projects.json").exists());

    folio(&dir)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(contains("\"title\": \"Demo\""));

    folio(&dir)
        .args(["projects", "save", "--id", "1", "--title", "Renamed"])
        .assert()
        .success()
        .stdout(contains("\"title\": \"Renamed\""))
        .stdout(contains("\"rust\""));

    folio(&dir)
        .args(["projects", "get", "1"])
        .assert()
        .success()
        .stdout(contains("\"title\": \"Renamed\""));

    folio(&dir)
        .args(["projects", "remove", "1", "--yes"])
        .assert()
        .success()
        .stdout(contains("\"deleted\": 1"));

    folio(&dir)
        .args(["projects", "get", "1"])
        .assert()
        .code(2);
}

#[test]
fn reads_are_public_and_lenient() {
    let dir = TempDir::new().expect("tempdir");
    folio(&dir)
        .args(["blogs", "list"])
        .assert()
        .success()
        .stdout(contains("[]"));
}

#[test]
fn invalid_draft_reports_missing_fields() {
    let dir = TempDir::new().expect("tempdir");
    login(&dir);
    folio(&dir)
        .args(["blogs", "save", "--title", "Only a title"])
        .assert()
        .code(2)
        .stderr(contains("Please fill in all required fields"));
    assert!(!dir.path().join("store/data/blogs.json").exists());
}

#[test]
fn remove_without_confirmation_keeps_the_entry() {
    let dir = TempDir::new().expect("tempdir");
    login(&dir);
    save_demo_project(&dir);

    folio(&dir)
        .args(["projects", "remove", "1"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(contains("not confirmed"));

    folio(&dir)
        .args(["projects", "remove", "1"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(contains("\"deleted\": 1"));
}

#[test]
fn logout_ends_the_session() {
    let dir = TempDir::new().expect("tempdir");
    login(&dir);
    folio(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("logged out"));
    folio(&dir)
        .args(["projects", "remove", "1", "--yes"])
        .assert()
        .code(3);
}

#[test]
fn chat_without_api_key_answers_with_a_fallback() {
    let dir = TempDir::new().expect("tempdir");
    folio(&dir)
        .args(["chat", "--message", "What do you build?"])
        .assert()
        .success()
        .stdout(contains("trouble reaching my brain"));
}
