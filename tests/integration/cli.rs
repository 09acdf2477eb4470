use crate::common::{TestHome, read_to_string};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

#[test]
fn test_list_empty_session() {
    let home = TestHome::new();

    home.sitegen()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No homepages yet"));
}

#[test]
fn test_prompt_round_trip() {
    let home = TestHome::new();

    home.sitegen()
        .args(["prompt", "A surf school in Ericeira", "--style", "laid back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prompt saved"));

    home.sitegen()
        .args(["prompt", "--audience", "beginners"])
        .assert()
        .success();

    home.sitegen()
        .arg("prompt")
        .assert()
        .success()
        .stdout(predicate::str::contains("A surf school in Ericeira"))
        .stdout(predicate::str::contains("laid back"))
        .stdout(predicate::str::contains("beginners"));
}

#[test]
fn test_prompt_missing_suggests_setting_one() {
    let home = TestHome::new();

    home.sitegen()
        .arg("prompt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("session prompt not found"));
}

#[test]
fn test_generate_without_backend_is_a_config_error() {
    let home = TestHome::new();
    home.sitegen().args(["prompt", "A bakery"]).assert().success();

    home.sitegen()
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend.base_url is not set"));
}

#[test]
fn test_favorite_unknown_slug_fails() {
    let home = TestHome::new();

    home.sitegen()
        .args(["favorite", "version9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("homepage 'version9' not found"));
}

#[tokio::test]
async fn test_seeded_session_commands() {
    let home = TestHome::new();
    home.seed("default").await;

    home.sitegen()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("version1"))
        .stdout(predicate::str::contains("Version 3"));

    home.sitegen()
        .args(["favorite", "version2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Version 2 is a favorite"));

    home.sitegen()
        .args(["duplicate", "version2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Version 2 (Copy)"));

    let output = home.sitegen().args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let variants: Value = serde_json::from_slice(&output.stdout).unwrap();
    let variants = variants.as_array().unwrap();
    assert_eq!(variants.len(), 4);
    assert_eq!(variants[1]["isFavorite"], true);
    assert_eq!(variants[3]["slug"], "version2-copy");
    assert_ne!(variants[3]["color"], variants[1]["color"]);

    home.sitegen()
        .args(["list", "--favorites"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version2"))
        .stdout(predicate::str::contains("version1").not());
}

#[tokio::test]
async fn test_sessions_do_not_share_state() {
    let home = TestHome::new();
    home.seed("shop").await;

    home.sitegen()
        .args(["list", "--session", "shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version1"));

    home.sitegen()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No homepages yet"));
}

#[tokio::test]
async fn test_finalize_activates_child_theme() {
    let home = TestHome::new();
    home.seed("default").await;
    home.sitegen()
        .args(["site", "--title", "Nata & Co", "--url", "https://example.com"])
        .assert()
        .success();
    let screenshot = home.temp.path().join("shot.png");
    fs::write(&screenshot, b"\x89PNG shot").unwrap();

    home.sitegen()
        .args(["finalize", "version1", "--screenshot"])
        .arg(&screenshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Published Version 1 as the front page"));

    let themes = home.themes_dir();
    assert_eq!(read_to_string(&themes.join(".active-theme")), "yith-wonder-version1");
    let child = themes.join("yith-wonder-version1");
    assert_eq!(fs::read(child.join("screenshot.png")).unwrap(), b"\x89PNG shot");
    assert!(read_to_string(&child.join("style.css")).contains("generated for Nata & Co"));

    home.sitegen()
        .arg("site")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Front:\s+page").unwrap());

    // A rerun reuses the published document
    home.sitegen().args(["finalize", "version1"]).assert().success().stdout(
        predicate::str::contains("reused 1 documents").and(predicate::str::contains("active")),
    );
}
