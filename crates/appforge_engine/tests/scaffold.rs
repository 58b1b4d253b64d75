use std::fs;

use appforge_engine::{prepare_app_dir, write_scaffold, AppIdentity, BundleTarget};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;

fn identity() -> (Url, AppIdentity) {
    let url = Url::parse("https://www.example.org/start").unwrap();
    let identity = AppIdentity::from_url(&url);
    (url, identity)
}

#[test]
fn prepare_creates_named_app_dir() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("apps");
    let (_, identity) = identity();

    let app_dir = prepare_app_dir(&root, &identity).unwrap();

    assert_eq!(app_dir, root.join("www-example-org-app"));
    assert!(app_dir.is_dir());
    assert_eq!(fs::read_dir(&app_dir).unwrap().count(), 0);
}

#[test]
fn prepare_discards_previous_contents() {
    let temp = TempDir::new().unwrap();
    let (_, identity) = identity();
    let stale = temp.path().join("www-example-org-app").join("stale.txt");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "old").unwrap();

    let app_dir = prepare_app_dir(temp.path(), &identity).unwrap();

    assert!(app_dir.is_dir());
    assert!(!stale.exists());
}

#[test]
fn scaffold_writes_every_file() {
    let temp = TempDir::new().unwrap();
    let (url, identity) = identity();
    let app_dir = prepare_app_dir(temp.path(), &identity).unwrap();

    let summary = write_scaffold(&app_dir, &identity, &url, "Example", BundleTarget::Msi).unwrap();

    assert_eq!(summary.project_dir, app_dir.join("src-tauri"));
    for relative in [
        "src-tauri/Cargo.toml",
        "src-tauri/src/main.rs",
        "src-tauri/build.rs",
        "src-tauri/tauri.conf.json",
        "src-tauri/schemas/desktop-schema.json",
        "src-tauri/build-utils/main.js",
        "dist/index.html",
    ] {
        let path = app_dir.join(relative);
        assert!(path.is_file(), "missing {relative}");
        assert!(summary.files.contains(&path), "not reported: {relative}");
    }
    assert_eq!(summary.files.len(), 7);

    let manifest = fs::read_to_string(app_dir.join("src-tauri/Cargo.toml")).unwrap();
    assert!(manifest.contains("name = \"www-example-org-app\""));
    assert!(manifest.contains("description = \"Generated app for www.example.org\""));
}

#[test]
fn tauri_conf_points_window_at_page() {
    let temp = TempDir::new().unwrap();
    let (url, identity) = identity();
    let app_dir = prepare_app_dir(temp.path(), &identity).unwrap();
    write_scaffold(&app_dir, &identity, &url, "Example Start", BundleTarget::Deb).unwrap();

    let raw = fs::read_to_string(app_dir.join("src-tauri/tauri.conf.json")).unwrap();
    let conf: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(conf["identifier"], "com.www-example-org.app");
    assert_eq!(conf["productName"], "www.example.org App");
    assert_eq!(conf["version"], "0.1.0");
    assert_eq!(conf["build"]["frontendDist"], "../dist");
    let window = &conf["app"]["windows"][0];
    assert_eq!(window["url"], "https://www.example.org/start");
    assert_eq!(window["title"], "Example Start");
    assert_eq!(window["width"], 1024);
    assert_eq!(window["height"], 768);
    assert_eq!(conf["bundle"]["targets"][0], "deb");
}
