//! Generation of the web-view shell project that wraps a page.
//!
//! Layout of `{output_root}/{app_name}`:
//!
//! ```text
//! dist/index.html
//! src-tauri/Cargo.toml
//! src-tauri/build.rs
//! src-tauri/src/main.rs
//! src-tauri/tauri.conf.json
//! src-tauri/schemas/desktop-schema.json
//! src-tauri/build-utils/main.js
//! ```
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use serde_json::json;
use url::Url;

use crate::persist::{ensure_output_dir, reset_dir, AtomicFileWriter, PersistError};
use crate::{AppIdentity, BundleTarget};

pub const PROJECT_DIR: &str = "src-tauri";

const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 768;

const MAIN_RS: &str = r#"#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    tauri::Builder::default()
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
"#;

const BUILD_RS: &str = r#"fn main() {
    tauri_build::build()
}
"#;

const BUILD_UTILS_JS: &str = "// Required by the bundler.\n";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Loading...</title>
</head>
<body>
    <div>Loading your app...</div>
</body>
</html>
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldSummary {
    pub app_dir: PathBuf,
    pub project_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Creates an empty `{output_root}/{app_name}`, discarding any previous build.
pub fn prepare_app_dir(output_root: &Path, identity: &AppIdentity) -> Result<PathBuf, PersistError> {
    ensure_output_dir(output_root)?;
    let app_dir = output_root.join(&identity.app_name);
    if app_dir.exists() {
        engine_info!("Replacing existing app directory {:?}", app_dir);
    }
    reset_dir(&app_dir)?;
    Ok(app_dir)
}

/// Writes every scaffold file into `app_dir`.
pub fn write_scaffold(
    app_dir: &Path,
    identity: &AppIdentity,
    url: &Url,
    window_title: &str,
    target: BundleTarget,
) -> Result<ScaffoldSummary, PersistError> {
    let writer = AtomicFileWriter::new(app_dir.to_path_buf());
    let project = Path::new(PROJECT_DIR);

    let conf = serde_json::to_string_pretty(&tauri_conf(identity, url, window_title, target))
        .map_err(|err| PersistError::Io(err.into()))?;
    let schema = serde_json::to_string_pretty(&desktop_schema())
        .map_err(|err| PersistError::Io(err.into()))?;

    let files = vec![
        writer.write(project.join("Cargo.toml"), &cargo_manifest(identity))?,
        writer.write(project.join("src").join("main.rs"), MAIN_RS)?,
        writer.write(project.join("build.rs"), BUILD_RS)?,
        writer.write(project.join("tauri.conf.json"), &conf)?,
        writer.write(project.join("schemas").join("desktop-schema.json"), &schema)?,
        writer.write(project.join("build-utils").join("main.js"), BUILD_UTILS_JS)?,
        writer.write(Path::new("dist").join("index.html"), INDEX_HTML)?,
    ];

    engine_info!("Wrote {} scaffold files to {:?}", files.len(), app_dir);
    Ok(ScaffoldSummary {
        app_dir: app_dir.to_path_buf(),
        project_dir: app_dir.join(PROJECT_DIR),
        files,
    })
}

fn cargo_manifest(identity: &AppIdentity) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "{version}"
description = "Generated app for {domain}"
edition = "2021"

[build-dependencies]
tauri-build = {{ version = "2", features = [] }}

[dependencies]
serde_json = "1.0"
serde = {{ version = "1.0", features = ["derive"] }}
tauri = {{ version = "2", features = [] }}

[features]
custom-protocol = ["tauri/custom-protocol"]
"#,
        name = identity.app_name,
        version = identity.version,
        domain = identity.domain,
    )
}

fn tauri_conf(
    identity: &AppIdentity,
    url: &Url,
    window_title: &str,
    target: BundleTarget,
) -> serde_json::Value {
    json!({
        "identifier": identity.identifier,
        "productName": identity.product_name,
        "version": identity.version,
        "build": {
            "beforeBuildCommand": "",
            "frontendDist": "../dist"
        },
        "app": {
            "windows": [{
                "fullscreen": false,
                "width": WINDOW_WIDTH,
                "height": WINDOW_HEIGHT,
                "resizable": true,
                "title": window_title,
                "url": url.as_str(),
                "decorations": true,
                "center": true
            }]
        },
        "bundle": {
            "active": true,
            "targets": [target.as_str()]
        }
    })
}

fn desktop_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2019-09/schema#",
        "type": "object",
        "required": ["identifier"],
        "properties": {
            "identifier": { "type": "string" }
        }
    })
}
