use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use appforge_engine::{BundleCommand, BundleTarget, EngineConfig, FetchSettings};
use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// On-disk configuration (`appforge.ron`). Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub probe_page: bool,
    pub bundle: bool,
    #[serde(with = "target_name")]
    pub bundle_target: BundleTarget,
    pub bundle_program: String,
    pub bundle_args: Vec<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_page_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            output_dir: engine.output_root,
            probe_page: engine.probe_page,
            bundle: engine.bundle,
            bundle_target: engine.bundle_target,
            bundle_program: engine.bundle_command.program,
            bundle_args: engine.bundle_command.args,
            connect_timeout_secs: engine.fetch.connect_timeout.as_secs(),
            request_timeout_secs: engine.fetch.request_timeout.as_secs(),
            redirect_limit: engine.fetch.redirect_limit,
            max_page_bytes: engine.fetch.max_bytes,
        }
    }
}

impl AppConfig {
    /// Command-line flags win over file values.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(target) = cli.target {
            self.bundle_target = target;
        }
        if cli.no_bundle {
            self.bundle = false;
        }
        if cli.no_probe {
            self.probe_page = false;
        }
        self
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            output_root: self.output_dir.clone(),
            probe_page: self.probe_page,
            bundle: self.bundle,
            bundle_target: self.bundle_target,
            bundle_command: BundleCommand {
                program: self.bundle_program.clone(),
                args: self.bundle_args.clone(),
            },
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                redirect_limit: self.redirect_limit,
                max_bytes: self.max_page_bytes,
                ..FetchSettings::default()
            },
        }
    }
}

/// Stores `BundleTarget` by its installer name, so a bad name fails the config parse.
mod target_name {
    use appforge_engine::BundleTarget;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(target: &BundleTarget, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(target.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BundleTarget, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

pub(crate) fn read_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the config file, falling back to defaults when it is missing or broken.
pub(crate) fn load_or_default(path: &Path) -> AppConfig {
    match read_config(path) {
        Ok(Some(config)) => {
            engine_info!("Loaded config from {:?}", path);
            config
        }
        Ok(None) => AppConfig::default(),
        Err(err) => {
            engine_warn!("Ignoring config: {}", err);
            AppConfig::default()
        }
    }
}
