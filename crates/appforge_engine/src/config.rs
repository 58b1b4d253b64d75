use std::path::PathBuf;

use crate::{BundleCommand, BundleTarget, FetchSettings};

/// Everything the conversion pipeline needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Parent directory of every generated `{app_name}` directory.
    pub output_root: PathBuf,
    /// Fetch the page before scaffolding to confirm reachability and read its title.
    pub probe_page: bool,
    /// Run the bundler after scaffolding; otherwise stop at the scaffold.
    pub bundle: bool,
    pub bundle_target: BundleTarget,
    pub bundle_command: BundleCommand,
    pub fetch: FetchSettings,
}

impl EngineConfig {
    pub fn default_with_output(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            probe_page: true,
            bundle: true,
            bundle_target: BundleTarget::default(),
            bundle_command: BundleCommand::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::default_with_output("generated-apps")
    }
}
