use std::path::PathBuf;

use appforge_engine::BundleTarget;
use clap::{Parser, ValueEnum};

use crate::platform::logging::LogDestination;

/// Turn a webpage into an installable desktop app.
#[derive(Debug, Parser)]
#[command(name = "appforge", version)]
#[command(about = "Convert a webpage into an installable desktop application", long_about = None)]
pub struct Cli {
    /// Webpage URL to convert. Without it, URLs are read from stdin one per line.
    pub url: Option<String>,

    /// RON configuration file; missing files fall back to defaults.
    #[arg(long, default_value = "appforge.ron")]
    pub config: PathBuf,

    /// Directory that receives the generated app directories.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Stop after writing the scaffold; do not run the bundler.
    #[arg(long)]
    pub no_bundle: bool,

    /// Skip fetching the page before scaffolding.
    #[arg(long)]
    pub no_probe: bool,

    /// Installer format: msi, nsis, deb, appimage or dmg.
    #[arg(long)]
    pub target: Option<BundleTarget>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogChoice::File)]
    pub log: LogChoice,

    /// Print past conversions and exit.
    #[arg(long)]
    pub history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogChoice {
    File,
    Terminal,
    Both,
}

impl From<LogChoice> for LogDestination {
    fn from(choice: LogChoice) -> Self {
        match choice {
            LogChoice::File => LogDestination::File,
            LogChoice::Terminal => LogDestination::Terminal,
            LogChoice::Both => LogDestination::Both,
        }
    }
}
