use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use engine_logging::{engine_debug, engine_info};

use crate::{ConvertError, FailureKind};

/// Installer format requested from the bundler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundleTarget {
    #[default]
    Msi,
    Nsis,
    Deb,
    AppImage,
    Dmg,
}

impl BundleTarget {
    /// Name used in `tauri.conf.json` and as the bundle output directory.
    pub fn as_str(self) -> &'static str {
        match self {
            BundleTarget::Msi => "msi",
            BundleTarget::Nsis => "nsis",
            BundleTarget::Deb => "deb",
            BundleTarget::AppImage => "appimage",
            BundleTarget::Dmg => "dmg",
        }
    }

    fn installer_file_name(self, app_name: &str, version: &str) -> String {
        match self {
            BundleTarget::Msi => format!("{app_name}_{version}_x64_en-US.msi"),
            BundleTarget::Nsis => format!("{app_name}_{version}_x64-setup.exe"),
            BundleTarget::Deb => format!("{app_name}_{version}_amd64.deb"),
            BundleTarget::AppImage => format!("{app_name}_{version}_amd64.AppImage"),
            BundleTarget::Dmg => format!("{app_name}_{version}_x64.dmg"),
        }
    }

    /// Where the bundler drops the installer, relative to the `src-tauri` project dir.
    pub fn installer_path(self, project_dir: &Path, app_name: &str, version: &str) -> PathBuf {
        project_dir
            .join("target")
            .join("release")
            .join("bundle")
            .join(self.as_str())
            .join(self.installer_file_name(app_name, version))
    }
}

impl fmt::Display for BundleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bundle target {0:?} (expected msi, nsis, deb, appimage or dmg)")]
pub struct ParseBundleTargetError(pub String);

impl FromStr for BundleTarget {
    type Err = ParseBundleTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msi" => Ok(BundleTarget::Msi),
            "nsis" => Ok(BundleTarget::Nsis),
            "deb" => Ok(BundleTarget::Deb),
            "appimage" => Ok(BundleTarget::AppImage),
            "dmg" => Ok(BundleTarget::Dmg),
            _ => Err(ParseBundleTargetError(s.to_string())),
        }
    }
}

/// External command that turns a scaffold into an installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for BundleCommand {
    fn default() -> Self {
        Self {
            program: "cargo".to_string(),
            args: vec!["tauri".to_string(), "build".to_string()],
        }
    }
}

#[async_trait::async_trait]
pub trait Bundler: Send + Sync {
    async fn bundle(&self, project_dir: &Path) -> Result<(), ConvertError>;
}

#[derive(Debug, Clone, Default)]
pub struct CommandBundler {
    command: BundleCommand,
}

impl CommandBundler {
    pub fn new(command: BundleCommand) -> Self {
        Self { command }
    }
}

#[async_trait::async_trait]
impl Bundler for CommandBundler {
    async fn bundle(&self, project_dir: &Path) -> Result<(), ConvertError> {
        engine_info!(
            "Running bundler {} {:?} in {:?}",
            self.command.program,
            self.command.args,
            project_dir
        );
        let output = tokio::process::Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(project_dir)
            .output()
            .await
            .map_err(|err| {
                ConvertError::new(
                    FailureKind::BundleSpawn,
                    format!("{}: {err}", self.command.program),
                )
            })?;

        engine_debug!(
            "Bundler finished with {:?}, {} bytes of stdout",
            output.status.code(),
            output.stdout.len()
        );
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(ConvertError::new(
            FailureKind::BundleFailed {
                code: output.status.code(),
            },
            stderr,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_parse_case_insensitively() {
        assert_eq!("MSI".parse::<BundleTarget>().unwrap(), BundleTarget::Msi);
        assert_eq!(
            " AppImage ".parse::<BundleTarget>().unwrap(),
            BundleTarget::AppImage
        );
        assert!("zip".parse::<BundleTarget>().is_err());
    }

    #[test]
    fn msi_installer_path_matches_bundler_layout() {
        let path = BundleTarget::Msi.installer_path(Path::new("proj"), "example-com-app", "0.1.0");
        assert_eq!(
            path,
            Path::new("proj/target/release/bundle/msi/example-com-app_0.1.0_x64_en-US.msi")
        );
    }

    #[test]
    fn deb_installer_path_uses_amd64_suffix() {
        let path = BundleTarget::Deb.installer_path(Path::new("p"), "a-app", "0.1.0");
        assert!(path.ends_with("bundle/deb/a-app_0.1.0_amd64.deb"));
    }
}
