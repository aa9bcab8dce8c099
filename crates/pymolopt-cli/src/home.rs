use crate::error::{CliError, Result};
use directories::ProjectDirs;
use pymolopt::core::tool::ToolVersion;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the PyMOL home directory.
pub const PYMOL_HOME_VAR: &str = "PYMOL_HOME";

/// Resolves the PyMOL home directory from a persisted custom path or the OS default.
#[derive(Debug)]
pub struct ToolHomeManager {
    home: PathBuf,
}

impl ToolHomeManager {
    pub fn new(version: ToolVersion) -> Result<Self> {
        let home = Self::determine_home(version)?;
        debug!("ToolHomeManager initialized with home: {:?}", &home);
        Ok(Self { home })
    }

    #[cfg(test)]
    pub fn with_custom_path(home: PathBuf) -> Self {
        Self { home }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn set_custom_path(path: &Path) -> Result<()> {
        let config_path = Self::get_home_config_file()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let value = path.to_str().ok_or_else(|| {
            CliError::Argument(format!("Path is not valid UTF-8: {}", path.display()))
        })?;
        fs::write(config_path, value)?;
        Ok(())
    }

    pub fn reset_path() -> Result<()> {
        if let Ok(config_path) = Self::get_home_config_file() {
            if config_path.exists() {
                fs::remove_file(config_path)?;
            }
        }
        Ok(())
    }

    fn determine_home(version: ToolVersion) -> Result<PathBuf> {
        match Self::get_home_config_file() {
            Ok(config_path) if config_path.exists() => {
                match read_custom_home(&config_path)? {
                    Some(home) => Ok(home),
                    None => {
                        warn!("Custom home config file is empty, falling back to default path.");
                        Self::get_default_home(version)
                    }
                }
            }
            _ => Self::get_default_home(version),
        }
    }

    fn get_home_config_file() -> Result<PathBuf> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("home.conf"))
            .ok_or_else(|| CliError::Tool("Could not determine config directory path.".to_string()))
    }

    fn get_default_home(version: ToolVersion) -> Result<PathBuf> {
        project_dirs()
            .map(|dirs| dirs.data_dir().join(version.home_dir_name()))
            .ok_or_else(|| {
                CliError::Tool("Could not determine default tool directory path.".to_string())
            })
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("es", "csic.cnb", "pymolopt")
}

fn read_custom_home(config_path: &Path) -> Result<Option<PathBuf>> {
    let value = fs::read_to_string(config_path)?.trim().to_string();
    Ok((!value.is_empty()).then(|| PathBuf::from(value)))
}
