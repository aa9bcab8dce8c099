//! On-disk layout of a PyMOL open-source build and the recipe that produces it.
//!
//! PyMOL is built from a pinned source snapshot into a dedicated conda environment named
//! `pymol<version>`. Everything the adapter needs to know about an installation is derived
//! from the tool home directory and the version, see [`ToolLayout`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const PYMOL_SOURCE_COMMIT: &str = "95a44ad";
const MMTF_CPP_COMMIT: &str = "7c74b18";
const PYTHON_VERSION: &str = "3.7";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolVersion {
    #[default]
    V2_4_0,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported PyMOL version '{0}'. Supported versions: 2.4.0")]
pub struct ParseToolVersionError(pub String);

impl ToolVersion {
    pub const SUPPORTED: [ToolVersion; 1] = [Self::V2_4_0];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V2_4_0 => "2.4.0",
        }
    }

    /// Name of the conda environment the build lives in.
    pub fn env_name(&self) -> String {
        format!("pymol{}", self.as_str())
    }

    /// Default name of the tool home directory under the software root.
    pub fn home_dir_name(&self) -> String {
        format!("pymol-{}", self.as_str())
    }
}

impl FromStr for ToolVersion {
    type Err = ParseToolVersionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::SUPPORTED
            .into_iter()
            .find(|v| v.as_str() == s || s.starts_with(v.as_str()))
            .ok_or_else(|| ParseToolVersionError(s.to_string()))
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paths of one PyMOL installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLayout {
    home: PathBuf,
    version: ToolVersion,
}

impl ToolLayout {
    pub fn new(home: impl Into<PathBuf>, version: ToolVersion) -> Self {
        Self {
            home: home.into(),
            version,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn version(&self) -> ToolVersion {
        self.version
    }

    /// The unpacked source tree, which also hosts the build prefix.
    pub fn source_dir(&self) -> PathBuf {
        self.home.join("pymol")
    }

    pub fn build_prefix(&self) -> PathBuf {
        self.source_dir().join("pymol-build")
    }

    pub fn binary(&self) -> PathBuf {
        self.build_prefix().join("bin").join("pymol")
    }

    /// Marker file touched as the last step of a successful install.
    pub fn sentinel(&self) -> PathBuf {
        self.source_dir().join("pymol_installed")
    }

    pub fn activation_command(&self) -> String {
        format!("conda activate {}", self.version.env_name())
    }

    pub fn check_installation(&self) -> InstallStatus {
        InstallStatus {
            sentinel_present: self.sentinel().is_file(),
            binary_present: self.binary().is_file(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallStatus {
    pub sentinel_present: bool,
    pub binary_present: bool,
}

impl InstallStatus {
    pub fn is_installed(&self) -> bool {
        self.sentinel_present && self.binary_present
    }
}

/// One shell command of the install recipe and the path it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub command: String,
    pub target: Option<PathBuf>,
}

/// The sequence of commands that fetches, builds and installs PyMOL into `layout`.
///
/// The recipe is descriptive: it is rendered for an operator (or a package manager) to run,
/// this crate never executes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRecipe {
    steps: Vec<InstallStep>,
}

impl InstallRecipe {
    pub fn for_layout(layout: &ToolLayout, conda_activation: &str) -> Self {
        let version = layout.version();
        let env = version.env_name();
        let tarball = format!("{}.tar.gz", PYMOL_SOURCE_COMMIT);
        let mmtf_tarball = format!("{}.tar.gz", MMTF_CPP_COMMIT);

        let mut build = String::new();
        build.push_str(&activation_prefix(conda_activation));
        build.push_str(&format!("conda create -y -n {} python={} && ", env, PYTHON_VERSION));
        build.push_str(&format!("conda activate {} && ", env));
        build.push_str("conda install -c anaconda pyqt -y && ");
        build.push_str("conda install -c conda-forge pmw -y && ");
        build.push_str("conda install -c openbabel openbabel -y && ");
        build.push_str(&format!(
            "wget -N https://github.com/rcsb/mmtf-cpp/archive/{} && ",
            mmtf_tarball
        ));
        build.push_str(&format!("tar -xf {} && ", mmtf_tarball));
        build.push_str("mv mmtf-cpp*/include/mmtf* pymol/include/ && ");
        build.push_str(&format!(
            "cd pymol && python setup.py build install --home={} && ",
            layout.build_prefix().display()
        ));
        build.push_str("touch pymol_installed");

        let steps = vec![
            InstallStep {
                command: format!(
                    "wget -c https://github.com/schrodinger/pymol-open-source/archive/{}",
                    tarball
                ),
                target: Some(layout.home().join(&tarball)),
            },
            InstallStep {
                command: format!("tar -xvf {}", tarball),
                target: None,
            },
            InstallStep {
                command: "mv pymol-open-source-* pymol".to_string(),
                target: None,
            },
            InstallStep {
                command: build,
                target: Some(layout.sentinel()),
            },
        ];

        Self { steps }
    }

    pub fn steps(&self) -> &[InstallStep] {
        &self.steps
    }

    /// Renders the recipe as a shell script meant to be run from the tool home.
    pub fn render(&self, layout: &ToolLayout) -> String {
        let mut lines = vec![
            "#!/usr/bin/env bash".to_string(),
            "set -e".to_string(),
            format!("mkdir -p {}", layout.home().display()),
            format!("cd {}", layout.home().display()),
        ];
        lines.extend(self.steps.iter().map(|s| s.command.clone()));
        lines.join("\n") + "\n"
    }
}

// The activation fragment is prepended verbatim; make sure it chains into what follows.
fn activation_prefix(conda_activation: &str) -> String {
    let trimmed = conda_activation.trim();
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.ends_with("&&") {
        format!("{} ", trimmed)
    } else {
        format!("{} && ", trimmed)
    }
}
