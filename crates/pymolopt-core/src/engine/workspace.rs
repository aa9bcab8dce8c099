use super::error::EngineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const TMP_DIR: &str = "tmp";
const EXTRA_DIR: &str = "extra";

/// The private working area of one step instance.
///
/// Scratch files (the generated script) go to `tmp/`, published results to `extra/`. Two step
/// instances never share a root, so concurrent runs never collide on these paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepWorkspace {
    root: PathBuf,
}

impl StepWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the root, `tmp/` and `extra/` directories if missing.
    pub fn prepare(&self) -> Result<(), EngineError> {
        for dir in [self.tmp_dir(), self.extra_dir()] {
            fs::create_dir_all(&dir).map_err(|e| EngineError::io(&dir, e))?;
        }
        debug!("Prepared step workspace at {:?}", self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(TMP_DIR)
    }

    pub fn extra_dir(&self) -> PathBuf {
        self.root.join(EXTRA_DIR)
    }

    pub fn tmp_path(&self, name: &str) -> PathBuf {
        self.tmp_dir().join(name)
    }

    pub fn extra_path(&self, name: &str) -> PathBuf {
        self.extra_dir().join(name)
    }
}
