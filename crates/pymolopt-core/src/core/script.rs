//! The PML command script handed to PyMOL in batch mode.
//!
//! The template loads the input under the alias [`SELECTION_ALIAS`], boots the plugin system so
//! that the `optimize` plugin's `minimize` becomes importable, minimizes that selection and
//! saves it back out. Substitution is plain formatting: paths and values are written verbatim,
//! without quoting.

use super::models::params::MinimizationParams;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the rendered script inside the step's tmp directory.
pub const SCRIPT_FILE_NAME: &str = "pymol_optimize.pml";

/// Object name the input structure is loaded under.
pub const SELECTION_ALIAS: &str = "s1";

const PLUGIN_BOOTSTRAP: [&str; 3] = [
    "import pymol.plugins",
    "plugins.initialize()",
    "from pmg_tk.startup.optimize import minimize",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeScript<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub params: &'a MinimizationParams,
}

impl<'a> OptimizeScript<'a> {
    pub fn new(input: &'a Path, output: &'a Path, params: &'a MinimizationParams) -> Self {
        Self {
            input,
            output,
            params,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(PLUGIN_BOOTSTRAP.len() + 3);
        lines.push(format!("load {}, {}", self.input.display(), SELECTION_ALIAS));
        lines.extend(PLUGIN_BOOTSTRAP.iter().map(|l| l.to_string()));
        lines.push(format!(
            "minimize(selection=\"{}\",forcefield=\"{}\",method=\"{}\",nsteps0={})",
            SELECTION_ALIAS,
            self.params.force_field.as_str(),
            self.params.method.as_str(),
            self.params.steps
        ));
        lines.push(format!("save {}, {}", self.output.display(), SELECTION_ALIAS));
        lines.join("\n")
    }

    /// Renders the script into `path`, overwriting whatever was there.
    pub fn write_to_path(&self, path: &Path) -> io::Result<PathBuf> {
        let contents = self.render();
        fs::write(path, &contents)?;
        debug!("Wrote PML script ({} bytes) to {:?}", contents.len(), path);
        Ok(path.to_path_buf())
    }
}

/// Renders the optimize script for `input` and writes it to `script_path`.
pub fn build_script(
    input: &Path,
    params: &MinimizationParams,
    output: &Path,
    script_path: &Path,
) -> io::Result<PathBuf> {
    OptimizeScript::new(input, output, params).write_to_path(script_path)
}
