use crate::error::{CliError, Result};
use crate::utils::parser::SetValue;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileMinimizationConfig {
    pub method: Option<String>,
    #[serde(rename = "force-field")]
    pub force_field: Option<String>,
    pub steps: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileToolConfig {
    pub home: Option<String>,
    pub version: Option<String>,
    #[serde(rename = "conda-activation")]
    pub conda_activation: Option<String>,
    pub shell: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub minimization: Option<FileMinimizationConfig>,
    pub tool: Option<FileToolConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Applies `-S key=value` overrides on top of what the file said.
    pub fn apply_set_values(mut self, set_values: &[SetValue]) -> Result<Self> {
        for SetValue { key, value } in set_values {
            match key.as_str() {
                "minimization.method" => {
                    self.minimization
                        .get_or_insert_with(Default::default)
                        .method = Some(value.clone());
                }
                "minimization.force-field" => {
                    self.minimization
                        .get_or_insert_with(Default::default)
                        .force_field = Some(value.clone());
                }
                "minimization.steps" => {
                    self.minimization
                        .get_or_insert_with(Default::default)
                        .steps = Some(value.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value
                        ))
                    })?);
                }
                "tool.home" => {
                    self.tool.get_or_insert_with(Default::default).home = Some(value.clone());
                }
                "tool.version" => {
                    self.tool.get_or_insert_with(Default::default).version = Some(value.clone());
                }
                "tool.conda-activation" => {
                    self.tool
                        .get_or_insert_with(Default::default)
                        .conda_activation = Some(value.clone());
                }
                "tool.shell" => {
                    self.tool.get_or_insert_with(Default::default).shell = Some(value.clone());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(self)
    }
}
