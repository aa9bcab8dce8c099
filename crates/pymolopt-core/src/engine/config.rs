use crate::core::models::params::{
    DEFAULT_STEPS, ForceField, MinimizationMethod, MinimizationParams,
};
use crate::core::tool::{ToolLayout, ToolVersion};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shell fragment that makes `conda activate` usable in a non-interactive bash.
pub const DEFAULT_CONDA_ACTIVATION: &str = "eval \"$(conda shell.bash hook)\"";

pub const DEFAULT_SHELL: &str = "bash";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Where PyMOL lives and how to reach it from a fresh shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub layout: ToolLayout,
    pub conda_activation: String,
    pub shell: String,
}

impl ToolConfig {
    pub fn binary(&self) -> PathBuf {
        self.layout.binary()
    }

    pub fn tool_activation(&self) -> String {
        self.layout.activation_command()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeConfig {
    pub params: MinimizationParams,
    pub tool: ToolConfig,
}

#[derive(Default)]
pub struct OptimizeConfigBuilder {
    method: Option<MinimizationMethod>,
    force_field: Option<ForceField>,
    steps: Option<u32>,
    tool_home: Option<PathBuf>,
    tool_version: Option<ToolVersion>,
    conda_activation: Option<String>,
    shell: Option<String>,
}

impl OptimizeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: MinimizationMethod) -> Self {
        self.method = Some(method);
        self
    }
    pub fn force_field(mut self, force_field: ForceField) -> Self {
        self.force_field = Some(force_field);
        self
    }
    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }
    pub fn tool_home(mut self, home: impl AsRef<Path>) -> Self {
        self.tool_home = Some(home.as_ref().to_path_buf());
        self
    }
    pub fn tool_version(mut self, version: ToolVersion) -> Self {
        self.tool_version = Some(version);
        self
    }
    pub fn conda_activation(mut self, command: impl Into<String>) -> Self {
        self.conda_activation = Some(command.into());
        self
    }
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    pub fn build(self) -> Result<OptimizeConfig, ConfigError> {
        let steps = self.steps.unwrap_or(DEFAULT_STEPS);
        if steps == 0 {
            return Err(ConfigError::InvalidValue {
                name: "steps",
                reason: "the number of minimization steps must be positive".to_string(),
            });
        }

        let shell = self.shell.unwrap_or_else(|| DEFAULT_SHELL.to_string());
        if shell.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "shell",
                reason: "must not be empty".to_string(),
            });
        }

        let home = self
            .tool_home
            .ok_or(ConfigError::MissingParameter("tool_home"))?;

        let params = MinimizationParams {
            method: self.method.unwrap_or_default(),
            force_field: self.force_field.unwrap_or_default(),
            steps,
        };
        let tool = ToolConfig {
            layout: ToolLayout::new(home, self.tool_version.unwrap_or_default()),
            conda_activation: self
                .conda_activation
                .unwrap_or_else(|| DEFAULT_CONDA_ACTIVATION.to_string()),
            shell,
        };

        Ok(OptimizeConfig { params, tool })
    }
}
