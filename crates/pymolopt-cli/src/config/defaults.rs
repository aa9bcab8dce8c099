use pymolopt::core::models::params::{DEFAULT_STEPS, ForceField, MinimizationMethod};
use pymolopt::core::tool::ToolVersion;
use pymolopt::engine::config::{DEFAULT_CONDA_ACTIVATION, DEFAULT_SHELL};

pub struct DefaultsConfig {
    pub method: MinimizationMethod,
    pub force_field: ForceField,
    pub steps: u32,
    pub tool_version: ToolVersion,
    pub conda_activation: String,
    pub shell: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            method: MinimizationMethod::ConjugateGradients,
            force_field: ForceField::Mmff94s,
            steps: DEFAULT_STEPS,
            tool_version: ToolVersion::V2_4_0,
            conda_activation: DEFAULT_CONDA_ACTIVATION.to_string(),
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}
