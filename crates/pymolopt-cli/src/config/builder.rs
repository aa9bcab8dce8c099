use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{OptimizeArgs, ToolOverrides};
use crate::error::{CliError, Result};
use crate::home::{PYMOL_HOME_VAR, ToolHomeManager};
use crate::utils::parser;
use pymolopt::core::models::params::{ForceField, MinimizationMethod};
use pymolopt::core::models::structure::StructureRef;
use pymolopt::core::tool::ToolVersion;
use pymolopt::engine::config::{OptimizeConfigBuilder, ToolConfig};
use pymolopt::engine::workspace::StepWorkspace;
use std::path::PathBuf;
use tracing::debug;

pub fn build_config(args: &OptimizeArgs, home_manager: &ToolHomeManager) -> Result<AppConfig> {
    let env_home = std::env::var_os(PYMOL_HOME_VAR).map(PathBuf::from);
    build_config_with_env(args, env_home, home_manager)
}

/// Tool configuration for subcommands that take no config file.
pub fn build_tool_config(
    overrides: &ToolOverrides,
    home_manager: &ToolHomeManager,
) -> Result<ToolConfig> {
    let defaults = DefaultsConfig::default();
    let env_home = std::env::var_os(PYMOL_HOME_VAR).map(PathBuf::from);
    let home = resolve_home(overrides.tool_home.clone(), None, env_home, home_manager);

    let config = OptimizeConfigBuilder::new()
        .tool_home(home)
        .tool_version(defaults.tool_version)
        .conda_activation(
            overrides
                .conda_activation
                .clone()
                .unwrap_or(defaults.conda_activation),
        )
        .shell(defaults.shell)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(config.tool)
}

fn build_config_with_env(
    args: &OptimizeArgs,
    env_home: Option<PathBuf>,
    home_manager: &ToolHomeManager,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let set_values = parser::parse_set_values(&args.set_values)
        .map_err(|e| CliError::Argument(e.to_string()))?;
    let mut file_config = file_config.apply_set_values(&set_values)?;

    let min_file = file_config.minimization.take().unwrap_or_default();
    let tool_file = file_config.tool.take().unwrap_or_default();

    let method = match args.method.as_deref().or(min_file.method.as_deref()) {
        Some(name) => name
            .parse::<MinimizationMethod>()
            .map_err(|e| CliError::Argument(e.to_string()))?,
        None => defaults.method,
    };
    let force_field = match args.force_field.as_deref().or(min_file.force_field.as_deref()) {
        Some(name) => name
            .parse::<ForceField>()
            .map_err(|e| CliError::Argument(e.to_string()))?,
        None => defaults.force_field,
    };
    let steps = args.steps.or(min_file.steps).unwrap_or(defaults.steps);

    let tool_version = match tool_file.version.as_deref() {
        Some(v) => v
            .parse::<ToolVersion>()
            .map_err(|e| CliError::Config(e.to_string()))?,
        None => defaults.tool_version,
    };
    let home = resolve_home(
        args.tool.tool_home.clone(),
        tool_file.home.map(PathBuf::from),
        env_home,
        home_manager,
    );
    let conda_activation = args
        .tool
        .conda_activation
        .clone()
        .or(tool_file.conda_activation)
        .unwrap_or(defaults.conda_activation);
    let shell = tool_file.shell.unwrap_or(defaults.shell);

    let core_config = OptimizeConfigBuilder::new()
        .method(method)
        .force_field(force_field)
        .steps(steps)
        .tool_home(home)
        .tool_version(tool_version)
        .conda_activation(conda_activation)
        .shell(shell)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!("Resolved configuration: {:?}", core_config);

    let input_path = std::path::absolute(&args.input)?;
    let input = match &args.label {
        Some(label) => StructureRef::with_label(label.clone(), input_path),
        None => StructureRef::new(input_path),
    };

    Ok(AppConfig {
        input,
        workspace: StepWorkspace::new(std::path::absolute(&args.workdir)?),
        core_config,
        dry_run: args.dry_run,
    })
}

fn resolve_home(
    cli: Option<PathBuf>,
    file: Option<PathBuf>,
    env: Option<PathBuf>,
    home_manager: &ToolHomeManager,
) -> PathBuf {
    cli.or(file)
        .or(env.filter(|p| !p.as_os_str().is_empty()))
        .unwrap_or_else(|| home_manager.home().to_path_buf())
}
