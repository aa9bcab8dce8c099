use crate::cli::{ToolArgs, ToolCommands, ToolOverrides};
use crate::config;
use crate::error::{CliError, Result};
use crate::home::ToolHomeManager;
use pymolopt::core::tool::{InstallRecipe, ToolVersion};
use std::path::PathBuf;
use tracing::info;

pub async fn run(args: ToolArgs) -> Result<()> {
    match args.command {
        ToolCommands::Path => {
            handle_path()?;
        }
        ToolCommands::SetHome { path } => {
            handle_set_home(path)?;
        }
        ToolCommands::ResetHome => {
            handle_reset_home()?;
        }
        ToolCommands::Recipe { tool } => {
            handle_recipe(&tool)?;
        }
        ToolCommands::Check { tool } => {
            handle_check(&tool)?;
        }
    }
    Ok(())
}

fn handle_path() -> Result<()> {
    let manager = ToolHomeManager::new(ToolVersion::default())?;
    println!("{}", manager.home().display());
    Ok(())
}

fn handle_set_home(path: PathBuf) -> Result<()> {
    if !path.is_absolute() {
        return Err(CliError::Argument(format!(
            "The tool home must be an absolute path: {}",
            path.display()
        )));
    }
    ToolHomeManager::set_custom_path(&path)?;
    info!("Custom PyMOL home set to {:?}", path);
    println!("✓ PyMOL home set to: {}", path.display());
    Ok(())
}

fn handle_reset_home() -> Result<()> {
    ToolHomeManager::reset_path()?;
    let manager = ToolHomeManager::new(ToolVersion::default())?;
    println!(
        "✓ PyMOL home reset to default: {}",
        manager.home().display()
    );
    Ok(())
}

fn handle_recipe(overrides: &ToolOverrides) -> Result<()> {
    let manager = ToolHomeManager::new(ToolVersion::default())?;
    let tool = config::build_tool_config(overrides, &manager)?;
    let recipe = InstallRecipe::for_layout(&tool.layout, &tool.conda_activation);
    print!("{}", recipe.render(&tool.layout));
    Ok(())
}

fn handle_check(overrides: &ToolOverrides) -> Result<()> {
    let manager = ToolHomeManager::new(ToolVersion::default())?;
    let tool = config::build_tool_config(overrides, &manager)?;
    let layout = &tool.layout;
    let status = layout.check_installation();

    let mark = |present: bool| if present { "✓" } else { "✗" };
    println!("PyMOL {} home: {}", layout.version(), layout.home().display());
    println!(
        "  {} binary    {}",
        mark(status.binary_present),
        layout.binary().display()
    );
    println!(
        "  {} sentinel  {}",
        mark(status.sentinel_present),
        layout.sentinel().display()
    );
    println!("  conda env: {}", layout.version().env_name());

    if status.is_installed() {
        Ok(())
    } else {
        Err(CliError::Tool(format!(
            "PyMOL is not installed in {}. Run 'pymolopt tool recipe' to see how to install it.",
            layout.home().display()
        )))
    }
}
