use crate::cli::OptimizeArgs;
use crate::config::{self, AppConfig};
use crate::error::Result;
use crate::home::ToolHomeManager;
use crate::utils::progress::CliProgressHandler;
use pymolopt::core::tool::ToolVersion;
use pymolopt::engine::executor::ShellJobRunner;
use pymolopt::engine::progress::ProgressReporter;
use pymolopt::workflows::optimize::LocalOptimizeProtocol;
use std::path::PathBuf;
use tracing::{info, warn};

/// File the published outputs and their lineage are written to, in the step's working dir.
pub const MANIFEST_FILE_NAME: &str = "outputs.toml";

pub async fn run(args: OptimizeArgs) -> Result<()> {
    info!("Resolving PyMOL home...");
    let home_manager = ToolHomeManager::new(ToolVersion::default())?;

    info!("Merging configuration from file and CLI arguments...");
    let AppConfig {
        input,
        workspace,
        core_config,
        dry_run,
    } = config::build_config(&args, &home_manager)?;

    if !input.path().is_file() {
        warn!("Input structure {:?} does not exist or is not a file.", input.path());
    }
    let status = core_config.tool.layout.check_installation();
    if !status.is_installed() && !dry_run {
        warn!(
            "PyMOL does not look installed in {:?}. Run 'pymolopt tool check' for details.",
            core_config.tool.layout.home()
        );
    }

    let runner = ShellJobRunner::new(core_config.tool.shell.clone());
    let mut protocol = LocalOptimizeProtocol::new(input, core_config, workspace, runner);

    if dry_run {
        let script = protocol.build_script()?;
        println!("Script written to: {}", script.display());
        println!("{}", std::fs::read_to_string(&script)?);
        println!();
        println!("Command line:\n{}", protocol.command_line(&script));
        return Ok(());
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting local optimization...");
    info!("Invoking the local optimization workflow...");

    let result = tokio::task::block_in_place(|| protocol.run(&reporter));
    if result.is_err() {
        progress_handler.abandon();
    }
    let artifact = result?;

    let manifest_path: PathBuf = protocol.workspace().root().join(MANIFEST_FILE_NAME);
    protocol.outputs().write_manifest(&manifest_path)?;
    info!("Output manifest written to {:?}", manifest_path);

    for line in protocol.summary() {
        println!("{}", line);
    }
    for block in protocol.methods() {
        info!("{}", block);
    }
    println!(
        "✓ Optimized structure written to: {}",
        artifact.path().display()
    );

    Ok(())
}
