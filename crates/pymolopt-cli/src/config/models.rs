use pymolopt::core::models::structure::StructureRef;
use pymolopt::engine::config::OptimizeConfig;
use pymolopt::engine::workspace::StepWorkspace;

pub struct AppConfig {
    pub input: StructureRef,
    pub workspace: StepWorkspace,
    pub core_config: OptimizeConfig,
    pub dry_run: bool,
}
