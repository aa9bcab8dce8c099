mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_config, build_tool_config};
pub use models::AppConfig;
