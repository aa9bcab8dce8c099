use super::config::ToolConfig;
use std::path::Path;

/// Flags putting PyMOL in batch mode: no GUI (`-c`), no banner or feedback (`-q`).
pub const BATCH_FLAGS: &str = "-cq";

/// Builds `<env activation> && <tool activation> && <binary> -cq <script>`.
///
/// Fragments are joined verbatim. A trailing `&&` left on a fragment is dropped so it does not
/// chain twice, and empty fragments are skipped.
pub fn compose_command_line(tool: &ToolConfig, script: &Path) -> String {
    let run = format!(
        "{} {} {}",
        tool.binary().display(),
        BATCH_FLAGS,
        script.display()
    );
    let fragments = [tool.conda_activation.clone(), tool.tool_activation(), run];

    fragments
        .iter()
        .map(|f| strip_chain_operator(f))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" && ")
}

fn strip_chain_operator(fragment: &str) -> &str {
    let trimmed = fragment.trim();
    trimmed.strip_suffix("&&").map(str::trim_end).unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::OptimizeConfigBuilder;

    fn tool(activation: &str) -> ToolConfig {
        OptimizeConfigBuilder::new()
            .tool_home("/sw/pymol-2.4.0")
            .conda_activation(activation)
            .build()
            .unwrap()
            .tool
    }

    #[test]
    fn composes_activation_then_batch_call() {
        let line = compose_command_line(
            &tool("eval \"$(conda shell.bash hook)\""),
            Path::new("/work/tmp/pymol_optimize.pml"),
        );
        assert_eq!(
            line,
            "eval \"$(conda shell.bash hook)\" && conda activate pymol2.4.0 && \
             /sw/pymol-2.4.0/pymol/pymol-build/bin/pymol -cq /work/tmp/pymol_optimize.pml"
        );
    }

    #[test]
    fn trailing_chain_operator_is_not_doubled() {
        let line = compose_command_line(
            &tool("source ~/miniconda3/etc/profile.d/conda.sh && "),
            Path::new("s.pml"),
        );
        assert!(line.starts_with(
            "source ~/miniconda3/etc/profile.d/conda.sh && conda activate pymol2.4.0 && "
        ));
        assert!(!line.contains("&& &&"));
    }

    #[test]
    fn empty_activation_is_skipped() {
        let line = compose_command_line(&tool(""), Path::new("s.pml"));
        assert_eq!(
            line,
            "conda activate pymol2.4.0 && /sw/pymol-2.4.0/pymol/pymol-build/bin/pymol -cq s.pml"
        );
    }
}
