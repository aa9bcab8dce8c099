use crate::core::models::artifact::{AtomStructArtifact, StepOutputs};
use crate::core::models::structure::StructureRef;
use crate::core::script::{OptimizeScript, SCRIPT_FILE_NAME};
use crate::engine::config::OptimizeConfig;
use crate::engine::error::EngineError;
use crate::engine::executor::{JobOutcome, JobRunner};
use crate::engine::invocation::compose_command_line;
use crate::engine::progress::{Phase, Progress, ProgressReporter};
use crate::engine::workspace::StepWorkspace;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// File name PyMOL saves the minimized structure under, inside the step's extra directory.
pub const OUTPUT_FILE_NAME: &str = "optimized.pdb";

/// Name the optimized structure is published under.
pub const OUTPUT_NAME: &str = "outputPDB";

const NOT_READY: &str = "Minimized structure not ready yet.";

/// Local optimization of an atomic structure with PyMOL.
///
/// The step runs in two phases: write the script and run the tool, then register the output.
/// Registration happens only after the tool reported success and the output file exists, so a
/// failed run never leaves an artifact behind.
///
/// The tool runs inside the workspace root, so every path written into the script or onto the
/// command line is made absolute against the current directory first.
pub struct LocalOptimizeProtocol<R: JobRunner> {
    input: StructureRef,
    config: OptimizeConfig,
    workspace: StepWorkspace,
    runner: R,
    outputs: StepOutputs,
}

impl<R: JobRunner> LocalOptimizeProtocol<R> {
    pub fn new(
        input: StructureRef,
        config: OptimizeConfig,
        workspace: StepWorkspace,
        runner: R,
    ) -> Self {
        Self {
            input,
            config,
            workspace,
            runner,
            outputs: StepOutputs::new(),
        }
    }

    pub fn input(&self) -> &StructureRef {
        &self.input
    }

    pub fn config(&self) -> &OptimizeConfig {
        &self.config
    }

    pub fn workspace(&self) -> &StepWorkspace {
        &self.workspace
    }

    pub fn outputs(&self) -> &StepOutputs {
        &self.outputs
    }

    pub fn script_path(&self) -> PathBuf {
        self.workspace.tmp_path(SCRIPT_FILE_NAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.workspace.extra_path(OUTPUT_FILE_NAME)
    }

    /// Writes the PML script for this step and returns its path.
    pub fn build_script(&self) -> Result<PathBuf, EngineError> {
        self.workspace.prepare()?;
        let script_path = absolute(&self.script_path())?;
        let output_path = absolute(&self.output_path())?;
        let input_path = absolute(self.input.path())?;
        OptimizeScript::new(&input_path, &output_path, &self.config.params)
            .write_to_path(&script_path)
            .map_err(|e| EngineError::io(&script_path, e))
    }

    /// The exact command line [`Self::run_external_tool`] hands to the runner.
    pub fn command_line(&self, script: &Path) -> String {
        compose_command_line(&self.config.tool, script)
    }

    /// Runs PyMOL on `script` and returns the raw outcome, whatever the exit status.
    pub fn run_external_tool(&self, script: &Path) -> Result<JobOutcome, EngineError> {
        let command_line = self.command_line(&absolute(script)?);
        self.runner.run(&command_line, self.workspace.root())
    }

    /// Wraps the tool's output file into an artifact and records its lineage.
    ///
    /// Fails with [`EngineError::MissingOutput`] if the file is absent; nothing is registered
    /// in that case.
    pub fn finalize_output(&mut self) -> Result<AtomStructArtifact, EngineError> {
        let path = self.output_path();
        if !path.is_file() {
            return Err(EngineError::MissingOutput { path });
        }

        let artifact = AtomStructArtifact::new(path, self.input.clone());
        self.outputs.define_output(OUTPUT_NAME, artifact.clone());
        self.outputs.define_source_relation(&self.input, OUTPUT_NAME);
        info!("Registered {} at {:?}", OUTPUT_NAME, artifact.path());
        Ok(artifact)
    }

    #[instrument(skip_all, name = "local_optimize")]
    pub fn run(&mut self, reporter: &ProgressReporter) -> Result<AtomStructArtifact, EngineError> {
        info!(
            "Optimizing {:?} ({}, {}, {} steps)",
            self.input.path(),
            self.config.params.method,
            self.config.params.force_field,
            self.config.params.steps
        );

        let script = reporter.phase(Phase::WriteScript, || self.build_script())?;

        let outcome = reporter.phase(Phase::RunTool, || {
            let outcome = self.run_external_tool(&script)?;
            if outcome.success() {
                Ok(outcome)
            } else {
                warn!("PyMOL failed; skipping output registration.");
                Err(EngineError::ToolFailed {
                    exit_code: outcome.exit_code,
                    stderr: outcome.stderr.trim().to_string(),
                })
            }
        })?;
        reporter.report(Progress::Message(format!(
            "PyMOL finished in {:.1}s",
            outcome.duration.as_secs_f64()
        )));

        reporter.phase(Phase::RegisterOutput, || self.finalize_output())
    }

    pub fn summary(&self) -> Vec<String> {
        let mut summary = vec![format!(
            "Input atomic structure: {}",
            self.input.path().display()
        )];
        match self.outputs.get(OUTPUT_NAME) {
            Some(artifact) => summary.push(format!(
                "Minimized structure: {}",
                artifact.path().display()
            )),
            None => summary.push(NOT_READY.to_string()),
        }
        summary
    }

    pub fn methods(&self) -> Vec<String> {
        let params = &self.config.params;
        let force_field = format!("Force Field: {}", params.force_field);
        let steps = format!("Minimization steps: {}", params.steps);
        let method = format!("Minimization method: {}", params.method);

        match self.outputs.get(OUTPUT_NAME) {
            Some(artifact) => vec![format!(
                "Minimized structure: {}\n{}\n{}\n{}",
                artifact.path().display(),
                force_field,
                steps,
                method
            )],
            None => vec![NOT_READY.to_string(), force_field, steps, method],
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, EngineError> {
    std::path::absolute(path).map_err(|e| EngineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::params::{ForceField, MinimizationMethod};
    use crate::engine::config::OptimizeConfigBuilder;
    use std::cell::RefCell;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use serial_test::serial;
    use tempfile::{TempDir, tempdir};

    const PDB: &str = "ATOM      1  N   ALA A   1\nEND\n";

    #[derive(Clone, Copy)]
    enum Behavior {
        WriteOutput,
        Fail(i32),
        SucceedWithoutOutput,
    }

    /// Stands in for PyMOL: reads the script from the end of the command line and, if asked
    /// to, writes the file named on its `save` line.
    struct FakePymol {
        behavior: Behavior,
        calls: RefCell<Vec<String>>,
    }

    impl FakePymol {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl JobRunner for FakePymol {
        fn run(&self, command_line: &str, _working_dir: &Path) -> Result<JobOutcome, EngineError> {
            self.calls.borrow_mut().push(command_line.to_string());
            let outcome = |code: i32, stderr: &str| JobOutcome {
                exit_code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
                duration: Duration::from_millis(5),
            };

            match self.behavior {
                Behavior::WriteOutput => {
                    let script = command_line.rsplit(' ').next().unwrap();
                    let text = fs::read_to_string(script).unwrap();
                    let save_line = text.lines().find(|l| l.starts_with("save ")).unwrap();
                    let out = save_line
                        .trim_start_matches("save ")
                        .trim_end_matches(", s1");
                    fs::write(out, PDB).unwrap();
                    Ok(outcome(0, ""))
                }
                Behavior::Fail(code) => Ok(outcome(code, "Error: conda environment not found\n")),
                Behavior::SucceedWithoutOutput => Ok(outcome(0, "")),
            }
        }
    }

    fn setup(behavior: Behavior) -> (LocalOptimizeProtocol<FakePymol>, TempDir) {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("in.pdb");
        fs::write(&input_path, PDB).unwrap();

        let config = OptimizeConfigBuilder::new()
            .method(MinimizationMethod::SteepestDescent)
            .force_field(ForceField::Uff)
            .steps(1000)
            .tool_home("/sw/pymol-2.4.0")
            .conda_activation("true")
            .build()
            .unwrap();

        let protocol = LocalOptimizeProtocol::new(
            StructureRef::new(&input_path),
            config,
            StepWorkspace::new(dir.path().join("run")),
            FakePymol::new(behavior),
        );
        (protocol, dir)
    }

    #[test]
    fn build_script_writes_template_into_tmp_dir() {
        let (protocol, dir) = setup(Behavior::WriteOutput);

        let script = protocol.build_script().unwrap();

        assert_eq!(script, dir.path().join("run/tmp/pymol_optimize.pml"));
        let text = fs::read_to_string(&script).unwrap();
        let expected = format!(
            "load {}, s1\n\
             import pymol.plugins\n\
             plugins.initialize()\n\
             from pmg_tk.startup.optimize import minimize\n\
             minimize(selection=\"s1\",forcefield=\"UFF\",method=\"steepest descent\",nsteps0=1000)\n\
             save {}, s1",
            dir.path().join("in.pdb").display(),
            dir.path().join("run/extra/optimized.pdb").display()
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn run_external_tool_hands_composed_command_to_runner() {
        let (protocol, _dir) = setup(Behavior::SucceedWithoutOutput);
        let script = protocol.build_script().unwrap();

        let outcome = protocol.run_external_tool(&script).unwrap();

        assert!(outcome.success());
        let calls = protocol.runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            format!(
                "true && conda activate pymol2.4.0 && /sw/pymol-2.4.0/pymol/pymol-build/bin/pymol -cq {}",
                script.display()
            )
        );
    }

    #[test]
    fn successful_run_registers_output_linked_to_input() {
        let (mut protocol, dir) = setup(Behavior::WriteOutput);

        let artifact = protocol.run(&ProgressReporter::new()).unwrap();

        let expected_path = dir.path().join("run/extra/optimized.pdb");
        assert_eq!(artifact.path(), expected_path);
        assert!(expected_path.is_file());
        assert_eq!(artifact.derived_from(), protocol.input());

        let outputs = protocol.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs.get(OUTPUT_NAME), Some(&artifact));
        assert_eq!(outputs.relations().len(), 1);
        assert_eq!(&outputs.relations()[0].source, protocol.input());
        assert_eq!(outputs.relations()[0].path, expected_path);
    }

    #[test]
    fn failed_tool_run_skips_registration() {
        let (mut protocol, _dir) = setup(Behavior::Fail(1));

        let result = protocol.run(&ProgressReporter::new());

        match result {
            Err(EngineError::ToolFailed { exit_code, stderr }) => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr, "Error: conda environment not found");
            }
            other => panic!("Expected ToolFailed, got {:?}", other),
        }
        assert!(protocol.outputs().is_empty());
        assert!(protocol.outputs().relations().is_empty());
    }

    #[test]
    fn finalize_without_output_file_raises_missing_output() {
        let (mut protocol, dir) = setup(Behavior::SucceedWithoutOutput);

        let result = protocol.run(&ProgressReporter::new());

        match result {
            Err(EngineError::MissingOutput { path }) => {
                assert_eq!(path, dir.path().join("run/extra/optimized.pdb"));
            }
            other => panic!("Expected MissingOutput, got {:?}", other),
        }
        assert!(protocol.outputs().is_empty());
    }

    #[test]
    fn run_reports_all_three_phases_in_order() {
        let (mut protocol, _dir) = setup(Behavior::WriteOutput);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            if !matches!(p, Progress::Message(_)) {
                sink.lock().unwrap().push(p);
            }
        }));

        protocol.run(&reporter).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::PhaseStart(Phase::WriteScript),
                Progress::PhaseFinish(Phase::WriteScript),
                Progress::PhaseStart(Phase::RunTool),
                Progress::PhaseFinish(Phase::RunTool),
                Progress::PhaseStart(Phase::RegisterOutput),
                Progress::PhaseFinish(Phase::RegisterOutput),
            ]
        );
    }

    #[test]
    fn summary_and_methods_before_and_after_run() {
        let (mut protocol, dir) = setup(Behavior::WriteOutput);
        let input = dir.path().join("in.pdb");
        let output = dir.path().join("run/extra/optimized.pdb");

        assert_eq!(
            protocol.summary(),
            vec![
                format!("Input atomic structure: {}", input.display()),
                "Minimized structure not ready yet.".to_string(),
            ]
        );
        assert_eq!(
            protocol.methods(),
            vec![
                "Minimized structure not ready yet.".to_string(),
                "Force Field: UFF".to_string(),
                "Minimization steps: 1000".to_string(),
                "Minimization method: steepest descent".to_string(),
            ]
        );

        protocol.run(&ProgressReporter::new()).unwrap();

        assert_eq!(
            protocol.summary()[1],
            format!("Minimized structure: {}", output.display())
        );
        assert_eq!(
            protocol.methods(),
            vec![format!(
                "Minimized structure: {}\nForce Field: UFF\nMinimization steps: 1000\nMinimization method: steepest descent",
                output.display()
            )]
        );
    }

    /// A PyMOL home under `root` whose `pymol` copies the loaded file to the saved one, plus
    /// a `conda` that accepts anything.
    #[cfg(unix)]
    fn stub_tool_config(root: &Path) -> OptimizeConfig {
        use std::os::unix::fs::PermissionsExt;

        let home = root.join("pymol-2.4.0");
        let stub_bin = root.join("stub-bin");
        let make_executable = |path: &Path, body: &str| {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        };
        make_executable(&stub_bin.join("conda"), "#!/bin/sh\nexit 0\n");

        let config = OptimizeConfigBuilder::new()
            .tool_home(&home)
            .conda_activation(format!("export PATH={}:$PATH", stub_bin.display()))
            .shell("sh")
            .build()
            .unwrap();
        make_executable(
            &config.tool.binary(),
            "#!/bin/sh\n\
             script=\"$2\"\n\
             in=$(sed -n 's/^load \\(.*\\), s1$/\\1/p' \"$script\")\n\
             out=$(sed -n 's/^save \\(.*\\), s1$/\\1/p' \"$script\")\n\
             cp \"$in\" \"$out\"\n",
        );
        config
    }

    #[cfg(unix)]
    #[test]
    fn end_to_end_with_shell_runner_and_stub_binaries() {
        use crate::engine::executor::ShellJobRunner;

        let dir = tempdir().unwrap();
        let config = stub_tool_config(dir.path());
        let input_path = dir.path().join("in.pdb");
        fs::write(&input_path, PDB).unwrap();

        let mut protocol = LocalOptimizeProtocol::new(
            StructureRef::new(&input_path),
            config,
            StepWorkspace::new(dir.path().join("run")),
            ShellJobRunner::new("sh"),
        );

        let artifact = protocol.run(&ProgressReporter::new()).unwrap();

        assert_eq!(fs::read_to_string(artifact.path()).unwrap(), PDB);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn relative_workdir_and_input_resolve_against_launch_dir() {
        use crate::engine::executor::ShellJobRunner;

        let dir = tempdir().unwrap();
        let config = stub_tool_config(dir.path());
        fs::write(dir.path().join("in.pdb"), PDB).unwrap();

        let previous_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let mut protocol = LocalOptimizeProtocol::new(
            StructureRef::new("in.pdb"),
            config,
            StepWorkspace::new("run"),
            ShellJobRunner::new("sh"),
        );
        let result = protocol.run(&ProgressReporter::new());
        std::env::set_current_dir(previous_dir).unwrap();

        let artifact = result.unwrap();
        assert_eq!(artifact.path(), Path::new("run/extra/optimized.pdb"));
        assert_eq!(
            fs::read_to_string(dir.path().join("run/extra/optimized.pdb")).unwrap(),
            PDB
        );

        let script = fs::read_to_string(dir.path().join("run/tmp/pymol_optimize.pml")).unwrap();
        let load = script.lines().next().unwrap();
        let loaded = load.trim_start_matches("load ").trim_end_matches(", s1");
        assert!(Path::new(loaded).is_absolute());
        assert!(loaded.ends_with("/in.pdb"));
    }
}
