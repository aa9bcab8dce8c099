use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "David Herreros Calero",
    version,
    about = "pymolopt - Local optimization of atomic structures using PyMOL's minimizer as a pipeline step.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimize an atomic structure locally with PyMOL and register the result.
    Optimize(OptimizeArgs),
    /// Inspect and manage the PyMOL installation used by pymolopt.
    Tool(ToolArgs),
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    // --- Core Arguments ---
    /// Path to the input atomic structure (e.g., model.pdb).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Private working directory of this step; the result lands in <DIR>/extra/optimized.pdb.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub workdir: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Label recorded for the input structure in the output manifest. Defaults to the file stem.
    #[arg(long, value_name = "NAME")]
    pub label: Option<String>,

    // --- Minimization Overrides ---
    /// Minimization method: 'conjugate gradients' (cg) or 'steepest descent' (sd).
    #[arg(short, long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Force field: GAFF, MMFF94s, MMFF94, UFF or Ghemical.
    #[arg(short, long = "force-field", value_name = "NAME")]
    pub force_field: Option<String>,

    /// Number of minimization steps.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<u32>,

    // --- Tool Overrides ---
    #[command(flatten)]
    pub tool: ToolOverrides,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S minimization.steps=1000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Write the PML script and print the command line without running PyMOL.
    #[arg(long)]
    pub dry_run: bool,
}

/// Options locating the PyMOL installation, shared by several subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct ToolOverrides {
    /// Override the PyMOL home directory (the one containing 'pymol/pymol-build').
    #[arg(long, value_name = "PATH")]
    pub tool_home: Option<PathBuf>,

    /// Shell fragment that makes 'conda activate' available, run before anything else.
    #[arg(long, value_name = "COMMAND")]
    pub conda_activation: Option<String>,
}

/// Arguments for the `tool` subcommand.
#[derive(Args, Debug)]
pub struct ToolArgs {
    #[command(subcommand)]
    pub command: ToolCommands,
}

/// Available commands for tool management.
#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// Show the PyMOL home directory that will be used.
    Path,
    /// Persist a custom PyMOL home directory.
    SetHome {
        /// The directory PyMOL is (or will be) installed in.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Forget the custom home and go back to the default, OS-specific location.
    ResetHome,
    /// Print the shell recipe that fetches, builds and installs PyMOL.
    Recipe {
        #[command(flatten)]
        tool: ToolOverrides,
    },
    /// Check whether PyMOL is installed in the home directory.
    Check {
        #[command(flatten)]
        tool: ToolOverrides,
    },
}
