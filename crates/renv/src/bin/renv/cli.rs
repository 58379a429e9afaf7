//! renv cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; renv ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve definitions and print the result
    ///
    /// Reads a definition from stdin unless any other source is provided (via --input-*).
    /// Every source is resolved on its own.
    #[command(alias = "r")]
    Render(RenderCommand),

    /// Resolve a definition and run a command with the result added to its environment
    Run(RunCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct RenderCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolve: ResolveArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct RunCommand {
    /// Definition file
    #[clap(short = 'f', long = "input-file")]
    pub file: PathBuf,

    #[clap(flatten)]
    pub resolve: ResolveArgs,

    /// Command to run, followed by its arguments
    #[clap(last(true), required(true))]
    pub command: Vec<OsString>,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load definition files (*env.yaml, *env.yml) from work directory
    #[clap(short = 'w', long = "input-workdir")]
    pub workdir: bool,

    /// Load a file
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Load definition files (*env.yaml, *env.yml) from given directory
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[arg(long = "strategy", default_value_t)]
    pub strategy: Strategy,

    /// What to do when variables reference each other in a loop
    #[arg(long = "on-cycle", default_value_t)]
    pub on_cycle: OnCycle,

    /// Fail on references that are neither declared nor set in the environment
    ///
    /// By default these expand to an empty string.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Resolve against an empty environment instead of the current one
    #[arg(short = 'i', long = "ignore-environment")]
    pub ignore_environment: bool,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Env,
    Export,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Env => f.write_str("env"),
            OutputFormat::Export => f.write_str("export"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl From<OutputFormat> for renv::emit::Format {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Env => Self::Env,
            OutputFormat::Export => Self::Export,
            OutputFormat::Json => Self::Json,
            OutputFormat::Yaml => Self::Yaml,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum Strategy {
    /// Depth first order of the dependency graph
    #[default]
    Topological,
    /// Repeat expansion until nothing changes
    FixedPoint,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Topological => f.write_str("topological"),
            Strategy::FixedPoint => f.write_str("fixed-point"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OnCycle {
    /// Fail
    #[default]
    Abort,
    /// Output what could be resolved before the loop was found
    Partial,
}

impl std::fmt::Display for OnCycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OnCycle::Abort => f.write_str("abort"),
            OnCycle::Partial => f.write_str("partial"),
        }
    }
}

impl ResolveArgs {
    pub fn options(&self) -> renv::resolve::Options {
        use renv::expand::UndefinedPolicy;
        use renv::resolve::{CyclePolicy, Options};

        Options {
            strategy: match self.strategy {
                Strategy::Topological => renv::resolve::Strategy::Topological,
                Strategy::FixedPoint => renv::resolve::Strategy::FixedPoint,
            },
            on_cycle: match self.on_cycle {
                OnCycle::Abort => CyclePolicy::Abort,
                OnCycle::Partial => CyclePolicy::Partial,
            },
            on_undefined: if self.strict {
                UndefinedPolicy::Error
            } else {
                UndefinedPolicy::Empty
            },
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,

    #[clap(flatten)]
    pub input: InputArgs,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Dependencies of every declared variable
    Graph,
    /// Order in which the variables get expanded
    Order,
}
