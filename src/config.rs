use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Gradebot 9000 is a tool to grade your 4600 project 1.
#[derive(Parser, Debug)]
#[command(name = "gradebot", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to scheduler directory
    #[arg(long = "dir", default_value = ".")]
    pub path: PathBuf,

    /// Debug output
    #[arg(long)]
    pub debug: bool,

    /// Print total only
    #[arg(long)]
    pub total: bool,

    /// Print the rubric as JSON
    #[arg(long, conflicts_with = "total")]
    pub json: bool,

    /// Kill a scheduler run after this many seconds (no limit by default)
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Exit without waiting for a key press
    #[arg(long)]
    pub no_pause: bool,
}

/// How the submission is turned into a runnable binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    /// File name of the produced binary, relative to the submission directory.
    pub output: String,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: ["build", "-o", "scheduler.bin"].map(String::from).to_vec(),
            output: "scheduler.bin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GradeConfig {
    pub build: BuildCommand,
    pub timeout: Option<Duration>,
}

impl From<&Cli> for GradeConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            build: BuildCommand::default(),
            timeout: cli.timeout.map(Duration::from_secs),
        }
    }
}
