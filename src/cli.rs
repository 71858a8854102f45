use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "pgmrun", about = "Run a program by name with command-line style arguments", version)]
pub struct Cli {
    /// Program to run: module.function, or a function defined at top level.
    #[arg(value_name = "PROGRAM")]
    pub program: Option<String>,

    /// Arguments passed to the program verbatim.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Show the help document instead of running anything.
    #[arg(short = 'H', long = "help-page", conflicts_with = "bundle")]
    pub help_page: bool,

    /// Read the host argument bundle (JSON) from a file.
    #[arg(long, value_name = "FILE", conflicts_with = "program")]
    pub bundle: Option<PathBuf>,

    /// Directory of program definition files.
    #[arg(long, value_name = "DIR")]
    pub programs: Option<PathBuf>,

    /// How rendered tables are written. In json mode the tables go to stdout
    /// after the program finishes, following anything the program itself
    /// printed there; use --output to keep them apart.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write json tables to this file instead of stdout.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// List the programs that can be run.
    #[arg(short = 'l', long = "list")]
    pub list: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Command name under which tokens from the command line are filed.
pub const COMMAND_NAME: &str = "PGMRUN";
