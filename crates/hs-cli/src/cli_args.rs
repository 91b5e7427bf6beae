use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hs-cli")]
#[command(about = "Run host scripts and inspect object graphs from JSON fixtures")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Run(RunArgs),
    Check(CheckArgs),
    Get(GetArgs),
    Explore(ExploreArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    pub(crate) script: String,
    #[arg(long = "context")]
    pub(crate) context: Option<String>,
    #[arg(long = "options")]
    pub(crate) options: Option<String>,
    #[arg(long = "seed")]
    pub(crate) seed: Option<u32>,
    #[arg(long = "max-operations")]
    pub(crate) max_operations: Option<u64>,
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    pub(crate) script: String,
}

#[derive(Debug, Args)]
pub(crate) struct GetArgs {
    pub(crate) data: String,
    pub(crate) path: String,
}

#[derive(Debug, Args)]
pub(crate) struct ExploreArgs {
    pub(crate) data: String,
    #[arg(long = "shortcut")]
    pub(crate) shortcuts: Vec<String>,
}
