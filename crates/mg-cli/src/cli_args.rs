use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mg_api::DEFAULT_LIBRARY;
use mg_runtime::DEFAULT_TEMPLATE_ROOT;

#[derive(Debug, Parser)]
#[command(name = "mg-cli")]
#[command(about = "Runs random map scripts against an emulated engine host")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    /// Map script, relative to the working directory.
    pub(crate) script: String,
    #[arg(long = "library", default_value = DEFAULT_LIBRARY)]
    pub(crate) library: String,
    #[arg(long = "cwd")]
    pub(crate) cwd: Option<PathBuf>,
    #[arg(long = "template-root", default_value = DEFAULT_TEMPLATE_ROOT)]
    pub(crate) template_root: String,
    #[arg(long = "map-settings")]
    pub(crate) map_settings: Option<PathBuf>,
    #[arg(long = "export-out")]
    pub(crate) export_out: Option<PathBuf>,
    #[arg(long = "quiet-progress")]
    pub(crate) quiet_progress: bool,
    #[arg(long = "quiet-export")]
    pub(crate) quiet_export: bool,
    #[arg(long = "no-script-log")]
    pub(crate) no_script_log: bool,
}
