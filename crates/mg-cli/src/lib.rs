use std::ffi::OsString;

use clap::Parser;
use log::debug;
use mg_api::{load_map_settings, run_map_script, RunMapScriptOptions};
use mg_core::MapgenError;
use mg_runtime::{render, Reporting};

mod cli_args;
mod error_map;
mod export_store;
mod working_dir;

pub(crate) use cli_args::{Cli, Mode, RunArgs};
pub(crate) use error_map::{emit_error, map_cli_cwd, map_cli_export_encode, map_cli_export_write};
pub(crate) use export_store::save_exports;
pub(crate) use working_dir::resolve_working_dir;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, MapgenError> {
    match cli.command {
        Mode::Run(args) => run_map(args),
    }
}

fn run_map(args: RunArgs) -> Result<i32, MapgenError> {
    let working_dir = resolve_working_dir(args.cwd.as_deref())?;
    debug!("Working directory: {}", working_dir.display());
    let map_settings = args
        .map_settings
        .as_deref()
        .map(load_map_settings)
        .transpose()?;

    let reports = run_map_script(RunMapScriptOptions {
        script: args.script,
        library: Some(args.library),
        working_dir,
        template_root: Some(args.template_root),
        map_settings,
        reporting: Reporting {
            script_log: !args.no_script_log,
            progress: !args.quiet_progress,
            export: !args.quiet_export,
        },
    })?;

    if let Some(path) = &args.export_out {
        save_exports(path, &reports.exports)?;
    }

    println!("RESULT:OK");
    println!("EXPORTS:{}", reports.exports.len());
    if let Some(progress) = &reports.progress {
        println!("PROGRESS:{}", render(progress));
    }
    println!(
        "EXPORT_OUT:{}",
        args.export_out
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "NONE".to_string())
    );
    Ok(0)
}
