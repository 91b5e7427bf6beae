use std::ffi::OsString;

use clap::Parser;
use hs_core::{RuntimeOptions, ScriptError};
use hs_runtime::{dynamic_to_host, path, ScriptRuntime};

mod cli_args;
mod error_map;
mod models;
mod source_loader;

pub(crate) use cli_args::{CheckArgs, Cli, ExploreArgs, GetArgs, Mode, RunArgs};
pub(crate) use error_map::{emit_error, map_cli_json_invalid, map_cli_output, map_cli_source_read};
pub(crate) use models::{CheckReport, CommandOutcome};
pub(crate) use source_loader::{load_context, load_data, load_options, read_source};

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
    match run(cli).and_then(|outcome| emit_outcome(&outcome)) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<CommandOutcome, ScriptError> {
    match cli.command {
        Mode::Run(args) => run_script(args),
        Mode::Check(args) => check_script(args),
        Mode::Get(args) => get_path(args),
        Mode::Explore(args) => explore_data(args),
    }
}

fn run_script(args: RunArgs) -> Result<CommandOutcome, ScriptError> {
    let source = read_source(&args.script)?;
    let context = load_context(args.context.as_deref())?;
    let mut options = load_options(args.options.as_deref())?;
    if args.seed.is_some() {
        options.random_seed = args.seed;
    }
    if let Some(max_operations) = args.max_operations {
        options.max_operations = max_operations;
    }

    let runtime = ScriptRuntime::new(options)?;
    let value = runtime.try_execute(&source, &context)?;
    Ok(CommandOutcome::Value(dynamic_to_host(value).to_json()))
}

fn check_script(args: CheckArgs) -> Result<CommandOutcome, ScriptError> {
    let source = read_source(&args.script)?;
    let runtime = ScriptRuntime::new(RuntimeOptions::default())?;
    let unit = hs_compiler::try_compile(runtime.engine(), &source)?;
    let functions = unit
        .ast()
        .map(|ast| {
            ast.iter_functions()
                .map(|function| function.name.to_string())
                .collect()
        })
        .unwrap_or_default();
    Ok(CommandOutcome::Checked(CheckReport {
        source_chars: source.chars().count(),
        functions,
    }))
}

fn get_path(args: GetArgs) -> Result<CommandOutcome, ScriptError> {
    let root = load_data(&args.data)?;
    match path::get(&root, &args.path) {
        Some(value) => Ok(CommandOutcome::Value(value.to_json())),
        None => Err(ScriptError::new(
            "CLI_PATH_NOT_FOUND",
            format!("Path \"{}\" does not resolve to a value.", args.path),
        )),
    }
}

fn explore_data(args: ExploreArgs) -> Result<CommandOutcome, ScriptError> {
    let root = load_data(&args.data)?;
    Ok(CommandOutcome::Paths(path::explore(&root, &args.shortcuts)))
}

pub(crate) fn emit_outcome(outcome: &CommandOutcome) -> Result<i32, ScriptError> {
    let lines = match outcome {
        CommandOutcome::Value(value) => vec![format!(
            "VALUE_JSON:{}",
            serde_json::to_string(value).map_err(map_cli_output)?
        )],
        CommandOutcome::Checked(report) => vec![format!(
            "CHECK_JSON:{}",
            serde_json::to_string(report).map_err(map_cli_output)?
        )],
        CommandOutcome::Paths(paths) => paths.iter().map(|path| format!("PATH:{}", path)).collect(),
    };
    println!("RESULT:OK");
    for line in lines {
        println!("{}", line);
    }
    Ok(0)
}

#[cfg(test)]
mod cli_test_support;
