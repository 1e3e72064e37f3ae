mod help_module;
mod version_module;

use std::{path::PathBuf, process::ExitCode};

use {
    anyhow::Context,
    clap::Parser,
    mortar_dispatch::{Dispatcher, ModuleSet},
    tracing::debug,
    tracing_subscriber::EnvFilter,
};

use crate::{help_module::HelpModule, version_module::VersionModule};

#[derive(Parser)]
#[command(name = "mortar", about = "Modular command dispatcher", version)]
struct Cli {
    /// Command to run (defaults to `help`).
    command: Option<String>,

    /// Arguments passed through to the command untouched.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, env = "MORTAR_LOG", default_value = "warn")]
    log_level: String,

    /// Cache directory. Must exist when given; defaults to the platform
    /// data dir, which is created on first run.
    #[arg(long, env = "MORTAR_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

fn init_telemetry(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The cache root: an explicit `--cache-dir` as-is, otherwise the platform
/// data dir (created if needed).
fn cache_root(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let dirs = directories::ProjectDirs::from("", "", "mortar")
        .context("could not determine a data directory")?;
    let root = dirs.data_dir().join("cache");
    std::fs::create_dir_all(&root)
        .with_context(|| format!("create cache directory {}", root.display()))?;
    Ok(root)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = cache_root(cli.cache_dir)?;
    debug!(cache_root = %root.display(), "starting");

    let modules = ModuleSet::builder()
        .module(Box::new(HelpModule::new(&root)))
        .module(Box::new(VersionModule))
        .build()?;
    let mut dispatcher = Dispatcher::new(modules, &root)?;

    // Reassemble the conventional argv shape the dispatcher expects:
    // program name, command name, then the command's own arguments.
    let mut argv = vec!["mortar".to_string()];
    if let Some(command) = cli.command {
        argv.push(command);
        argv.extend(cli.args);
    }
    dispatcher.dispatch(&argv)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_telemetry(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<mortar_common::Error>() {
                Some(unknown @ mortar_common::Error::UnknownCommand { .. }) => {
                    eprintln!("{unknown}");
                    eprintln!("run `mortar help` for the list of commands");
                },
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        },
    }
}
