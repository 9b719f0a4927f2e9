use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glossa::{config::Config, orchestrator::Orchestrator};
use log::{LevelFilter, error, info};

#[derive(Debug, Parser)]
#[command(name = "glossa", version, about = "Compile message bundles into JavaScript modules")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a project file into message modules
    Compile {
        /// Project file with locale settings and bundles
        #[arg(short, long)]
        project: PathBuf,

        /// Additional config file, applied after glossa.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Emit per-request overrides and call tracking in dispatchers
        #[arg(long)]
        middleware_locale_splitting: bool,

        /// Remove previously generated modules before writing
        #[arg(long)]
        clean: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Compile {
            project,
            config,
            out_dir,
            middleware_locale_splitting,
            clean,
        } => {
            let project_dir = project
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            let mut config = Config::load(&project_dir, config.as_deref())
                .context("Failed to load configuration")?;
            if let Some(out_dir) = out_dir {
                config.out_dir = out_dir;
            }
            config.experimental_middleware_locale_splitting |= middleware_locale_splitting;
            config.clean_out_dir |= clean;

            let summary = Orchestrator::new(config)
                .build(&project)
                .with_context(|| format!("Failed to compile {}", project.display()))?;
            info!(
                "Compiled {} bundle(s) in {} locale(s)",
                summary.bundles, summary.locales
            );
            Ok(())
        }
    }
}
