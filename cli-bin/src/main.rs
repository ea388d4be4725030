//! dumpkeeper CLI entry-point
//!
//! All heavy lifting lives in `libdumpkeeper`; this file handles argument
//! parsing, logging, dispatch and the mapping of outcomes to exit codes.

mod cli; // sub-command definitions and argument structs

use libdumpkeeper::{config, logging};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use std::io;
use std::process::ExitCode;
use tracing::debug;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let args = Cli::parse();
    logging::init_with(if args.verbose { "debug" } else { "info" });

    match dispatch(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(args: Cli) -> Result<ExitCode> {
    /* ── shell-completion shortcut ────────────────────────────── */
    if let Some(Commands::Completions { shell }) = &args.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "dumpkeeper", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = config::Config::load()?;
    debug!(?cfg, "configuration loaded");

    match args.command {
        None => cli::run::run(&cli::run::RunOpts::default(), cfg, args.format),
        Some(Commands::Run(opts)) => cli::run::run(&opts, cfg, args.format),
        Some(Commands::List(opts)) => {
            cli::list::run(&opts, cfg, args.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Prune(opts)) => {
            cli::prune::run(&opts, cfg, args.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Completions { .. }) => Ok(ExitCode::SUCCESS), // handled above
    }
}
