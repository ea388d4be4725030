// src/cli/run.rs
use crate::cli::{apply_retention, Format, LocationOpts};
use anyhow::Result;
use clap::Args;
use libdumpkeeper::utils::{expand_path, failure_exit_code};
use libdumpkeeper::{BackupRunner, Config, RunOutcome};
use serde_json::json;
use std::process::ExitCode;

/// Options for the `run` command
#[derive(Args, Debug, Default)]
pub struct RunOpts {
    #[command(flatten)]
    pub location: LocationOpts,

    /// Delete artifacts older than N days after a successful dump
    #[arg(long)]
    pub retention_days: Option<u32>,

    /// Dump program to invoke (defaults to `pg_dump` on PATH)
    #[arg(long)]
    pub pg_dump: Option<String>,
}

pub fn run(opts: &RunOpts, mut cfg: Config, fmt: Format) -> Result<ExitCode> {
    opts.location.apply(&mut cfg);
    apply_retention(opts.retention_days, &mut cfg)?;
    if let Some(program) = &opts.pg_dump {
        cfg.pg_dump = expand_path(program);
    }

    let runner = BackupRunner::new(cfg)?;
    let outcome = runner.run()?;

    match &outcome {
        RunOutcome::Success {
            run_id,
            backup_path,
            log_path,
            sweep,
        } => {
            match fmt {
                Format::Text => {
                    println!("Backup created: {}", backup_path.display());
                    if !sweep.removed.is_empty() {
                        println!("Removed {} expired artifact(s)", sweep.removed.len());
                    }
                }
                Format::Json => println!(
                    "{}",
                    json!({
                        "status": "ok",
                        "run": run_id.suffix(),
                        "backup": backup_path,
                        "log": log_path,
                        "removed": sweep.removed,
                    })
                ),
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::DumpFailed {
            run_id,
            exit_code,
            log_path,
            ..
        } => {
            if fmt == Format::Json {
                println!(
                    "{}",
                    json!({
                        "status": "failed",
                        "run": run_id.suffix(),
                        "exit_code": exit_code,
                        "log": log_path,
                    })
                );
            }
            eprintln!(
                "Backup failed: dump utility exited with code {exit_code}. See log: {}",
                log_path.display()
            );
            Ok(ExitCode::from(failure_exit_code(*exit_code)))
        }
    }
}
