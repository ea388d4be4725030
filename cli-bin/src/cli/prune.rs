// src/cli/prune.rs
use crate::cli::{apply_retention, Format, LocationOpts};
use anyhow::Result;
use clap::Args;
use libdumpkeeper::{BackupRunner, Config};
use serde_json::json;
use std::time::SystemTime;

#[derive(Args, Debug)]
pub struct PruneOpts {
    #[command(flatten)]
    pub location: LocationOpts,

    /// Delete artifacts older than N days
    #[arg(long)]
    pub retention_days: Option<u32>,
}

pub fn run(opts: &PruneOpts, mut cfg: Config, fmt: Format) -> Result<()> {
    opts.location.apply(&mut cfg);
    apply_retention(opts.retention_days, &mut cfg)?;

    let runner = BackupRunner::new(cfg)?;
    let report = runner.sweep_at(SystemTime::now());

    match fmt {
        Format::Text => {
            println!(
                "Pruned {} expired artifacts, kept {}",
                report.removed.len(),
                report.retained
            );
            for (path, err) in &report.failed {
                eprintln!("could not remove {}: {err}", path.display());
            }
        }
        Format::Json => println!(
            "{}",
            json!({
                "removed": report.removed,
                "retained": report.retained,
                "skipped": report.skipped,
                "failed": report
                    .failed
                    .iter()
                    .map(|(p, e)| json!({ "path": p, "error": e }))
                    .collect::<Vec<_>>(),
            })
        ),
    }
    Ok(())
}
