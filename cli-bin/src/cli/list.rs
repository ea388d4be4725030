// src/cli/list.rs
use crate::cli::{Format, LocationOpts};
use anyhow::Result;
use clap::Args;
use libdumpkeeper::{artifacts, Config};

#[derive(Args, Debug)]
pub struct ListOpts {
    #[command(flatten)]
    pub location: LocationOpts,
}

pub fn run(opts: &ListOpts, mut cfg: Config, fmt: Format) -> Result<()> {
    opts.location.apply(&mut cfg);
    let infos = artifacts::list(&cfg.backup_dir, &cfg.prefix)?;

    match fmt {
        Format::Json => {
            let rows: Vec<_> = infos.iter().map(|i| i.to_json()).collect();
            println!("{}", serde_json::Value::Array(rows));
        }
        Format::Text if infos.is_empty() => {
            eprintln!("No artifacts in {}", cfg.backup_dir.display());
        }
        Format::Text => {
            for info in &infos {
                println!(
                    "{}  {:<4}  {:>12}  {}",
                    info.timestamp.format("%Y-%m-%d %H:%M UTC"),
                    info.kind.as_str(),
                    info.size_bytes,
                    info.file_name
                );
            }
        }
    }
    Ok(())
}
