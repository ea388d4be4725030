// src/cli.rs
pub mod list;
pub mod prune;
pub mod run;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use libdumpkeeper::utils::expand_path;
use libdumpkeeper::{Config, RetentionPolicy};

/// dumpkeeper – scheduled pg_dump backups with a per-run log and retention
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for command results
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub format: Format,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one backup cycle: dump, log, then sweep expired artifacts
    Run(run::RunOpts),

    /// List dump and log artifacts, newest first
    List(list::ListOpts),

    /// Delete expired artifacts without taking a new dump
    Prune(prune::PruneOpts),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Where the artifacts live; shared by every command.
#[derive(Args, Debug, Default)]
pub struct LocationOpts {
    /// Backup directory (overrides DUMPKEEPER_BACKUP_DIR)
    #[arg(long)]
    pub dir: Option<String>,

    /// File-name prefix of dump artifacts
    #[arg(long)]
    pub prefix: Option<String>,
}

impl LocationOpts {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(dir) = &self.dir {
            cfg.backup_dir = expand_path(dir);
        }
        if let Some(prefix) = &self.prefix {
            cfg.prefix = prefix.clone();
        }
    }
}

pub fn apply_retention(days: Option<u32>, cfg: &mut Config) -> Result<()> {
    if let Some(days) = days {
        cfg.retention = RetentionPolicy::days(days)?;
    }
    Ok(())
}
