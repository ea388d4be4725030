// libdumpkeeper/src/backup.rs

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{error, info, warn};

use crate::artifacts::ArtifactPaths;
use crate::config::Config;
use crate::dump::DumpInvocation;
use crate::error::Error;
use crate::retention::{self, SweepReport};
use crate::run_id::RunId;
use crate::run_log::RunLog;
use crate::utils::exit_code_of;

/// What one backup cycle amounted to.
///
/// Setup and IO problems are `Err`s; a dump that ran and failed is a
/// normal outcome the caller maps to an exit code.
#[derive(Debug)]
pub enum RunOutcome {
    Success {
        run_id: RunId,
        backup_path: PathBuf,
        log_path: PathBuf,
        sweep: SweepReport,
    },
    DumpFailed {
        run_id: RunId,
        exit_code: i32,
        backup_path: PathBuf,
        log_path: PathBuf,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn log_path(&self) -> &Path {
        match self {
            Self::Success { log_path, .. } | Self::DumpFailed { log_path, .. } => log_path,
        }
    }

    pub fn backup_path(&self) -> &Path {
        match self {
            Self::Success { backup_path, .. } | Self::DumpFailed { backup_path, .. } => {
                backup_path
            }
        }
    }
}

#[derive(Debug)]
pub struct BackupRunner {
    cfg: Config,
    backup_dir: PathBuf,
    remove: fn(&Path) -> io::Result<()>,
}

impl BackupRunner {
    /// Prepare the backup directory (creating it and its ancestors when
    /// missing) and remember its absolute location.
    pub fn new(cfg: Config) -> Result<Self> {
        let dir = cfg.backup_dir.clone();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                anyhow::Error::new(Error::Setup(format!(
                    "cannot create backup directory {}: {e}",
                    dir.display()
                )))
            })?;
        } else if !dir.is_dir() {
            return Err(anyhow::Error::new(Error::Setup(format!(
                "backup path exists but is not a directory: {}",
                dir.display()
            ))));
        }
        let backup_dir = fs::canonicalize(&dir)
            .with_context(|| format!("Failed to resolve backup directory {}", dir.display()))?;
        Ok(Self {
            cfg,
            backup_dir,
            remove: retention::remove_artifact,
        })
    }

    /// Swap the step the retention sweep uses to delete an artifact.
    pub fn with_remover(mut self, remove: fn(&Path) -> io::Result<()>) -> Self {
        self.remove = remove;
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// One full cycle for the current process.
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_as(RunId::current())
    }

    /// One full cycle under an explicit identity.
    pub fn run_as(&self, run_id: RunId) -> Result<RunOutcome> {
        let paths = ArtifactPaths::new(&self.backup_dir, &self.cfg.prefix, &run_id);
        info!(run_id = %run_id, path = %paths.backup.display(), "starting backup");

        let mut log = RunLog::start(&paths.log, &run_id)?;
        let invocation = DumpInvocation::for_config(&self.cfg, &paths.backup);

        let status = match invocation.run_into(&log.child_sink()?) {
            Ok(status) => status,
            Err(e) => {
                // leave a trace in the artifact before bailing out
                if let Err(log_err) = log.spawn_error(&format!("{e:#}")) {
                    warn!(error = %log_err, "could not record launch failure in run log");
                }
                return Err(e);
            }
        };

        let exit_code = exit_code_of(status);
        log.exit_code(exit_code)?;

        if exit_code != 0 {
            error!(
                run_id = %run_id,
                exit_code,
                log = %paths.log.display(),
                "dump utility failed; retention sweep skipped"
            );
            return Ok(RunOutcome::DumpFailed {
                run_id,
                exit_code,
                backup_path: paths.backup,
                log_path: paths.log,
            });
        }

        let sweep = self.sweep_at(SystemTime::now());
        log.ok(&paths.backup)?;

        info!(
            run_id = %run_id,
            path = %paths.backup.display(),
            removed = sweep.removed.len(),
            "backup created"
        );
        Ok(RunOutcome::Success {
            run_id,
            backup_path: paths.backup,
            log_path: paths.log,
            sweep,
        })
    }

    /// Retention sweep on its own. Never fails: a sweep that cannot even
    /// start is logged and reported as empty.
    pub fn sweep_at(&self, now: SystemTime) -> SweepReport {
        match retention::sweep_with(
            &self.backup_dir,
            &self.cfg.prefix,
            &self.cfg.retention,
            now,
            self.remove,
        ) {
            Ok(report) => {
                if !report.failed.is_empty() {
                    warn!(
                        failed = report.failed.len(),
                        "some expired artifacts could not be removed"
                    );
                }
                report
            }
            Err(e) => {
                warn!(error = %e, "retention sweep could not run");
                SweepReport::default()
            }
        }
    }
}
