//! Best-effort retention sweep over the backup directory.

use anyhow::{Context, Result};
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use crate::artifacts;
use crate::error::Error;
use crate::run_id::parse_suffix;

const SECS_PER_DAY: u64 = 86_400;

/// How old an artifact may get before the sweep deletes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    max_age: Duration,
}

impl RetentionPolicy {
    /// A window of `n` whole days. Zero would delete the run's own
    /// artifacts, so it is rejected.
    pub fn days(n: u32) -> Result<Self> {
        if n == 0 {
            return Err(anyhow::Error::new(Error::Config(
                "retention window must be at least one day".into(),
            )));
        }
        Ok(Self {
            max_age: Duration::from_secs(u64::from(n) * SECS_PER_DAY),
        })
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Strictly older than `now - max_age`.
    pub fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        match now.checked_sub(self.max_age) {
            Some(cutoff) => modified < cutoff,
            None => false,
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(
                u64::from(crate::config::DEFAULT_RETENTION_DAYS) * SECS_PER_DAY,
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub retained: usize,
    /// Deletions that hit an expected error class and were let go.
    pub skipped: usize,
    /// Deletions that failed for an unexpected reason. Never fatal.
    pub failed: Vec<(PathBuf, String)>,
}

/// Delete dump and log artifacts in `dir` older than the policy allows.
///
/// Only the glob itself can fail; per-file problems are folded into the
/// report.
pub fn sweep(
    dir: &Path,
    prefix: &str,
    policy: &RetentionPolicy,
    now: SystemTime,
) -> Result<SweepReport> {
    sweep_with(dir, prefix, policy, now, remove_artifact)
}

/// [`sweep`] with the deletion step supplied by the caller.
pub fn sweep_with<R>(
    dir: &Path,
    prefix: &str,
    policy: &RetentionPolicy,
    now: SystemTime,
    remove: R,
) -> Result<SweepReport>
where
    R: Fn(&Path) -> io::Result<()>,
{
    let mut report = SweepReport::default();

    let escaped_dir = Pattern::escape(&dir.to_string_lossy());
    let patterns = [
        artifacts::dump_glob(prefix),
        artifacts::LOG_GLOB.to_string(),
    ];

    for file_pattern in patterns {
        let full = format!("{escaped_dir}/{file_pattern}");
        let entries =
            glob::glob(&full).with_context(|| format!("Invalid retention pattern `{full}`"))?;

        for entry in entries {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    debug!(error = %e, "unreadable entry during sweep");
                    report.skipped += 1;
                    continue;
                }
            };
            if !is_run_artifact(&path, prefix) {
                debug!(path = %path.display(), "not a run artifact, leaving it alone");
                continue;
            }
            sweep_one(&path, policy, now, &remove, &mut report);
        }
    }

    Ok(report)
}

/// The default deletion step.
pub fn remove_artifact(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// The glob only pins the prefix and extension; the rest of the name must
/// be a real `<stamp>_<token>` run suffix.
fn is_run_artifact(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| artifacts::classify(n, prefix))
        .is_some_and(|(_, suffix)| parse_suffix(&suffix).is_some())
}

fn sweep_one<R>(
    path: &Path,
    policy: &RetentionPolicy,
    now: SystemTime,
    remove: &R,
    report: &mut SweepReport,
) where
    R: Fn(&Path) -> io::Result<()>,
{
    let modified = match fs::metadata(path).and_then(|m| {
        if m.is_file() {
            m.modified().map(Some)
        } else {
            Ok(None)
        }
    }) {
        Ok(Some(t)) => t,
        Ok(None) => return,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot stat artifact, skipping");
            report.skipped += 1;
            return;
        }
    };

    if !policy.is_expired(modified, now) {
        report.retained += 1;
        return;
    }

    match remove(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed expired artifact");
            report.removed.push(path.to_path_buf());
        }
        Err(e) if is_ignorable(&e) => {
            debug!(path = %path.display(), error = %e, "could not remove artifact, ignoring");
            report.skipped += 1;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove expired artifact");
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
}

/// Error classes the sweep lets go silently: the file vanished, we may not
/// touch it, or someone holds it open.
pub fn is_ignorable(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
    ) {
        return true;
    }
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}
