//! The per-run log artifact.
//!
//! Line format, in order: `START <rfc3339>`, raw dump output,
//! `EXITCODE <n>`, and `OK - Backup created: <path>` on success only.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::run_id::RunId;

#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Create (or truncate) the log and write the `START` line.
    pub fn start(path: &Path, run_id: &RunId) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to create run log at {}", path.display()))?;
        let mut log = Self {
            path: path.to_path_buf(),
            file,
        };
        log.line(&format!("START {}", run_id.started_iso()))?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A second handle on the same open file, for a child's stdout/stderr.
    ///
    /// Writes through either handle share one file offset, so the child's
    /// output lands between our own lines in the order it was emitted.
    pub fn child_sink(&self) -> Result<File> {
        self.file
            .try_clone()
            .with_context(|| format!("Failed to share run log {}", self.path.display()))
    }

    pub fn exit_code(&mut self, code: i32) -> Result<()> {
        self.line(&format!("EXITCODE {code}"))
    }

    pub fn spawn_error(&mut self, err: &dyn std::fmt::Display) -> Result<()> {
        self.line(&format!("SPAWN-ERROR {err}"))
    }

    pub fn ok(&mut self, backup_path: &Path) -> Result<()> {
        self.line(&format!("OK - Backup created: {}", backup_path.display()))
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.file, "{text}")
            .and_then(|_| self.file.flush())
            .with_context(|| format!("Failed to write run log {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_lines_in_order() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("backup_x.log");
        let id = RunId::new(Local.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap(), 1);

        let mut log = RunLog::start(&path, &id).unwrap();
        {
            let mut sink = log.child_sink().unwrap();
            writeln!(sink, "pg_dump: dumping contents of table \"players\"").unwrap();
        }
        log.exit_code(0).unwrap();
        log.ok(Path::new("/srv/b/golf_stats_x.dump")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("START 2026-02-03T04:05:06"));
        assert_eq!(lines[1], "pg_dump: dumping contents of table \"players\"");
        assert_eq!(lines[2], "EXITCODE 0");
        assert_eq!(lines[3], "OK - Backup created: /srv/b/golf_stats_x.dump");
    }

    #[test]
    fn start_truncates_existing_log() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("backup_y.log");
        fs::write(&path, "stale\nstale\n").unwrap();

        RunLog::start(&path, &RunId::current()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("START "));
    }
}
