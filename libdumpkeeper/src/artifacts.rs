//! Artifact naming and listing.
//!
//! A run leaves two files behind, tied together by the run identity:
//! `<prefix>_<stamp>_<token>.dump` and `backup_<stamp>_<token>.log`.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::run_id::{parse_suffix, RunId};

pub const DUMP_EXT: &str = "dump";
pub const LOG_PREFIX: &str = "backup";
pub const LOG_EXT: &str = "log";
pub const LOG_GLOB: &str = "backup_*.log";

/// Glob matching every dump artifact for `prefix`.
pub fn dump_glob(prefix: &str) -> String {
    format!("{}_*.{DUMP_EXT}", glob::Pattern::escape(prefix))
}

/// The two paths one run writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub backup: PathBuf,
    pub log: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, prefix: &str, run_id: &RunId) -> Self {
        let suffix = run_id.suffix();
        Self {
            backup: dir.join(format!("{prefix}_{suffix}.{DUMP_EXT}")),
            log: dir.join(format!("{LOG_PREFIX}_{suffix}.{LOG_EXT}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Dump,
    Log,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dump => "dump",
            Self::Log => "log",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    pub file_name: String,
    pub kind: ArtifactKind,
    /// `<stamp>_<token>`; shared by a dump and its log.
    pub run_suffix: String,
    pub timestamp: DateTime<Utc>,
    pub size_bytes: u64,
}

#[cfg(feature = "json")]
impl ArtifactInfo {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "file": self.file_name,
            "kind": self.kind.as_str(),
            "run": self.run_suffix,
            "timestamp": self.timestamp.to_rfc3339(),
            "size_bytes": self.size_bytes,
        })
    }
}

/// Classify a file name, returning its kind and run suffix.
pub fn classify(file_name: &str, prefix: &str) -> Option<(ArtifactKind, String)> {
    let dump_head = format!("{prefix}_");
    let dump_tail = format!(".{DUMP_EXT}");
    let log_head = format!("{LOG_PREFIX}_");
    let log_tail = format!(".{LOG_EXT}");

    if let Some(rest) = file_name
        .strip_prefix(&dump_head)
        .and_then(|r| r.strip_suffix(&dump_tail))
    {
        return Some((ArtifactKind::Dump, rest.to_string()));
    }
    if let Some(rest) = file_name
        .strip_prefix(&log_head)
        .and_then(|r| r.strip_suffix(&log_tail))
    {
        return Some((ArtifactKind::Log, rest.to_string()));
    }
    None
}

/// List dump and log artifacts in `dir`, newest first.
///
/// A missing directory is not an error; it just has no artifacts.
pub fn list(dir: &Path, prefix: &str) -> Result<Vec<ArtifactInfo>> {
    let mut infos = Vec::new();

    if !dir.exists() {
        return Ok(infos);
    }

    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read backup directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((kind, run_suffix)) = classify(file_name, prefix) else {
            continue;
        };

        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to get metadata for {}", path.display()))?;

        // prefer the stamp in the name, fall back to mtime for odd names
        let timestamp = match parse_suffix(&run_suffix) {
            Some((naive, _)) => match Local.from_local_datetime(&naive) {
                chrono::LocalResult::Single(dt) => DateTime::<Utc>::from(dt),
                chrono::LocalResult::Ambiguous(first, _) => {
                    warn!(
                        "Ambiguous local time for artifact {}, taking first interpretation",
                        file_name
                    );
                    DateTime::<Utc>::from(first)
                }
                chrono::LocalResult::None => DateTime::<Utc>::from(metadata.modified()?),
            },
            None => DateTime::<Utc>::from(metadata.modified()?),
        };

        infos.push(ArtifactInfo {
            file_name: file_name.to_string(),
            kind,
            run_suffix,
            timestamp,
            size_bytes: metadata.len(),
        });
    }

    infos.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    Ok(infos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn run_id(min: u32, token: u32) -> RunId {
        RunId::new(Local.with_ymd_and_hms(2026, 5, 1, 12, min, 0).unwrap(), token)
    }

    #[test]
    fn paths_share_run_suffix() {
        let dir = Path::new("/srv/backups");
        let paths = ArtifactPaths::new(dir, "golf_stats", &run_id(30, 77));
        assert_eq!(
            paths.backup,
            dir.join("golf_stats_2026-05-01_12-30_77.dump")
        );
        assert_eq!(paths.log, dir.join("backup_2026-05-01_12-30_77.log"));
    }

    #[test]
    fn classify_recognises_both_kinds() {
        assert_eq!(
            classify("golf_stats_2026-05-01_12-30_77.dump", "golf_stats"),
            Some((ArtifactKind::Dump, "2026-05-01_12-30_77".into()))
        );
        assert_eq!(
            classify("backup_2026-05-01_12-30_77.log", "golf_stats"),
            Some((ArtifactKind::Log, "2026-05-01_12-30_77".into()))
        );
        assert_eq!(classify("golf_stats_x.sql", "golf_stats"), None);
        assert_eq!(classify("other_x.dump", "golf_stats"), None);
    }

    #[test]
    fn dump_glob_escapes_prefix() {
        assert_eq!(dump_glob("golf_stats"), "golf_stats_*.dump");
        assert_eq!(dump_glob("db[1]"), "db[[]1[]]_*.dump");
    }

    #[test]
    fn list_missing_dir_is_empty() {
        let tmp = tempdir().unwrap();
        let listed = list(&tmp.path().join("absent"), "golf_stats").unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn list_orders_newest_first_and_skips_strangers() {
        let tmp = tempdir().unwrap();
        let older = ArtifactPaths::new(tmp.path(), "golf_stats", &run_id(1, 10));
        let newer = ArtifactPaths::new(tmp.path(), "golf_stats", &run_id(2, 11));
        for p in [&older.backup, &older.log, &newer.backup, &newer.log] {
            fs::write(p, b"data").unwrap();
        }
        fs::write(tmp.path().join("not_a_backup.txt"), "hello").unwrap();
        fs::create_dir(tmp.path().join("a_subdir")).unwrap();

        let listed = list(tmp.path(), "golf_stats").unwrap();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].run_suffix, "2026-05-01_12-02_11");
        assert_eq!(listed[1].run_suffix, "2026-05-01_12-02_11");
        assert_eq!(listed[2].run_suffix, "2026-05-01_12-01_10");
        assert_eq!(listed[0].kind, ArtifactKind::Log);
        assert_eq!(listed[1].kind, ArtifactKind::Dump);
        assert_eq!(listed[0].size_bytes, 4);
    }

    #[test]
    fn list_falls_back_to_modification_time() {
        let tmp = tempdir().unwrap();
        let odd = tmp.path().join("golf_stats_handmade.dump");
        fs::write(&odd, b"bad").unwrap();

        let expected = DateTime::<Utc>::from(fs::metadata(&odd).unwrap().modified().unwrap());
        let listed = list(tmp.path(), "golf_stats").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].run_suffix, "handmade");
        assert_eq!(listed[0].timestamp, expected);
    }
}
