//! tests/util.rs
//! Small helpers shared across integration tests.
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const DAY: u64 = 86_400;

/// Absolute path to the freshly-built `dumpkeeper` binary.
pub fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dumpkeeper"))
}

/// `<tmp>/backups`
pub fn backup_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("backups")
}

/// Build a `Command` for `dumpkeeper` whose backup directory is
/// `<tmp>/backups` and whose dump program is a fake exiting with
/// `exit_code`.
///
/// Each call yields a brand-new `Command`, so callers can freely add
/// arguments without affecting other invocations.
pub fn dumpkeeper(tmp: &TempDir, exit_code: i32) -> Command {
    let mut cmd = Command::new(bin());
    for var in [
        "DUMPKEEPER_DATABASE_URL",
        "DUMPKEEPER_DB_PASSWORD",
        "DUMPKEEPER_PG_DUMP_ARGS",
        "DUMPKEEPER_PREFIX",
        "DUMPKEEPER_RETENTION_DAYS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("DUMPKEEPER_BACKUP_DIR", backup_dir(tmp));
    cmd.env("DUMPKEEPER_PG_DUMP", fake_pg_dump(tmp.path(), exit_code));
    cmd
}

/// Shell stand-in for `pg_dump`: writes the `-f` target, prints a line on
/// each stream and exits with `exit_code`.
#[cfg(unix)]
pub fn fake_pg_dump(dir: &Path, exit_code: i32) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(format!("fake_pg_dump_{exit_code}.sh"));
    if path.exists() {
        return path;
    }
    let script = format!(
        "#!/bin/sh\n\
         out=\"\"\n\
         while [ $# -gt 0 ]; do\n\
           if [ \"$1\" = \"-f\" ]; then out=\"$2\"; shift; fi\n\
           shift\n\
         done\n\
         echo \"pg_dump: dumping contents of table players\"\n\
         echo \"pg_dump: warning from stderr\" >&2\n\
         printf 'PGDMP' > \"$out\"\n\
         exit {exit_code}\n"
    );
    {
        let mut f = File::create(&path).unwrap();
        f.write_all(script.as_bytes()).unwrap();
        f.sync_all().unwrap();
    }
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(not(unix))]
pub fn fake_pg_dump(dir: &Path, _exit_code: i32) -> PathBuf {
    dir.join("fake_pg_dump_unsupported")
}

/// Create `name` under `dir` with an mtime `days` in the past.
pub fn aged_file(dir: &Path, name: &str, days: u64) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, b"old").unwrap();
    let file = File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(days * DAY))
        .unwrap();
    path
}

/// File names in `dir`, sorted.
pub fn names(dir: &Path) -> Vec<String> {
    let mut out: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    out.sort();
    out
}

/// Names ending in `ext`.
pub fn with_ext(dir: &Path, ext: &str) -> Vec<String> {
    names(dir)
        .into_iter()
        .filter(|n| n.ends_with(ext))
        .collect()
}
