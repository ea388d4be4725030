use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use lazy_static::lazy_static;

lazy_static! {
    /// Global mutex to serialize environment-variable modifications in tests.
    pub static ref ENV_MUTEX: Mutex<()> = Mutex::new(());
}

/// Backdate a file's mtime to `now - age`.
pub fn age_file(path: &Path, age: Duration, now: SystemTime) {
    let file = File::options()
        .write(true)
        .open(path)
        .unwrap_or_else(|e| panic!("cannot open {} to age it: {e}", path.display()));
    file.set_modified(now - age)
        .unwrap_or_else(|e| panic!("cannot set mtime on {}: {e}", path.display()));
}

/// Write a stand-in for `pg_dump` into `dir` and return its path.
///
/// It writes `PGDMP-fake` to the `-f` target, prints one line on stdout
/// then one on stderr, and exits with `exit_code`. Without
/// `PGCONNECT_TIMEOUT` in its environment it bails out with 7.
#[cfg(unix)]
pub fn fake_pg_dump(dir: &Path, exit_code: i32) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(format!("fake_pg_dump_{exit_code}.sh"));
    let script = format!(
        r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-f" ]; then out="$2"; shift; fi
  shift
done
[ -n "$PGCONNECT_TIMEOUT" ] || {{ echo "fake pg_dump: no connect timeout" >&2; exit 7; }}
echo "fake pg_dump: to stdout"
echo "fake pg_dump: to stderr" >&2
if [ -n "$PGPASSWORD" ]; then echo "fake pg_dump: password supplied"; fi
printf 'PGDMP-fake' > "$out"
exit {exit_code}
"#
    );
    {
        let mut f = File::create(&path).unwrap();
        f.write_all(script.as_bytes()).unwrap();
        f.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(not(unix))]
pub fn fake_pg_dump(dir: &Path, _exit_code: i32) -> PathBuf {
    dir.join("fake_pg_dump_unsupported")
}
