//! libdumpkeeper – scheduled `pg_dump` backups with a per-run log and a
//! retention sweep.
//!
//! The binary (`cli-bin`) should only need what is re-exported here plus
//! the public modules; everything runs synchronously on the caller's
//! thread.

pub mod artifacts; // naming + listing of dump/log files
pub mod backup;    // BackupRunner, RunOutcome
pub mod config;
pub mod dump;      // scoped-env child process
pub mod error;
pub mod logging;   // expose the logging init helper
pub mod retention;
pub mod run_id;
pub mod run_log;
pub mod utils;

pub use backup::{BackupRunner, RunOutcome};
pub use config::Config;
pub use retention::{RetentionPolicy, SweepReport};
pub use run_id::RunId;

#[cfg(test)]
mod test_utils;
