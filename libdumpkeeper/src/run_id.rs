//! Run identity: the (timestamp, token) pair that names one backup attempt.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Timelike};
use std::fmt;

/// Minute-resolution timestamp format embedded in artifact names.
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Identity of a single run, generated once and threaded through path
/// construction and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId {
    started: DateTime<Local>,
    token: u32,
}

impl RunId {
    /// Identity for the current process, stamped now.
    pub fn current() -> Self {
        Self::new(Local::now(), std::process::id())
    }

    pub fn new(started: DateTime<Local>, token: u32) -> Self {
        Self { started, token }
    }

    /// Full-precision start time (used for the `START` log line).
    pub fn started(&self) -> DateTime<Local> {
        self.started
    }

    pub fn token(&self) -> u32 {
        self.token
    }

    /// `yyyy-MM-dd_HH-mm`
    pub fn stamp(&self) -> String {
        self.started.format(STAMP_FORMAT).to_string()
    }

    /// `<stamp>_<token>`, the suffix shared by a dump and its log.
    pub fn suffix(&self) -> String {
        format!("{}_{}", self.stamp(), self.token)
    }

    /// RFC 3339 start time with the local offset, second precision.
    pub fn started_iso(&self) -> String {
        self.started
            .with_nanosecond(0)
            .unwrap_or(self.started)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix())
    }
}

/// Split a `<stamp>_<token>` suffix back into its parts.
///
/// Returns `None` when either half does not parse.
pub fn parse_suffix(suffix: &str) -> Option<(NaiveDateTime, u32)> {
    let (stamp, token) = suffix.rsplit_once('_')?;
    let token = token.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
    Some((naive, token))
}
