//! Misc shared helpers.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Expand a leading `~` (and `~user` where supported) in a path string.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

/// Exit code of a finished child, `-1` when it was killed without one.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Map a failed dump's exit code onto something a process can return.
///
/// Codes in `1..=255` pass through; everything else (negative, zero,
/// out of range) becomes the generic `1`.
pub fn failure_exit_code(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(c) if c != 0 => c,
        _ => 1,
    }
}
