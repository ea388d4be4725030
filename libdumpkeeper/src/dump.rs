//! One launch of the external dump utility.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use crate::config::Config;

pub const ENV_PASSWORD: &str = "PGPASSWORD";
pub const ENV_CONNECT_TIMEOUT: &str = "PGCONNECT_TIMEOUT";

/// Program, arguments and a private environment for a single child.
///
/// The environment map is applied to the child only; the parent's own
/// environment is never read from or written to here.
#[derive(Clone)]
pub struct DumpInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    /// Positions in `args` hidden from `Debug`.
    secret_args: BTreeSet<usize>,
    env: BTreeMap<String, String>,
}

impl DumpInvocation {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_args: BTreeSet::new(),
            env: BTreeMap::new(),
        }
    }

    /// `pg_dump -h H -p P -U U -d DB -w -F c -f OUT [extra...]`, or
    /// `pg_dump -d URI -w ...` when a connection URI is configured.
    pub fn for_config(cfg: &Config, output: &Path) -> Self {
        let mut inv = Self::new(&cfg.pg_dump);
        match &cfg.database_url {
            Some(url) => {
                inv.arg("-d").secret_arg(url.expose());
            }
            None => {
                inv.arg("-h")
                    .arg(&cfg.target.host)
                    .arg("-p")
                    .arg(cfg.target.port.to_string())
                    .arg("-U")
                    .arg(&cfg.target.username)
                    .arg("-d")
                    .arg(&cfg.target.dbname);
            }
        }
        inv.arg("-w") // never prompt; the secret comes from the env
            .arg("-F")
            .arg("c")
            .arg("-f")
            .arg(output.as_os_str());
        for extra in &cfg.extra_args {
            inv.arg(extra);
        }

        inv.env(ENV_CONNECT_TIMEOUT, cfg.connect_timeout_secs.to_string());
        if let Some(secret) = &cfg.password {
            inv.env(ENV_PASSWORD, secret.expose());
        }
        inv
    }

    pub fn arg<S: Into<OsString>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// An argument that must not show up in `Debug` output.
    pub fn secret_arg<S: Into<OsString>>(&mut self, arg: S) -> &mut Self {
        self.secret_args.insert(self.args.len());
        self.arg(arg)
    }

    pub fn env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn env_keys(&self) -> impl Iterator<Item = &str> {
        self.env.keys().map(String::as_str)
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(&self.env).stdin(Stdio::null());
        cmd
    }

    /// Run to completion with stdout and stderr both written to `sink`.
    ///
    /// Only a failure to launch is an `Err`; a non-zero exit is reported
    /// through the returned status.
    pub fn run_into(&self, sink: &File) -> Result<ExitStatus> {
        let stdout = sink.try_clone().context("Failed to attach stdout to run log")?;
        let stderr = sink.try_clone().context("Failed to attach stderr to run log")?;

        debug!(invocation = ?self, "spawning dump utility");
        let status = self
            .to_command()
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .with_context(|| format!("Failed to launch {}", self.program.display()))?;
        Ok(status)
    }
}

impl fmt::Debug for DumpInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env: BTreeMap<&str, &str> = self
            .env
            .iter()
            .map(|(k, v)| {
                let shown = if k == ENV_PASSWORD { "***" } else { v.as_str() };
                (k.as_str(), shown)
            })
            .collect();
        let args: Vec<&OsStr> = self
            .args
            .iter()
            .enumerate()
            .map(|(i, a)| {
                if self.secret_args.contains(&i) {
                    OsStr::new("***")
                } else {
                    a.as_os_str()
                }
            })
            .collect();
        f.debug_struct("DumpInvocation")
            .field("program", &self.program)
            .field("args", &args)
            .field("env", &env)
            .finish()
    }
}
