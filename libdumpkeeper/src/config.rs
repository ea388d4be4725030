use anyhow::Result;
use directories::ProjectDirs;
use std::{env, fmt, path::PathBuf};

use crate::error::Error;
use crate::retention::RetentionPolicy;
use crate::utils::expand_path;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "golf_stats";
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u32 = 10;
pub const DEFAULT_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_PREFIX: &str = "golf_stats";
pub const DEFAULT_PG_DUMP: &str = "pg_dump";

/// Where and as whom to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbTarget {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub username: String,
}

impl Default for DbTarget {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dbname: DEFAULT_DB_NAME.to_string(),
            username: DEFAULT_DB_USER.to_string(),
        }
    }
}

/// A credential that must never show up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything one backup run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: DbTarget,
    /// libpq connection URI; when set it replaces `target` on the command
    /// line. It may embed a password, so it is kept as a secret too.
    pub database_url: Option<Secret>,
    pub password: Option<Secret>,
    pub connect_timeout_secs: u32,
    pub backup_dir: PathBuf,
    pub retention: RetentionPolicy,
    /// File-name prefix of dump artifacts (`<prefix>_<stamp>_<token>.dump`).
    pub prefix: String,
    pub pg_dump: PathBuf,
    /// Appended verbatim after the built-in `pg_dump` arguments.
    pub extra_args: Vec<String>,
}

impl Config {
    /// Defaults for everything, artifacts under `backup_dir`.
    pub fn with_backup_dir<P: Into<PathBuf>>(backup_dir: P) -> Self {
        Self {
            target: DbTarget::default(),
            database_url: None,
            password: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            backup_dir: backup_dir.into(),
            retention: RetentionPolicy::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            pg_dump: PathBuf::from(DEFAULT_PG_DUMP),
            extra_args: Vec::new(),
        }
    }

    /// Resolve configuration from the process environment.
    ///
    /// Every `DUMPKEEPER_*` variable is optional. The backup directory
    /// is picked in this order:
    /// 1. `DUMPKEEPER_BACKUP_DIR` (explicit override)
    /// 2. XDG data dir (`~/.local/share/dumpkeeper/backups`)
    /// 3. `./backups` when no XDG dir can be located
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backup_dir = match get("DUMPKEEPER_BACKUP_DIR") {
            Some(dir) => expand_path(&dir),
            None => default_backup_dir(),
        };
        let mut cfg = Self::with_backup_dir(backup_dir);

        if let Some(host) = get("DUMPKEEPER_DB_HOST") {
            cfg.target.host = host;
        }
        if let Some(port) = get("DUMPKEEPER_DB_PORT") {
            cfg.target.port = parse_num("DUMPKEEPER_DB_PORT", &port)?;
        }
        if let Some(name) = get("DUMPKEEPER_DB_NAME") {
            cfg.target.dbname = name;
        }
        if let Some(user) = get("DUMPKEEPER_DB_USER") {
            cfg.target.username = user;
        }
        if let Some(url) = get("DUMPKEEPER_DATABASE_URL") {
            cfg.database_url = Some(Secret::new(libpq_uri(&url)?));
        }
        // an empty password is still a password; don't filter it
        cfg.password = lookup("DUMPKEEPER_DB_PASSWORD").map(Secret::new);

        if let Some(secs) = get("DUMPKEEPER_CONNECT_TIMEOUT") {
            cfg.connect_timeout_secs = parse_num("DUMPKEEPER_CONNECT_TIMEOUT", &secs)?;
        }
        if let Some(days) = get("DUMPKEEPER_RETENTION_DAYS") {
            let days = parse_num("DUMPKEEPER_RETENTION_DAYS", &days)?;
            cfg.retention = RetentionPolicy::days(days)?;
        }
        if let Some(prefix) = get("DUMPKEEPER_PREFIX") {
            cfg.prefix = prefix;
        }
        if let Some(program) = get("DUMPKEEPER_PG_DUMP") {
            cfg.pg_dump = expand_path(&program);
        }
        if let Some(raw) = get("DUMPKEEPER_PG_DUMP_ARGS") {
            cfg.extra_args = shlex::split(&raw).ok_or_else(|| {
                anyhow::Error::new(Error::Config(format!(
                    "DUMPKEEPER_PG_DUMP_ARGS has unbalanced quotes: `{raw}`"
                )))
            })?;
        }

        Ok(cfg)
    }
}

fn default_backup_dir() -> PathBuf {
    // If HOME and XDG_DATA_HOME are missing we can't resolve an XDG path
    if env::var_os("HOME").is_some() || env::var_os("XDG_DATA_HOME").is_some() {
        if let Some(dirs) = ProjectDirs::from("io", "Dumpkeeper", "dumpkeeper") {
            return dirs.data_dir().join("backups");
        }
    }
    PathBuf::from("backups")
}

/// Accept `postgres://` and `postgresql://` URIs, dropping a
/// `+driver` suffix from the scheme (`postgresql+psycopg2://...`).
fn libpq_uri(raw: &str) -> Result<String> {
    let bad = || {
        anyhow::Error::new(Error::Config(
            "DUMPKEEPER_DATABASE_URL must be a postgres:// or postgresql:// URI".into(),
        ))
    };
    let (scheme, rest) = raw.trim().split_once("://").ok_or_else(bad)?;
    let base = scheme.split('+').next().unwrap_or(scheme);
    if !matches!(base, "postgres" | "postgresql") {
        return Err(bad());
    }
    Ok(format!("{base}://{rest}"))
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        anyhow::Error::new(Error::Config(format!(
            "{key} must be a non-negative integer, got `{raw}`"
        )))
    })
}
