//! Adapter configuration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Callback receiving a formatted log line.
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Settings for [`KvStore::open`](crate::KvStore::open).
#[derive(Clone)]
pub struct Config {
    /// Backing database file.
    pub path: PathBuf,
    /// Name of the pre-provisioned root bucket.
    pub bucket_name: String,
    /// Informational hook. No-op when unset.
    pub log_fn: Option<LogFn>,
    /// Error hook. No-op when unset.
    pub err_fn: Option<LogFn>,
}

impl Config {
    pub fn new(path: impl Into<PathBuf>, bucket_name: impl Into<String>) -> Self {
        Config {
            path: path.into(),
            bucket_name: bucket_name.into(),
            log_fn: None,
            err_fn: None,
        }
    }

    pub fn with_log_fn(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.log_fn = Some(Arc::new(f));
        self
    }

    pub fn with_err_fn(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.err_fn = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("bucket_name", &self.bucket_name)
            .field("log_fn", &self.log_fn.is_some())
            .field("err_fn", &self.err_fn.is_some())
            .finish()
    }
}

/// The resolved pair of hooks, defaulting to no-ops.
#[derive(Clone)]
pub(crate) struct Hooks {
    log_fn: LogFn,
    err_fn: LogFn,
}

impl Hooks {
    pub(crate) fn from_config(config: &Config) -> Self {
        let noop: LogFn = Arc::new(|_: &str| {});
        Hooks {
            log_fn: config.log_fn.clone().unwrap_or_else(|| noop.clone()),
            err_fn: config.err_fn.clone().unwrap_or(noop),
        }
    }

    pub(crate) fn noop() -> Self {
        Hooks::from_config(&Config::new("", ""))
    }

    pub(crate) fn info(&self, msg: &str) {
        (self.log_fn)(msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        (self.err_fn)(msg);
    }
}
