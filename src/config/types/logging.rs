use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DEFAULT_LOG_BASENAME, DEFAULT_LOG_ROTATE_KEEP, DEFAULT_LOG_ROTATE_SIZE};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file or directory. A path without an extension is a directory;
    /// a leading `~/` is the home directory.
    pub path: Option<String>,
    pub rotate_size: u64,
    pub rotate_keep: usize,
}

/// Where the rotating log files go: `{directory}/{basename}.log` plus the
/// numbered rotations next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub directory: PathBuf,
    pub basename: String,
}

impl LoggingConfig {
    /// Resolves the configured path against the default `logs_dir`.
    pub fn target(&self, logs_dir: &Path) -> LogTarget {
        let Some(path) = self.path.as_deref().map(expand_home) else {
            return LogTarget {
                directory: logs_dir.to_path_buf(),
                basename: DEFAULT_LOG_BASENAME.to_string(),
            };
        };
        if path.extension().is_none() {
            return LogTarget {
                directory: path,
                basename: DEFAULT_LOG_BASENAME.to_string(),
            };
        }
        let basename = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(DEFAULT_LOG_BASENAME)
            .to_string();
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => logs_dir.to_path_buf(),
        };
        LogTarget {
            directory,
            basename,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
            rotate_size: DEFAULT_LOG_ROTATE_SIZE,
            rotate_keep: DEFAULT_LOG_ROTATE_KEEP,
        }
    }
}
