//! Logging setup.
//!
//! Console output always; a plain-text log file when a path is given. The
//! filter defaults to `info` and can be overridden with `RUST_LOG`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log file to write in addition to the console. Truncated on start.
    pub log_file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is not set.
    pub default_level: String,
    /// Colored console output.
    pub ansi: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_file: None,
            default_level: DEFAULT_LOG_LEVEL.to_string(),
            ansi: true,
        }
    }
}

impl LogOptions {
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    pub fn with_default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(options: &LogOptions) -> Result<LoggingGuard, io::Error> {
    let (file_layer, file_guard) = match &options.log_file {
        Some(path) => {
            let (dir, file_name) = prepare_log_file(path)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(options.ansi)
        .with_target(false)
        .with_timer(LocalTime::rfc_3339());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Creates the parent directory and truncates the file.
///
/// Returns the directory and file name for the appender.
fn prepare_log_file(path: &Path) -> Result<(PathBuf, PathBuf), io::Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;

    fs::create_dir_all(&dir)?;
    fs::write(dir.join(&file_name), "")?;
    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_options() {
        let options = LogOptions::default();
        assert!(options.log_file.is_none());
        assert_eq!(options.default_level, "info");
    }

    #[test]
    fn test_prepare_creates_nested_directory_and_clears_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("deep/nested/wayfinder.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "old log data").unwrap();

        let (dir, file_name) = prepare_log_file(&path).unwrap();

        assert_eq!(dir, temp.path().join("deep/nested"));
        assert_eq!(file_name, PathBuf::from("wayfinder.log"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_prepare_rejects_path_without_file_name() {
        assert!(prepare_log_file(Path::new("/")).is_err());
    }

    #[test]
    fn test_guard_structure() {
        use tracing_appender::non_blocking::NonBlocking;

        let (non_blocking, guard) = NonBlocking::new(std::io::sink());
        drop(non_blocking);

        let _logging_guard = LoggingGuard {
            _file_guard: Some(guard),
        };
    }

    // Installing the global subscriber is left to the binary; it can only be
    // set once per process.
}
