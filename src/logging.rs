//! Logging setup
//!
//! CLI commands log to stderr. The daemon logs to stderr in the foreground and
//! otherwise to a size-rotated file in the XDG state directory.

use color_eyre::eyre::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::config::Config;

/// Daemon log file name
pub const LOG_FILE_NAME: &str = "daemon.log";

/// Rotate once the daemon log reaches this size
pub const MAX_LOG_BYTES: u64 = 1_000_000;

/// Log writer that keeps one current file and one `.old` backup.
///
/// The current file is rotated once it reaches `max_bytes`. If the file is
/// removed from under the daemon it is re-created on the next write. Files are
/// created with 0o600 permissions on Unix.
pub struct RotatingFileAppender {
    path: PathBuf,
    backup_path: PathBuf,
    max_bytes: u64,
    /// Open file and the number of bytes it holds
    current: Mutex<Option<(File, u64)>>,
}

impl RotatingFileAppender {
    pub fn new(dir: impl AsRef<Path>, filename: &str, max_bytes: u64) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(filename),
            backup_path: dir.join(format!("{filename}.old")),
            max_bytes,
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path, truncate: bool) -> io::Result<(File, u64)> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        #[cfg(unix)]
        options.mode(0o600);

        let file = options.open(path)?;
        let len = file.metadata()?.len();
        Ok((file, len))
    }

    fn rotate(&self) -> io::Result<(File, u64)> {
        if self.path.exists() {
            fs::rename(&self.path, &self.backup_path)?;
        }
        Self::open(&self.path, true)
    }
}

impl Write for RotatingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| io::Error::other(format!("Log mutex poisoned: {e}")))?;

        if !self.path.exists() {
            *current = None;
        }

        let needs_rotation = matches!(*current, Some((_, len)) if len >= self.max_bytes);
        if needs_rotation {
            *current = None;
            match self.rotate() {
                Ok(opened) => *current = Some(opened),
                Err(e) => eprintln!("Failed to rotate log file: {e}"),
            }
        }

        let (file, len) = match current.take() {
            Some(opened) => opened,
            None => Self::open(&self.path, false)?,
        };
        let (file, len) = current.insert((file, len));

        file.write_all(buf)?;
        *len += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| io::Error::other(format!("Log mutex poisoned: {e}")))?;

        if let Some((file, _)) = current.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Logging for one-shot CLI commands: stderr, `RUST_LOG` or `warn`
pub fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

/// Filter for the daemon: `RUST_LOG` wins, otherwise `prisw=<log_level>`
#[must_use]
pub fn daemon_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prisw={}", config.settings.log_level)))
}

/// Logging for the daemon
///
/// The returned guard must be kept alive for the lifetime of the daemon so
/// buffered file logs are flushed on exit.
///
/// # Errors
/// Returns an error if the log directory cannot be determined.
pub fn init_daemon_logging(config: &Config, foreground: bool) -> Result<Option<WorkerGuard>> {
    let filter = daemon_filter(config);

    if foreground {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(filter)
            .init();
        return Ok(None);
    }

    let log_dir = Config::get_log_dir()?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log dir: {log_dir:?}"))?;

    let appender = RotatingFileAppender::new(&log_dir, LOG_FILE_NAME, MAX_LOG_BYTES);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    eprintln!("Logging to {}", log_dir.join(LOG_FILE_NAME).display());
    Ok(Some(guard))
}
