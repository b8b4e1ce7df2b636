//! Board Logger
//!
//! A `tracing` subscriber that writes to a log file rolled once per day and
//! keeps the most recent lines in a circular buffer, so a client can show
//! them without reading the file back. `log` records are bridged into
//! `tracing` by the subscriber, so library code can keep using `log` macros.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use chrono::{Local, NaiveDate};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::MakeWriter;

/// Number of lines kept in memory by default
pub const DEFAULT_CAPACITY: usize = 500;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("failed to create log dir {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
    #[error("logger already initialized")]
    AlreadyInitialized,
}

struct Inner {
    dir: PathBuf,
    app_name: String,
    current: Option<(NaiveDate, File)>,
    recent: VecDeque<String>,
    capacity: usize,
    partial: String,
}

impl Inner {
    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}.{}.log", self.app_name, date.format("%Y-%m-%d")))
    }

    fn file_for(&mut self, date: NaiveDate) -> io::Result<&mut File> {
        let stale = !matches!(&self.current, Some((d, _)) if *d == date);
        if stale {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(date))?;
            self.current = Some((date, file));
        }
        match self.current.as_mut() {
            Some((_, file)) => Ok(file),
            None => Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        }
    }

    fn write_at(&mut self, buf: &[u8], date: NaiveDate) -> io::Result<()> {
        self.file_for(date)?.write_all(buf)?;

        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            self.push_recent(line.trim_end().to_string());
        }
        Ok(())
    }

    fn push_recent(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        while self.recent.len() >= self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(line);
    }
}

/// File writer rolled by local date, with an in-memory ring of recent lines
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<Inner>>,
}

impl RollingWriter {
    pub fn new(
        log_dir: impl AsRef<Path>,
        app_name: &str,
        capacity: usize,
    ) -> Result<Self, LoggerError> {
        let dir = log_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| LoggerError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                dir,
                app_name: app_name.to_string(),
                current: None,
                recent: VecDeque::with_capacity(capacity),
                capacity,
                partial: String::new(),
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Path of the log file used for `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.lock().path_for(date)
    }

    /// Most recent complete lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        self.lock().recent.iter().cloned().collect()
    }

    /// Write as if the local date were `date`
    pub fn write_at(&self, buf: &[u8], date: NaiveDate) -> io::Result<()> {
        self.lock().write_at(buf, date)
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_at(buf, Local::now().date_naive())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock().current.as_mut() {
            Some((_, file)) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber.
///
/// Lines go to `{log_dir}/{app_name}.{YYYY-MM-DD}.log` and to stderr.
/// `level` is one of `trace`, `debug`, `info`, `warn`, `error`, `off`.
pub fn init_logger(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    level: &str,
) -> Result<(), LoggerError> {
    let level: LevelFilter = level
        .parse()
        .map_err(|_| LoggerError::InvalidLevel(level.to_string()))?;

    let writer = RollingWriter::new(log_dir, app_name, DEFAULT_CAPACITY)?;
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(level)
        .with_writer(writer.clone().and(io::stderr))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    // only a writer that is actually installed backs `recent_lines`
    LOGGER
        .set(writer)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Recent lines of the global logger; empty before `init_logger`
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingWriter::recent).unwrap_or_default()
}

pub fn info(msg: &str) {
    tracing::info!("{}", msg);
}

pub fn error(msg: &str) {
    tracing::error!("{}", msg);
}
