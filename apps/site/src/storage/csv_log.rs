//! Append-only CSV logs on local disk.
//!
//! Every append opens the file, takes an exclusive lock, writes the header if
//! the file is still empty, writes the row and closes the file again. Writers
//! in this process take turns per path before touching the file lock, so a
//! lock conflict always means another process holds the file. That case is
//! retried on a fixed schedule; any other I/O failure is returned straight
//! away.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::storage::StorageError;

const DEFAULT_ATTEMPTS: u32 = 6;
const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Returned on Windows when another process opened the file without sharing.
#[cfg(windows)]
const ERROR_SHARING_VIOLATION: i32 = 32;

/// How often, and how patiently, a locked log file is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

enum AttemptError {
    Locked(io::Error),
    Io(io::Error),
}

impl From<io::Error> for AttemptError {
    fn from(err: io::Error) -> Self {
        if is_lock_conflict(&err) {
            AttemptError::Locked(err)
        } else {
            AttemptError::Io(err)
        }
    }
}

impl From<csv::Error> for AttemptError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(err) => err.into(),
            kind => AttemptError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("CSV encoding failed: {kind:?}"),
            )),
        }
    }
}

/// True when `err` is the platform's signal that another holder has the file
/// exclusively locked.
pub fn is_lock_conflict(err: &io::Error) -> bool {
    let Some(code) = err.raw_os_error() else {
        return false;
    };
    if Some(code) == fs2::lock_contended_error().raw_os_error() {
        return true;
    }
    #[cfg(windows)]
    if code == ERROR_SHARING_VIOLATION {
        return true;
    }
    false
}

/// Per-path turn for writers in this process. `flock` locks taken through
/// separate handles conflict even inside one process, so without this two
/// concurrent requests would burn each other's retry budget.
fn writer_turn(path: &Path) -> Arc<Mutex<()>> {
    static TURNS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let key = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    TURNS
        .get_or_init(Default::default)
        .lock()
        .entry(key)
        .or_default()
        .clone()
}

/// A log file bound to its fixed header row.
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
    header: Vec<String>,
    retry: RetryPolicy,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>, header: &[&str]) -> Self {
        Self {
            path: path.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append<R: AsRef<str>>(&self, row: &[R]) -> Result<bool, StorageError> {
        append_row_with(&self.path, &self.header, row, self.retry)
    }

    /// Runs [`CsvLog::append`] on the blocking pool so the retry sleeps never
    /// stall the async runtime.
    pub async fn append_async(&self, row: Vec<String>) -> Result<bool, StorageError> {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.append(&row)).await?
    }
}

/// Appends `row` to the CSV file at `path`, writing `header` first when the
/// file is new. Uses the default retry policy.
///
/// Returns `Ok(false)` if the file stayed locked for the whole retry budget.
pub fn append_row<H, R>(
    path: impl AsRef<Path>,
    header: &[H],
    row: &[R],
) -> Result<bool, StorageError>
where
    H: AsRef<str>,
    R: AsRef<str>,
{
    append_row_with(path.as_ref(), header, row, RetryPolicy::default())
}

pub fn append_row_with<H, R>(
    path: &Path,
    header: &[H],
    row: &[R],
    retry: RetryPolicy,
) -> Result<bool, StorageError>
where
    H: AsRef<str>,
    R: AsRef<str>,
{
    let turn = writer_turn(path);
    for attempt in 1..=retry.attempts {
        let outcome = {
            let _turn = turn.lock();
            try_append(path, header, row)
        };
        match outcome {
            Ok(()) => {
                debug!("Appended row to {} (attempt {})", path.display(), attempt);
                return Ok(true);
            }
            Err(AttemptError::Locked(err)) => {
                if attempt < retry.attempts {
                    warn!(
                        "{} is locked ({}), attempt {} of {}, retrying after {}ms...",
                        path.display(),
                        err,
                        attempt,
                        retry.attempts,
                        retry.delay.as_millis()
                    );
                    thread::sleep(retry.delay);
                }
            }
            Err(AttemptError::Io(source)) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    error!(
        "Gave up appending to {} after {} attempts: file stayed locked",
        path.display(),
        retry.attempts
    );
    Ok(false)
}

fn try_append<H, R>(path: &Path, header: &[H], row: &[R]) -> Result<(), AttemptError>
where
    H: AsRef<str>,
    R: AsRef<str>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.try_lock_exclusive()?;

    // Closing the handle releases the lock.
    write_locked(&file, header, row)
}

fn write_locked<H, R>(file: &File, header: &[H], row: &[R]) -> Result<(), AttemptError>
where
    H: AsRef<str>,
    R: AsRef<str>,
{
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
    if needs_header && !header.is_empty() {
        writer.write_record(header.iter().map(|h| h.as_ref()))?;
    }
    writer.write_record(row.iter().map(|f| f.as_ref()))?;
    writer.flush()?;
    drop(writer);

    file.sync_data()?;
    Ok(())
}
