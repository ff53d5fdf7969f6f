//! Local-disk persistence: the CSV submission logs and stored resumes.

pub mod csv_log;
pub mod resumes;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use csv_log::{append_row, CsvLog, RetryPolicy};
pub use resumes::ResumeStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Storage task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
