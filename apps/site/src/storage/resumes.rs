use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::info;

use crate::storage::StorageError;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];
const FALLBACK_NAME: &str = "resume.pdf";

/// True when `filename` has an extension on the upload allow-list.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduces a client-supplied filename to something safe to join onto a
/// directory: ASCII only, no path separators, words joined by `_`, and only
/// `[A-Za-z0-9_.-]` kept. Can return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// `<YYYYmmdd-HHMMSS>_<sanitized name>`, the name a resume is stored under.
pub fn stamped_name(original: &str, now: DateTime<Utc>) -> String {
    let safe = secure_filename(original);
    let safe = if safe.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        safe
    };
    format!("{}_{}", now.format("%Y%m%d-%H%M%S"), safe)
}

/// Directory of uploaded resumes, referenced by name from the application log.
#[derive(Debug, Clone)]
pub struct ResumeStore {
    dir: PathBuf,
}

impl ResumeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `bytes` under a stamped name and returns that name.
    pub async fn save(
        &self,
        original_name: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let name = stamped_name(original_name, now);
        let path = self.dir.join(&name);
        fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Stored resume {} ({} bytes)", name, bytes.len());
        Ok(name)
    }
}
