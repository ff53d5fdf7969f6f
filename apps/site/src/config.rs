use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::models::job::{default_jobs, JobPosting};
use crate::storage::RetryPolicy;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Site configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Base storage directory. Logs and resumes live under `<data_dir>/uploads`.
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub brand: String,
    pub max_upload_bytes: usize,
    /// Send no-cache headers on every response (development).
    pub dev_no_cache: bool,
    pub jobs: Vec<JobPosting>,
    /// How long a locked submission log is waited on before giving up.
    pub log_retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jobs = match lookup("JOBS_FILE") {
            Some(path) => load_jobs(Path::new(&path))?,
            None => default_jobs(),
        };

        let defaults = RetryPolicy::default();
        let log_retry = RetryPolicy {
            attempts: parse_or(&lookup, "LOG_RETRY_ATTEMPTS", defaults.attempts)?,
            delay: Duration::from_millis(parse_or(
                &lookup,
                "LOG_RETRY_DELAY_MS",
                defaults.delay.as_millis() as u64,
            )?),
        };
        if log_retry.attempts == 0 {
            bail!("LOG_RETRY_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("instance").join("data")),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            brand: lookup("BRAND").unwrap_or_else(|| "VAGR TECHNOLOGY".to_string()),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            dev_no_cache: match lookup("DEV_NO_CACHE") {
                Some(raw) => parse_bool(&raw).context("DEV_NO_CACHE must be true or false")?,
                None => true,
            },
            jobs,
            log_retry,
        })
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.uploads_dir().join("resumes")
    }

    pub fn contacts_log_path(&self) -> PathBuf {
        self.uploads_dir().join("contacts.csv")
    }

    pub fn applications_log_path(&self) -> PathBuf {
        self.uploads_dir().join("application.csv")
    }

    /// Upload limit as shown to visitors, e.g. `5 MB`.
    pub fn upload_limit_label(&self) -> String {
        const MB: usize = 1024 * 1024;
        if self.max_upload_bytes >= MB {
            format!("{} MB", self.max_upload_bytes / MB)
        } else {
            format!("{} KB", self.max_upload_bytes.div_ceil(1024))
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("'{other}' is not a boolean"),
    }
}

fn load_jobs(path: &Path) -> Result<Vec<JobPosting>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JOBS_FILE {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("JOBS_FILE {} is not a valid job listing", path.display()))
}
