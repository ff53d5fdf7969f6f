use std::sync::Arc;

use crate::config::Config;
use crate::models::application::APPLICATION_HEADER;
use crate::models::contact::CONTACT_HEADER;
use crate::storage::{CsvLog, ResumeStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; everything mutable lives on disk.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub contacts: CsvLog,
    pub applications: CsvLog,
    pub resumes: ResumeStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            contacts: CsvLog::new(config.contacts_log_path(), CONTACT_HEADER)
                .with_retry(config.log_retry),
            applications: CsvLog::new(config.applications_log_path(), APPLICATION_HEADER)
                .with_retry(config.log_retry),
            resumes: ResumeStore::new(config.resumes_dir()),
            config: Arc::new(config),
        }
    }
}
