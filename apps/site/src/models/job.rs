use serde::{Deserialize, Serialize};

/// One opening on the careers page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: String,
}

impl JobPosting {
    fn new(title: &str, location: &str, kind: &str, level: &str) -> Self {
        Self {
            title: title.to_string(),
            location: location.to_string(),
            kind: kind.to_string(),
            level: level.to_string(),
        }
    }
}

/// Listing used when no `JOBS_FILE` is configured.
pub fn default_jobs() -> Vec<JobPosting> {
    vec![
        JobPosting::new("Frontend Engineer", "Madurai / Remote", "Full-time", "Mid-Senior"),
        JobPosting::new("Backend Engineer", "Madurai / Remote", "Full-time", "Senior"),
        JobPosting::new("Database", "Remote", "Full-time", "Mid"),
    ]
}
