use serde::Deserialize;

pub const CONTACT_HEADER: &[&str] = &["timestamp", "name", "email", "message"];

/// Raw contact form as posted by the home page. Missing fields decode as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Trims every field. `None` if any of them ends up empty.
    pub fn validate(self) -> Option<ContactSubmission> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return None;
        }
        Some(ContactSubmission {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

impl ContactSubmission {
    /// Row for the contact log, in `CONTACT_HEADER` order.
    pub fn to_row(&self, timestamp: &str) -> Vec<String> {
        vec![
            timestamp.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.message.clone(),
        ]
    }
}
