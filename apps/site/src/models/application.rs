use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;

use crate::storage::resumes::allowed_file;

pub const APPLICATION_HEADER: &[&str] = &[
    "timestamp",
    "name",
    "email",
    "role",
    "note",
    "resume_file",
];

/// An uploaded resume as received, before anything is written to disk.
#[derive(Debug, Clone)]
pub struct Resume {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Job application collected from the careers multipart form.
#[derive(Debug, Default)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    pub role: String,
    pub note: String,
    pub resume: Option<Resume>,
}

#[derive(Debug, Clone)]
pub struct ApplicationSubmission {
    pub name: String,
    pub email: String,
    pub role: String,
    pub note: String,
    pub resume: Resume,
}

/// Why an application was turned away. Shown to the applicant as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationRejection {
    MissingFields,
    InvalidFileType,
    InvalidFileContent,
}

impl ApplicationRejection {
    pub fn message(&self) -> &'static str {
        match self {
            ApplicationRejection::MissingFields => "Please fill all fields and attach a PDF.",
            ApplicationRejection::InvalidFileType => "Invalid file type. PDF only.",
            ApplicationRejection::InvalidFileContent => "Invalid file content. PDF only.",
        }
    }
}

impl ApplicationForm {
    /// Drains the multipart stream. A file field without a filename counts as
    /// no file, which is what browsers send when nothing was chosen.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = ApplicationForm::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or_default().to_string();
            match field_name.as_str() {
                "name" => form.name = field.text().await?,
                "email" => form.email = field.text().await?,
                "role" => form.role = field.text().await?,
                "note" => form.note = field.text().await?,
                "resume" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if !filename.is_empty() {
                        form.resume = Some(Resume {
                            filename,
                            content_type,
                            bytes,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Trims the text fields and checks the resume. `note` is optional.
    pub fn validate(self) -> Result<ApplicationSubmission, ApplicationRejection> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let role = self.role.trim().to_string();
        let note = self.note.trim().to_string();

        let resume = match self.resume {
            Some(resume) if !name.is_empty() && !email.is_empty() && !role.is_empty() => resume,
            _ => return Err(ApplicationRejection::MissingFields),
        };

        if !allowed_file(&resume.filename) {
            return Err(ApplicationRejection::InvalidFileType);
        }

        let is_pdf = resume
            .content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().ends_with("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(ApplicationRejection::InvalidFileContent);
        }

        Ok(ApplicationSubmission {
            name,
            email,
            role,
            note,
            resume,
        })
    }
}

impl ApplicationSubmission {
    /// Row for the application log, in `APPLICATION_HEADER` order.
    pub fn to_row(&self, timestamp: &str, stored_resume: &str) -> Vec<String> {
        vec![
            timestamp.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.role.clone(),
            self.note.clone(),
            stored_resume.to_string(),
        ]
    }
}
