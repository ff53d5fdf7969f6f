use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::application::ApplicationForm;
use crate::routes::pages::careers_with_message;
use crate::routes::submission_timestamp;
use crate::state::AppState;

const APPLICATION_THANKS: &str = "Application submitted with resume. Thank you!";

/// POST /apply
///
/// Validation failures re-render the careers page with a message. The resume
/// is written before the log row, and the row names the stored file.
pub async fn handle_apply(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = match ApplicationForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Rejected oversized application upload: {err}");
            let message = format!("File too large. Max {}.", state.config.upload_limit_label());
            return Ok(careers_with_message(
                &state,
                StatusCode::PAYLOAD_TOO_LARGE,
                &message,
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(rejection) => {
            info!("Application rejected: {:?}", rejection);
            return Ok(careers_with_message(
                &state,
                StatusCode::OK,
                rejection.message(),
            ));
        }
    };

    let now = Utc::now();
    let stored = state
        .resumes
        .save(&submission.resume.filename, &submission.resume.bytes, now)
        .await?;

    let row = submission.to_row(&submission_timestamp(now), &stored);
    let logged = match state.applications.append_async(row).await {
        Ok(logged) => logged,
        Err(err) => {
            error!(
                "Application from {} was not logged; resume kept as {}",
                submission.email, stored
            );
            return Err(err.into());
        }
    };
    if logged {
        info!(
            "Logged application from {} for {}",
            submission.email, submission.role
        );
    } else {
        error!(
            "Application from {} (resume {}) was not logged: {} stayed locked",
            submission.email,
            stored,
            state.applications.path().display()
        );
    }

    Ok(careers_with_message(&state, StatusCode::OK, APPLICATION_THANKS))
}
