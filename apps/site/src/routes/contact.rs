use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::contact::ContactForm;
use crate::render::home_page;
use crate::routes::submission_timestamp;
use crate::state::AppState;

const CONTACT_THANKS: &str = "Thanks! We received your enquiry.";

/// POST /contact
///
/// Incomplete forms bounce back to the home page. A log that stays locked is
/// reported in the server log only; the visitor is still thanked.
pub async fn handle_contact(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    let Some(submission) = form.validate() else {
        return Ok(Redirect::to("/").into_response());
    };

    let row = submission.to_row(&submission_timestamp(Utc::now()));
    if state.contacts.append_async(row).await? {
        info!("Logged contact enquiry from {}", submission.email);
    } else {
        error!(
            "Contact enquiry from {} was not logged: {} stayed locked",
            submission.email,
            state.contacts.path().display()
        );
    }

    Ok(Html(home_page(&state.config.brand, Some(CONTACT_THANKS))).into_response())
}
