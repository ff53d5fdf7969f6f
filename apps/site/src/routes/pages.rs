use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::render::{careers_page, home_page};
use crate::state::AppState;

/// GET /
pub async fn handle_home(State(state): State<AppState>) -> Html<String> {
    Html(home_page(&state.config.brand, None))
}

/// GET /careers
pub async fn handle_careers(State(state): State<AppState>) -> Html<String> {
    Html(careers_page(&state.config.brand, &state.config.jobs, None))
}

/// Careers page carrying a status message, shared by the apply flow.
pub fn careers_with_message(state: &AppState, status: StatusCode, message: &str) -> Response {
    let html = careers_page(&state.config.brand, &state.config.jobs, Some(message));
    (status, Html(html)).into_response()
}
