pub mod apply;
pub mod contact;
pub mod health;
pub mod pages;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

use crate::state::AppState;

/// Timestamp recorded in the first column of every submission log.
pub fn submission_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let no_cache = state.config.dev_no_cache;
    let static_files = ServeDir::new(&state.config.static_dir);

    let router = Router::new()
        .route("/", get(pages::handle_home))
        .route("/careers", get(pages::handle_careers))
        .route("/contact", post(contact::handle_contact))
        .route("/apply", post(apply::handle_apply))
        .route("/health", get(health::health_handler))
        .route("/__paths", get(health::paths_handler))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if !no_cache {
        return router;
    }

    router
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderMap, Request, StatusCode},
    };
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::Config;

    const BOUNDARY: &str = "site-test-boundary";

    fn test_state(extra: &[(&str, &str)]) -> (TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(static_dir.join("css")).unwrap();
        std::fs::write(static_dir.join("css").join("site.css"), "body { margin: 0; }").unwrap();

        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert(
            "DATA_DIR".into(),
            dir.path().join("data").display().to_string(),
        );
        vars.insert("STATIC_DIR".into(), static_dir.display().to_string());
        vars.insert("BRAND".into(), "ACME LABS".into());
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        (dir, AppState::new(config))
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/apply")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const APPLICANT: &[(&str, &str)] = &[
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("role", "Backend Engineer"),
        ("note", "Available in May"),
    ];

    fn csv_records(path: &Path) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .unwrap()
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    fn stored_resumes(state: &AppState) -> Vec<String> {
        match std::fs::read_dir(state.resumes.dir()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[test]
    fn test_submission_timestamp_is_utc_with_micros() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(submission_timestamp(now), "2024-01-01T00:00:00.000000Z");
    }

    #[tokio::test]
    async fn test_home_page() {
        let (_dir, state) = test_state(&[]);
        let (status, headers, body) = send(&state, get_request("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("ACME LABS"));
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "no-store, no-cache, must-revalidate, max-age=0"
        );
        assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
        assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
    }

    #[tokio::test]
    async fn test_cache_headers_can_be_disabled() {
        let (_dir, state) = test_state(&[("DEV_NO_CACHE", "false")]);
        let (_, headers, _) = send(&state, get_request("/")).await;
        assert!(headers.get(header::PRAGMA).is_none());
    }

    #[tokio::test]
    async fn test_careers_page_lists_configured_jobs() {
        let (_dir, state) = test_state(&[]);
        let (status, _, body) = send(&state, get_request("/careers")).await;

        assert_eq!(status, StatusCode::OK);
        for job in &state.config.jobs {
            assert!(body.contains(&job.title));
        }
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let (_dir, state) = test_state(&[]);
        let (status, headers, body) = send(&state, get_request("/static/css/site.css")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body { margin: 0; }");
        assert!(headers.get(header::CACHE_CONTROL).is_some());
    }

    #[tokio::test]
    async fn test_health_and_paths() {
        let (_dir, state) = test_state(&[]);

        let (status, _, body) = send(&state, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let health: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(health["status"], "ok");

        let (_, _, body) = send(&state, get_request("/__paths")).await;
        let paths: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            paths["instance"],
            state.config.data_dir.display().to_string()
        );
    }

    #[tokio::test]
    async fn test_contact_is_logged() {
        let (_dir, state) = test_state(&[]);
        let request = form_request(
            "/contact",
            "name=+Alice+&email=a%40x.com&message=Hello%2C+there",
        );
        let (status, _, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Thanks! We received your enquiry."));

        let records = csv_records(state.contacts.path());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], vec!["timestamp", "name", "email", "message"]);
        assert_eq!(&records[1][1..], &["Alice", "a@x.com", "Hello, there"]);
    }

    #[tokio::test]
    async fn test_second_contact_appends_without_header() {
        let (_dir, state) = test_state(&[]);
        for name in ["Alice", "Bob"] {
            let body = format!("name={name}&email=x%40y.z&message=hi");
            send(&state, form_request("/contact", &body)).await;
        }

        let records = csv_records(state.contacts.path());
        assert_eq!(records.len(), 3);
        assert_eq!(records[1][1], "Alice");
        assert_eq!(records[2][1], "Bob");
    }

    #[tokio::test]
    async fn test_incomplete_contact_redirects_home() {
        let (_dir, state) = test_state(&[]);
        let (status, headers, _) =
            send(&state, form_request("/contact", "name=Alice&email=&message=hi")).await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/");
        assert!(!state.contacts.path().exists());
    }

    #[tokio::test]
    async fn test_application_stores_resume_and_logs_it() {
        let (_dir, state) = test_state(&[]);
        let request = multipart_request(
            APPLICANT,
            Some(("Jane Doe.pdf", "application/pdf", &b"%PDF-1.4 resume"[..])),
        );
        let (status, _, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Application submitted with resume. Thank you!"));

        let resumes = stored_resumes(&state);
        assert_eq!(resumes.len(), 1);
        assert!(resumes[0].ends_with("_Jane_Doe.pdf"));
        let saved = std::fs::read(state.resumes.dir().join(&resumes[0])).unwrap();
        assert_eq!(saved, b"%PDF-1.4 resume");

        let records = csv_records(state.applications.path());
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            vec!["timestamp", "name", "email", "role", "note", "resume_file"]
        );
        assert_eq!(
            &records[1][1..],
            &[
                "Jane Doe",
                "jane@example.com",
                "Backend Engineer",
                "Available in May",
                resumes[0].as_str(),
            ]
        );
    }

    #[tokio::test]
    async fn test_application_without_resume() {
        let (_dir, state) = test_state(&[]);
        let (status, _, body) = send(&state, multipart_request(APPLICANT, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Please fill all fields and attach a PDF."));
        assert!(!state.applications.path().exists());
    }

    #[tokio::test]
    async fn test_application_with_wrong_extension() {
        let (_dir, state) = test_state(&[]);
        let request = multipart_request(APPLICANT, Some(("cv.docx", "application/pdf", &b"x"[..])));
        let (_, _, body) = send(&state, request).await;

        assert!(body.contains("Invalid file type. PDF only."));
        assert!(stored_resumes(&state).is_empty());
    }

    #[tokio::test]
    async fn test_application_with_wrong_content_type_keeps_nothing() {
        let (_dir, state) = test_state(&[]);
        let request = multipart_request(APPLICANT, Some(("cv.pdf", "text/plain", &b"hello"[..])));
        let (_, _, body) = send(&state, request).await;

        assert!(body.contains("Invalid file content. PDF only."));
        assert!(stored_resumes(&state).is_empty());
        assert!(!state.applications.path().exists());
    }

    #[tokio::test]
    async fn test_application_log_failure_is_a_server_error() {
        let (_dir, state) = test_state(&[]);
        // A directory where the log file should be makes every open fail.
        std::fs::create_dir_all(state.applications.path()).unwrap();

        let request = multipart_request(
            APPLICANT,
            Some(("cv.pdf", "application/pdf", &b"%PDF-1.4"[..])),
        );
        let (status, _, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Something went wrong"));
        let resumes = stored_resumes(&state);
        assert_eq!(resumes.len(), 1);
        assert!(resumes[0].ends_with("_cv.pdf"));
    }

    #[tokio::test]
    async fn test_oversized_application_is_rejected() {
        let (_dir, state) = test_state(&[("MAX_UPLOAD_BYTES", "1024")]);
        let big = vec![b'x'; 4096];
        let request = multipart_request(APPLICANT, Some(("cv.pdf", "application/pdf", big.as_slice())));
        let (status, _, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body.contains("File too large. Max 1 KB."));
        assert!(body.contains("Backend Engineer"));
        assert!(stored_resumes(&state).is_empty());
    }
}
