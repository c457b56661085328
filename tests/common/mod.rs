#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use staffup_backend::{
    config::Config,
    database::MemoryStore,
    dto::{
        application_dto::{ApplicantDetailsPayload, ApplyPayload},
        vacancy_dto::CreateVacancyPayload,
    },
    middleware::auth::Claims,
    models::{
        account::{Caller, Role},
        application::Application,
        vacancy::Vacancy,
    },
    routes, AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "test_secret_key";

pub fn uploads_dir() -> PathBuf {
    std::env::temp_dir().join(format!("staffup-test-{}", Uuid::new_v4()))
}

pub fn state() -> AppState {
    let config = Config::in_memory(SECRET, uploads_dir().to_string_lossy().to_string());
    AppState::new(Arc::new(MemoryStore::new()), &config)
}

pub fn state_with_upload_limit(max_upload_bytes: usize) -> AppState {
    let mut config = Config::in_memory(SECRET, uploads_dir().to_string_lossy().to_string());
    config.max_upload_bytes = max_upload_bytes;
    AppState::new(Arc::new(MemoryStore::new()), &config)
}

pub fn app(state: AppState) -> Router {
    routes::app_router(state)
}

pub fn recruiter() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Recruiter)
}

pub fn candidate() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Candidate)
}

pub fn token_for(caller: &Caller) -> String {
    let claims = Claims {
        sub: caller.id,
        role: caller.role,
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode token")
}

pub fn vacancy_payload(total_slots: Option<i32>) -> CreateVacancyPayload {
    CreateVacancyPayload {
        title: "Backend Engineer".into(),
        dept: "Platform".into(),
        location: "Remote".into(),
        salary: Decimal::from(85_000),
        description: "Own the hiring pipeline services".into(),
        requirements: "Rust, SQL".into(),
        total_slots,
    }
}

pub fn apply_payload(vacancy_id: Uuid) -> ApplyPayload {
    ApplyPayload {
        vacancy_id,
        details: ApplicantDetailsPayload {
            exp: Some("4 years".into()),
            notes: None,
        },
        resume_path: None,
    }
}

pub async fn seed_vacancy(state: &AppState, owner: &Caller, total_slots: i32) -> Vacancy {
    state
        .vacancy_service
        .create(owner, vacancy_payload(Some(total_slots)))
        .await
        .expect("create vacancy")
}

pub async fn seed_application(state: &AppState, vacancy_id: Uuid) -> (Caller, Application) {
    let applicant = candidate();
    let application = state
        .application_service
        .apply(&applicant, apply_payload(vacancy_id))
        .await
        .expect("apply");
    (applicant, application)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<&Caller>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header("authorization", format!("Bearer {}", token_for(caller)));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, body)
}

pub const BOUNDARY: &str = "staffup-test-boundary";

/// Builds a `multipart/form-data` body with text fields and an optional `resume` file.
pub fn multipart_body(fields: &[(&str, &str)], resume: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = resume {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: &Router,
    method: &str,
    uri: &str,
    caller: &Caller,
    body: Vec<u8>,
) -> (StatusCode, JsonValue) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token_for(caller)))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}

pub async fn fetch_raw(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, bytes.to_vec())
}
