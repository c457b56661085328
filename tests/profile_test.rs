mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use staffup_backend::models::account::Caller;

async fn upload_resume(app: &axum::Router, caller: &Caller, data: &[u8]) -> String {
    let (status, body) = send_multipart(
        app,
        "POST",
        "/api/candidate/resume",
        caller,
        multipart_body(&[], Some(("cv.pdf", data))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["path"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn candidate_profile_lifecycle_replaces_the_old_resume() {
    let app = app(state());
    let applicant = candidate();
    let first_cv = upload_resume(&app, &applicant, b"first resume").await;

    let (status, _) = send(&app, "GET", "/api/auth/profile", Some(&applicant), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&applicant),
        Some(json!({
            "name": "Dana Rivers",
            "email": "Dana@Example.com",
            "experience": "3 years of Go",
            "company": "ignored for candidates",
            "cv_path": first_cv
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user"]["email"], "dana@example.com");
    assert_eq!(created["user"]["role"], "candidate");
    assert!(created["user"]["meta"]["company"].is_null());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&applicant),
        Some(json!({ "name": "Again", "email": "again@example.com", "cv_path": first_cv })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send_multipart(
        &app,
        "PUT",
        "/api/auth/profile",
        &applicant,
        multipart_body(
            &[("name", "Dana R."), ("experience", "4 years of Rust")],
            Some(("new-cv.PDF", &b"second resume"[..])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["user"]["name"], "Dana R.");
    assert_eq!(updated["user"]["meta"]["experience"], "4 years of Rust");
    let new_cv = updated["user"]["cv_path"].as_str().unwrap().to_string();
    assert_ne!(new_cv, first_cv);
    assert!(new_cv.ends_with(".pdf"));

    let (status, _) = fetch_raw(&app, &first_cv).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, served) = fetch_raw(&app, &new_cv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, b"second resume".to_vec());

    let (status, profile) = send(&app, "GET", "/api/auth/profile", Some(&applicant), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["cv_path"], new_cv.as_str());
}

#[tokio::test]
async fn candidate_registration_needs_a_resume_and_unique_email() {
    let app = app(state());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&candidate()),
        Some(json!({ "name": "No CV", "email": "nocv@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&recruiter()),
        Some(json!({ "name": "Rae", "email": "shared@example.com", "company": "Acme" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&recruiter()),
        Some(json!({ "name": "Sam", "email": "SHARED@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn recruiter_profile_update_only_touches_recruiter_fields() {
    let app = app(state());
    let owner = recruiter();
    send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&owner),
        Some(json!({ "name": "Rae", "email": "rae@example.com", "company": "Acme" })),
    )
    .await;

    let (status, updated) = send_multipart(
        &app,
        "PUT",
        "/api/auth/profile",
        &owner,
        multipart_body(
            &[("company", "Globex"), ("experience", "not for recruiters")],
            Some(("cv.pdf", &b"ignored"[..])),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["user"]["meta"]["company"], "Globex");
    assert!(updated["user"]["meta"]["experience"].is_null());
    assert!(updated["user"]["cv_path"].is_null());
}

#[tokio::test]
async fn recruiter_application_details_include_the_applicant() {
    let app = app(state());
    let owner = recruiter();
    let applicant = candidate();
    let cv = upload_resume(&app, &applicant, b"resume").await;
    send(
        &app,
        "POST",
        "/api/auth/profile",
        Some(&applicant),
        Some(json!({
            "name": "Lee",
            "email": "lee@example.com",
            "experience": "2 years",
            "cv_path": cv
        })),
    )
    .await;

    let (_, vacancy) = send(
        &app,
        "POST",
        "/api/recruit/create",
        Some(&owner),
        Some(json!({
            "title": "QA Engineer",
            "dept": "Quality",
            "location": "Remote",
            "salary": 50000,
            "description": "Break things",
            "requirements": "Curiosity"
        })),
    )
    .await;
    let (status, applied) = send(
        &app,
        "POST",
        "/api/candidate/apply",
        Some(&applicant),
        Some(json!({ "vacancy_id": vacancy["id"], "resume_path": cv })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let application_id = applied["entry"]["id"].as_str().unwrap();

    let (status, details) = send(
        &app,
        "GET",
        &format!("/api/recruit/details/{}", application_id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["applicant"]["name"], "Lee");
    assert_eq!(details["applicant"]["email"], "lee@example.com");
    assert_eq!(details["applicant"]["meta"]["experience"], "2 years");
    assert_eq!(details["applicant"]["cv_path"], cv.as_str());

    // Candidates see their own application without the applicant block.
    let (status, own) = send(
        &app,
        "GET",
        &format!("/api/candidate/applied/{}", application_id),
        Some(&applicant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(own.get("applicant").is_none());
}
