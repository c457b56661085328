use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::{
        application_dto::{
            ApplicationDetailsResponse, ApplyPayload, ApplyResponse, CheckAppliedResponse,
            ResumeUploadResponse,
        },
        vacancy_dto::{VacancyFeedItem, VacancyResponse},
    },
    error::{Error, Result},
    models::account::Caller,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/candidate/feed",
    responses(
        (status = 200, description = "Open vacancies the caller has not applied to", body = Vec<VacancyFeedItem>)
    )
)]
#[axum::debug_handler]
pub async fn feed(State(state): State<AppState>, caller: Caller) -> Result<impl IntoResponse> {
    let items = state.vacancy_service.feed(&caller).await?;
    let body: Vec<VacancyFeedItem> = items.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/candidate/view/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy found", body = VacancyResponse),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn view_vacancy(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.get_by_id(id).await?;
    Ok(Json(VacancyResponse::from(vacancy)))
}

#[utoipa::path(
    get,
    path = "/api/candidate/check-applied/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Whether the caller already applied", body = CheckAppliedResponse)
    )
)]
#[axum::debug_handler]
pub async fn check_applied(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let applied = state.application_service.check_applied(&caller, id).await?;
    Ok(Json(CheckAppliedResponse { applied }))
}

#[utoipa::path(
    post,
    path = "/api/candidate/apply",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = ApplyResponse),
        (status = 403, description = "Caller is not a candidate"),
        (status = 404, description = "Vacancy not found"),
        (status = 409, description = "Duplicate application, closed vacancy or no slots remaining")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    let entry = state.application_service.apply(&caller, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            msg: "Applied successfully".to_string(),
            entry,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/candidate/my-history",
    responses(
        (status = 200, description = "The caller's applications, newest first", body = Vec<ApplicationDetailsResponse>)
    )
)]
#[axum::debug_handler]
pub async fn my_history(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse> {
    let views = state.application_service.history(&caller).await?;
    let body: Vec<ApplicationDetailsResponse> = views.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/candidate/applied/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "One of the caller's applications", body = ApplicationDetailsResponse),
        (status = 403, description = "Application belongs to someone else"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn applied_details(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state
        .application_service
        .applied_details(&caller, id)
        .await?;
    Ok(Json(ApplicationDetailsResponse::from(view)))
}

#[utoipa::path(
    post,
    path = "/api/candidate/resume",
    responses(
        (status = 201, description = "Resume stored; multipart field `resume` carries the file", body = ResumeUploadResponse),
        (status = 400, description = "Missing or empty file")
    )
)]
#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("resume") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        let path = state.resume_store.save(&caller, &filename, &data).await?;
        return Ok((StatusCode::CREATED, Json(ResumeUploadResponse { path })));
    }

    Err(Error::BadRequest("Missing 'resume' file field".into()))
}
