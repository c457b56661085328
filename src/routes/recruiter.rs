use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::{
        application_dto::{
            ApplicationDetailsResponse, PipelineResponse, UpdateStatusPayload,
            UpdateStatusResponse,
        },
        vacancy_dto::{
            CloseVacancyResponse, CreateVacancyPayload, UpdateVacancyPayload, VacancyResponse,
        },
    },
    error::Result,
    models::{account::Caller, application::RecruiterDecision},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/recruit/create",
    request_body = CreateVacancyPayload,
    responses(
        (status = 201, description = "Vacancy created", body = VacancyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a recruiter")
    )
)]
#[axum::debug_handler]
pub async fn create_vacancy(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateVacancyPayload>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(VacancyResponse::from(vacancy))))
}

#[utoipa::path(
    get,
    path = "/api/recruit/posted",
    responses(
        (status = 200, description = "Vacancies posted by the caller", body = Vec<VacancyResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_posted(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse> {
    let items = state.vacancy_service.list_posted(&caller).await?;
    let body: Vec<VacancyResponse> = items.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/recruit/view/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy found", body = VacancyResponse),
        (status = 403, description = "Vacancy belongs to another recruiter"),
        (status = 404, description = "Vacancy not found")
    )
)]
#[axum::debug_handler]
pub async fn view_vacancy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.get_owned(&caller, id).await?;
    Ok(Json(VacancyResponse::from(vacancy)))
}

#[utoipa::path(
    put,
    path = "/api/recruit/update-job/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    request_body = UpdateVacancyPayload,
    responses(
        (status = 200, description = "Vacancy updated", body = VacancyResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Vacancy not found"),
        (status = 409, description = "Vacancy closed or total below filled slots")
    )
)]
#[axum::debug_handler]
pub async fn update_vacancy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVacancyPayload>,
) -> Result<impl IntoResponse> {
    let vacancy = state.vacancy_service.update(&caller, id, payload).await?;
    Ok(Json(VacancyResponse::from(vacancy)))
}

#[utoipa::path(
    put,
    path = "/api/recruit/close-job/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Vacancy closed", body = CloseVacancyResponse),
        (status = 404, description = "Vacancy not found"),
        (status = 409, description = "Vacancy already closed")
    )
)]
#[axum::debug_handler]
pub async fn close_vacancy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let closed = state.vacancy_service.close(&caller, id).await?;
    Ok(Json(CloseVacancyResponse::from(closed)))
}

#[utoipa::path(
    get,
    path = "/api/recruit/applications",
    responses(
        (status = 200, description = "Live applications across the caller's vacancies", body = PipelineResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse> {
    let pipeline = state.application_service.recruiter_pipeline(&caller).await?;
    Ok(Json(PipelineResponse::from(pipeline)))
}

#[utoipa::path(
    get,
    path = "/api/recruit/job-applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Vacancy ID")
    ),
    responses(
        (status = 200, description = "Applications for one vacancy", body = PipelineResponse),
        (status = 403, description = "Vacancy belongs to another recruiter")
    )
)]
#[axum::debug_handler]
pub async fn list_vacancy_applications(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let pipeline = state
        .application_service
        .vacancy_pipeline(&caller, id)
        .await?;
    Ok(Json(PipelineResponse::from(pipeline)))
}

#[utoipa::path(
    get,
    path = "/api/recruit/details/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application with its vacancy", body = ApplicationDetailsResponse),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn application_details(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state
        .application_service
        .details_for_recruiter(&caller, id)
        .await?;
    Ok(Json(ApplicationDetailsResponse::from(view)))
}

#[utoipa::path(
    patch,
    path = "/api/recruit/update-status/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 400, description = "Status is not Shortlisted, Hired or Dropped"),
        (status = 403, description = "Vacancy belongs to another recruiter"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "No free slot, terminal application or concurrent change")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let decision = RecruiterDecision::try_from(payload)?;
    let application = state
        .application_service
        .transition_status(&caller, id, decision)
        .await?;
    Ok(Json(UpdateStatusResponse {
        msg: "Status updated successfully".to_string(),
        application,
    }))
}
