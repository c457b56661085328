use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    dto::{
        account_dto::{
            ApplicantSummary, ProfileResponse, RegisterProfilePayload, UpdateProfileFields,
        },
        application_dto::{
            ApplicantDetailsPayload, ApplicationDetailsResponse, ApplyPayload, ApplyResponse,
            CheckAppliedResponse, PipelineResponse, ResumeUploadResponse, UpdateStatusPayload,
            UpdateStatusResponse,
        },
        vacancy_dto::{
            CloseVacancyResponse, CreateVacancyPayload, UpdateVacancyPayload, VacancyFeedItem,
            VacancyResponse,
        },
    },
    middleware::auth::require_bearer_auth,
    models::{
        account::{Account, AccountMeta, Role},
        application::{ApplicantDetails, Application, ApplicationStatus, RecruiterDecision},
        vacancy::Slots,
    },
    AppState,
};

pub mod account;
pub mod candidate;
pub mod health;
pub mod recruiter;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        account::register_profile,
        account::get_profile,
        account::update_profile,
        recruiter::create_vacancy,
        recruiter::list_posted,
        recruiter::view_vacancy,
        recruiter::update_vacancy,
        recruiter::close_vacancy,
        recruiter::list_applications,
        recruiter::list_vacancy_applications,
        recruiter::application_details,
        recruiter::update_status,
        candidate::feed,
        candidate::view_vacancy,
        candidate::check_applied,
        candidate::apply,
        candidate::my_history,
        candidate::applied_details,
        candidate::upload_resume,
    ),
    components(schemas(
        Role,
        AccountMeta,
        Account,
        RegisterProfilePayload,
        UpdateProfileFields,
        ProfileResponse,
        ApplicantSummary,
        Slots,
        ApplicationStatus,
        RecruiterDecision,
        ApplicantDetails,
        Application,
        CreateVacancyPayload,
        UpdateVacancyPayload,
        VacancyResponse,
        VacancyFeedItem,
        CloseVacancyResponse,
        ApplicantDetailsPayload,
        ApplyPayload,
        ApplyResponse,
        UpdateStatusPayload,
        UpdateStatusResponse,
        PipelineResponse,
        ApplicationDetailsResponse,
        CheckAppliedResponse,
        ResumeUploadResponse,
    )),
    tags(
        (name = "staffup", description = "Vacancy slots and hiring pipeline")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn account_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/api/auth/profile",
        post(account::register_profile)
            .get(account::get_profile)
            .put(account::update_profile)
            .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
    )
}

fn recruiter_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recruit/create", post(recruiter::create_vacancy))
        .route("/api/recruit/posted", get(recruiter::list_posted))
        .route("/api/recruit/view/:id", get(recruiter::view_vacancy))
        .route("/api/recruit/update-job/:id", put(recruiter::update_vacancy))
        .route("/api/recruit/close-job/:id", put(recruiter::close_vacancy))
        .route("/api/recruit/applications", get(recruiter::list_applications))
        .route(
            "/api/recruit/job-applications/:id",
            get(recruiter::list_vacancy_applications),
        )
        .route("/api/recruit/details/:id", get(recruiter::application_details))
        .route("/api/recruit/update-status/:id", patch(recruiter::update_status))
}

fn candidate_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/candidate/feed", get(candidate::feed))
        .route("/api/candidate/view/:id", get(candidate::view_vacancy))
        .route("/api/candidate/check-applied/:id", get(candidate::check_applied))
        .route("/api/candidate/apply", post(candidate::apply))
        .route("/api/candidate/my-history", get(candidate::my_history))
        .route("/api/candidate/applied/:id", get(candidate::applied_details))
        .route(
            "/api/candidate/resume",
            post(candidate::upload_resume)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}

/// Full application router: public health routes, bearer-protected APIs and uploaded files.
pub fn app_router(state: AppState) -> Router {
    let max_upload_bytes = state.resume_store.max_bytes();
    let protected = account_routes(max_upload_bytes)
        .merge(recruiter_routes())
        .merge(candidate_routes(max_upload_bytes))
        .route_layer(from_fn_with_state(
            state.authenticator.clone(),
            require_bearer_auth,
        ));

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json));

    let uploads = ServeDir::new(state.resume_store.root());

    public
        .merge(protected)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
