use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::account_dto::{ProfileResponse, RegisterProfilePayload, UpdateProfileFields},
    error::Result,
    models::account::{Account, Caller},
    services::account_service::ResumeUpload,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/profile",
    request_body = RegisterProfilePayload,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid payload or missing resume for a candidate"),
        (status = 409, description = "Profile exists or email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<RegisterProfilePayload>,
) -> Result<impl IntoResponse> {
    let user = state.account_service.register(&caller, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            msg: "Profile created successfully".to_string(),
            user,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "The caller's profile", body = Account),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<impl IntoResponse> {
    let account = state.account_service.profile(&caller).await?;
    Ok(Json(account))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile updated; multipart fields `name`, `company`, `experience` and file `resume`", body = ProfileResponse),
        (status = 404, description = "User not found"),
        (status = 413, description = "Resume too large")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut fields = UpdateProfileFields::default();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => fields.name = Some(field.text().await?),
            "company" => fields.company = Some(field.text().await?),
            "experience" => fields.experience = Some(field.text().await?),
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                resume = Some(ResumeUpload { filename, data });
            }
            _ => {}
        }
    }

    let user = state
        .account_service
        .update_profile(&caller, fields, resume)
        .await?;
    Ok(Json(ProfileResponse {
        msg: "Profile updated successfully".to_string(),
        user,
    }))
}
