use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::account_dto::ApplicantSummary;
use crate::dto::vacancy_dto::VacancyResponse;
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicantDetails, Application, ApplicationStatus, RecruiterDecision,
};
use crate::services::application_service::{ApplicationView, Pipeline};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplicantDetailsPayload {
    #[validate(length(max = 2000, message = "Experience is too long"))]
    pub exp: Option<String>,
    #[validate(length(max = 5000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

impl From<ApplicantDetailsPayload> for ApplicantDetails {
    fn from(value: ApplicantDetailsPayload) -> Self {
        Self {
            exp: value.exp,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplyPayload {
    pub vacancy_id: Uuid,
    #[serde(default)]
    #[validate(nested)]
    pub details: ApplicantDetailsPayload,
    /// Path returned by the resume upload endpoint.
    #[validate(length(min = 1, max = 512))]
    pub resume_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplyResponse {
    pub msg: String,
    pub entry: Application,
}

/// Any status is accepted on the wire; only the recruiter decisions pass conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
}

impl TryFrom<UpdateStatusPayload> for RecruiterDecision {
    type Error = Error;

    fn try_from(value: UpdateStatusPayload) -> Result<Self> {
        RecruiterDecision::try_from(value.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub msg: String,
    pub application: Application,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PipelineResponse {
    pub recent: Vec<Application>,
    pub hired: Vec<Application>,
}

impl From<Pipeline> for PipelineResponse {
    fn from(value: Pipeline) -> Self {
        Self {
            recent: value.recent,
            hired: value.hired,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationDetailsResponse {
    pub application: Application,
    pub vacancy: VacancyResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantSummary>,
}

impl From<ApplicationView> for ApplicationDetailsResponse {
    fn from(value: ApplicationView) -> Self {
        Self {
            application: value.application,
            vacancy: value.vacancy.into(),
            applicant: value.applicant.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckAppliedResponse {
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResumeUploadResponse {
    pub path: String,
}
