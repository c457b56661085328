use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const JOB_REMOVED_MESSAGE: &str = "This job post was removed by the recruiter.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_status", rename_all = "PascalCase")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Hired,
    Dropped,
    Closed,
}

impl ApplicationStatus {
    /// `Closed` is only reached through vacancy closure and never left.
    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Closed)
    }

    pub fn is_hired(self) -> bool {
        matches!(self, ApplicationStatus::Hired)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Dropped => "Dropped",
            ApplicationStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The statuses a recruiter may pick for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RecruiterDecision {
    Shortlisted,
    Hired,
    Dropped,
}

impl From<RecruiterDecision> for ApplicationStatus {
    fn from(value: RecruiterDecision) -> Self {
        match value {
            RecruiterDecision::Shortlisted => ApplicationStatus::Shortlisted,
            RecruiterDecision::Hired => ApplicationStatus::Hired,
            RecruiterDecision::Dropped => ApplicationStatus::Dropped,
        }
    }
}

impl TryFrom<ApplicationStatus> for RecruiterDecision {
    type Error = Error;

    fn try_from(value: ApplicationStatus) -> Result<Self> {
        match value {
            ApplicationStatus::Shortlisted => Ok(RecruiterDecision::Shortlisted),
            ApplicationStatus::Hired => Ok(RecruiterDecision::Hired),
            ApplicationStatus::Dropped => Ok(RecruiterDecision::Dropped),
            other => Err(Error::BadRequest(format!(
                "Status '{}' cannot be set by a recruiter",
                other
            ))),
        }
    }
}

/// What a transition does to the vacancy's `slots.filled` counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEffect {
    Claim,
    Release,
    Keep,
}

impl SlotEffect {
    pub fn delta(self) -> i32 {
        match self {
            SlotEffect::Claim => 1,
            SlotEffect::Release => -1,
            SlotEffect::Keep => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub slots: SlotEffect,
}

impl TransitionPlan {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Decide how a recruiter decision applies to an application currently in `from`.
///
/// Capacity is not checked here; a `Claim` still has to win the conditional
/// increment on the vacancy when it is committed.
pub fn plan_transition(from: ApplicationStatus, decision: RecruiterDecision) -> Result<TransitionPlan> {
    if from.is_terminal() {
        return Err(Error::Conflict(format!(
            "Application is {} and accepts no further status changes",
            from
        )));
    }

    let to = ApplicationStatus::from(decision);
    let slots = match (from.is_hired(), to.is_hired()) {
        (false, true) => SlotEffect::Claim,
        (true, false) => SlotEffect::Release,
        _ => SlotEffect::Keep,
    };

    Ok(TransitionPlan { from, to, slots })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ApplicantDetails {
    #[sqlx(rename = "details_exp")]
    pub exp: Option<String>,
    #[sqlx(rename = "details_notes")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Application {
    pub id: Uuid,
    pub vacancy_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    #[sqlx(flatten)]
    pub details: ApplicantDetails,
    pub resume_path: Option<String>,
    pub job_removed: bool,
    pub job_removed_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub vacancy_id: Uuid,
    pub applicant_id: Uuid,
    pub details: ApplicantDetails,
    pub resume_path: Option<String>,
}

/// A planned transition ready to be committed against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub application_id: Uuid,
    pub vacancy_id: Uuid,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub slots: SlotEffect,
}

impl StatusTransition {
    pub fn new(application: &Application, plan: TransitionPlan) -> Self {
        Self {
            application_id: application.id,
            vacancy_id: application.vacancy_id,
            from: plan.from,
            to: plan.to,
            slots: plan.slots,
        }
    }
}
