use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::account::{Account, AccountMeta};

/// Creates the caller's profile. Id and role come from the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterProfilePayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(length(max = 2000))]
    pub experience: Option<String>,
    /// Path returned by the resume upload endpoint; required for candidates.
    #[validate(length(min = 1, max = 512))]
    pub cv_path: Option<String>,
}

/// Text fields of the multipart profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileFields {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(length(max = 2000))]
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub msg: String,
    pub user: Account,
}

/// What a recruiter sees of the person behind an application.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub meta: AccountMeta,
    pub cv_path: Option<String>,
}

impl From<Account> for ApplicantSummary {
    fn from(value: Account) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            meta: value.meta,
            cv_path: value.cv_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_payload_requires_a_valid_email() {
        let payload = RegisterProfilePayload {
            name: "Dana".into(),
            email: "not-an-email".into(),
            company: None,
            experience: None,
            cv_path: None,
        };
        assert!(payload.validate().is_err());

        let payload = RegisterProfilePayload {
            email: "dana@example.com".into(),
            ..payload
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_name_update_is_invalid() {
        let fields = UpdateProfileFields {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(fields.validate().is_err());
        assert!(UpdateProfileFields::default().validate().is_ok());
    }
}
