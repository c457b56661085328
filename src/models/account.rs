use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Recruiter,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
        }
    }
}

/// Identity of the account behind a request, as vouched for by the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn require(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "Only a {} may do this",
                role.as_str()
            )))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AccountMeta {
    /// Recruiters only.
    #[sqlx(rename = "meta_company")]
    pub company: Option<String>,
    /// Candidates only.
    #[sqlx(rename = "meta_experience")]
    pub experience: Option<String>,
}

/// Profile of a caller. The id and role are the ones carried by the bearer token;
/// credentials stay with the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[sqlx(flatten)]
    pub meta: AccountMeta,
    pub cv_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub meta: AccountMeta,
    pub cv_path: Option<String>,
}

/// Partial profile edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub company: Option<String>,
    pub experience: Option<String>,
    pub cv_path: Option<String>,
}

impl AccountChanges {
    /// Drops the fields `role` may not hold: company is recruiter-only,
    /// experience and CV are candidate-only.
    pub fn restricted_to(self, role: Role) -> Self {
        match role {
            Role::Recruiter => Self {
                experience: None,
                cv_path: None,
                ..self
            },
            Role::Candidate => Self {
                company: None,
                ..self
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.experience.is_none()
            && self.cv_path.is_none()
    }

    pub fn apply_to(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(company) = &self.company {
            account.meta.company = Some(company.clone());
        }
        if let Some(experience) = &self.experience {
            account.meta.experience = Some(experience.clone());
        }
        if let Some(cv_path) = &self.cv_path {
            account.cv_path = Some(cv_path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes() -> AccountChanges {
        AccountChanges {
            name: Some("Dana".into()),
            company: Some("Acme".into()),
            experience: Some("6 years".into()),
            cv_path: Some("/uploads/resumes/a.pdf".into()),
        }
    }

    #[test]
    fn recruiter_changes_keep_only_name_and_company() {
        let restricted = changes().restricted_to(Role::Recruiter);
        assert_eq!(restricted.company.as_deref(), Some("Acme"));
        assert!(restricted.experience.is_none());
        assert!(restricted.cv_path.is_none());
    }

    #[test]
    fn candidate_changes_drop_company() {
        let restricted = changes().restricted_to(Role::Candidate);
        assert!(restricted.company.is_none());
        assert_eq!(restricted.experience.as_deref(), Some("6 years"));
        assert!(!restricted.is_empty());
    }

    #[test]
    fn caller_require_checks_role() {
        let caller = Caller::new(Uuid::new_v4(), Role::Candidate);
        assert!(caller.require(Role::Candidate).is_ok());
        assert!(matches!(caller.require(Role::Recruiter), Err(Error::Forbidden(_))));
    }
}
