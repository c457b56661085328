use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use validator::Validate;

use crate::database::EntityStore;
use crate::dto::account_dto::{RegisterProfilePayload, UpdateProfileFields};
use crate::error::{Error, Result};
use crate::models::account::{Account, AccountChanges, AccountMeta, Caller, NewAccount, Role};
use crate::services::resume_store::ResumeStore;

/// A replacement CV sent along with a profile update.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn EntityStore>,
    resumes: ResumeStore,
}

impl AccountService {
    pub fn new(store: Arc<dyn EntityStore>, resumes: ResumeStore) -> Self {
        Self { store, resumes }
    }

    pub async fn register(
        &self,
        caller: &Caller,
        payload: RegisterProfilePayload,
    ) -> Result<Account> {
        payload.validate()?;
        if caller.role == Role::Candidate && payload.cv_path.is_none() {
            return Err(Error::BadRequest(
                "Resume is required for candidates".to_string(),
            ));
        }

        let meta = match caller.role {
            Role::Recruiter => AccountMeta {
                company: payload.company,
                experience: None,
            },
            Role::Candidate => AccountMeta {
                company: None,
                experience: payload.experience,
            },
        };
        let account = self
            .store
            .insert_account(NewAccount {
                id: caller.id,
                name: payload.name.trim().to_string(),
                email: payload.email.trim().to_lowercase(),
                role: caller.role,
                meta,
                cv_path: match caller.role {
                    Role::Candidate => payload.cv_path,
                    Role::Recruiter => None,
                },
            })
            .await?;
        info!(account_id = %account.id, role = caller.role.as_str(), "profile created");
        Ok(account)
    }

    pub async fn profile(&self, caller: &Caller) -> Result<Account> {
        self.store
            .find_account(caller.id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Updates name plus the role's own fields. A candidate's new CV replaces the
    /// old file, which is deleted once the profile points at the new one.
    pub async fn update_profile(
        &self,
        caller: &Caller,
        fields: UpdateProfileFields,
        resume: Option<ResumeUpload>,
    ) -> Result<Account> {
        fields.validate()?;
        let current = self.profile(caller).await?;

        let new_cv = match resume {
            Some(upload) if caller.role == Role::Candidate => Some(
                self.resumes
                    .save(caller, &upload.filename, &upload.data)
                    .await?,
            ),
            _ => None,
        };

        let changes = AccountChanges {
            name: fields.name.map(|n| n.trim().to_string()),
            company: fields.company,
            experience: fields.experience,
            cv_path: new_cv.clone(),
        }
        .restricted_to(caller.role);
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = match self.store.update_account(caller.id, changes).await {
            Ok(account) => account,
            Err(err) => {
                if let Some(path) = &new_cv {
                    if let Err(cleanup) = self.resumes.remove(path).await {
                        warn!(error = %cleanup, "failed to discard unused resume");
                    }
                }
                return Err(err);
            }
        };

        if let (Some(old), Some(new)) = (&current.cv_path, &new_cv) {
            if old != new {
                if let Err(err) = self.resumes.remove(old).await {
                    warn!(account_id = %caller.id, error = %err, "old resume not removed");
                }
            }
        }
        info!(account_id = %caller.id, "profile updated");
        Ok(updated)
    }
}
