use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::database::{ClosedVacancy, EntityStore};
use crate::dto::vacancy_dto::{CreateVacancyPayload, UpdateVacancyPayload};
use crate::error::{Error, Result};
use crate::models::account::{Caller, Role};
use crate::models::application::JOB_REMOVED_MESSAGE;
use crate::models::vacancy::{Vacancy, VacancyChanges};

#[derive(Clone)]
pub struct VacancyService {
    store: Arc<dyn EntityStore>,
}

impl VacancyService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, caller: &Caller, payload: CreateVacancyPayload) -> Result<Vacancy> {
        caller.require(Role::Recruiter)?;
        payload.validate()?;

        let vacancy = self
            .store
            .insert_vacancy(payload.into_new_vacancy(caller.id))
            .await?;
        info!(
            vacancy_id = %vacancy.id,
            owner_id = %caller.id,
            total_slots = vacancy.slots.total,
            "vacancy created"
        );
        Ok(vacancy)
    }

    pub async fn list_posted(&self, caller: &Caller) -> Result<Vec<Vacancy>> {
        caller.require(Role::Recruiter)?;
        self.store.list_vacancies_by_owner(caller.id).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vacancy> {
        self.store.find_vacancy(id).await
    }

    /// Loads a vacancy the calling recruiter owns.
    pub async fn get_owned(&self, caller: &Caller, id: Uuid) -> Result<Vacancy> {
        caller.require(Role::Recruiter)?;
        let vacancy = self.store.find_vacancy(id).await?;
        if !vacancy.is_owned_by(caller.id) {
            return Err(Error::Forbidden("Not allowed".to_string()));
        }
        Ok(vacancy)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        payload: UpdateVacancyPayload,
    ) -> Result<Vacancy> {
        payload.validate()?;
        let current = self.get_owned(caller, id).await?;
        if current.is_closed {
            return Err(Error::Conflict("Vacancy is closed".to_string()));
        }

        let changes = VacancyChanges::from(payload);
        if changes.is_empty() {
            return Ok(current);
        }
        if let Some(total) = changes.total_slots {
            if total < current.slots.filled {
                return Err(Error::Conflict(format!(
                    "Total slots cannot drop below the {} already filled",
                    current.slots.filled
                )));
            }
        }

        let vacancy = self.store.edit_vacancy(id, changes).await?;
        info!(vacancy_id = %id, "vacancy updated");
        Ok(vacancy)
    }

    pub async fn close(&self, caller: &Caller, id: Uuid) -> Result<ClosedVacancy> {
        let current = self.get_owned(caller, id).await?;
        if current.is_closed {
            return Err(Error::Conflict("Vacancy is already closed".to_string()));
        }

        let closed = self.store.close_vacancy(id, JOB_REMOVED_MESSAGE).await?;
        info!(
            vacancy_id = %id,
            applications_closed = closed.applications_closed,
            slots_filled = closed.vacancy.slots.filled,
            "vacancy closed"
        );
        Ok(closed)
    }

    /// Open vacancies the calling candidate has not applied to yet.
    pub async fn feed(&self, caller: &Caller) -> Result<Vec<Vacancy>> {
        caller.require(Role::Candidate)?;
        self.store.list_open_vacancies_for(caller.id).await
    }
}
