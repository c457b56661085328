use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::store::{ClosedVacancy, EntityStore};
use crate::error::{Error, Result};
use crate::models::account::{Account, AccountChanges, NewAccount};
use crate::models::application::{
    Application, ApplicationStatus, NewApplication, SlotEffect, StatusTransition,
};
use crate::models::vacancy::{NewVacancy, Slots, Vacancy, VacancyChanges};

#[derive(Default)]
struct MemoryState {
    vacancies: HashMap<Uuid, Vacancy>,
    applications: HashMap<Uuid, Application>,
    accounts: HashMap<Uuid, Account>,
}

impl MemoryState {
    fn vacancy(&self, id: Uuid) -> Result<&Vacancy> {
        self.vacancies
            .get(&id)
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    fn vacancy_mut(&mut self, id: Uuid) -> Result<&mut Vacancy> {
        self.vacancies
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    fn application_for(&self, vacancy_id: Uuid, applicant_id: Uuid) -> Option<&Application> {
        self.applications
            .values()
            .find(|a| a.vacancy_id == vacancy_id && a.applicant_id == applicant_id)
    }

    /// Mirrors the conditional `UPDATE` of the postgres store.
    fn update_vacancy_slots(
        &mut self,
        vacancy_id: Uuid,
        delta: i32,
        capacity_check: bool,
    ) -> Result<bool> {
        let vacancy = self.vacancy_mut(vacancy_id)?;
        let next = vacancy.slots.filled + delta;
        if vacancy.is_closed || next < 0 || (capacity_check && next > vacancy.slots.total) {
            return Ok(false);
        }
        vacancy.slots.filled = next;
        vacancy.updated_at = Utc::now();
        Ok(true)
    }

    fn update_application_status(
        &mut self,
        application_id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let application = self
            .applications
            .get_mut(&application_id)
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        if application.status != from {
            return Ok(None);
        }
        application.status = to;
        application.updated_at = Utc::now();
        Ok(Some(application.clone()))
    }

    fn bulk_close_applications(&mut self, vacancy_id: Uuid, message: &str) -> u64 {
        let now = Utc::now();
        let mut closed = 0;
        for application in self
            .applications
            .values_mut()
            .filter(|a| a.vacancy_id == vacancy_id)
        {
            application.status = ApplicationStatus::Closed;
            application.job_removed = true;
            application.job_removed_message = Some(message.to_string());
            application.updated_at = now;
            closed += 1;
        }
        closed
    }
}

fn newest_first<T, F>(mut items: Vec<T>, created: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created(item)));
    items
}

/// In-process store. One mutex guards every map, so every trait call is a
/// single critical section and therefore atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy> {
        let now = Utc::now();
        let row = Vacancy {
            id: Uuid::new_v4(),
            title: vacancy.title,
            dept: vacancy.dept,
            location: vacancy.location,
            salary: vacancy.salary,
            description: vacancy.description,
            requirements: vacancy.requirements,
            slots: Slots::new(vacancy.total_slots),
            owner_id: vacancy.owner_id,
            is_closed: false,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.lock().await;
        state.vacancies.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_vacancy(&self, id: Uuid) -> Result<Vacancy> {
        let state = self.state.lock().await;
        state.vacancy(id).cloned()
    }

    async fn edit_vacancy(&self, id: Uuid, changes: VacancyChanges) -> Result<Vacancy> {
        let mut state = self.state.lock().await;
        let vacancy = state.vacancy_mut(id)?;
        if vacancy.is_closed {
            return Err(Error::Conflict("Vacancy is closed".to_string()));
        }
        if let Some(total) = changes.total_slots {
            if total < vacancy.slots.filled {
                return Err(Error::Conflict(format!(
                    "Total slots cannot drop below the {} already filled",
                    vacancy.slots.filled
                )));
            }
        }
        changes.apply_to(vacancy);
        vacancy.updated_at = Utc::now();
        Ok(vacancy.clone())
    }

    async fn list_vacancies_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vacancy>> {
        let state = self.state.lock().await;
        let items = state
            .vacancies
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |v: &Vacancy| v.created_at))
    }

    async fn list_open_vacancies_for(&self, applicant_id: Uuid) -> Result<Vec<Vacancy>> {
        let state = self.state.lock().await;
        let items = state
            .vacancies
            .values()
            .filter(|v| !v.is_closed && state.application_for(v.id, applicant_id).is_none())
            .cloned()
            .collect();
        Ok(newest_first(items, |v: &Vacancy| v.created_at))
    }

    async fn close_vacancy(&self, id: Uuid, message: &str) -> Result<ClosedVacancy> {
        let mut state = self.state.lock().await;
        let vacancy = state.vacancy_mut(id)?;
        if vacancy.is_closed {
            return Err(Error::Conflict("Vacancy is already closed".to_string()));
        }
        vacancy.is_closed = true;
        vacancy.updated_at = Utc::now();
        let vacancy = vacancy.clone();

        let applications_closed = state.bulk_close_applications(id, message);
        Ok(ClosedVacancy {
            vacancy,
            applications_closed,
        })
    }

    async fn find_application(
        &self,
        vacancy_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<Application>> {
        let state = self.state.lock().await;
        Ok(state.application_for(vacancy_id, applicant_id).cloned())
    }

    async fn get_application(&self, id: Uuid) -> Result<Application> {
        let state = self.state.lock().await;
        state
            .applications
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    async fn create_application(&self, application: NewApplication) -> Result<Application> {
        let mut state = self.state.lock().await;
        let vacancy = state.vacancy(application.vacancy_id)?;
        if state
            .application_for(application.vacancy_id, application.applicant_id)
            .is_some()
        {
            return Err(Error::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }
        if vacancy.is_closed {
            return Err(Error::Conflict("Vacancy is closed".to_string()));
        }
        if !vacancy.slots.has_capacity() {
            return Err(Error::Conflict("No slots remaining".to_string()));
        }

        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            vacancy_id: application.vacancy_id,
            applicant_id: application.applicant_id,
            status: ApplicationStatus::Applied,
            details: application.details,
            resume_path: application.resume_path,
            job_removed: false,
            job_removed_message: None,
            created_at: now,
            updated_at: now,
        };
        state.applications.insert(row.id, row.clone());
        Ok(row)
    }

    async fn commit_transition(&self, transition: StatusTransition) -> Result<Application> {
        let mut state = self.state.lock().await;

        let current = state
            .applications
            .get(&transition.application_id)
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
        if current.status != transition.from {
            return Err(Error::Conflict(format!(
                "Application is no longer {}; reload and retry",
                transition.from
            )));
        }

        // Status is verified first, so a failed slot update leaves nothing to undo.
        let vacancy_ok = match transition.slots {
            SlotEffect::Keep => !state.vacancy(transition.vacancy_id)?.is_closed,
            SlotEffect::Claim => state.update_vacancy_slots(transition.vacancy_id, 1, true)?,
            SlotEffect::Release => state.update_vacancy_slots(transition.vacancy_id, -1, false)?,
        };
        if !vacancy_ok {
            return Err(match transition.slots {
                SlotEffect::Claim => Error::Conflict(
                    "Cannot hire: all slots for this role are already filled".to_string(),
                ),
                _ => Error::Conflict("Vacancy is closed".to_string()),
            });
        }

        state
            .update_application_status(transition.application_id, transition.from, transition.to)?
            .ok_or_else(|| Error::Internal("application status changed under lock".to_string()))
    }

    async fn list_applications_for_vacancy(&self, vacancy_id: Uuid) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let items = state
            .applications
            .values()
            .filter(|a| a.vacancy_id == vacancy_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |a: &Application| a.created_at))
    }

    async fn list_applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let items = state
            .applications
            .values()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect();
        Ok(newest_first(items, |a: &Application| a.created_at))
    }

    async fn list_active_applications_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Application>> {
        let state = self.state.lock().await;
        let items = state
            .applications
            .values()
            .filter(|a| {
                !a.job_removed
                    && state
                        .vacancies
                        .get(&a.vacancy_id)
                        .is_some_and(|v| v.owner_id == owner_id)
            })
            .cloned()
            .collect();
        Ok(newest_first(items, |a: &Application| a.created_at))
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&account.id) {
            return Err(Error::Conflict("Profile already exists".to_string()));
        }
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(Error::Conflict("Email is already registered".to_string()));
        }

        let now = Utc::now();
        let row = Account {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            meta: account.meta,
            cv_path: account.cv_path,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn update_account(&self, id: Uuid, changes: AccountChanges) -> Result<Account> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        changes.apply_to(account);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}
