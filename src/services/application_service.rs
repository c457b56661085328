use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::database::EntityStore;
use crate::dto::application_dto::ApplyPayload;
use crate::error::{Error, Result};
use crate::models::account::{Account, Caller, Role};
use crate::models::application::{
    plan_transition, Application, NewApplication, RecruiterDecision, SlotEffect, StatusTransition,
};
use crate::models::vacancy::Vacancy;

/// Applications split the way the recruiter dashboard shows them.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub recent: Vec<Application>,
    pub hired: Vec<Application>,
}

impl Pipeline {
    pub fn partition(applications: Vec<Application>) -> Self {
        let (hired, recent) = applications
            .into_iter()
            .partition(|a| a.status.is_hired());
        Self { recent, hired }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationView {
    pub application: Application,
    pub vacancy: Vacancy,
    /// Filled in for recruiters when the applicant has a profile.
    pub applicant: Option<Account>,
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn EntityStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn apply(&self, caller: &Caller, payload: ApplyPayload) -> Result<Application> {
        caller.require(Role::Candidate)?;
        payload.validate()?;

        // Same order as the stores: duplicate, then closed, then capacity.
        let vacancy = self.store.find_vacancy(payload.vacancy_id).await?;
        if self
            .store
            .find_application(vacancy.id, caller.id)
            .await?
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

        // The store re-checks all three conditions when it inserts.
        let application = self
            .store
            .create_application(NewApplication {
                vacancy_id: vacancy.id,
                applicant_id: caller.id,
                details: payload.details.into(),
                resume_path: payload.resume_path,
            })
            .await?;
        info!(
            application_id = %application.id,
            vacancy_id = %vacancy.id,
            applicant_id = %caller.id,
            "application submitted"
        );
        Ok(application)
    }

    pub async fn transition_status(
        &self,
        caller: &Caller,
        application_id: Uuid,
        decision: RecruiterDecision,
    ) -> Result<Application> {
        caller.require(Role::Recruiter)?;

        let application = self.store.get_application(application_id).await?;
        let vacancy = self.store.find_vacancy(application.vacancy_id).await?;
        if !vacancy.is_owned_by(caller.id) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }

        let plan = plan_transition(application.status, decision)?;
        if vacancy.is_closed {
            return Err(Error::Conflict("Vacancy is closed".to_string()));
        }
        if plan.is_noop() {
            return Ok(application);
        }
        if plan.slots == SlotEffect::Claim && !vacancy.slots.has_capacity() {
            return Err(Error::Conflict(format!(
                "Cannot hire: all {} slots for this role are already filled",
                vacancy.slots.total
            )));
        }

        let transition = StatusTransition::new(&application, plan);
        match self.store.commit_transition(transition).await {
            Ok(updated) => {
                info!(
                    application_id = %updated.id,
                    vacancy_id = %vacancy.id,
                    from = %plan.from,
                    to = %plan.to,
                    slot_delta = plan.slots.delta(),
                    "application status changed"
                );
                Ok(updated)
            }
            Err(err @ Error::Conflict(_)) => {
                warn!(
                    application_id = %application_id,
                    vacancy_id = %vacancy.id,
                    error = %err,
                    "status change lost a race"
                );
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Every live application on the calling recruiter's vacancies.
    pub async fn recruiter_pipeline(&self, caller: &Caller) -> Result<Pipeline> {
        caller.require(Role::Recruiter)?;
        let applications = self
            .store
            .list_active_applications_for_owner(caller.id)
            .await?;
        Ok(Pipeline::partition(applications))
    }

    pub async fn vacancy_pipeline(&self, caller: &Caller, vacancy_id: Uuid) -> Result<Pipeline> {
        caller.require(Role::Recruiter)?;
        let vacancy = self.store.find_vacancy(vacancy_id).await?;
        if !vacancy.is_owned_by(caller.id) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        let applications = self.store.list_applications_for_vacancy(vacancy_id).await?;
        Ok(Pipeline::partition(applications))
    }

    pub async fn details_for_recruiter(
        &self,
        caller: &Caller,
        application_id: Uuid,
    ) -> Result<ApplicationView> {
        caller.require(Role::Recruiter)?;
        let application = self.store.get_application(application_id).await?;
        let vacancy = self.store.find_vacancy(application.vacancy_id).await?;
        if !vacancy.is_owned_by(caller.id) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        let applicant = self.store.find_account(application.applicant_id).await?;
        Ok(ApplicationView {
            application,
            vacancy,
            applicant,
        })
    }

    pub async fn history(&self, caller: &Caller) -> Result<Vec<ApplicationView>> {
        caller.require(Role::Candidate)?;
        let applications = self.store.list_applications_for_applicant(caller.id).await?;

        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            let vacancy = self.store.find_vacancy(application.vacancy_id).await?;
            views.push(ApplicationView {
                application,
                vacancy,
                applicant: None,
            });
        }
        Ok(views)
    }

    pub async fn applied_details(
        &self,
        caller: &Caller,
        application_id: Uuid,
    ) -> Result<ApplicationView> {
        caller.require(Role::Candidate)?;
        let application = self.store.get_application(application_id).await?;
        if application.applicant_id != caller.id {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        let vacancy = self.store.find_vacancy(application.vacancy_id).await?;
        Ok(ApplicationView {
            application,
            vacancy,
            applicant: None,
        })
    }

    pub async fn check_applied(&self, caller: &Caller, vacancy_id: Uuid) -> Result<bool> {
        caller.require(Role::Candidate)?;
        Ok(self
            .store
            .find_application(vacancy_id, caller.id)
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockEntityStore;
    use crate::models::application::{ApplicantDetails, ApplicationStatus};
    use crate::models::vacancy::Slots;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn vacancy(owner_id: Uuid, total: i32, filled: i32) -> Vacancy {
        Vacancy {
            id: Uuid::new_v4(),
            title: "Data Engineer".into(),
            dept: "Analytics".into(),
            location: "Berlin".into(),
            salary: Decimal::from(70_000),
            description: "Pipelines".into(),
            requirements: "SQL".into(),
            slots: Slots { total, filled },
            owner_id,
            is_closed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn application(vacancy_id: Uuid, status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            vacancy_id,
            applicant_id: Uuid::new_v4(),
            status,
            details: ApplicantDetails::default(),
            resume_path: None,
            job_removed: false,
            job_removed_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn full_vacancy_rejects_hire_without_touching_the_store() {
        let owner = Uuid::new_v4();
        let v = vacancy(owner, 1, 1);
        let app = application(v.id, ApplicationStatus::Shortlisted);

        let mut store = MockEntityStore::new();
        let app_clone = app.clone();
        store
            .expect_get_application()
            .returning(move |_| Ok(app_clone.clone()));
        store.expect_find_vacancy().returning(move |_| Ok(v.clone()));
        store.expect_commit_transition().never();

        let service = ApplicationService::new(Arc::new(store));
        let err = service
            .transition_status(&Caller::new(owner, Role::Recruiter), app.id, RecruiterDecision::Hired)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn foreign_recruiter_is_forbidden_before_any_write() {
        let v = vacancy(Uuid::new_v4(), 2, 0);
        let app = application(v.id, ApplicationStatus::Applied);

        let mut store = MockEntityStore::new();
        let app_clone = app.clone();
        store
            .expect_get_application()
            .returning(move |_| Ok(app_clone.clone()));
        store.expect_find_vacancy().returning(move |_| Ok(v.clone()));
        store.expect_commit_transition().never();

        let service = ApplicationService::new(Arc::new(store));
        let intruder = Caller::new(Uuid::new_v4(), Role::Recruiter);
        let err = service
            .transition_status(&intruder, app.id, RecruiterDecision::Dropped)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn candidate_cannot_change_status() {
        let mut store = MockEntityStore::new();
        store.expect_get_application().never();
        store.expect_commit_transition().never();

        let service = ApplicationService::new(Arc::new(store));
        let err = service
            .transition_status(
                &Caller::new(Uuid::new_v4(), Role::Candidate),
                Uuid::new_v4(),
                RecruiterDecision::Hired,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn hire_commits_a_claiming_transition() {
        let owner = Uuid::new_v4();
        let v = vacancy(owner, 2, 0);
        let app = application(v.id, ApplicationStatus::Applied);

        let mut store = MockEntityStore::new();
        let app_clone = app.clone();
        store
            .expect_get_application()
            .returning(move |_| Ok(app_clone.clone()));
        store.expect_find_vacancy().returning(move |_| Ok(v.clone()));
        let app_id = app.id;
        let hired = Application {
            status: ApplicationStatus::Hired,
            ..app.clone()
        };
        store
            .expect_commit_transition()
            .withf(move |t| {
                t.application_id == app_id
                    && t.from == ApplicationStatus::Applied
                    && t.to == ApplicationStatus::Hired
                    && t.slots == SlotEffect::Claim
            })
            .times(1)
            .returning(move |_| Ok(hired.clone()));

        let service = ApplicationService::new(Arc::new(store));
        let updated = service
            .transition_status(&Caller::new(owner, Role::Recruiter), app.id, RecruiterDecision::Hired)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Hired);
    }

    #[test]
    fn pipeline_separates_hired_from_the_rest() {
        let vacancy_id = Uuid::new_v4();
        let pipeline = Pipeline::partition(vec![
            application(vacancy_id, ApplicationStatus::Applied),
            application(vacancy_id, ApplicationStatus::Hired),
            application(vacancy_id, ApplicationStatus::Dropped),
        ]);
        assert_eq!(pipeline.hired.len(), 1);
        assert_eq!(pipeline.recent.len(), 2);
    }
}
