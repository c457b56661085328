use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::account::{Account, AccountChanges, NewAccount};
use crate::models::application::{Application, NewApplication, StatusTransition};
use crate::models::vacancy::{NewVacancy, Vacancy, VacancyChanges};

/// Result of closing a vacancy: the frozen vacancy and how many applications it took down with it.
#[derive(Debug, Clone)]
pub struct ClosedVacancy {
    pub vacancy: Vacancy,
    pub applications_closed: u64,
}

/// Durable home of vacancies and applications.
///
/// Every mutating method is a single atomic commit. Conditional writes that lose
/// a race report `Error::Conflict` and leave no partial state behind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy>;

    /// `Error::NotFound` when the id is unknown.
    async fn find_vacancy(&self, id: Uuid) -> Result<Vacancy>;

    /// Applies `changes` only while the vacancy is open and, when a new total is
    /// given, only if it is not below the current `slots.filled`.
    async fn edit_vacancy(&self, id: Uuid, changes: VacancyChanges) -> Result<Vacancy>;

    async fn list_vacancies_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vacancy>>;

    /// Open vacancies `applicant_id` has not applied to yet, newest first.
    async fn list_open_vacancies_for(&self, applicant_id: Uuid) -> Result<Vec<Vacancy>>;

    /// Marks the vacancy closed and every one of its applications `Closed`/job-removed.
    /// `Error::Conflict` if it was already closed.
    async fn close_vacancy(&self, id: Uuid, message: &str) -> Result<ClosedVacancy>;

    async fn find_application(
        &self,
        vacancy_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<Application>>;

    /// `Error::NotFound` when the id is unknown.
    async fn get_application(&self, id: Uuid) -> Result<Application>;

    /// Inserts an `Applied` application iff the vacancy is open, has a free slot
    /// and the applicant has not applied to it before.
    async fn create_application(&self, application: NewApplication) -> Result<Application>;

    /// Moves the application from `transition.from` to `transition.to` and
    /// adjusts `slots.filled` in the same commit.
    async fn commit_transition(&self, transition: StatusTransition) -> Result<Application>;

    async fn list_applications_for_vacancy(&self, vacancy_id: Uuid) -> Result<Vec<Application>>;

    async fn list_applications_for_applicant(&self, applicant_id: Uuid)
        -> Result<Vec<Application>>;

    /// Applications on `owner_id`'s vacancies that have not been job-removed.
    async fn list_active_applications_for_owner(&self, owner_id: Uuid)
        -> Result<Vec<Application>>;

    /// `Error::Conflict` when the id already has a profile or the email is taken.
    async fn insert_account(&self, account: NewAccount) -> Result<Account>;

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>>;

    /// `Error::NotFound` when the account does not exist.
    async fn update_account(&self, id: Uuid, changes: AccountChanges) -> Result<Account>;
}
