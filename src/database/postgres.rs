use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::store::{ClosedVacancy, EntityStore};
use crate::error::{Error, Result};
use crate::models::account::{Account, AccountChanges, NewAccount};
use crate::models::application::{
    Application, ApplicationStatus, NewApplication, SlotEffect, StatusTransition,
};
use crate::models::vacancy::{NewVacancy, Vacancy, VacancyChanges};

const VACANCY_COLUMNS: &str = "id, title, dept, location, salary, description, requirements, \
     slots_total, slots_filled, owner_id, is_closed, created_at, updated_at";

const ACCOUNT_COLUMNS: &str = "id, name, email, role, meta_company, meta_experience, cv_path, \
     created_at, updated_at";

const APPLICATION_COLUMNS: &str = "id, vacancy_id, applicant_id, status, details_exp, \
     details_notes, resume_path, job_removed, job_removed_message, created_at, updated_at";

/// PostgreSQL-backed store. Capacity and status changes rely on conditional
/// `UPDATE ... WHERE` clauses inside one transaction; rows are always locked
/// vacancy first, application second.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Atomic conditional increment/decrement of `slots_filled`.
/// Returns false when the vacancy is closed, the counter would drop below zero,
/// or (with `capacity_check`) it would exceed `slots_total`.
async fn update_vacancy_slots(
    conn: &mut PgConnection,
    vacancy_id: Uuid,
    delta: i32,
    capacity_check: bool,
) -> Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE vacancies
        SET slots_filled = slots_filled + $2, updated_at = NOW()
        WHERE id = $1
          AND is_closed = FALSE
          AND slots_filled + $2 >= 0
          AND (NOT $3 OR slots_filled + $2 <= slots_total)
        "#,
    )
    .bind(vacancy_id)
    .bind(delta)
    .bind(capacity_check)
    .execute(conn)
    .await?;

    Ok(res.rows_affected() == 1)
}

/// Takes a share lock on an open vacancy so a concurrent closure waits for us.
async fn lock_open_vacancy(conn: &mut PgConnection, vacancy_id: Uuid) -> Result<bool> {
    let row = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM vacancies WHERE id = $1 AND is_closed = FALSE FOR SHARE",
    )
    .bind(vacancy_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.is_some())
}

/// Compare-and-swap on the application's status.
async fn update_application_status(
    conn: &mut PgConnection,
    application_id: Uuid,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<Option<Application>> {
    let query = format!(
        "UPDATE applications SET status = $3, updated_at = NOW() \
         WHERE id = $1 AND status = $2 \
         RETURNING {}",
        APPLICATION_COLUMNS
    );
    let application = sqlx::query_as::<_, Application>(&query)
        .bind(application_id)
        .bind(from)
        .bind(to)
        .fetch_optional(conn)
        .await?;

    Ok(application)
}

async fn bulk_close_applications(
    conn: &mut PgConnection,
    vacancy_id: Uuid,
    message: &str,
) -> Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE applications
        SET status = 'Closed', job_removed = TRUE, job_removed_message = $2, updated_at = NOW()
        WHERE vacancy_id = $1
        "#,
    )
    .bind(vacancy_id)
    .bind(message)
    .execute(conn)
    .await?;

    Ok(res.rows_affected())
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy> {
        let query = format!(
            "INSERT INTO vacancies (id, title, dept, location, salary, description, requirements, slots_total, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            VACANCY_COLUMNS
        );
        let row = sqlx::query_as::<_, Vacancy>(&query)
            .bind(Uuid::new_v4())
            .bind(&vacancy.title)
            .bind(&vacancy.dept)
            .bind(&vacancy.location)
            .bind(vacancy.salary)
            .bind(&vacancy.description)
            .bind(&vacancy.requirements)
            .bind(vacancy.total_slots)
            .bind(vacancy.owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_vacancy(&self, id: Uuid) -> Result<Vacancy> {
        let query = format!("SELECT {} FROM vacancies WHERE id = $1", VACANCY_COLUMNS);
        sqlx::query_as::<_, Vacancy>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".to_string()))
    }

    async fn edit_vacancy(&self, id: Uuid, changes: VacancyChanges) -> Result<Vacancy> {
        let query = format!(
            r#"
            UPDATE vacancies
            SET
                title = COALESCE($2, title),
                dept = COALESCE($3, dept),
                location = COALESCE($4, location),
                salary = COALESCE($5, salary),
                description = COALESCE($6, description),
                requirements = COALESCE($7, requirements),
                slots_total = COALESCE($8, slots_total),
                updated_at = NOW()
            WHERE id = $1
              AND is_closed = FALSE
              AND ($8::INT4 IS NULL OR $8::INT4 >= slots_filled)
            RETURNING {}
            "#,
            VACANCY_COLUMNS
        );
        let updated = sqlx::query_as::<_, Vacancy>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.dept)
            .bind(&changes.location)
            .bind(changes.salary)
            .bind(&changes.description)
            .bind(&changes.requirements)
            .bind(changes.total_slots)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(vacancy) => Ok(vacancy),
            None => {
                let current = self.find_vacancy(id).await?;
                if current.is_closed {
                    Err(Error::Conflict("Vacancy is closed".to_string()))
                } else {
                    Err(Error::Conflict(format!(
                        "Total slots cannot drop below the {} already filled",
                        current.slots.filled
                    )))
                }
            }
        }
    }

    async fn list_vacancies_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vacancy>> {
        let query = format!(
            "SELECT {} FROM vacancies WHERE owner_id = $1 ORDER BY created_at DESC",
            VACANCY_COLUMNS
        );
        let items = sqlx::query_as::<_, Vacancy>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_open_vacancies_for(&self, applicant_id: Uuid) -> Result<Vec<Vacancy>> {
        let query = format!(
            "SELECT {} FROM vacancies \
             WHERE is_closed = FALSE \
               AND id NOT IN (SELECT vacancy_id FROM applications WHERE applicant_id = $1) \
             ORDER BY created_at DESC",
            VACANCY_COLUMNS
        );
        let items = sqlx::query_as::<_, Vacancy>(&query)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn close_vacancy(&self, id: Uuid, message: &str) -> Result<ClosedVacancy> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "UPDATE vacancies SET is_closed = TRUE, updated_at = NOW() \
             WHERE id = $1 AND is_closed = FALSE \
             RETURNING {}",
            VACANCY_COLUMNS
        );
        let closed = sqlx::query_as::<_, Vacancy>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(vacancy) = closed else {
            tx.rollback().await?;
            self.find_vacancy(id).await?;
            return Err(Error::Conflict("Vacancy is already closed".to_string()));
        };

        let applications_closed = bulk_close_applications(&mut tx, id, message).await?;
        tx.commit().await?;

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
        let query = format!(
            "SELECT {} FROM applications WHERE vacancy_id = $1 AND applicant_id = $2",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(vacancy_id)
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }

    async fn get_application(&self, id: Uuid) -> Result<Application> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".to_string()))
    }

    async fn create_application(&self, application: NewApplication) -> Result<Application> {
        let query = format!(
            r#"
            INSERT INTO applications (id, vacancy_id, applicant_id, status, details_exp, details_notes, resume_path)
            SELECT $1, v.id, $3, 'Applied'::application_status, $4, $5, $6
            FROM vacancies v
            WHERE v.id = $2 AND v.is_closed = FALSE AND v.slots_filled < v.slots_total
            FOR SHARE OF v
            ON CONFLICT (vacancy_id, applicant_id) DO NOTHING
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Application>(&query)
            .bind(Uuid::new_v4())
            .bind(application.vacancy_id)
            .bind(application.applicant_id)
            .bind(&application.details.exp)
            .bind(&application.details.notes)
            .bind(&application.resume_path)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        // Nothing inserted: report which precondition failed.
        if self
            .find_application(application.vacancy_id, application.applicant_id)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }
        let vacancy = self.find_vacancy(application.vacancy_id).await?;
        if vacancy.is_closed {
            Err(Error::Conflict("Vacancy is closed".to_string()))
        } else {
            Err(Error::Conflict("No slots remaining".to_string()))
        }
    }

    async fn commit_transition(&self, transition: StatusTransition) -> Result<Application> {
        let mut tx = self.pool.begin().await?;

        let vacancy_ok = match transition.slots {
            SlotEffect::Keep => lock_open_vacancy(&mut tx, transition.vacancy_id).await?,
            SlotEffect::Claim => {
                update_vacancy_slots(&mut tx, transition.vacancy_id, 1, true).await?
            }
            SlotEffect::Release => {
                update_vacancy_slots(&mut tx, transition.vacancy_id, -1, false).await?
            }
        };
        if !vacancy_ok {
            tx.rollback().await?;
            return Err(match transition.slots {
                SlotEffect::Claim => Error::Conflict(
                    "Cannot hire: all slots for this role are already filled".to_string(),
                ),
                _ => Error::Conflict("Vacancy is closed".to_string()),
            });
        }

        let updated = update_application_status(
            &mut tx,
            transition.application_id,
            transition.from,
            transition.to,
        )
        .await?;
        let Some(application) = updated else {
            tx.rollback().await?;
            return Err(Error::Conflict(format!(
                "Application is no longer {}; reload and retry",
                transition.from
            )));
        };

        tx.commit().await?;
        Ok(application)
    }

    async fn list_applications_for_vacancy(&self, vacancy_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE vacancy_id = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&query)
            .bind(vacancy_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_applications_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE applicant_id = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&query)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_active_applications_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications \
             WHERE job_removed = FALSE \
               AND vacancy_id IN (SELECT id FROM vacancies WHERE owner_id = $1) \
             ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account> {
        let query = format!(
            "INSERT INTO accounts (id, name, email, role, meta_company, meta_experience, cv_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(account.id)
            .bind(&account.name)
            .bind(&account.email)
            .bind(account.role)
            .bind(&account.meta.company)
            .bind(&account.meta.experience)
            .bind(&account.cv_path)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    if db.constraint() == Some("accounts_email_unique") {
                        Error::Conflict("Email is already registered".to_string())
                    } else {
                        Error::Conflict("Profile already exists".to_string())
                    }
                }
                other => other.into(),
            })
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>> {
        let query = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn update_account(&self, id: Uuid, changes: AccountChanges) -> Result<Account> {
        let query = format!(
            r#"
            UPDATE accounts
            SET
                name = COALESCE($2, name),
                meta_company = COALESCE($3, meta_company),
                meta_experience = COALESCE($4, meta_experience),
                cv_path = COALESCE($5, cv_path),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.company)
            .bind(&changes.experience)
            .bind(&changes.cv_path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
