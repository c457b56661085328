use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::database::ClosedVacancy;
use crate::models::vacancy::{NewVacancy, Slots, Vacancy, VacancyChanges, DEFAULT_TOTAL_SLOTS};

fn validate_positive_salary(salary: &Decimal) -> Result<(), ValidationError> {
    if salary.is_sign_positive() && !salary.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("salary_must_be_positive"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVacancyPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub dept: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(custom(function = "validate_positive_salary"))]
    #[schema(value_type = f64)]
    pub salary: Decimal,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub requirements: String,
    #[validate(range(min = 1, message = "A vacancy needs at least one slot"))]
    pub total_slots: Option<i32>,
}

impl CreateVacancyPayload {
    pub fn into_new_vacancy(self, owner_id: Uuid) -> NewVacancy {
        NewVacancy {
            title: self.title.trim().to_string(),
            dept: self.dept.trim().to_string(),
            location: self.location.trim().to_string(),
            salary: self.salary,
            description: self.description,
            requirements: self.requirements,
            total_slots: self.total_slots.unwrap_or(DEFAULT_TOTAL_SLOTS),
            owner_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVacancyPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub dept: Option<String>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_positive_salary"))]
    #[schema(value_type = Option<f64>)]
    pub salary: Option<Decimal>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub requirements: Option<String>,
    #[validate(range(min = 1, message = "A vacancy needs at least one slot"))]
    pub total_slots: Option<i32>,
}

impl From<UpdateVacancyPayload> for VacancyChanges {
    fn from(value: UpdateVacancyPayload) -> Self {
        Self {
            title: value.title.map(|t| t.trim().to_string()),
            dept: value.dept.map(|d| d.trim().to_string()),
            location: value.location.map(|l| l.trim().to_string()),
            salary: value.salary,
            description: value.description,
            requirements: value.requirements,
            total_slots: value.total_slots,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VacancyResponse {
    pub id: Uuid,
    pub title: String,
    pub dept: String,
    pub location: String,
    #[schema(value_type = f64)]
    pub salary: Decimal,
    pub description: String,
    pub requirements: String,
    pub slots: Slots,
    pub remaining_slots: i32,
    pub owner_id: Uuid,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vacancy> for VacancyResponse {
    fn from(value: Vacancy) -> Self {
        Self {
            id: value.id,
            title: value.title,
            dept: value.dept,
            location: value.location,
            salary: value.salary,
            description: value.description,
            requirements: value.requirements,
            remaining_slots: value.slots.remaining(),
            slots: value.slots,
            owner_id: value.owner_id,
            is_closed: value.is_closed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Trimmed card shown in the candidate feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VacancyFeedItem {
    pub id: Uuid,
    pub title: String,
    pub dept: String,
    pub location: String,
    #[schema(value_type = f64)]
    pub salary: Decimal,
    pub slots: Slots,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vacancy> for VacancyFeedItem {
    fn from(value: Vacancy) -> Self {
        Self {
            id: value.id,
            title: value.title,
            dept: value.dept,
            location: value.location,
            salary: value.salary,
            slots: value.slots,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CloseVacancyResponse {
    pub msg: String,
    pub vacancy: VacancyResponse,
    pub applications_closed: u64,
}

impl From<ClosedVacancy> for CloseVacancyResponse {
    fn from(value: ClosedVacancy) -> Self {
        Self {
            msg: "Job closed successfully".to_string(),
            vacancy: value.vacancy.into(),
            applications_closed: value.applications_closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn payload() -> CreateVacancyPayload {
        CreateVacancyPayload {
            title: "Backend Engineer".into(),
            dept: "Platform".into(),
            location: "Remote".into(),
            salary: Decimal::from_i64(90_000).unwrap(),
            description: "Build services".into(),
            requirements: "Rust".into(),
            total_slots: None,
        }
    }

    #[test]
    fn create_payload_defaults_to_three_slots() {
        let new = payload().into_new_vacancy(Uuid::new_v4());
        assert_eq!(new.total_slots, DEFAULT_TOTAL_SLOTS);
    }

    #[test]
    fn non_positive_salary_and_slots_are_rejected() {
        let mut p = payload();
        p.salary = Decimal::ZERO;
        assert!(p.validate().is_err());

        let mut p = payload();
        p.total_slots = Some(0);
        assert!(p.validate().is_err());

        let update = UpdateVacancyPayload {
            salary: Some(Decimal::from_i64(-5).unwrap()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
