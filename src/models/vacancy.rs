use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_TOTAL_SLOTS: i32 = 3;

/// Hiring capacity of a vacancy. `filled` tracks the applications currently `Hired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Slots {
    #[sqlx(rename = "slots_total")]
    pub total: i32,
    #[sqlx(rename = "slots_filled")]
    pub filled: i32,
}

impl Slots {
    pub fn new(total: i32) -> Self {
        Self { total, filled: 0 }
    }

    pub fn has_capacity(&self) -> bool {
        self.filled < self.total
    }

    pub fn remaining(&self) -> i32 {
        (self.total - self.filled).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vacancy {
    pub id: Uuid,
    pub title: String,
    pub dept: String,
    pub location: String,
    #[schema(value_type = f64)]
    pub salary: Decimal,
    pub description: String,
    pub requirements: String,
    #[sqlx(flatten)]
    pub slots: Slots,
    pub owner_id: Uuid,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vacancy {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }
}

/// Fields of a vacancy about to be inserted; capacity starts empty.
#[derive(Debug, Clone)]
pub struct NewVacancy {
    pub title: String,
    pub dept: String,
    pub location: String,
    pub salary: Decimal,
    pub description: String,
    pub requirements: String,
    pub total_slots: i32,
    pub owner_id: Uuid,
}

/// Partial edit. `None` leaves a field untouched. `slots.filled`, the owner and
/// the closed flag are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct VacancyChanges {
    pub title: Option<String>,
    pub dept: Option<String>,
    pub location: Option<String>,
    pub salary: Option<Decimal>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub total_slots: Option<i32>,
}

impl VacancyChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.dept.is_none()
            && self.location.is_none()
            && self.salary.is_none()
            && self.description.is_none()
            && self.requirements.is_none()
            && self.total_slots.is_none()
    }

    pub fn apply_to(&self, vacancy: &mut Vacancy) {
        if let Some(title) = &self.title {
            vacancy.title = title.clone();
        }
        if let Some(dept) = &self.dept {
            vacancy.dept = dept.clone();
        }
        if let Some(location) = &self.location {
            vacancy.location = location.clone();
        }
        if let Some(salary) = self.salary {
            vacancy.salary = salary;
        }
        if let Some(description) = &self.description {
            vacancy.description = description.clone();
        }
        if let Some(requirements) = &self.requirements {
            vacancy.requirements = requirements.clone();
        }
        if let Some(total) = self.total_slots {
            vacancy.slots.total = total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_exhausted_when_filled_reaches_total() {
        let mut slots = Slots::new(2);
        assert!(slots.has_capacity());
        slots.filled = 2;
        assert!(!slots.has_capacity());
        assert_eq!(slots.remaining(), 0);
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(VacancyChanges::default().is_empty());
        let changes = VacancyChanges {
            total_slots: Some(4),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
