pub mod account_service;
pub mod application_service;
pub mod resume_store;
pub mod vacancy_service;
