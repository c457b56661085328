pub mod account_dto;
pub mod application_dto;
pub mod vacancy_dto;
