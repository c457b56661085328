pub mod account;
pub mod application;
pub mod vacancy;
