pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::database::{
    pool::{create_pool, run_migrations},
    EntityStore, MemoryStore, PgStore,
};
use crate::error::Result;
use crate::middleware::auth::Authenticator;
use crate::services::{
    account_service::AccountService, application_service::ApplicationService,
    resume_store::ResumeStore, vacancy_service::VacancyService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub vacancy_service: VacancyService,
    pub application_service: ApplicationService,
    pub account_service: AccountService,
    pub resume_store: ResumeStore,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: &Config) -> Self {
        let vacancy_service = VacancyService::new(store.clone());
        let application_service = ApplicationService::new(store.clone());
        let resume_store = ResumeStore::new(&config.uploads_dir, config.max_upload_bytes);
        let account_service = AccountService::new(store.clone(), resume_store.clone());
        let authenticator = Authenticator::new(&config.jwt_secret);

        Self {
            store,
            vacancy_service,
            application_service,
            account_service,
            resume_store,
            authenticator,
        }
    }
}

/// Opens the configured backing store, migrating Postgres before handing it out.
pub async fn build_store(config: &Config) -> Result<Arc<dyn EntityStore>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(config).await?;
            run_migrations(&pool).await?;
            info!("Connected to Postgres and applied migrations");
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
