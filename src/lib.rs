//! Library Catalog Server
//!
//! A REST JSON API for a small library catalog: authors, genres and books,
//! with filtering, sorting and pagination on the book listing.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::Services;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
}

impl AppState {
    /// Connect to the configured database, create missing tables and wire
    /// up the services.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let repository = Repository::connect(&config.database).await?;
        repository.init_schema().await?;

        Ok(Self {
            services: Arc::new(Services::new(repository)),
        })
    }
}
