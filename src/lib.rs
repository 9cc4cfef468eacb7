//! Local Library catalog
//!
//! Server-rendered pages for managing book instances (physical copies of
//! books): list, detail, create, update and delete, backed by PostgreSQL or
//! an in-memory store.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::Repository;
use services::Services;
use views::{HtmlRenderer, Renderer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
    pub views: Arc<dyn Renderer>,
}

impl AppState {
    /// State rendering the built-in HTML pages
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self::with_renderer(config, repository, Arc::new(HtmlRenderer))
    }

    pub fn with_renderer(
        config: AppConfig,
        repository: Repository,
        views: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(Services::new(repository)),
            views,
        }
    }
}
