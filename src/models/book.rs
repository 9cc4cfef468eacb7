//! Book reference model
//!
//! Only the fields needed to label and select a book are loaded here.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::CATALOG_ROOT;

/// Book as seen from the book instance pages: id and title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: String,
    pub title: String,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
        }
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Detail page of the book
    pub fn url(&self) -> String {
        format!("{}/book/{}", CATALOG_ROOT, self.id)
    }
}
