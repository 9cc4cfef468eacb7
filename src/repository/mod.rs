//! Repository layer for catalog storage
//!
//! Handlers never see a concrete store: the catalog service talks to the
//! traits below, backed either by PostgreSQL or by the in-memory store.

pub mod book_instances;
pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceDetail, BookInstanceFields},
};

pub use memory::MemoryStore;

/// Persistence of book instances
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    /// All instances, book resolved, in creation order
    async fn find_all(&self) -> AppResult<Vec<BookInstanceDetail>>;

    /// One instance with its book resolved
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>>;

    /// Insert a new instance; the store assigns the id
    async fn create(&self, fields: &BookInstanceFields) -> AppResult<BookInstance>;

    /// Overwrite all mutable fields; `None` when no record has this id
    async fn update(&self, id: Uuid, fields: &BookInstanceFields) -> AppResult<Option<BookInstance>>;

    /// Remove by id. Removing a missing id is not an error.
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Connectivity check used by the readiness endpoint
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Read access to the books that instances reference
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// Id and title of every book, ordered by title
    async fn list_books(&self) -> AppResult<Vec<Book>>;
}

/// Main repository struct holding the store handles
#[derive(Clone)]
pub struct Repository {
    pub book_instances: Arc<dyn BookInstanceStore>,
    pub books: Arc<dyn BookCatalog>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool)),
        }
    }

    /// Create a repository backed by an in-memory store
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            book_instances: Arc::new(store.clone()),
            books: Arc::new(store),
        }
    }

    /// Assemble a repository from arbitrary store implementations
    pub fn from_parts(
        book_instances: Arc<dyn BookInstanceStore>,
        books: Arc<dyn BookCatalog>,
    ) -> Self {
        Self {
            book_instances,
            books,
        }
    }
}
