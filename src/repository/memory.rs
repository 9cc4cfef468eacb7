//! In-memory catalog store
//!
//! Same contract as the PostgreSQL repositories. Instances keep insertion
//! order; nothing checks that an instance's book exists.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookCatalog, BookInstanceStore};
use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceDetail, BookInstanceFields},
};

#[derive(Default)]
struct MemoryState {
    books: IndexMap<String, Book>,
    instances: IndexMap<Uuid, BookInstance>,
}

impl MemoryState {
    fn resolve(&self, instance: &BookInstance) -> BookInstanceDetail {
        BookInstanceDetail {
            id: instance.id,
            book_id: instance.book_id.clone(),
            book: self.books.get(&instance.book_id).cloned(),
            imprint: instance.imprint.clone(),
            status: instance.status,
            due_back: instance.due_back,
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one book per title
    pub fn with_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let books = titles
            .into_iter()
            .map(|title| {
                let book = Book::new(title);
                (book.id.clone(), book)
            })
            .collect();
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                books,
                instances: IndexMap::new(),
            })),
        }
    }

    pub async fn insert_book(&self, book: Book) {
        self.state.write().await.books.insert(book.id.clone(), book);
    }

    pub async fn instance_count(&self) -> usize {
        self.state.read().await.instances.len()
    }
}

#[async_trait]
impl BookInstanceStore for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let state = self.state.read().await;
        Ok(state.instances.values().map(|i| state.resolve(i)).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let state = self.state.read().await;
        Ok(state.instances.get(&id).map(|i| state.resolve(i)))
    }

    async fn create(&self, fields: &BookInstanceFields) -> AppResult<BookInstance> {
        let instance = BookInstance::from_fields(Uuid::new_v4(), fields.clone());
        self.state
            .write()
            .await
            .instances
            .insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn update(&self, id: Uuid, fields: &BookInstanceFields) -> AppResult<Option<BookInstance>> {
        let mut state = self.state.write().await;
        Ok(state.instances.get_mut(&id).map(|slot| {
            *slot = BookInstance::from_fields(id, fields.clone());
            slot.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        // shift_remove keeps the remaining instances in creation order
        self.state.write().await.instances.shift_remove(&id);
        Ok(())
    }
}

#[async_trait]
impl BookCatalog for MemoryStore {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let mut books: Vec<Book> = self.state.read().await.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }
}
