//! Book instance catalog service
//!
//! Orchestrates the store and the validation pipeline for every catalog page.
//! Store failures are returned untouched; validation failures are not errors
//! and come back as [`Submission::Rejected`].

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInstance, BookInstanceDetail, BookInstanceDraft, BookInstanceForm, FieldError},
    repository::Repository,
    validation::{check_book_instance, Checked},
};

pub const MSG_NOT_FOUND: &str = "book instance not found";

/// Result of submitting the create or update form
#[derive(Debug)]
pub enum Submission {
    /// The record was written
    Saved(BookInstance),
    /// Nothing was written; the form has to be shown again
    Rejected {
        draft: BookInstanceDraft,
        errors: Vec<FieldError>,
        books: Vec<Book>,
    },
}

/// Path ids that are not valid identifiers match no record
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id.trim()).ok()
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// All book instances with their book
    pub async fn list_book_instances(&self) -> AppResult<Vec<BookInstanceDetail>> {
        self.repository.book_instances.find_all().await
    }

    /// Look up a book instance, `None` when absent
    pub async fn find_book_instance(&self, id: &str) -> AppResult<Option<BookInstanceDetail>> {
        match parse_id(id) {
            Some(id) => self.repository.book_instances.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Get a book instance that must exist
    pub async fn get_book_instance(&self, id: &str) -> AppResult<BookInstanceDetail> {
        self.find_book_instance(id)
            .await?
            .ok_or_else(|| AppError::NotFound(MSG_NOT_FOUND.to_string()))
    }

    /// Books offered by the form's selector
    pub async fn book_list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_books().await
    }

    /// Load an instance and the book list together for the update form.
    ///
    /// Both reads run concurrently; if either fails the whole load fails.
    pub async fn edit_book_instance(&self, id: &str) -> AppResult<(BookInstanceDetail, Vec<Book>)> {
        let (instance, books) = tokio::try_join!(self.find_book_instance(id), self.book_list())?;
        let instance = instance.ok_or_else(|| AppError::NotFound(MSG_NOT_FOUND.to_string()))?;
        Ok((instance, books))
    }

    /// Validate and store a new book instance
    pub async fn create_book_instance(&self, form: &BookInstanceForm) -> AppResult<Submission> {
        match check_book_instance(form, None) {
            Checked::Valid(fields) => {
                let created = self.repository.book_instances.create(&fields).await?;
                tracing::info!(id = %created.id, book = %created.book_id, "book instance created");
                Ok(Submission::Saved(created))
            }
            Checked::Invalid { draft, errors } => self.reject(draft, errors).await,
        }
    }

    /// Validate and overwrite an existing book instance
    pub async fn update_book_instance(&self, id: &str, form: &BookInstanceForm) -> AppResult<Submission> {
        let record_id = parse_id(id);
        match check_book_instance(form, record_id) {
            Checked::Valid(fields) => {
                let record_id =
                    record_id.ok_or_else(|| AppError::NotFound(MSG_NOT_FOUND.to_string()))?;
                let updated = self
                    .repository
                    .book_instances
                    .update(record_id, &fields)
                    .await?
                    .ok_or_else(|| AppError::NotFound(MSG_NOT_FOUND.to_string()))?;
                tracing::info!(id = %updated.id, "book instance updated");
                Ok(Submission::Saved(updated))
            }
            Checked::Invalid { draft, errors } => self.reject(draft, errors).await,
        }
    }

    /// Remove a book instance. Unknown ids are silently accepted.
    pub async fn delete_book_instance(&self, id: &str) -> AppResult<()> {
        match parse_id(id) {
            Some(id) => {
                self.repository.book_instances.delete(id).await?;
                tracing::info!(%id, "book instance deleted");
            }
            None => tracing::debug!(id, "delete requested for malformed id"),
        }
        Ok(())
    }

    /// Store connectivity for the readiness endpoint
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.book_instances.ping().await
    }

    async fn reject(&self, draft: BookInstanceDraft, errors: Vec<FieldError>) -> AppResult<Submission> {
        tracing::debug!(errors = errors.len(), "book instance form rejected");
        let books = self.book_list().await?;
        Ok(Submission::Rejected { draft, errors, books })
    }
}
