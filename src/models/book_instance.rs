//! Book instance (physical copy) model and related types

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{book::Book, CATALOG_ROOT};

/// Availability of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Available,
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is outside the known set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown book instance status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BookInstanceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Stored book instance, book not resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: String,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn from_fields(id: Uuid, fields: BookInstanceFields) -> Self {
        Self {
            id,
            book_id: fields.book_id,
            imprint: fields.imprint,
            status: fields.status,
            due_back: fields.due_back,
        }
    }

    pub fn url(&self) -> String {
        book_instance_url(&self.id)
    }
}

/// The four mutable fields of a book instance, already validated and sanitized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceFields {
    pub book_id: String,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

/// Book instance with its book resolved.
///
/// `book` is `None` when the referenced book no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstanceDetail {
    pub id: Uuid,
    pub book_id: String,
    pub book: Option<Book>,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceDetail {
    pub fn url(&self) -> String {
        book_instance_url(&self.id)
    }

    pub fn due_back_formatted(&self) -> Option<String> {
        self.due_back.map(format_due_back)
    }
}

/// Detail page of a book instance
pub fn book_instance_url(id: &Uuid) -> String {
    format!("{}/bookinstance/{}", CATALOG_ROOT, id)
}

/// Long form date used on pages, e.g. "January 5th, 2024"
pub fn format_due_back(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}

/// Book reference as handed to views
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Book instance as handed to views, with derived fields filled in
#[derive(Debug, Clone, Serialize)]
pub struct BookInstanceView {
    pub id: Uuid,
    pub url: String,
    pub book_id: String,
    pub book: Option<BookView>,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
    pub due_back_formatted: Option<String>,
}

impl From<&BookInstanceDetail> for BookInstanceView {
    fn from(detail: &BookInstanceDetail) -> Self {
        Self {
            id: detail.id,
            url: detail.url(),
            book_id: detail.book_id.clone(),
            book: detail.book.as_ref().map(|book| BookView {
                id: book.id.clone(),
                title: book.title.clone(),
                url: book.url(),
            }),
            imprint: detail.imprint.clone(),
            status: detail.status,
            due_back: detail.due_back,
            due_back_formatted: detail.due_back_formatted(),
        }
    }
}

/// Raw form body submitted by the create and update forms
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookInstanceForm {
    /// Id of the book selected in the form
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub imprint: String,
    #[serde(default)]
    pub status: String,
    /// ISO-8601 date, empty when the copy is not lent
    #[serde(default)]
    pub due_back: Option<String>,
}

/// Sanitized form values, carried back into the form when validation fails
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct BookInstanceDraft {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "book name must be specified"))]
    pub book: String,
    #[validate(length(min = 1, message = "publisher must be specified"))]
    pub imprint: String,
    pub status: String,
    pub due_back: Option<NaiveDate>,
}

impl From<&BookInstanceDetail> for BookInstanceDraft {
    fn from(detail: &BookInstanceDetail) -> Self {
        Self {
            id: Some(detail.id),
            book: detail.book_id.clone(),
            imprint: detail.imprint.clone(),
            status: detail.status.to_string(),
            due_back: detail.due_back,
        }
    }
}

/// A single field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            msg: msg.into(),
        }
    }
}
