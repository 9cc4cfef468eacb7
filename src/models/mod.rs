//! Data models for the catalog

pub mod book;
pub mod book_instance;

// Re-export commonly used types
pub use book::Book;
pub use book_instance::{
    BookInstance, BookInstanceDetail, BookInstanceDraft, BookInstanceFields, BookInstanceForm,
    BookInstanceStatus, BookInstanceView, FieldError,
};

/// Path under which every catalog page is mounted
pub const CATALOG_ROOT: &str = "/catalog";

/// Location of the book instance list page
pub fn book_instance_list_url() -> String {
    format!("{}/bookinstances", CATALOG_ROOT)
}
