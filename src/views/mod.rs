//! Page rendering
//!
//! Handlers hand a view name and a JSON context to a [`Renderer`]; the HTML
//! implementation lives in [`html`].

pub mod html;

use serde_json::Value;

use crate::error::AppResult;

pub use html::HtmlRenderer;

pub const VIEW_LIST: &str = "bookinstance_list";
pub const VIEW_DETAIL: &str = "bookinstance_detail";
pub const VIEW_FORM: &str = "bookinstance_form";
pub const VIEW_DELETE: &str = "bookinstance_delete";

/// Turns a named view and its context into a page body
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, context: &Value) -> AppResult<String>;
}
