//! Built-in HTML pages for the book instance catalog

use axum::http::StatusCode;
use serde_json::Value;

use super::{Renderer, VIEW_DELETE, VIEW_DETAIL, VIEW_FORM, VIEW_LIST};
use crate::{
    error::{AppError, AppResult},
    models::{book_instance_list_url, BookInstanceStatus, CATALOG_ROOT},
    validation::escape,
};

/// Renders the catalog views as self-contained HTML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &str, context: &Value) -> AppResult<String> {
        let title = text(&context["title"]);
        let content = match view {
            VIEW_LIST => list(context),
            VIEW_DETAIL => detail(context),
            VIEW_FORM => form(context),
            VIEW_DELETE => delete(context),
            other => return Err(AppError::Internal(format!("unknown view '{}'", other))),
        };
        Ok(layout(&title, &content))
    }
}

/// Error page used by the error sink
pub fn error_page(status: StatusCode, message: &str) -> String {
    layout(
        "Error",
        &format!(
            "<h1>{}</h1>\n<h2>{}</h2>\n",
            escape(message),
            status.as_u16()
        ),
    )
}

/// Escaped text of a JSON value; null renders as nothing
fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape(s),
        other => escape(&other.to_string()),
    }
}

/// Attribute value such as a link target. Only characters that could end the
/// attribute or open markup are escaped, so paths keep their slashes.
fn attr(value: &Value) -> String {
    let raw = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Imprint and status are escaped when the form is accepted, so they are
/// written out as stored.
fn stored(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => text(other),
    }
}

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\"/>\n  \
         <title>{title}</title>\n</head>\n<body>\n<nav>\n  <a href=\"{list}\">All book-instances</a>\n  \
         <a href=\"{root}/bookinstance/create\">Create new book instance</a>\n</nav>\n<main>\n{content}</main>\n\
         </body>\n</html>\n",
        title = title,
        list = book_instance_list_url(),
        root = CATALOG_ROOT,
        content = content,
    )
}

fn book_title(instance: &Value) -> String {
    match &instance["book"] {
        Value::Null => "(unknown book)".to_string(),
        book => text(&book["title"]),
    }
}

fn due_back_line(instance: &Value) -> String {
    if instance["status"] == BookInstanceStatus::Available.as_str() {
        return String::new();
    }
    match &instance["due_back_formatted"] {
        Value::Null => String::new(),
        due => format!(" <span>(Due: {})</span>", text(due)),
    }
}

fn list(context: &Value) -> String {
    let mut out = format!("<h1>{}</h1>\n", text(&context["title"]));
    let instances = context["bookinstance_list"].as_array().cloned().unwrap_or_default();
    if instances.is_empty() {
        out.push_str("<p>There are no book copies in this library.</p>\n");
        return out;
    }

    out.push_str("<ul>\n");
    for instance in &instances {
        out.push_str(&format!(
            "  <li><a href=\"{}\">{} : {}</a> - <span class=\"status\">{}</span>{}</li>\n",
            attr(&instance["url"]),
            book_title(instance),
            stored(&instance["imprint"]),
            stored(&instance["status"]),
            due_back_line(instance),
        ));
    }
    out.push_str("</ul>\n");
    out
}

fn detail(context: &Value) -> String {
    let instance = &context["bookinstance"];
    let book_link = match &instance["book"] {
        Value::Null => book_title(instance),
        book => format!("<a href=\"{}\">{}</a>", attr(&book["url"]), text(&book["title"])),
    };

    let mut out = format!("<h1>ID: {}</h1>\n", text(&instance["id"]));
    out.push_str(&format!("<p><strong>Title:</strong> {}</p>\n", book_link));
    out.push_str(&format!("<p><strong>Imprint:</strong> {}</p>\n", stored(&instance["imprint"])));
    out.push_str(&format!("<p><strong>Status:</strong> {}</p>\n", stored(&instance["status"])));
    if instance["status"] != BookInstanceStatus::Available.as_str() {
        out.push_str(&format!(
            "<p><strong>Due back:</strong> {}</p>\n",
            text(&instance["due_back_formatted"])
        ));
    }
    out.push_str(&format!(
        "<hr/>\n<p><a href=\"{url}/delete\">Delete BookInstance</a></p>\n\
         <p><a href=\"{url}/update\">Update BookInstance</a></p>\n",
        url = attr(&instance["url"]),
    ));
    out
}

fn form(context: &Value) -> String {
    let instance = &context["bookinstance"];
    let selected_book = context["selected_book"].as_str().unwrap_or_default();
    let status = instance["status"].as_str().unwrap_or_default();

    let mut out = format!("<h1>{}</h1>\n<form method=\"POST\" action=\"\">\n", text(&context["title"]));

    out.push_str("  <label for=\"book\">Book:</label>\n  <select id=\"book\" name=\"book\" required>\n");
    for book in context["book_list"].as_array().into_iter().flatten() {
        let id = book["id"].as_str().unwrap_or_default();
        out.push_str(&format!(
            "    <option value=\"{}\"{}>{}</option>\n",
            attr(&book["id"]),
            if id == selected_book { " selected" } else { "" },
            text(&book["title"]),
        ));
    }
    out.push_str("  </select>\n");

    out.push_str(&format!(
        "  <label for=\"imprint\">Imprint:</label>\n  \
         <input id=\"imprint\" type=\"text\" name=\"imprint\" required value=\"{}\"/>\n",
        stored(&instance["imprint"]),
    ));
    out.push_str(&format!(
        "  <label for=\"due_back\">Date when book available:</label>\n  \
         <input id=\"due_back\" type=\"date\" name=\"due_back\" value=\"{}\"/>\n",
        text(&instance["due_back"]),
    ));

    out.push_str("  <label for=\"status\">Status:</label>\n  <select id=\"status\" name=\"status\" required>\n");
    for option in BookInstanceStatus::ALL {
        out.push_str(&format!(
            "    <option value=\"{0}\"{1}>{0}</option>\n",
            option.as_str(),
            if option.as_str().eq_ignore_ascii_case(status) { " selected" } else { "" },
        ));
    }
    out.push_str("  </select>\n  <button type=\"submit\">Submit</button>\n</form>\n");

    if let Some(errors) = context["errors"].as_array().filter(|errors| !errors.is_empty()) {
        out.push_str("<ul class=\"errors\">\n");
        for error in errors {
            out.push_str(&format!("  <li>{}</li>\n", text(&error["msg"])));
        }
        out.push_str("</ul>\n");
    }
    out
}

fn delete(context: &Value) -> String {
    let instance = &context["bookinstance"];
    let mut out = format!("<h1>{}</h1>\n", text(&context["title"]));
    out.push_str("<p>Do you really want to delete this BookInstance?</p>\n<div>\n");
    out.push_str(&format!("  <p><strong>ID:</strong> {}</p>\n", text(&instance["id"])));
    out.push_str(&format!("  <p><strong>Title:</strong> {}</p>\n", book_title(instance)));
    out.push_str(&format!("  <p><strong>Imprint:</strong> {}</p>\n", stored(&instance["imprint"])));
    out.push_str(&format!("  <p><strong>Status:</strong> {}</p>\n", stored(&instance["status"])));
    out.push_str("</div>\n");
    out.push_str(&format!(
        "<form method=\"POST\" action=\"\">\n  <input type=\"hidden\" name=\"id\" value=\"{}\"/>\n  \
         <button type=\"submit\">Delete</button>\n</form>\n",
        attr(&instance["id"]),
    ));
    out
}
