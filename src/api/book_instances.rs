//! Book instance pages
//!
//! Every handler either renders a view or redirects. Validation failures are
//! rendered back into the form with status 200; everything else that goes
//! wrong is handed to the error sink as an [`AppError`].

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use super::FormBody;
use crate::{
    error::AppResult,
    models::{
        book_instance_list_url, Book, BookInstanceDraft, BookInstanceForm, BookInstanceView,
        FieldError,
    },
    services::catalog::Submission,
    views::{VIEW_DELETE, VIEW_DETAIL, VIEW_FORM, VIEW_LIST},
    AppState,
};

pub const TITLE_LIST: &str = "Book Instance List";
pub const TITLE_DETAIL: &str = "Book:";
pub const TITLE_CREATE: &str = "Create BookInstance";
pub const TITLE_UPDATE: &str = "Update BookInstance";
pub const TITLE_DELETE: &str = "Delete BookInstance";

/// Body of the delete confirmation form
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteForm {
    /// Id of the book instance to remove
    #[serde(default)]
    pub id: String,
}

fn render(state: &AppState, view: &str, context: Value) -> AppResult<Html<String>> {
    state.views.render(view, &context).map(Html)
}

fn render_form(
    state: &AppState,
    title: &str,
    books: &[Book],
    draft: &BookInstanceDraft,
    errors: Option<&[FieldError]>,
) -> AppResult<Html<String>> {
    let mut context = json!({
        "title": title,
        "book_list": books,
        "selected_book": draft.book,
        "bookinstance": draft,
    });
    if let Some(errors) = errors {
        context["errors"] = json!(errors);
    }
    render(state, VIEW_FORM, context)
}

fn submission_response(state: &AppState, title: &str, submission: Submission) -> AppResult<Response> {
    match submission {
        Submission::Saved(instance) => Ok(Redirect::to(&instance.url()).into_response()),
        Submission::Rejected {
            draft,
            errors,
            books,
        } => Ok(render_form(state, title, &books, &draft, Some(&errors))?.into_response()),
    }
}

/// List all book instances
#[utoipa::path(
    get,
    path = "/catalog/bookinstances",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Book instance list page", content_type = "text/html", body = String),
        (status = 500, description = "Store failure")
    )
)]
pub async fn bookinstance_list(State(state): State<AppState>) -> AppResult<Html<String>> {
    let instances = state.services.catalog.list_book_instances().await?;
    let views: Vec<BookInstanceView> = instances.iter().map(BookInstanceView::from).collect();

    render(
        &state,
        VIEW_LIST,
        json!({ "title": TITLE_LIST, "bookinstance_list": views }),
    )
}

/// Show one book instance
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Book instance detail page", content_type = "text/html", body = String),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn bookinstance_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let instance = state.services.catalog.get_book_instance(&id).await?;

    render(
        &state,
        VIEW_DETAIL,
        json!({ "title": TITLE_DETAIL, "bookinstance": BookInstanceView::from(&instance) }),
    )
}

/// Show the empty create form
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    responses(
        (status = 200, description = "Create form", content_type = "text/html", body = String)
    )
)]
pub async fn bookinstance_create_get(State(state): State<AppState>) -> AppResult<Html<String>> {
    let books = state.services.catalog.book_list().await?;

    render(
        &state,
        VIEW_FORM,
        json!({ "title": TITLE_CREATE, "book_list": books }),
    )
}

/// Create a book instance from the submitted form
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/create",
    tag = "bookinstances",
    request_body(content = BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created; redirects to the new book instance"),
        (status = 200, description = "Form shown again with validation errors", content_type = "text/html", body = String),
        (status = 400, description = "Form body could not be decoded")
    )
)]
pub async fn bookinstance_create_post(
    State(state): State<AppState>,
    FormBody(form): FormBody<BookInstanceForm>,
) -> AppResult<Response> {
    let submission = state.services.catalog.create_book_instance(&form).await?;
    submission_response(&state, TITLE_CREATE, submission)
}

/// Ask for confirmation before deleting
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Delete confirmation page", content_type = "text/html", body = String),
        (status = 303, description = "No such book instance; redirects to the list")
    )
)]
pub async fn bookinstance_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(instance) = state.services.catalog.find_book_instance(&id).await? else {
        return Ok(Redirect::to(&book_instance_list_url()).into_response());
    };

    Ok(render(
        &state,
        VIEW_DELETE,
        json!({ "title": TITLE_DELETE, "bookinstance": BookInstanceView::from(&instance) }),
    )?
    .into_response())
}

/// Delete the book instance named in the form body
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/delete",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Ignored; the form body names the record")),
    request_body(content = DeleteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirects to the list, whether or not the record existed"),
        (status = 400, description = "Form body could not be decoded")
    )
)]
pub async fn bookinstance_delete_post(
    State(state): State<AppState>,
    FormBody(form): FormBody<DeleteForm>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_book_instance(&form.id).await?;
    Ok(Redirect::to(&book_instance_list_url()))
}

/// Show the update form filled with the stored values
#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Update form", content_type = "text/html", body = String),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn bookinstance_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let (instance, books) = state.services.catalog.edit_book_instance(&id).await?;
    let draft = BookInstanceDraft::from(&instance);

    render_form(&state, TITLE_UPDATE, &books, &draft, None)
}

/// Overwrite a book instance from the submitted form
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/update",
    tag = "bookinstances",
    params(("id" = String, Path, description = "Book instance ID")),
    request_body(content = BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated; redirects to the book instance"),
        (status = 200, description = "Form shown again with validation errors", content_type = "text/html", body = String),
        (status = 400, description = "Form body could not be decoded"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn bookinstance_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormBody(form): FormBody<BookInstanceForm>,
) -> AppResult<Response> {
    let submission = state.services.catalog.update_book_instance(&id, &form).await?;
    submission_response(&state, TITLE_UPDATE, submission)
}
