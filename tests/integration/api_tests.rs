//! API integration tests
//!
//! Drive the full router against the in-memory store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;
use uuid::Uuid;

use locallibrary_server::{
    api::create_router,
    config::DatabaseBackend,
    models::Book,
    repository::{BookInstanceStore, MemoryStore, Repository},
    AppConfig, AppState,
};

struct TestApp {
    router: Router,
    store: MemoryStore,
    book: Book,
}

impl TestApp {
    async fn new() -> Self {
        let store = MemoryStore::new();
        let book = Book::new("The Dispossessed");
        store.insert_book(book.clone()).await;
        store.insert_book(Book::new("A Wizard of Earthsea")).await;

        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        let state = AppState::new(config, Repository::in_memory(store.clone()));
        Self {
            router: create_router(state),
            store,
            book,
        }
    }

    async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(&self, uri: &str, body: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Create an instance through the form and return its id
    async fn create_instance(&self, imprint: &str) -> Uuid {
        let response = self
            .post_form(
                "/catalog/bookinstance/create",
                &format!("book={}&imprint={}&status=Available&due_back=", self.book.id, imprint),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = location(&response);
        location
            .rsplit('/')
            .next()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("redirect ends with the new id")
    }
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_check() {
    let app = TestApp::new().await;

    let response = app.get("/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_empty_list() {
    let app = TestApp::new().await;

    let response = app.get("/catalog/bookinstances").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Book Instance List"));
    assert!(body.contains("There are no book copies in this library."));
}

#[tokio::test]
async fn test_create_form_lists_books() {
    let app = TestApp::new().await;

    let response = app.get("/catalog/bookinstance/create").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Create BookInstance"));
    assert!(body.contains("The Dispossessed"));
    assert!(body.contains("A Wizard of Earthsea"));
}

#[tokio::test]
async fn test_create_redirects_to_new_record() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=Penguin&status=Available&due_back=", app.book.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = location(&response);
    assert!(location.starts_with("/catalog/bookinstance/"));

    let id = Uuid::parse_str(location.rsplit('/').next().unwrap()).unwrap();
    let stored = app.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.imprint, "Penguin");
    assert_eq!(stored.due_back, None);
    assert_eq!(stored.book_id, app.book.id);
}

#[tokio::test]
async fn test_create_accepts_plain_book_reference() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            "book=b1&imprint=Penguin&status=Available&due_back=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = location(&response);
    let id = Uuid::parse_str(location.trim_start_matches("/catalog/bookinstance/")).unwrap();
    let stored = app.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.book_id, "b1");
    assert_eq!(stored.due_back, None);
    assert_eq!(stored.book, None);

    let body = body_text(app.get(&location).await).await;
    assert!(body.contains("(unknown book)"));
}

#[tokio::test]
async fn test_create_resolves_book_with_plain_id() {
    let app = TestApp::new().await;
    app.store.insert_book(Book::with_id("b1", "Kindred")).await;

    let response = app
        .post_form("/catalog/bookinstance/create", "book=b1&imprint=Beacon&status=Loaned")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = body_text(app.get(&location(&response)).await).await;
    assert!(body.contains("<a href=\"/catalog/book/b1\">Kindred</a>"));
}

#[tokio::test]
async fn test_undecodable_form_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/catalog/bookinstance/create")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("<h2>400</h2>"));
    assert_eq!(app.store.instance_count().await, 0);
}

#[tokio::test]
async fn test_create_sanitizes_input() {
    let app = TestApp::new().await;

    let id = app.create_instance("%20%20Harper%20%26%20Row%20").await;

    let stored = app.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.imprint, "Harper &amp; Row");
}

#[tokio::test]
async fn test_create_without_book_rerenders_form() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            "book=&imprint=Penguin&status=Available",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("book name must be specified"));
    assert!(!body.contains("publisher must be specified"));
    assert!(body.contains("value=\"Penguin\""));
    assert_eq!(app.store.instance_count().await, 0);
}

#[tokio::test]
async fn test_create_collects_every_error() {
    let app = TestApp::new().await;

    let response = app
        .post_form("/catalog/bookinstance/create", "book=&imprint=&due_back=someday")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("book name must be specified"));
    assert!(body.contains("publisher must be specified"));
    assert!(body.contains("invalid date"));
    assert_eq!(app.store.instance_count().await, 0);
}

#[tokio::test]
async fn test_rejected_form_keeps_selected_book() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            "/catalog/bookinstance/create",
            &format!("book={}&imprint=&status=Loaned", app.book.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains(&format!("<option value=\"{}\" selected>", app.book.id)));
    assert!(body.contains("<option value=\"Loaned\" selected>"));
}

#[tokio::test]
async fn test_detail_and_list_show_record() {
    let app = TestApp::new().await;
    let id = app.create_instance("Harper").await;

    let response = app.get(&format!("/catalog/bookinstance/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("The Dispossessed"));
    assert!(body.contains("Harper"));

    assert!(body.contains(&format!("href=\"/catalog/bookinstance/{}/update\"", id)));

    let body = body_text(app.get("/catalog/bookinstances").await).await;
    assert!(body.contains(&format!("href=\"/catalog/bookinstance/{}\"", id)));
    assert!(body.contains("The Dispossessed : Harper"));
}

#[tokio::test]
async fn test_detail_not_found() {
    let app = TestApp::new().await;

    let response = app.get(&format!("/catalog/bookinstance/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("book instance not found"));

    let response = app.get("/catalog/bookinstance/not-a-real-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_form_not_found() {
    let app = TestApp::new().await;

    let response = app
        .get(&format!("/catalog/bookinstance/{}/update", Uuid::new_v4()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_form_is_prefilled() {
    let app = TestApp::new().await;
    let id = app.create_instance("Harper").await;

    let response = app.get(&format!("/catalog/bookinstance/{}/update", id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Update BookInstance"));
    assert!(body.contains("value=\"Harper\""));
    assert!(body.contains(&format!("<option value=\"{}\" selected>", app.book.id)));
}

#[tokio::test]
async fn test_update_overwrites_record() {
    let app = TestApp::new().await;
    let id = app.create_instance("Harper").await;

    let response = app
        .post_form(
            &format!("/catalog/bookinstance/{}/update", id),
            &format!("book={}&imprint=Gollancz&status=Loaned&due_back=2024-11-05", app.book.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/catalog/bookinstance/{}", id));

    let stored = app.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.imprint, "Gollancz");
    assert_eq!(stored.status.as_str(), "Loaned");
    assert_eq!(stored.due_back, chrono::NaiveDate::from_ymd_opt(2024, 11, 5));
    assert_eq!(app.store.instance_count().await, 1);

    let body = body_text(app.get(&format!("/catalog/bookinstance/{}", id)).await).await;
    assert!(body.contains("November 5th, 2024"));
}

#[tokio::test]
async fn test_invalid_update_leaves_record_untouched() {
    let app = TestApp::new().await;
    let id = app.create_instance("Harper").await;

    let response = app
        .post_form(
            &format!("/catalog/bookinstance/{}/update", id),
            &format!("book={}&imprint=&status=Loaned", app.book.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("publisher must be specified"));

    let stored = app.store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.imprint, "Harper");
}

#[tokio::test]
async fn test_update_of_missing_record_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .post_form(
            &format!("/catalog/bookinstance/{}/update", Uuid::new_v4()),
            &format!("book={}&imprint=Gollancz&status=Loaned", app.book.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.instance_count().await, 0);
}

#[tokio::test]
async fn test_delete_confirmation_and_missing_redirect() {
    let app = TestApp::new().await;
    let id = app.create_instance("Harper").await;

    let response = app.get(&format!("/catalog/bookinstance/{}/delete", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Delete BookInstance"));
    assert!(body.contains(&format!("name=\"id\" value=\"{}\"", id)));

    let response = app
        .get(&format!("/catalog/bookinstance/{}/delete", Uuid::new_v4()))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/catalog/bookinstances");
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = TestApp::new().await;
    let id = app.create_instance("Harper").await;
    let uri = format!("/catalog/bookinstance/{}/delete", id);

    for _ in 0..2 {
        let response = app.post_form(&uri, &format!("id={}", id)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/catalog/bookinstances");
    }
    assert_eq!(app.store.instance_count().await, 0);
}

#[tokio::test]
async fn test_delete_uses_body_id() {
    let app = TestApp::new().await;
    let kept = app.create_instance("Harper").await;
    let removed = app.create_instance("Gollancz").await;

    let response = app
        .post_form(
            &format!("/catalog/bookinstance/{}/delete", kept),
            &format!("id={}", removed),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(app.store.find_by_id(kept).await.unwrap().is_some());
    assert!(app.store.find_by_id(removed).await.unwrap().is_none());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["paths"]["/catalog/bookinstances"].is_object());
}
