//! API integration tests: the full router, driven in-process

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_server::{api, config::AppConfig, AppState};

async fn app() -> Router {
    let state = AppState::build(AppConfig::in_memory())
        .await
        .expect("Failed to build in-memory state");
    api::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Genre "Фантастика", author "Айзек Азимов" and the book "Основание"
async fn seed_foundation(app: &Router) {
    let (status, genre) = post(app, "/api/v1/genres", json!({ "name": "Фантастика" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(genre["id"], 1);

    let (status, author) = post(
        app,
        "/api/v1/authors",
        json!({ "name": "Айзек Азимов", "bio": "Американский писатель-фантаст" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author["id"], 1);

    let (status, book) = post(
        app,
        "/api/v1/books",
        json!({
            "title": "Основание",
            "author_id": 1,
            "genre_id": 1,
            "isbn": "978-0-553-29335-0",
            "publication_year": 1951,
            "page_count": 255
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["author"]["name"], "Айзек Азимов");
    assert_eq!(book["genre"]["name"], "Фантастика");
    assert!(book["created_at"].is_string());
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app().await;

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = get(&app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/api/v1/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_end_to_end_listing_by_genre_name() {
    let app = app().await;
    seed_foundation(&app).await;

    // genre_name=фантаст
    let (status, body) = get(
        &app,
        "/api/v1/books?genre_name=%D1%84%D0%B0%D0%BD%D1%82%D0%B0%D1%81%D1%82",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["pages"], 1);
    let items = body["items"].as_array().expect("items must be an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Основание");
    assert_eq!(items[0]["isbn"], "978-0-553-29335-0");
}

#[tokio::test]
async fn test_listing_query_validation() {
    let app = app().await;
    seed_foundation(&app).await;

    let (status, _) = get(&app, "/api/v1/books?limit=100").await;
    assert_eq!(status, StatusCode::OK);

    for uri in [
        "/api/v1/books?limit=101",
        "/api/v1/books?limit=0",
        "/api/v1/books?skip=-1",
        "/api/v1/books?limit=abc",
        "/api/v1/authors?limit=500",
        "/api/v1/genres?skip=-3",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert_eq!(body["error"], "BadValue", "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_sort_and_skip_past_end() {
    let app = app().await;
    seed_foundation(&app).await;

    let (status, body) = get(&app, "/api/v1/books?sort_by=nonexistent&sort_order=up").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = get(&app, "/api/v1/books?skip=50&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["page"], 6);
}

#[tokio::test]
async fn test_empty_catalog_listing() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["pages"], 0);
    assert_eq!(body["page"], 1);
}

#[tokio::test]
async fn test_duplicate_genre_and_isbn_conflicts() {
    let app = app().await;
    seed_foundation(&app).await;

    let (status, body) = post(&app, "/api/v1/genres", json!({ "name": "Фантастика" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate");

    let (_, genres) = get(&app, "/api/v1/genres").await;
    assert_eq!(genres.as_array().map(Vec::len), Some(1));

    let (status, body) = post(
        &app,
        "/api/v1/books",
        json!({
            "title": "Другая книга",
            "author_id": 1,
            "genre_id": 1,
            "isbn": "978-0-553-29335-0"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Duplicate");

    let (_, body) = get(&app, "/api/v1/books").await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_not_found_responses() {
    let app = app().await;

    let (status, body) = send(&app, Method::DELETE, "/api/v1/authors/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");
    assert!(body["message"].as_str().unwrap().contains("Author"));

    let (status, _) = get(&app, "/api/v1/genres/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/v1/books/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &app,
        "/api/v1/books",
        json!({ "title": "Сирота", "author_id": 5, "genre_id": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("Author"));
}

#[tokio::test]
async fn test_malformed_input_is_unprocessable() {
    let app = app().await;

    // Missing required field
    let (status, _) = post(&app, "/api/v1/books", json!({ "title": "Без автора" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Out-of-range field
    let (status, body) = post(
        &app,
        "/api/v1/books",
        json!({ "title": "Т", "author_id": 1, "genre_id": 1, "publication_year": 3000 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BadValue");

    // Blank name
    let (status, _) = post(&app, "/api/v1/authors", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Name too long
    let (status, _) = post(&app, "/api/v1/genres", json!({ "name": "ж".repeat(101) })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Title and ISBN length bounds
    let (status, _) = post(
        &app,
        "/api/v1/books",
        json!({ "title": "ж".repeat(301), "author_id": 1, "genre_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = post(
        &app,
        "/api/v1/books",
        json!({ "title": "Т", "author_id": 1, "genre_id": 1, "isbn": "9".repeat(21) }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BadValue");

    // Not JSON at all
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/authors")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Non-numeric id
    let (status, _) = get(&app, "/api/v1/books/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_longest_title_is_accepted() {
    let app = app().await;
    seed_foundation(&app).await;

    let title = "ж".repeat(300);
    let (status, body) = post(
        &app,
        "/api/v1/books",
        json!({ "title": title, "author_id": 1, "genre_id": 1, "isbn": "9".repeat(20) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], title);
}

#[tokio::test]
async fn test_partial_book_update_over_http() {
    let app = app().await;
    seed_foundation(&app).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({ "page_count": null, "description": "Первая книга цикла" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page_count"], Value::Null);
    assert_eq!(body["description"], "Первая книга цикла");
    assert_eq!(body["publication_year"], 1951);
    assert_eq!(body["isbn"], "978-0-553-29335-0");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({ "genre_id": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/api/v1/books/1").await;
    assert_eq!(body["genre_id"], 1);
}

#[tokio::test]
async fn test_delete_flow_with_restrict_policy() {
    let app = app().await;
    seed_foundation(&app).await;

    let (status, body) = send(&app, Method::DELETE, "/api/v1/genres/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EntityInUse");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, Method::DELETE, "/api/v1/genres/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/authors/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, authors) = get(&app, "/api/v1/authors").await;
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app().await;

    let (status, body) = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books"].is_object());
}
