//! Book (catalog) endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookPage, BookQuery, CreateBook, UpdateBook},
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse};

/// List books with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "One page of books", body = BookPage),
        (status = 422, description = "Invalid query parameters")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.books.search(&query).await?;
    Ok(Json(page))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 200, description = "Book created", body = BookDetails),
        (status = 400, description = "ISBN already exists"),
        (status = 404, description = "Author or genre not found"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateBook>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.create(data).await?;
    Ok(Json(book))
}

/// Update an existing book (only supplied fields change)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 400, description = "ISBN already exists"),
        (status = 404, description = "Book, author or genre not found"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(data): ApiJson<UpdateBook>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.books.update(id, data).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(id).await?;
    Ok(MessageResponse::new("Book deleted successfully"))
}
