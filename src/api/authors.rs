//! Author endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        pagination::ListQuery,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse};

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(ListQuery),
    responses(
        (status = 200, description = "List of authors", body = Vec<Author>),
        (status = 422, description = "Invalid skip/limit")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let authors = state.services.authors.list(&query).await?;
    Ok(Json(authors))
}

/// Get author by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.get_by_id(id).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = CreateAuthor,
    responses(
        (status = 200, description = "Author created", body = Author),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.create(data).await?;
    Ok(Json(author))
}

/// Update an author (only supplied fields change)
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(data): ApiJson<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let author = state.services.authors.update(id, data).await?;
    Ok(Json(author))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author deleted", body = MessageResponse),
        (status = 400, description = "Author still has books"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.authors.delete(id).await?;
    Ok(MessageResponse::new("Author deleted successfully"))
}
