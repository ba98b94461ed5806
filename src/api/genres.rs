//! Genre endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        genre::{CreateGenre, Genre, UpdateGenre},
        pagination::ListQuery,
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, MessageResponse};

/// List genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    params(ListQuery),
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>),
        (status = 422, description = "Invalid skip/limit")
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.genres.list(&query).await?;
    Ok(Json(genres))
}

/// Get genre by ID
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.genres.get_by_id(id).await?;
    Ok(Json(genre))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    request_body = CreateGenre,
    responses(
        (status = 200, description = "Genre created", body = Genre),
        (status = 400, description = "Genre name already exists"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<CreateGenre>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.genres.create(data).await?;
    Ok(Json(genre))
}

/// Rename a genre
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i64, Path, description = "Genre ID")),
    request_body = UpdateGenre,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 400, description = "Genre name already exists"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(data): ApiJson<UpdateGenre>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.genres.update(id, data).await?;
    Ok(Json(genre))
}

/// Delete a genre
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i64, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre deleted", body = MessageResponse),
        (status = 400, description = "Genre still has books"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.genres.delete(id).await?;
    Ok(MessageResponse::new("Genre deleted successfully"))
}
