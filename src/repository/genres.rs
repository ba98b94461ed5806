//! Genre domain methods on Repository

use sqlx::SqliteConnection;

use super::{fold_search_key, Repository};
use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre, UpdateGenre},
};

/// Load a genre or fail with NotFound
pub(super) async fn find_genre(conn: &mut SqliteConnection, id: i64) -> AppResult<Genre> {
    sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
}

/// Fail with Conflict if another genre already uses `name`
async fn ensure_name_free(
    conn: &mut SqliteConnection,
    name: &str,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM genres WHERE name = ? AND (? IS NULL OR id != ?))",
    )
    .bind(name)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    if taken {
        return Err(AppError::Conflict(
            "Genre with this name already exists".to_string(),
        ));
    }
    Ok(())
}

impl Repository {
    /// List genres by id, `skip`/`limit` paginated
    pub async fn genres_list(&self, skip: i64, limit: i64) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(
            "SELECT id, name FROM genres ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get genre by ID
    pub async fn genres_get_by_id(&self, id: i64) -> AppResult<Genre> {
        let mut conn = self.pool.acquire().await?;
        find_genre(&mut conn, id).await
    }

    /// Create genre (name must be unused)
    pub async fn genres_create(&self, data: &CreateGenre) -> AppResult<Genre> {
        let mut tx = self.writer.begin().await?;

        ensure_name_free(&mut tx, &data.name, None).await?;

        let row = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name, name_folded) VALUES (?, ?) RETURNING id, name",
        )
        .bind(&data.name)
        .bind(fold_search_key(&data.name))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Apply a partial update to a genre, re-checking name uniqueness on rename
    pub async fn genres_update(&self, id: i64, data: &UpdateGenre) -> AppResult<Genre> {
        let mut tx = self.writer.begin().await?;

        let mut genre = find_genre(&mut tx, id).await?;
        if data.merge_into(&mut genre) {
            ensure_name_free(&mut tx, &genre.name, Some(id)).await?;

            sqlx::query("UPDATE genres SET name = ?, name_folded = ? WHERE id = ?")
                .bind(&genre.name)
                .bind(fold_search_key(&genre.name))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(genre)
    }

    /// Delete a genre. Refused while books still reference it.
    pub async fn genres_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.writer.begin().await?;

        find_genre(&mut tx, id).await?;

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE genre_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if books > 0 {
            return Err(AppError::Referenced(format!(
                "Genre {} still has {} book(s)",
                id, books
            )));
        }

        sqlx::query("DELETE FROM genres WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
