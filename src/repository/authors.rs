//! Author domain methods on Repository

use sqlx::SqliteConnection;

use super::{fold_search_key, Repository};
use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
};

/// Load an author or fail with NotFound
pub(super) async fn find_author(conn: &mut SqliteConnection, id: i64) -> AppResult<Author> {
    sqlx::query_as::<_, Author>("SELECT id, name, bio FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
}

impl Repository {
    /// List authors by id, `skip`/`limit` paginated
    pub async fn authors_list(&self, skip: i64, limit: i64) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            "SELECT id, name, bio FROM authors ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get author by ID
    pub async fn authors_get_by_id(&self, id: i64) -> AppResult<Author> {
        let mut conn = self.pool.acquire().await?;
        find_author(&mut conn, id).await
    }

    /// Create author
    pub async fn authors_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, name_folded, bio)
            VALUES (?, ?, ?)
            RETURNING id, name, bio
            "#,
        )
        .bind(&data.name)
        .bind(fold_search_key(&data.name))
        .bind(&data.bio)
        .fetch_one(&self.writer)
        .await?;
        Ok(row)
    }

    /// Apply a partial update to an author
    pub async fn authors_update(&self, id: i64, data: &UpdateAuthor) -> AppResult<Author> {
        let mut tx = self.writer.begin().await?;

        let mut author = find_author(&mut tx, id).await?;
        data.merge_into(&mut author);

        sqlx::query("UPDATE authors SET name = ?, name_folded = ?, bio = ? WHERE id = ?")
            .bind(&author.name)
            .bind(fold_search_key(&author.name))
            .bind(&author.bio)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(author)
    }

    /// Delete an author. Refused while books still reference it.
    pub async fn authors_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.writer.begin().await?;

        find_author(&mut tx, id).await?;

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if books > 0 {
            return Err(AppError::Referenced(format!(
                "Author {} still has {} book(s)",
                id, books
            )));
        }

        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
