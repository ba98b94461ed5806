//! Author service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        pagination::ListQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<Vec<Author>> {
        query.validate()?;
        self.repository.authors_list(query.skip, query.limit).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        self.repository.authors_get_by_id(id).await
    }

    pub async fn create(&self, data: CreateAuthor) -> AppResult<Author> {
        let data = data.normalized();
        data.validate()?;

        let author = self.repository.authors_create(&data).await?;
        tracing::info!("Created author id={} name={:?}", author.id, author.name);
        Ok(author)
    }

    pub async fn update(&self, id: i64, data: UpdateAuthor) -> AppResult<Author> {
        let data = data.normalized();
        data.validate()?;

        let author = self.repository.authors_update(id, &data).await?;
        tracing::info!("Updated author id={}", id);
        Ok(author)
    }

    /// Delete an author (refused while books reference it)
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.authors_delete(id).await.inspect_err(|e| {
            tracing::warn!("Author {} not deleted: {}", id, e);
        })?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }
}
