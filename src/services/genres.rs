//! Genre service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        genre::{CreateGenre, Genre, UpdateGenre},
        pagination::ListQuery,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct GenresService {
    repository: Repository,
}

impl GenresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<Vec<Genre>> {
        query.validate()?;
        self.repository.genres_list(query.skip, query.limit).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Genre> {
        self.repository.genres_get_by_id(id).await
    }

    /// Create a genre; names are unique
    pub async fn create(&self, data: CreateGenre) -> AppResult<Genre> {
        let data = data.normalized();
        data.validate()?;

        let genre = self.repository.genres_create(&data).await.inspect_err(|e| {
            tracing::warn!("Genre {:?} not created: {}", data.name, e);
        })?;
        tracing::info!("Created genre id={} name={:?}", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update(&self, id: i64, data: UpdateGenre) -> AppResult<Genre> {
        let data = data.normalized();
        data.validate()?;

        let genre = self.repository.genres_update(id, &data).await?;
        tracing::info!("Updated genre id={}", id);
        Ok(genre)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.genres_delete(id).await.inspect_err(|e| {
            tracing::warn!("Genre {} not deleted: {}", id, e);
        })?;
        tracing::info!("Deleted genre id={}", id);
        Ok(())
    }
}
