//! Book service: CRUD plus the filtered catalog listing

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{BookDetails, BookPage, BookQuery, CreateBook, UpdateBook},
        pagination::{page_count, page_number},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters, sort and pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<BookPage> {
        query.validate()?;

        let (items, total) = self.repository.books_search(query).await?;
        tracing::debug!(
            "Book search matched {} row(s), returning {}",
            total,
            items.len()
        );

        Ok(BookPage {
            items,
            total,
            page: page_number(query.skip, query.limit),
            limit: query.limit,
            pages: page_count(total, query.limit),
        })
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<BookDetails> {
        self.repository.books_get_by_id(id).await
    }

    /// Create a book; author and genre must exist and the ISBN must be unused
    pub async fn create(&self, data: CreateBook) -> AppResult<BookDetails> {
        let data = data.normalized();
        data.validate()?;

        let book = self.repository.books_create(&data).await.inspect_err(|e| {
            tracing::warn!("Book {:?} not created: {}", data.title, e);
        })?;
        tracing::info!("Created book id={} title={:?}", book.id, book.title);
        Ok(book)
    }

    pub async fn update(&self, id: i64, data: UpdateBook) -> AppResult<BookDetails> {
        let data = data.normalized();
        data.validate()?;

        let book = self.repository.books_update(id, &data).await.inspect_err(|e| {
            tracing::warn!("Book {} not updated: {}", id, e);
        })?;
        tracing::info!("Updated book id={}", id);
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.books_delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }
}
