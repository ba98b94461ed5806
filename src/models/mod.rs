//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod genre;
pub mod pagination;

// Re-export commonly used types
pub use author::{Author, CreateAuthor, UpdateAuthor};
pub use book::{Book, BookDetails, BookPage, BookQuery, CreateBook, UpdateBook};
pub use genre::{CreateGenre, Genre, UpdateGenre};
pub use pagination::ListQuery;
