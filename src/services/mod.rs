//! Business logic services

pub mod authors;
pub mod books;
pub mod genres;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub authors: authors::AuthorsService,
    pub genres: genres::GenresService,
    pub books: books::BooksService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            authors: authors::AuthorsService::new(repository.clone()),
            genres: genres::GenresService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            repository,
        }
    }
}
