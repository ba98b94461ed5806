//! Book model, listing query and sort allow-list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{author::Author, genre::Genre, pagination::default_limit};

/// Book row as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub page_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub genre_id: i64,
}

/// Book with its author and genre resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i64,
    pub title: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub page_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub genre_id: i64,
    pub author: Author,
    pub genre: Genre,
}

/// Maps the `books JOIN authors JOIN genres` projection used by the repository.
impl<'r> FromRow<'r, SqliteRow> for BookDetails {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let author_id: i64 = row.try_get("author_id")?;
        let genre_id: i64 = row.try_get("genre_id")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            isbn: row.try_get("isbn")?,
            publication_year: row.try_get("publication_year")?,
            description: row.try_get("description")?,
            page_count: row.try_get("page_count")?,
            created_at: row.try_get("created_at")?,
            author_id,
            genre_id,
            author: Author {
                id: author_id,
                name: row.try_get("author_name")?,
                bio: row.try_get("author_bio")?,
            },
            genre: Genre {
                id: genre_id,
                name: row.try_get("genre_name")?,
            },
        })
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,
    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 1000, max = 2100, message = "Publication year must be between 1000 and 2100"))]
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Page count must be positive"))]
    pub page_count: Option<i32>,
    pub author_id: i64,
    pub genre_id: i64,
}

/// Update book request.
///
/// Required columns use `Option<T>` (absent means unchanged). Nullable
/// columns use `Option<Option<T>>` so an explicit `null` clears the value
/// while an absent key leaves it alone.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 1000, max = 2100, message = "Publication year must be between 1000 and 2100"))]
    pub publication_year: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 1, message = "Page count must be positive"))]
    pub page_count: Option<Option<i32>>,
    pub author_id: Option<i64>,
    pub genre_id: Option<i64>,
}

/// Which constrained fields a merge actually changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BookChanges {
    pub isbn: bool,
    pub author: bool,
    pub genre: bool,
}

fn normalize_isbn(isbn: Option<String>) -> Option<String> {
    isbn.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl CreateBook {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            isbn: normalize_isbn(self.isbn),
            ..self
        }
    }
}

impl UpdateBook {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            isbn: self.isbn.map(normalize_isbn),
            ..self
        }
    }

    /// Apply the supplied fields onto `book` and report which unique or
    /// reference fields now hold a different value.
    pub fn merge_into(&self, book: &mut Book) -> BookChanges {
        let mut changes = BookChanges::default();

        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref isbn) = self.isbn {
            changes.isbn = *isbn != book.isbn;
            book.isbn = isbn.clone();
        }
        if let Some(year) = self.publication_year {
            book.publication_year = year;
        }
        if let Some(ref description) = self.description {
            book.description = description.clone();
        }
        if let Some(pages) = self.page_count {
            book.page_count = pages;
        }
        if let Some(author_id) = self.author_id {
            changes.author = author_id != book.author_id;
            book.author_id = author_id;
        }
        if let Some(genre_id) = self.genre_id {
            changes.genre = genre_id != book.genre_id;
            book.genre_id = genre_id;
        }

        changes
    }
}

/// Sortable columns of the book listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Title,
    PublicationYear,
    #[default]
    CreatedAt,
    AuthorName,
    GenreName,
}

impl SortField {
    /// Resolve a requested key; anything outside the allow-list falls back
    /// to `created_at`.
    pub fn resolve(key: &str) -> Self {
        match key {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "publication_year" => SortField::PublicationYear,
            "created_at" => SortField::CreatedAt,
            "author_name" => SortField::AuthorName,
            "genre_name" => SortField::GenreName,
            _ => SortField::default(),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "b.id",
            SortField::Title => "b.title",
            SortField::PublicationYear => "b.publication_year",
            SortField::CreatedAt => "b.created_at",
            SortField::AuthorName => "a.name",
            SortField::GenreName => "g.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `"asc"` sorts ascending.
    pub fn from_param(order: &str) -> Self {
        if order == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_sort_by() -> String {
    "created_at".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

/// Book listing query parameters
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Number of matching records to skip
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must be non-negative"))]
    pub skip: i64,
    /// Maximum number of records to return (1-100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,
    /// Filter by author id
    pub author_id: Option<i64>,
    /// Filter by genre id
    pub genre_id: Option<i64>,
    /// Case-insensitive substring of the author name
    pub author_name: Option<String>,
    /// Case-insensitive substring of the genre name
    pub genre_name: Option<String>,
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// id, title, publication_year, created_at, author_name or genre_name
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// "asc" or "desc"
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            author_id: None,
            genre_id: None,
            author_name: None,
            genre_name: None,
            title: None,
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
        }
    }
}

impl BookQuery {
    pub fn sort_field(&self) -> SortField {
        SortField::resolve(&self.sort_by)
    }

    pub fn sort_order(&self) -> SortOrder {
        SortOrder::from_param(&self.sort_order)
    }
}

/// One page of the book listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookPage {
    pub items: Vec<BookDetails>,
    /// Rows matching the filters, before pagination
    pub total: i64,
    /// `skip / limit + 1`
    pub page: i64,
    pub limit: i64,
    /// `ceil(total / limit)`
    pub pages: i64,
}
