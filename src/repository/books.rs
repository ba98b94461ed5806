//! Book domain methods on Repository: CRUD and the filtered listing

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::{authors::find_author, fold_search_key, genres::find_genre, Repository};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
};

const BOOKS_JOINED: &str = r#"
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN genres g ON g.id = b.genre_id
"#;

const BOOK_DETAILS_COLUMNS: &str = r#"
    SELECT b.id, b.title, b.isbn, b.publication_year, b.description, b.page_count,
           b.created_at, b.author_id, b.genre_id,
           a.name AS author_name, a.bio AS author_bio,
           g.name AS genre_name
"#;

/// Append the listing filters as AND-ed predicates
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &BookQuery) {
    let mut clause = " WHERE ";

    if let Some(author_id) = query.author_id {
        builder.push(clause).push("b.author_id = ").push_bind(author_id);
        clause = " AND ";
    }
    if let Some(genre_id) = query.genre_id {
        builder.push(clause).push("b.genre_id = ").push_bind(genre_id);
        clause = " AND ";
    }

    // instr() over the folded columns: case-insensitive, and the needle
    // is taken literally (no LIKE wildcards)
    let substring_filters = [
        ("a.name_folded", &query.author_name),
        ("g.name_folded", &query.genre_name),
        ("b.title_folded", &query.title),
    ];
    for (column, needle) in substring_filters {
        if let Some(needle) = needle {
            builder
                .push(clause)
                .push(format!("instr({}, ", column))
                .push_bind(fold_search_key(needle))
                .push(") > 0");
            clause = " AND ";
        }
    }
}

async fn find_book(conn: &mut SqliteConnection, id: i64) -> AppResult<Book> {
    sqlx::query_as::<_, Book>(
        r#"
        SELECT id, title, isbn, publication_year, description, page_count,
               created_at, author_id, genre_id
        FROM books WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

async fn find_book_details(conn: &mut SqliteConnection, id: i64) -> AppResult<BookDetails> {
    let query = format!("{}{} WHERE b.id = ?", BOOK_DETAILS_COLUMNS, BOOKS_JOINED);
    sqlx::query_as::<_, BookDetails>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

/// Fail with Conflict if another book already carries `isbn`
async fn ensure_isbn_free(
    conn: &mut SqliteConnection,
    isbn: &str,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ? AND (? IS NULL OR id != ?))",
    )
    .bind(isbn)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    if taken {
        return Err(AppError::Conflict(format!(
            "Book with ISBN {} already exists",
            isbn
        )));
    }
    Ok(())
}

impl Repository {
    /// Filtered, sorted, paginated listing. Returns the page and the total
    /// number of matching rows.
    pub async fn books_search(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let mut conn = self.pool.acquire().await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        count.push(BOOKS_JOINED);
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut select = QueryBuilder::<Sqlite>::new(BOOK_DETAILS_COLUMNS);
        select.push(BOOKS_JOINED);
        push_filters(&mut select, query);

        // Book id breaks ties so pages stay stable between requests
        let order = query.sort_order().as_sql();
        select.push(format!(
            " ORDER BY {} {}, b.id {}",
            query.sort_field().column(),
            order,
            order
        ));
        select
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.skip);

        let items = select
            .build_query_as::<BookDetails>()
            .fetch_all(&mut *conn)
            .await?;

        Ok((items, total))
    }

    /// Get book by ID with author and genre
    pub async fn books_get_by_id(&self, id: i64) -> AppResult<BookDetails> {
        let mut conn = self.pool.acquire().await?;
        find_book_details(&mut conn, id).await
    }

    /// Create a book after checking its references and ISBN
    pub async fn books_create(&self, data: &CreateBook) -> AppResult<BookDetails> {
        let mut tx = self.writer.begin().await?;

        find_author(&mut tx, data.author_id).await?;
        find_genre(&mut tx, data.genre_id).await?;
        if let Some(ref isbn) = data.isbn {
            ensure_isbn_free(&mut tx, isbn, None).await?;
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (
                title, title_folded, isbn, publication_year, description, page_count,
                created_at, author_id, genre_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(fold_search_key(&data.title))
        .bind(&data.isbn)
        .bind(data.publication_year)
        .bind(&data.description)
        .bind(data.page_count)
        .bind(Utc::now())
        .bind(data.author_id)
        .bind(data.genre_id)
        .fetch_one(&mut *tx)
        .await?;

        let book = find_book_details(&mut tx, id).await?;
        tx.commit().await?;
        Ok(book)
    }

    /// Apply a partial update. Only fields that changed are re-validated:
    /// ISBN uniqueness (excluding this book) and author/genre existence.
    pub async fn books_update(&self, id: i64, data: &UpdateBook) -> AppResult<BookDetails> {
        let mut tx = self.writer.begin().await?;

        let mut book = find_book(&mut tx, id).await?;
        let changes = data.merge_into(&mut book);

        if changes.isbn {
            if let Some(ref isbn) = book.isbn {
                ensure_isbn_free(&mut tx, isbn, Some(id)).await?;
            }
        }
        if changes.author {
            find_author(&mut tx, book.author_id).await?;
        }
        if changes.genre {
            find_genre(&mut tx, book.genre_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE books SET
                title = ?, title_folded = ?, isbn = ?, publication_year = ?,
                description = ?, page_count = ?, author_id = ?, genre_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(fold_search_key(&book.title))
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(&book.description)
        .bind(book.page_count)
        .bind(book.author_id)
        .bind(book.genre_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let details = find_book_details(&mut tx, id).await?;
        tx.commit().await?;
        Ok(details)
    }

    /// Delete a book
    pub async fn books_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.writer)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}
