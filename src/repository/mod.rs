//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod genres;

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use unicode_normalization::UnicodeNormalization;

use crate::{config::DatabaseConfig, error::AppResult};

/// Tables and indexes, created on startup when absent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        name_folded TEXT NOT NULL,
        bio         TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_authors_name ON authors (name)",
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL UNIQUE,
        name_folded TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        title            TEXT NOT NULL,
        title_folded     TEXT NOT NULL,
        isbn             TEXT UNIQUE,
        publication_year INTEGER,
        description      TEXT,
        page_count       INTEGER,
        created_at       TEXT NOT NULL,
        author_id        INTEGER NOT NULL REFERENCES authors (id),
        genre_id         INTEGER NOT NULL REFERENCES genres (id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_books_title ON books (title)",
    "CREATE INDEX IF NOT EXISTS idx_books_created_at ON books (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_books_author_id ON books (author_id)",
    "CREATE INDEX IF NOT EXISTS idx_books_genre_id ON books (genre_id)",
];

/// Lower-cased, NFC-normalized form used for case-insensitive substring
/// matching. SQLite's own `lower()` and `LIKE` only fold ASCII.
pub fn fold_search_key(s: &str) -> String {
    s.to_lowercase().nfc().collect()
}

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle.
///
/// Reads go through `pool`. Every write goes through `writer`, a pool of
/// exactly one connection, so write transactions queue in-process instead
/// of racing for SQLite's write lock. With WAL enabled, readers never block
/// the writer.
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    writer: Pool<Sqlite>,
}

impl Repository {
    /// Create a repository from a read pool and a single-connection write pool
    pub fn new(pool: Pool<Sqlite>, writer: Pool<Sqlite>) -> Self {
        Self { pool, writer }
    }

    /// Open the pools for `config`, creating the database file if needed.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        if config.is_in_memory() {
            // Every new connection would see a fresh, empty database
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?;
            return Ok(Self::new(pool.clone(), pool));
        }

        let options = options.journal_mode(SqliteJournalMode::Wal);
        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(options.clone())
            .await?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool, writer))
    }

    /// Create the catalog tables if they do not exist yet
    pub async fn init_schema(&self) -> AppResult<()> {
        let mut tx = self.writer.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
