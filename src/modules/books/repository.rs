//! Book persistence.
//!
//! `BookRepository` is the storage contract the service depends on.
//! `PostgresBookRepository` is the production implementation;
//! `InMemoryBookRepository` backs the `memory` storage backend and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tokio::sync::RwLock;

use super::models::{Book, BookError, NewBook};

/// Schema for the `books` table and its id sequence.
pub const BOOKS_SCHEMA: &str = r#"
    CREATE SEQUENCE IF NOT EXISTS book_id_seq;
    CREATE TABLE IF NOT EXISTS books (
        id        INTEGER PRIMARY KEY DEFAULT nextval('book_id_seq'),
        title     TEXT    NOT NULL,
        author    TEXT    NOT NULL,
        publisher TEXT    NOT NULL,
        price     INTEGER NOT NULL
    );
    ALTER SEQUENCE book_id_seq OWNED BY books.id;
"#;

const LIST_BOOKS: &str = "SELECT id, title, author, publisher, price FROM books";

const CREATE_BOOK: &str = r#"
    INSERT INTO books (id, title, author, publisher, price)
    VALUES (nextval('book_id_seq'), $1, $2, $3, $4)
    RETURNING id, title, author, publisher, price
"#;

const GET_BOOK_BY_ID: &str =
    "SELECT id, title, author, publisher, price FROM books WHERE id = $1";

/// Storage contract for books. Each call is a single round trip with no retries.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every stored book in storage order. An empty store is not an error.
    async fn list_all(&self) -> Result<Vec<Book>, BookError>;

    /// Store `new_book` under a freshly assigned id.
    async fn create(&self, new_book: NewBook) -> Result<Book, BookError>;

    /// The book stored under `id`, or [`BookError::NotFound`].
    async fn get_by_id(&self, id: i32) -> Result<Book, BookError>;
}

pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        sqlx::query_as::<_, Book>(LIST_BOOKS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "unable to list books");
                BookError::from(e)
            })
    }

    async fn create(&self, new_book: NewBook) -> Result<Book, BookError> {
        sqlx::query_as::<_, Book>(CREATE_BOOK)
            .bind(&new_book.title)
            .bind(&new_book.author)
            .bind(&new_book.publisher)
            .bind(new_book.price)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "unable to create book");
                BookError::from(e)
            })
    }

    async fn get_by_id(&self, id: i32) -> Result<Book, BookError> {
        let book = sqlx::query_as::<_, Book>(GET_BOOK_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, id, "unable to get book");
                BookError::from(e)
            })?;

        book.ok_or(BookError::NotFound(id))
    }
}

#[derive(Default)]
struct Shelf {
    books: BTreeMap<i32, Book>,
    last_id: i32,
}

/// In-memory implementation of BookRepository; contents are lost on drop
#[derive(Default)]
pub struct InMemoryBookRepository {
    shelf: RwLock<Shelf>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        let shelf = self.shelf.read().await;
        Ok(shelf.books.values().cloned().collect())
    }

    async fn create(&self, new_book: NewBook) -> Result<Book, BookError> {
        let mut shelf = self.shelf.write().await;

        let id = shelf
            .last_id
            .checked_add(1)
            .ok_or_else(|| BookError::Storage("book id sequence exhausted".to_string()))?;
        shelf.last_id = id;

        let book = new_book.into_book(id);
        shelf.books.insert(id, book.clone());
        Ok(book)
    }

    async fn get_by_id(&self, id: i32) -> Result<Book, BookError> {
        let shelf = self.shelf.read().await;
        shelf.books.get(&id).cloned().ok_or(BookError::NotFound(id))
    }
}
