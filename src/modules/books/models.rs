use thiserror::Error;

/// A stored book. `id` is assigned by storage on creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub price: i32,
}

/// Validated fields for a book that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub price: i32,
}

impl NewBook {
    pub fn into_book(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            price: self.price,
        }
    }
}

/// Failure reported by the repository and passed through the service unchanged.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("book {0} not found")]
    NotFound(i32),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("storage failure: {0}")]
    Storage(String),
}
