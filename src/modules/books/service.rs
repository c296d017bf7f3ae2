use std::sync::Arc;

use async_trait::async_trait;

use super::models::{Book, BookError, NewBook};
use super::repository::BookRepository;

/// Application-level book operations used by the HTTP handlers.
///
/// Results and failures are those of the underlying repository; this is the
/// place for orchestration that belongs to neither transport nor storage.
#[async_trait]
pub trait BookService: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Book>, BookError>;

    async fn create(&self, new_book: NewBook) -> Result<Book, BookError>;

    async fn find_by_id(&self, id: i32) -> Result<Book, BookError>;
}

pub struct StandardBookService {
    repository: Arc<dyn BookRepository>,
}

impl StandardBookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl BookService for StandardBookService {
    #[tracing::instrument(skip(self), err)]
    async fn fetch_all(&self) -> Result<Vec<Book>, BookError> {
        self.repository.list_all().await
    }

    #[tracing::instrument(skip(self, new_book), fields(title = %new_book.title), err)]
    async fn create(&self, new_book: NewBook) -> Result<Book, BookError> {
        self.repository.create(new_book).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_by_id(&self, id: i32) -> Result<Book, BookError> {
        self.repository.get_by_id(id).await
    }
}
