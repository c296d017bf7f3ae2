pub mod command;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, Migration, Module};
use utoipa::OpenApi;

use handlers::{BooksApi, BooksState};
use repository::{BookRepository, BOOKS_SCHEMA};
use service::StandardBookService;

/// Book catalogue: `GET /books`, `POST /books` and `GET /books/{id}`.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(repository: Arc<dyn BookRepository>, settings: &Settings) -> Self {
        let service = Arc::new(StandardBookService::new(repository));
        Self {
            state: BooksState::new(service, settings.server.request_timeout()),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        handlers::routes(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(BooksApi::openapi()) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(module = self.name(), error = %e, "unable to encode openapi document");
                None
            }
        }
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: BOOKS_SCHEMA,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module on top of `repository`.
pub fn create_module(repository: Arc<dyn BookRepository>, settings: &Settings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(repository, settings))
}
