//! Composition root: storage, module registry and server lifecycle.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_db::Database;
use bookshelf_kernel::{
    settings::{Settings, StorageBackend},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    books::repository::{BookRepository, InMemoryBookRepository, PostgresBookRepository},
};

/// Run the service until a shutdown signal arrives.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookshelf bootstrap starting"
    );

    let database = connect(&settings).await?;
    let result = serve(&settings, database.as_ref()).await;

    if let Some(database) = database {
        database.close().await;
    }

    result
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let database = Database::connect(&settings.database).await?;
    let registry = build_registry(settings, Some(&database))?;

    let result = database
        .apply_migrations(&registry.collect_migrations())
        .await;
    database.close().await;

    let applied = result?;
    tracing::info!(applied, "migrations complete");
    Ok(applied)
}

/// Register every module against the configured storage.
pub fn build_registry(settings: &Settings, database: Option<&Database>) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, book_repository(database), settings)?;
    Ok(registry)
}

/// Postgres-backed repository when a database is available, in-memory otherwise.
pub fn book_repository(database: Option<&Database>) -> Arc<dyn BookRepository> {
    match database {
        Some(database) => Arc::new(PostgresBookRepository::new(database.pool().clone())),
        None => Arc::new(InMemoryBookRepository::new()),
    }
}

async fn connect(settings: &Settings) -> anyhow::Result<Option<Database>> {
    match settings.database.backend {
        StorageBackend::Postgres => Ok(Some(Database::connect(&settings.database).await?)),
        StorageBackend::Memory => {
            tracing::warn!("using in-memory book storage; data is lost on shutdown");
            Ok(None)
        }
    }
}

async fn serve(settings: &Settings, database: Option<&Database>) -> anyhow::Result<()> {
    let registry = build_registry(settings, database)?;
    let ctx = InitCtx { settings };

    registry.init_all(&ctx).await?;

    if let Some(database) = database {
        if settings.database.run_migrations {
            let applied = database
                .apply_migrations(&registry.collect_migrations())
                .await
                .context("failed to apply migrations")?;
            tracing::info!(applied, "migrations complete");
        }
    }

    registry.start_all(&ctx).await?;

    let served = bookshelf_http::start_server(&registry, settings).await;
    let stopped = registry.stop_all().await;

    served?;
    stopped
}
