//! Postgres connection pool and migration runner.
//!
//! Wraps `sqlx::postgres::PgPool` in a `Database` handle that repositories
//! borrow their pool from. The handle is created once by the composition root
//! and closed explicitly on shutdown.

use anyhow::Context;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;
use sqlx::postgres::{PgPool, PgPoolOptions};

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a pool against `settings.url`.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        tracing::info!(
            target: "bookshelf-db",
            max_connections = settings.max_connections,
            "connecting to postgres"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await
            .context("unable to connect to database")?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply every migration not yet recorded in `schema_migrations`.
    ///
    /// Each migration runs in its own transaction together with its ledger row.
    /// Returns how many migrations were applied.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        sqlx::raw_sql(LEDGER_DDL)
            .execute(&self.pool)
            .await
            .context("failed to create schema_migrations table")?;

        let mut applied = 0;

        for (module, migration) in migrations {
            let already_applied: Option<(String,)> =
                sqlx::query_as("SELECT id FROM schema_migrations WHERE module = $1 AND id = $2")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(&self.pool)
                    .await
                    .with_context(|| format!("failed to read migration state for {module}"))?;

            if already_applied.is_some() {
                tracing::debug!(target: "bookshelf-db", module = %module, id = migration.id, "migration already applied");
                continue;
            }

            tracing::info!(target: "bookshelf-db", module = %module, id = migration.id, "applying migration");

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("migration {module}/{} failed", migration.id))?;
            sqlx::query("INSERT INTO schema_migrations (module, id) VALUES ($1, $2)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit()
                .await
                .with_context(|| format!("failed to commit migration {module}/{}", migration.id))?;

            applied += 1;
        }

        Ok(applied)
    }

    /// Wait for in-flight connections to be returned, then close the pool.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable postgres database"]
    async fn migrations_are_applied_once() {
        let settings = DatabaseSettings {
            url: std::env::var("DATABASE_URL").unwrap(),
            ..DatabaseSettings::default()
        };
        let db = Database::connect(&settings).await.unwrap();
        for cleanup in [
            "DROP TABLE IF EXISTS migration_probe",
            "DELETE FROM schema_migrations WHERE module = 'probe'",
        ] {
            sqlx::raw_sql(cleanup).execute(db.pool()).await.ok();
        }

        let migrations = vec![(
            "probe".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE migration_probe (id INTEGER);",
            },
        )];

        assert_eq!(db.apply_migrations(&migrations).await.unwrap(), 1);
        assert_eq!(db.apply_migrations(&migrations).await.unwrap(), 0);

        db.close().await;
    }
}
