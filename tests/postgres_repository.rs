//! Repository tests against a live postgres.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`. The tests
//! drop and recreate the `books` table.

use bookshelf_app::bootstrap::build_registry;
use bookshelf_app::modules::books::models::{BookError, NewBook};
use bookshelf_app::modules::books::repository::{BookRepository, PostgresBookRepository};
use bookshelf_db::Database;
use bookshelf_kernel::settings::{DatabaseSettings, Settings};

async fn fresh_database() -> Database {
    let settings = DatabaseSettings {
        url: std::env::var("DATABASE_URL").unwrap(),
        ..DatabaseSettings::default()
    };
    let database = Database::connect(&settings).await.unwrap();

    for statement in [
        "DROP TABLE IF EXISTS books",
        "DROP SEQUENCE IF EXISTS book_id_seq",
        "DELETE FROM schema_migrations WHERE module = 'books'",
    ] {
        sqlx::raw_sql(statement).execute(database.pool()).await.ok();
    }

    let registry = build_registry(&Settings::default(), Some(&database)).unwrap();
    database
        .apply_migrations(&registry.collect_migrations())
        .await
        .unwrap();
    database
}

fn new_book(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "test author".to_string(),
        publisher: "test publisher".to_string(),
        price: 100,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a disposable postgres database"]
async fn create_list_and_get_against_postgres() {
    let database = fresh_database().await;
    let repo = PostgresBookRepository::new(database.pool().clone());

    assert!(repo.list_all().await.unwrap().is_empty());

    let first = repo.create(new_book("test title 1")).await.unwrap();
    let second = repo.create(new_book("test title 2")).await.unwrap();
    assert!(second.id > first.id);

    let listed = repo.list_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&first));

    assert_eq!(repo.get_by_id(first.id).await.unwrap(), first);

    let err = repo.get_by_id(424242).await.unwrap_err();
    assert!(matches!(err, BookError::NotFound(424242)));

    database.close().await;
}
