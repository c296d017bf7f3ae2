pub mod books;

use std::sync::Arc;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

use books::repository::BookRepository;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    book_repository: Arc<dyn BookRepository>,
    settings: &Settings,
) -> anyhow::Result<()> {
    registry.register(books::create_module(book_repository, settings))?;
    Ok(())
}
