//! Operator CLI for bookshelf.
//!
//! - `bookshelf-cli serve` - run the HTTP service
//! - `bookshelf-cli migrate` - apply pending postgres migrations and exit
//! - `bookshelf-cli settings` - print the resolved configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use bookshelf_kernel::settings::{Settings, StorageBackend};

#[derive(Parser)]
#[command(name = "bookshelf-cli")]
#[command(version, about = "Book catalogue service", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service until interrupted
    Serve {
        /// Listen port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,

        /// Keep books in memory instead of postgres
        #[arg(long)]
        in_memory: bool,
    },

    /// Apply pending database migrations
    Migrate,

    /// Print the resolved settings
    Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load bookshelf settings")?;

    match cli.command {
        Commands::Serve { port, in_memory } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            if in_memory {
                settings.database.backend = StorageBackend::Memory;
            }
            bookshelf_telemetry::init(&settings.telemetry)?;
            bookshelf_app::bootstrap::run(settings).await
        }
        Commands::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let applied = bookshelf_app::bootstrap::migrate(&settings).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Settings => {
            println!("{settings:#?}");
            Ok(())
        }
    }
}
