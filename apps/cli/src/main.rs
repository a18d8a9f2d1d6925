use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use packdrill_cli::commands::{self, AppContext};
use packdrill_cli::paths::AppPaths;

#[derive(Parser)]
#[command(name = "packdrill")]
#[command(about = "Import flashcard packages and drill them on a schedule", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a flashcard package as a deck
    Import {
        package: PathBuf,

        /// Deck name (defaults to the package filename)
        #[arg(long)]
        name: Option<String>,

        /// Replace the deck's existing cards instead of appending
        #[arg(long)]
        overwrite: bool,
    },

    /// List decks with card counts
    Decks,

    /// Delete a deck and everything in it
    Delete { name: String },

    /// Show a package's models and sample field values
    Inspect { package: PathBuf },

    /// Choose which fields make the front and back of a deck's cards
    Map {
        deck: String,
        model: String,

        /// 1-based field indexes for the front, e.g. --front 1
        #[arg(long, value_delimiter = ',')]
        front: Vec<u32>,

        /// 1-based field indexes for the back, e.g. --back 2,3
        #[arg(long, value_delimiter = ',')]
        back: Vec<u32>,
    },

    /// Rebuild a deck's cards from archived notes under the stored mapping
    Rebuild { deck: String },

    /// Show the next due card of a deck
    Next {
        deck: String,

        /// Pick randomly among equally-due cards
        #[arg(long)]
        random: bool,
    },

    /// Show what each rating would do to a card, without grading it
    Preview { card: i64 },

    /// Grade a card: again, hard, good or easy
    Rate { card: i64, rating: String },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let root = cli.data_dir.unwrap_or_else(AppPaths::default_root);
    let mut ctx = AppContext::open(root)?;

    match cli.command {
        Commands::Import {
            package,
            name,
            overwrite,
        } => commands::import::import(&mut ctx, &package, name, overwrite),
        Commands::Decks => commands::deck::list(&ctx),
        Commands::Delete { name } => commands::deck::delete(&ctx, &name),
        Commands::Inspect { package } => commands::inspect::inspect(&mut ctx, &package),
        Commands::Map {
            deck,
            model,
            front,
            back,
        } => commands::inspect::map(&mut ctx, &deck, &model, front, back),
        Commands::Rebuild { deck } => commands::import::rebuild(&mut ctx, &deck),
        Commands::Next { deck, random } => commands::study::next(&ctx, &deck, random),
        Commands::Preview { card } => commands::study::preview(&ctx, card),
        Commands::Rate { card, rating } => commands::study::rate(&ctx, card, &rating),
    }
}
