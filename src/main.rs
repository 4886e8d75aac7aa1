mod ai;
mod app;
mod books;
mod capsule;
mod capture;
mod cli;
mod config;
mod dashboard;
mod db;
mod journal;
mod records;
mod server;
mod store;
mod voice;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::app::Theme;
use crate::books::BookSort;
use crate::cli::books::{FolderAction, NewBook};

#[derive(Parser)]
#[command(name = "ttyl", version, about = "A quiet, local-first journal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the AI proxy and the web client
    Serve,
    /// Write the entry for a day (today by default); text from the argument or stdin
    Write {
        text: Option<String>,
        /// Day to write, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Add to the existing entry instead of replacing it
        #[arg(long)]
        append: bool,
        /// Summarize right away, whatever the length
        #[arg(long)]
        summarize: bool,
    },
    /// Print the entry for a day
    Show {
        #[arg(long)]
        date: Option<String>,
    },
    /// List journal entries, voice notes and capsules, newest first
    List {
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Rename an entry (sets its summary)
    Rename { key: String, name: String },
    /// Delete an entry
    Delete {
        key: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Save a recording as a voice note
    Voice {
        file: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
    },
    /// Seal or open time capsules
    Capsule {
        #[command(subcommand)]
        action: CapsuleAction,
    },
    /// The bookshelf
    Books {
        #[command(subcommand)]
        action: BooksAction,
    },
    /// Today's two writing prompts
    Prompts,
    /// Show or change the theme
    Theme {
        theme: Option<Theme>,
        #[arg(long, conflicts_with = "theme")]
        toggle: bool,
    },
    /// Export every record as JSON
    Export {
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Show record counts and database health
    Stats,
}

#[derive(Subcommand)]
enum CapsuleAction {
    /// Seal a new capsule (180 days out unless told otherwise)
    Seal {
        /// Freeform text; read from stdin when omitted
        text: Option<String>,
        /// Answer the five guided questions instead
        #[arg(long, conflicts_with = "text")]
        guided: bool,
        /// Unlock on this date, YYYY-MM-DD
        #[arg(long, conflicts_with = "random")]
        on: Option<String>,
        /// Unlock at a surprise moment 90 to 365 days out
        #[arg(long)]
        random: bool,
    },
    /// Open a capsule
    Open { key: String },
}

#[derive(Subcommand)]
enum BooksAction {
    /// List books
    List {
        #[arg(long, default_value = "recent")]
        sort: BookSort,
        /// Folder name or key
        #[arg(long)]
        folder: Option<String>,
    },
    /// Add a book by hand
    Add {
        title: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        started: Option<String>,
        #[arg(long)]
        finished: Option<String>,
        #[arg(long)]
        pages: Option<u32>,
        /// Fill author, page count and cover from the book metadata service
        #[arg(long)]
        lookup: bool,
    },
    /// Add a book from a photo of its cover
    Scan {
        image: PathBuf,
        #[arg(long)]
        lookup: bool,
    },
    /// Show one book
    Show { key: String },
    /// Replace a book's notes
    Notes { key: String, text: String },
    /// Add a takeaway
    Takeaway { key: String, text: String },
    /// Remove a takeaway by id
    Untake { key: String, id: i64 },
    /// Update reading progress
    Page {
        key: String,
        page: u32,
        /// Also mark the book finished today
        #[arg(long)]
        finished: bool,
    },
    /// Move a book into a folder (or out of any folder)
    Move {
        key: String,
        #[arg(long, conflicts_with = "none")]
        folder: Option<String>,
        #[arg(long)]
        none: bool,
    },
    /// Remove one or more books
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// File unfiled books into folders by suggested category
    Organize,
    /// Reading analytics
    Stats,
    /// Manage folders
    Folder {
        #[command(subcommand)]
        action: FolderCommand,
    },
}

#[derive(Subcommand)]
enum FolderCommand {
    List,
    Create { name: String },
    Rename { folder: String, name: String },
    Delete {
        folder: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::TtylConfig::load()?;

    // Log to stderr so command output on stdout stays clean.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Write {
            text,
            date,
            append,
            summarize,
        } => cli::entries::write(&config, date.as_deref(), text, append, summarize).await?,
        Command::Show { date } => cli::entries::show(&config, date.as_deref())?,
        Command::List { limit } => cli::entries::list(&config, limit)?,
        Command::Rename { key, name } => cli::entries::rename(&config, &key, &name)?,
        Command::Delete { key, yes } => cli::entries::delete(&config, &key, yes)?,
        Command::Voice { file, mime } => cli::voice::voice(&config, &file, mime.as_deref()).await?,
        Command::Capsule { action } => match action {
            CapsuleAction::Seal {
                text,
                guided,
                on,
                random,
            } => cli::capsule::seal(&config, guided, text, on.as_deref(), random)?,
            CapsuleAction::Open { key } => cli::capsule::open(&config, &key)?,
        },
        Command::Books { action } => match action {
            BooksAction::List { sort, folder } => {
                cli::books::list(&config, sort, folder.as_deref())?
            }
            BooksAction::Add {
                title,
                author,
                started,
                finished,
                pages,
                lookup,
            } => {
                let new = NewBook {
                    title: &title,
                    author: author.as_deref(),
                    started: started.as_deref(),
                    finished: finished.as_deref(),
                    pages,
                    lookup,
                };
                cli::books::add(&config, new).await?
            }
            BooksAction::Scan { image, lookup } => cli::books::scan(&config, &image, lookup).await?,
            BooksAction::Show { key } => cli::books::show(&config, &key)?,
            BooksAction::Notes { key, text } => cli::books::notes(&config, &key, text)?,
            BooksAction::Takeaway { key, text } => cli::books::add_takeaway(&config, &key, &text)?,
            BooksAction::Untake { key, id } => cli::books::remove_takeaway(&config, &key, id)?,
            BooksAction::Page {
                key,
                page,
                finished,
            } => cli::books::page(&config, &key, page, finished)?,
            BooksAction::Move { key, folder, none } => {
                anyhow::ensure!(folder.is_some() || none, "pass --folder <name> or --none");
                cli::books::move_book(&config, &key, folder.as_deref())?
            }
            BooksAction::Delete { keys, yes } => cli::books::delete(&config, &keys, yes)?,
            BooksAction::Organize => cli::books::organize(&config).await?,
            BooksAction::Stats => cli::books::stats(&config)?,
            BooksAction::Folder { action } => {
                let action = match action {
                    FolderCommand::List => FolderAction::List,
                    FolderCommand::Create { name } => FolderAction::Create { name },
                    FolderCommand::Rename { folder, name } => FolderAction::Rename { folder, name },
                    FolderCommand::Delete { folder, yes } => FolderAction::Delete { folder, yes },
                };
                cli::books::folder(&config, action)?
            }
        },
        Command::Prompts => cli::prefs::prompts(&config).await?,
        Command::Theme { theme, toggle } => cli::prefs::theme(&config, theme, toggle)?,
        Command::Export { output } => cli::export::export(&config, output.as_deref())?,
        Command::Stats => cli::stats::stats(&config)?,
    }

    Ok(())
}
