//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `browse`: library listing, option lists, in-progress and completed views
//! - `add`: adding albums and single tracks
//! - `edit`: replacing an album from an edit file
//! - `sheet`: creating, importing and exporting the worksheet
//! - `settings`: showing and saving the effective configuration

mod add;
mod browse;
mod edit;
mod settings;
mod sheet;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::model::User;
use crate::session::{Session, SessionOptions};
use crate::sheet::SqliteSheetStore;

pub use add::{cmd_add_album, cmd_add_track};
pub use browse::{
    cmd_albums, cmd_artists, cmd_completed, cmd_composers, cmd_in_progress, cmd_library, cmd_years,
};
pub use edit::cmd_edit_album;
pub use settings::cmd_config;
pub use sheet::{cmd_export, cmd_import, cmd_init};

/// Music Ledger CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Who is using the ledger (jom, jov or job)
    #[arg(short, long, global = true, env = "MUSIC_LEDGER_USER")]
    pub user: Option<String>,

    /// SQLite database holding the worksheet
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Worksheet name
    #[arg(long, global = true)]
    pub worksheet: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty ledger worksheet
    Init {
        /// Replace an existing worksheet
        #[arg(long)]
        force: bool,
    },
    /// Replace the worksheet with a JSON grid ({"columns": [...], "rows": [[...]]})
    Import {
        /// JSON file to read
        path: PathBuf,
    },
    /// Write the worksheet as a JSON grid
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List tracks, optionally filtered, with per-user averages
    Library {
        /// Keep tracks by any of these artists
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        /// Keep tracks on these albums
        #[arg(short = 'l', long = "album")]
        albums: Vec<String>,
    },
    /// List every credited artist
    Artists,
    /// List every credited composer
    Composers,
    /// List album titles, optionally for some artists
    Albums {
        #[arg(short, long = "artist")]
        artists: Vec<String>,
    },
    /// List every release year in the ledger
    Years,
    /// Add a whole album; track numbers follow the order given
    AddAlbum {
        /// Album title
        #[arg(short, long)]
        title: String,
        /// Release year
        #[arg(short, long)]
        year: i32,
        /// Album artist (repeatable)
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        /// An artist not yet in the ledger
        #[arg(long)]
        new_artist: Option<String>,
        /// Track as "Title" or "Title|Composer A; Composer B" (repeatable)
        #[arg(long = "track")]
        tracks: Vec<String>,
    },
    /// Add a single track to a new or existing album
    AddTrack {
        /// Track title
        #[arg(short, long)]
        title: String,
        /// Album title
        #[arg(short = 'l', long)]
        album: String,
        /// Artist (repeatable)
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        /// Release year (required for a new album, ignored otherwise)
        #[arg(short, long)]
        year: Option<i32>,
        /// Track number
        #[arg(short, long, default_value = "1")]
        number: u32,
        /// Composer (repeatable)
        #[arg(short, long = "composer")]
        composers: Vec<String>,
    },
    /// Albums you have not finished rating
    InProgress {
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        #[arg(short, long = "year")]
        years: Vec<i32>,
    },
    /// Albums you have rated in full, best first
    Completed {
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        #[arg(short, long = "year")]
        years: Vec<i32>,
    },
    /// Edit an album: print its edit file, or apply one
    EditAlbum {
        /// Album title
        #[arg(short = 'l', long)]
        album: String,
        /// Album artist, as stored (repeatable)
        #[arg(short, long = "artist")]
        artists: Vec<String>,
        /// Apply this JSON edit file instead of printing the current one
        #[arg(long)]
        apply: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Write it (including any flags given) to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Run the parsed command.
pub fn run_command(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let ctx = Context::new(cli, config, rt)?;

    match &cli.command {
        Commands::Init { force } => cmd_init(&ctx, *force),
        Commands::Import { path } => cmd_import(&ctx, path),
        Commands::Export { output } => cmd_export(&ctx, output.as_ref()),
        Commands::Library { artists, albums } => cmd_library(&ctx, artists, albums),
        Commands::Artists => cmd_artists(&ctx),
        Commands::Composers => cmd_composers(&ctx),
        Commands::Albums { artists } => cmd_albums(&ctx, artists),
        Commands::Years => cmd_years(&ctx),
        Commands::AddAlbum {
            title,
            year,
            artists,
            new_artist,
            tracks,
        } => cmd_add_album(&ctx, title, *year, artists, new_artist.as_deref(), tracks),
        Commands::AddTrack {
            title,
            album,
            artists,
            year,
            number,
            composers,
        } => cmd_add_track(&ctx, title, album, artists, *year, *number, composers),
        Commands::InProgress { artists, years } => cmd_in_progress(&ctx, artists, years),
        Commands::Completed { artists, years } => cmd_completed(&ctx, artists, years),
        Commands::EditAlbum {
            album,
            artists,
            apply,
        } => cmd_edit_album(&ctx, album, artists, apply.as_ref()),
        Commands::Config { save } => cmd_config(&ctx, *save),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Resolved settings shared by every command.
pub struct Context {
    pub rt: Runtime,
    /// File config with command-line overrides applied
    pub config: Config,
    pub options: SessionOptions,
}

impl Context {
    fn new(cli: &Cli, mut config: Config, rt: Runtime) -> anyhow::Result<Self> {
        if let Some(db) = &cli.db {
            config.store.database_path = db.clone();
        }
        if let Some(worksheet) = &cli.worksheet {
            config.store.worksheet = worksheet.clone();
        }
        if let Some(user) = &cli.user {
            config.session.default_user = Some(user.clone());
        }
        config.validate().context("invalid settings")?;

        Ok(Self {
            rt,
            options: SessionOptions::from(&config.store),
            config,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.config.store.database_path
    }

    /// The logged-in user; the name gate for every per-user command.
    pub fn user(&self) -> anyhow::Result<User> {
        let name = self
            .config
            .session
            .default_user
            .as_deref()
            .context("no user selected: pass --user (jom, jov or job)")?;
        Ok(name.parse()?)
    }

    pub async fn store(&self) -> anyhow::Result<SqliteSheetStore> {
        SqliteSheetStore::open(self.db_path())
            .await
            .with_context(|| format!("cannot open sheet database {}", self.db_path().display()))
    }

    pub async fn session(&self) -> anyhow::Result<Session<SqliteSheetStore>> {
        let user = self.user()?;
        let store = self.store().await?;
        Ok(Session::login(user, store, self.options.clone()).await?)
    }
}
