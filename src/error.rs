//! Application-wide error types.
//!
//! Library modules return [`Error`] (built with `thiserror`); the CLI
//! wraps it in `anyhow` for convenient propagation.
//!
//! # Design
//!
//! - [`Error`]: top-level error enum
//! - [`ValidationError`]: rejected mutation input; the table is left as it was
//! - Cell-level parse failures are never errors, they become missing values
//!
//! # Example
//!
//! ```ignore
//! use music_ledger::error::{Result, ResultExt};
//!
//! fn load(store: &SqliteSheetStore) -> Result<RawTable> {
//!     store.read("tracks").await.with_context("loading ledger")
//! }
//! ```

use crate::model::AlbumIdentity;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sheet store (database) error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Mutation input was rejected
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The store has no worksheet with this name
    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    /// No rows carry this album identity
    #[error("Album not found: {0}")]
    AlbumNotFound(AlbumIdentity),

    /// An edit was saved without first selecting an album
    #[error("No album is being edited")]
    NoActiveEdit,

    /// JSON import/export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Reasons a mutation is rejected before it touches the table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one artist is required")]
    NoArtists,

    #[error("album title is required")]
    EmptyAlbumTitle,

    #[error("track title is required")]
    EmptyTrackTitle,

    #[error("add at least one track to the album")]
    NoTracks,

    #[error("no track with a title was submitted")]
    NoTitledTracks,

    #[error("year is required")]
    MissingYear,

    #[error("year {0} outside {min}-{max}", min = crate::model::MIN_YEAR, max = crate::model::MAX_YEAR)]
    YearOutOfRange(i32),

    #[error("track number must be at least 1")]
    InvalidTrackNumber,

    #[error("track number is required")]
    MissingTrackNumber,

    #[error("rating {0} outside 0-10")]
    RatingOutOfRange(f64),
}

impl Error {
    /// Create a worksheet-not-found error.
    pub fn worksheet_not_found(name: impl Into<String>) -> Self {
        Self::WorksheetNotFound(name.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for rejected input, as opposed to store or I/O failures.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::WithContext { source, .. } => source.is_validation(),
            _ => false,
        }
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::worksheet_not_found("tracks");
        assert!(err.to_string().contains("tracks"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::config("bad ttl").context("while loading config");
        let msg = err.to_string();
        assert!(msg.contains("while loading config"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::from(ValidationError::YearOutOfRange(1850));
        let msg = err.to_string();
        assert!(msg.contains("1850"));
        assert!(msg.contains("1900-2100"));
    }

    #[test]
    fn test_is_validation_sees_through_context() {
        let err = Error::from(ValidationError::NoArtists).context("adding album");
        assert!(err.is_validation());
        assert!(!Error::worksheet_not_found("x").is_validation());
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::config("test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}
