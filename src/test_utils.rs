//! Test utilities and fixtures for music-ledger tests.
//!
//! This module provides common test helpers, mock factories and store
//! utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use music_ledger::test_utils::{album_tracks, rate, seeded_store};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let mut tracks = album_tracks("X", &["A"], 2000, 3);
//!     rate(&mut tracks[0], User::Jom, 8.0);
//!     let store = seeded_store(tracks);
//!     // ... test logic
//! }
//! ```

use tempfile::TempDir;

use crate::model::{Rating, Ratings, Track, User};
use crate::session::DEFAULT_WORKSHEET;
use crate::sheet::{MemorySheetStore, RawTable, SqliteSheetStore, to_raw};

/// Creates a temporary SQLite sheet store for testing.
///
/// The database lives in a temporary directory that is removed when the
/// returned `TempDir` is dropped. Keep it alive for the duration of the test.
///
/// ```ignore
/// let (store, _dir) = temp_store().await;
/// ```
pub async fn temp_store() -> (SqliteSheetStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");

    let store = SqliteSheetStore::open(&db_path)
        .await
        .expect("Failed to initialize test store");

    (store, dir)
}

/// An in-memory store whose default worksheet holds `tracks`.
pub fn seeded_store(tracks: Vec<Track>) -> MemorySheetStore {
    MemorySheetStore::with_sheet(DEFAULT_WORKSHEET, to_raw(&tracks))
}

/// Creates a mock Track with sensible defaults.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let custom = Track {
///     title: "Custom Title".to_string(),
///     ..mock_track()
/// };
/// ```
pub fn mock_track() -> Track {
    Track {
        track_number: Some(1),
        title: "Test Track".to_string(),
        artists: vec!["Test Artist".to_string()],
        album: "Test Album".to_string(),
        year: Some(2023),
        composers: vec!["Test Composer".to_string()],
        ratings: Ratings::unrated(),
    }
}

/// `count` unrated tracks of one album, numbered from 1.
pub fn album_tracks(album: &str, artists: &[&str], year: i32, count: usize) -> Vec<Track> {
    (1..=count)
        .map(|n| Track {
            track_number: Some(n as u32),
            title: format!("{album} {n}"),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album: album.to_string(),
            year: Some(year),
            composers: Vec::new(),
            ratings: Ratings::unrated(),
        })
        .collect()
}

/// Set one user's rating on a track.
pub fn rate(track: &mut Track, user: User, value: f64) {
    track
        .ratings
        .set(user, Some(Rating::new(value).expect("rating in range")));
}

/// Build a raw grid from string literals; `""` becomes a blank cell.
pub fn raw_table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect()
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetStore;

    #[tokio::test]
    async fn test_temp_store_creates_working_database() {
        let (store, _dir) = temp_store().await;
        assert!(store.worksheets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_store_holds_tracks() {
        let store = seeded_store(album_tracks("X", &["A"], 2000, 3));
        let raw = store.read(DEFAULT_WORKSHEET).await.unwrap();
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_mock_track_defaults() {
        let track = mock_track();
        assert_eq!(track.title, "Test Track");
        assert_eq!(track.track_number, Some(1));
        assert!(track.rating(User::Jom).is_none());
    }

    #[test]
    fn test_album_tracks_numbering() {
        let tracks = album_tracks("X", &["A", "B"], 1999, 3);
        let numbers: Vec<_> = tracks.iter().map(|t| t.track_number).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(tracks[0].artists, vec!["A", "B"]);
    }

    #[test]
    fn test_raw_table_blank_cells() {
        let raw = raw_table(&["a", "b"], &[&["1", ""]]);
        assert_eq!(raw.rows[0], vec![Some("1".to_string()), None]);
    }
}
