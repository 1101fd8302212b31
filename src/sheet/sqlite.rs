//! SQLite-backed sheet store.
//!
//! Uses SQLx with SQLite for lightweight, embedded storage. A worksheet is
//! kept as its header row (`sheet_columns`) plus its non-blank body cells
//! (`sheet_cells`); blank cells are not stored. `overwrite` replaces a whole
//! worksheet inside one transaction, so a failed write leaves the previous
//! contents in place.
//!
//! # Example
//!
//! ```ignore
//! use music_ledger::sheet::{SheetStore, SqliteSheetStore};
//!
//! let store = SqliteSheetStore::open(Path::new("music_ledger.db")).await?;
//! let raw = store.read("tracks").await?;
//! ```

use std::path::Path;

use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use super::{RawTable, SheetStore};
use crate::error::{Error, Result};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "music_ledger.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Worksheets persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSheetStore {
    pool: SqlitePool,
}

impl SqliteSheetStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::connect(&db_url(Some(path))).await
    }

    /// Connect to a SQLite URL and run pending migrations.
    ///
    /// Creates the database file if it doesn't exist.
    pub async fn connect(db_url: &str) -> Result<Self> {
        if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
            sqlx::Sqlite::create_database(db_url).await?;
            info!(url = db_url, "Created sheet database");
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Names of every stored worksheet.
    pub async fn worksheets(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM worksheets ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

#[async_trait]
impl SheetStore for SqliteSheetStore {
    async fn read(&self, worksheet: &str) -> Result<RawTable> {
        let row_count: Option<(i64,)> =
            sqlx::query_as("SELECT row_count FROM worksheets WHERE name = ?")
                .bind(worksheet)
                .fetch_optional(&self.pool)
                .await?;
        let Some((row_count,)) = row_count else {
            return Err(Error::worksheet_not_found(worksheet));
        };

        let columns: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sheet_columns WHERE worksheet = ? ORDER BY position",
        )
        .bind(worksheet)
        .fetch_all(&self.pool)
        .await?;

        let cells: Vec<(i64, i64, String)> = sqlx::query_as(
            "SELECT row_index, position, value FROM sheet_cells WHERE worksheet = ?",
        )
        .bind(worksheet)
        .fetch_all(&self.pool)
        .await?;

        let width = columns.len();
        let mut table = RawTable::new(columns.into_iter().map(|(name,)| name).collect());
        table.rows = vec![vec![None; width]; usize::try_from(row_count).unwrap_or(0)];

        for (row_index, position, value) in cells {
            let slot = usize::try_from(row_index)
                .ok()
                .zip(usize::try_from(position).ok())
                .and_then(|(r, p)| table.rows.get_mut(r).and_then(|row| row.get_mut(p)));
            if let Some(slot) = slot {
                *slot = Some(value);
            }
        }

        debug!(worksheet, rows = table.len(), "Read worksheet");
        Ok(table)
    }

    async fn overwrite(&self, worksheet: &str, table: &RawTable) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO worksheets (name, row_count) VALUES (?, ?)
            ON CONFLICT(name) DO UPDATE SET row_count = excluded.row_count
            "#,
        )
        .bind(worksheet)
        .bind(table.len() as i64)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sheet_columns WHERE worksheet = ?")
            .bind(worksheet)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sheet_cells WHERE worksheet = ?")
            .bind(worksheet)
            .execute(&mut *tx)
            .await?;

        for (position, name) in table.columns.iter().enumerate() {
            sqlx::query("INSERT INTO sheet_columns (worksheet, position, name) VALUES (?, ?, ?)")
                .bind(worksheet)
                .bind(position as i64)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        let mut stored = 0usize;
        for (row_index, row) in table.rows.iter().enumerate() {
            for (position, value) in row.iter().enumerate().take(table.columns.len()) {
                let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) else {
                    continue;
                };
                sqlx::query(
                    "INSERT INTO sheet_cells (worksheet, row_index, position, value) VALUES (?, ?, ?, ?)",
                )
                .bind(worksheet)
                .bind(row_index as i64)
                .bind(position as i64)
                .bind(value)
                .execute(&mut *tx)
                .await?;
                stored += 1;
            }
        }

        tx.commit().await?;
        info!(worksheet, rows = table.len(), cells = stored, "Overwrote worksheet");
        Ok(())
    }
}
