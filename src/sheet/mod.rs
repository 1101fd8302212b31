//! Sheet storage boundary.
//!
//! The ledger lives in a worksheet: a header row of column names followed
//! by rows of text cells. Stores only know how to read a worksheet whole and
//! overwrite it whole; there is no row-level update.
//!
//! - [`RawTable`]: the grid as the store sees it
//! - [`SheetStore`]: the read/overwrite contract
//! - [`normalize`]: raw grid <-> [`crate::model::Track`]
//! - [`sqlite`] / [`memory`]: store implementations
//!
//! Concurrent sessions writing the same worksheet race: the last overwrite
//! wins and silently discards the other session's edit.

pub mod memory;
pub mod normalize;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use memory::MemorySheetStore;
pub use normalize::{LoadReport, normalize, normalize_with_report, to_raw};
pub use sqlite::SqliteSheetStore;

/// A worksheet grid: named columns and rows of optional text cells.
///
/// Rows may be shorter than the header; missing trailing cells read as
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell text, or `None` when the cell is absent or blank.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a grid from `{"columns": [...], "rows": [[...], ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Whole-worksheet persistence.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read every row of a worksheet.
    async fn read(&self, worksheet: &str) -> Result<RawTable>;

    /// Replace the worksheet's entire contents with `table`.
    async fn overwrite(&self, worksheet: &str, table: &RawTable) -> Result<()>;
}
