//! In-memory sheet store.
//!
//! Holds worksheets in a shared map. Clones share the same map, so a test
//! can keep a handle and inspect what a session wrote.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{RawTable, SheetStore};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
    sheets: Mutex<HashMap<String, RawTable>>,
    overwrites: AtomicUsize,
    offline: AtomicBool,
}

/// Worksheets kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetStore {
    inner: Arc<Inner>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with one worksheet.
    pub fn with_sheet(worksheet: &str, table: RawTable) -> Self {
        let store = Self::new();
        store.inner.sheets.lock().insert(worksheet.to_string(), table);
        store
    }

    /// Current contents of a worksheet, if any.
    pub fn snapshot(&self, worksheet: &str) -> Option<RawTable> {
        self.inner.sheets.lock().get(worksheet).cloned()
    }

    /// Number of successful overwrites so far.
    pub fn overwrite_count(&self) -> usize {
        self.inner.overwrites.load(Ordering::SeqCst)
    }

    /// Simulate a lost connection: every call fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "sheet store unavailable",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn read(&self, worksheet: &str) -> Result<RawTable> {
        self.check_online()?;
        self.snapshot(worksheet)
            .ok_or_else(|| Error::worksheet_not_found(worksheet))
    }

    async fn overwrite(&self, worksheet: &str, table: &RawTable) -> Result<()> {
        self.check_online()?;
        self.inner
            .sheets
            .lock()
            .insert(worksheet.to_string(), table.clone());
        self.inner.overwrites.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::raw_table;

    #[tokio::test]
    async fn test_overwrite_visible_through_clones() {
        let store = MemorySheetStore::new();
        let handle = store.clone();
        let table = raw_table(&["a"], &[&["1"]]);

        store.overwrite("tracks", &table).await.unwrap();

        assert_eq!(handle.snapshot("tracks"), Some(table));
        assert_eq!(handle.overwrite_count(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_fails_without_writing() {
        let store = MemorySheetStore::with_sheet("tracks", raw_table(&["a"], &[&["1"]]));
        store.set_offline(true);

        assert!(store.read("tracks").await.is_err());
        assert!(store.overwrite("tracks", &RawTable::default()).await.is_err());
        assert_eq!(store.overwrite_count(), 0);

        store.set_offline(false);
        assert_eq!(store.read("tracks").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_worksheet() {
        let store = MemorySheetStore::new();
        assert!(matches!(
            store.read("nope").await,
            Err(Error::WorksheetNotFound(_))
        ));
    }
}
