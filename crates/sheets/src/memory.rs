//! In-process [`RowStore`] used for local runs and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Cells, Row, RowStore, SheetError};

#[derive(Debug, Default)]
struct MemoryTable {
    headers: Vec<String>,
    rows: Vec<Cells>,
}

/// A [`RowStore`] that keeps tables in memory.
///
/// Mirrors spreadsheet behaviour closely enough for handler tests: tables must
/// be created before use, unknown columns are dropped on append, and rows are
/// numbered from 2. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: Mutex<HashMap<String, MemoryTable>>,
    offline: AtomicBool,
}

impl MemoryRowStore {
    /// Creates a store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`SheetError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Header row of `table`, if it exists.
    pub async fn headers(&self, table: &str) -> Option<Vec<String>> {
        self.tables.lock().await.get(table).map(|t| t.headers.clone())
    }

    fn check_online(&self) -> Result<(), SheetError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(SheetError::Offline)
        } else {
            Ok(())
        }
    }
}

fn not_found(table: &str) -> SheetError {
    SheetError::TableNotFound {
        table: table.to_string(),
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn ensure_table(&self, table: &str, headers: &[&str]) -> Result<(), SheetError> {
        self.check_online()?;
        let mut tables = self.tables.lock().await;
        let entry = tables.entry(table.to_string()).or_default();
        for header in headers {
            if !entry.headers.iter().any(|h| h == header) {
                entry.headers.push((*header).to_string());
            }
        }
        Ok(())
    }

    async fn get_rows(&self, table: &str) -> Result<Vec<Row>, SheetError> {
        self.check_online()?;
        let tables = self.tables.lock().await;
        let t = tables.get(table).ok_or_else(|| not_found(table))?;
        Ok(t.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| Row::new(i + 2, cells.clone()))
            .collect())
    }

    async fn add_row(&self, table: &str, cells: &Cells) -> Result<(), SheetError> {
        self.check_online()?;
        let mut tables = self.tables.lock().await;
        let t = tables.get_mut(table).ok_or_else(|| not_found(table))?;
        let kept = cells
            .iter()
            .filter(|(k, _)| t.headers.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        t.rows.push(kept);
        Ok(())
    }

    async fn save_row(&self, table: &str, row: &Row) -> Result<(), SheetError> {
        self.check_online()?;
        let mut tables = self.tables.lock().await;
        let MemoryTable { headers, rows } = tables.get_mut(table).ok_or_else(|| not_found(table))?;
        let slot = row
            .number
            .checked_sub(2)
            .and_then(|i| rows.get_mut(i))
            .ok_or_else(|| SheetError::Malformed {
                message: format!("row {} is outside table '{table}'", row.number),
            })?;
        *slot = row
            .cells()
            .iter()
            .filter(|(k, _)| headers.contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(())
    }
}
