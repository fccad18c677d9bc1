//! Row-oriented table access.
//!
//! [`RowStore`] is the whole capability the rest of the crate needs from a
//! spreadsheet: list a table's rows, append a row, write a row back, and make
//! sure a table exists with the expected header columns. Rows are addressed by
//! header name, never by column position.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::SheetError;

/// Cell values keyed by header name.
pub type Cells = BTreeMap<String, String>;

/// One data row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position in the sheet. The header occupies row 1, so the first
    /// data row is 2.
    pub number: usize,
    cells: Cells,
}

impl Row {
    /// Creates a row at sheet position `number`.
    pub fn new(number: usize, cells: Cells) -> Self {
        Self { number, cells }
    }

    /// Value of column `header`, or `""` when the cell is empty or the column
    /// does not exist.
    pub fn get(&self, header: &str) -> &str {
        self.cells.get(header).map(String::as_str).unwrap_or("")
    }

    /// Sets column `header` to `value`. Not persisted until
    /// [`RowStore::save_row`] is called.
    pub fn set(&mut self, header: &str, value: impl Into<String>) {
        self.cells.insert(header.to_string(), value.into());
    }

    /// All cells of the row.
    pub fn cells(&self) -> &Cells {
        &self.cells
    }
}

/// Minimal table capability backed by a spreadsheet.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Creates `table` if it is missing and appends any of `headers` that the
    /// header row lacks. Existing columns keep their position.
    async fn ensure_table(&self, table: &str, headers: &[&str]) -> Result<(), SheetError>;

    /// Returns every data row of `table`, top to bottom.
    ///
    /// Fails with [`SheetError::TableNotFound`] when the table does not exist.
    async fn get_rows(&self, table: &str) -> Result<Vec<Row>, SheetError>;

    /// Appends a row. Cells whose header is not in the table are dropped.
    async fn add_row(&self, table: &str, cells: &Cells) -> Result<(), SheetError>;

    /// Writes `row` back to its position.
    async fn save_row(&self, table: &str, row: &Row) -> Result<(), SheetError>;
}
