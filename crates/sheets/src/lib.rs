//! OrderPilot spreadsheet infrastructure adapter.
//!
//! Implements the [`fulfillment::OrderLedger`] and
//! [`fulfillment::SettingsStore`] ports on top of a small row-oriented table
//! abstraction, [`RowStore`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Spreadsheet transport, A1 ranges, header migration, and
//! lenient cell parsing all live here. The [`fulfillment`] crate sees only the
//! port traits.
//!
//! ## Backends
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`GoogleSheetsClient`] | Production: Google Sheets v4 REST API |
//! | [`MemoryRowStore`] | Local runs and tests; contents are lost on exit |

pub mod error;
pub mod google;
pub mod ledger;
pub mod memory;
pub mod row;
pub mod settings;

pub use error::SheetError;
pub use google::{GoogleSheetsClient, GoogleSheetsConfig};
pub use ledger::SheetOrderLedger;
pub use memory::MemoryRowStore;
pub use row::{Cells, Row, RowStore};
pub use settings::SheetSettingsStore;
