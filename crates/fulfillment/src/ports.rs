//! Port traits implemented by infrastructure crates.
//!
//! The domain defines *what* it needs from the outside world; `sheets`
//! supplies the ledger and settings stores and `alerts` supplies the
//! notifier. Handlers hold these as `Arc<dyn Trait>` so tests can swap in
//! in-memory implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Alert, LookupKey, OrderRecord, SettingKey, Settings};

/// Failure reported by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the request.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Transport or API error text.
        message: String,
    },

    /// The store answered but the data could not be interpreted.
    #[error("malformed store data: {message}")]
    Malformed {
        /// Description of what could not be read.
        message: String,
    },
}

/// Failure reported by an alert notifier.
///
/// Callers log and swallow these; an alert must never fail the operation that
/// triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("alert delivery failed: {message}")]
pub struct AlertError {
    /// Transport or relay error text.
    pub message: String,
}

/// Key/value table of autopilot toggles.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Loads the full settings table. A table that does not exist yet yields
    /// an empty snapshot, not an error.
    async fn load_settings(&self) -> Result<Settings, StoreError>;

    /// Inserts `key` or overwrites its value.
    async fn upsert_setting(&self, key: &SettingKey, value: &str) -> Result<(), StoreError>;
}

/// The table of order records.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Appends a new order row.
    async fn append_order(&self, record: &OrderRecord) -> Result<(), StoreError>;

    /// Returns the first order whose id matches `id`.
    async fn find_order(&self, id: &LookupKey) -> Result<Option<OrderRecord>, StoreError>;

    /// Marks the first order matching `id` as shipped, overwriting tracking
    /// number and courier only when provided. Returns `false` if no order
    /// matched.
    async fn mark_shipped(
        &self,
        id: &LookupKey,
        tracking_number: Option<&str>,
        courier: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Returns every order in ledger order (oldest first).
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError>;
}

/// Delivers operator alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Sends `alert`.
    async fn send(&self, alert: &Alert) -> Result<(), AlertError>;
}
