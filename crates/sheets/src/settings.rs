//! [`SettingsStore`] over the Settings table (`Key` / `Value` columns).

use std::sync::Arc;

use async_trait::async_trait;
use fulfillment::{SettingKey, Settings, SettingsStore, StoreError};
use tracing::info;

use crate::{Cells, RowStore, SheetError};

pub const KEY_COLUMN: &str = "Key";
pub const VALUE_COLUMN: &str = "Value";

/// Autopilot settings stored in one table of a [`RowStore`].
#[derive(Clone)]
pub struct SheetSettingsStore {
    store: Arc<dyn RowStore>,
    table: String,
}

impl SheetSettingsStore {
    /// Settings in `table` of `store`.
    pub fn new(store: Arc<dyn RowStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }
}

#[async_trait]
impl SettingsStore for SheetSettingsStore {
    async fn load_settings(&self) -> Result<Settings, StoreError> {
        let rows = match self.store.get_rows(&self.table).await {
            Err(SheetError::TableNotFound { .. }) => return Ok(Settings::new()),
            other => other?,
        };

        // Later rows win when a key is duplicated.
        Ok(rows
            .iter()
            .filter(|row| !row.get(KEY_COLUMN).is_empty())
            .map(|row| (row.get(KEY_COLUMN), row.get(VALUE_COLUMN)))
            .collect())
    }

    async fn upsert_setting(&self, key: &SettingKey, value: &str) -> Result<(), StoreError> {
        self.store
            .ensure_table(&self.table, &[KEY_COLUMN, VALUE_COLUMN])
            .await?;
        let rows = self.store.get_rows(&self.table).await?;

        if let Some(mut row) = rows.into_iter().find(|r| r.get(KEY_COLUMN) == key.as_str()) {
            row.set(VALUE_COLUMN, value);
            self.store.save_row(&self.table, &row).await?;
        } else {
            let cells: Cells = [
                (KEY_COLUMN.to_string(), key.to_string()),
                (VALUE_COLUMN.to_string(), value.to_string()),
            ]
            .into_iter()
            .collect();
            self.store.add_row(&self.table, &cells).await?;
        }

        info!(key = %key, value, "setting updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRowStore;

    fn store() -> (Arc<MemoryRowStore>, SheetSettingsStore) {
        let rows = Arc::new(MemoryRowStore::new());
        let settings = SheetSettingsStore::new(rows.clone(), "Settings");
        (rows, settings)
    }

    #[tokio::test]
    async fn missing_table_is_an_empty_snapshot() {
        let (_, settings) = store();
        assert!(settings.load_settings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let (rows, settings) = store();
        let key = SettingKey::new("AUTOPILOT_URN").unwrap();

        settings.upsert_setting(&key, "ON").await.unwrap();
        settings.upsert_setting(&key, "OFF").await.unwrap();

        assert_eq!(rows.get_rows("Settings").await.unwrap().len(), 1);
        let loaded = settings.load_settings().await.unwrap();
        assert_eq!(loaded.get("AUTOPILOT_URN"), Some("OFF"));
    }

    #[tokio::test]
    async fn blank_keys_are_ignored() {
        let (rows, settings) = store();
        rows.ensure_table("Settings", &["Key", "Value"]).await.unwrap();
        let blank: Cells = [("Value".to_string(), "ON".to_string())].into_iter().collect();
        rows.add_row("Settings", &blank).await.unwrap();

        assert!(settings.load_settings().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn outage_propagates() {
        let (rows, settings) = store();
        rows.set_offline(true);
        assert!(settings.load_settings().await.is_err());
    }
}
