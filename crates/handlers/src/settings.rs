//! Autopilot toggle management.

use fulfillment::{FulfillmentError, SettingKey, Settings};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::FulfillmentService;

/// Body of a settings update: `{ "key": "AUTOPILOT_BLANKET", "value": "ON" }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingUpdate {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Acknowledgement of a settings update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingUpdated {
    pub message: String,
    pub key: String,
    pub value: String,
}

impl FulfillmentService {
    /// Returns every setting, with the global switch reported as `OFF` when
    /// unset.
    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<Settings, FulfillmentError> {
        Ok(self.settings.load_settings().await?.with_reported_defaults())
    }

    /// Inserts or overwrites one setting. Both key and value must be
    /// non-empty.
    #[instrument(skip(self, update), fields(key = ?update.key))]
    pub async fn update_setting(
        &self,
        update: SettingUpdate,
    ) -> Result<SettingUpdated, FulfillmentError> {
        let value = update.value.filter(|v| !v.is_empty());
        let (Some(key), Some(value)) = (update.key.and_then(SettingKey::new), value) else {
            return Err(FulfillmentError::validation("Bad Request"));
        };

        self.settings.upsert_setting(&key, &value).await?;
        Ok(SettingUpdated {
            message: "Updated".to_string(),
            key: key.to_string(),
            value,
        })
    }
}
