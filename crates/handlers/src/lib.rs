//! OrderPilot webhook handlers.
//!
//! [`FulfillmentService`] holds the ports (ledger, settings store, alert
//! notifier) and the [`fulfillment::Autopilot`] router, and exposes one
//! method per inbound operation. Each method returns plain domain values or a
//! [`fulfillment::FulfillmentError`]; the `listener` crate turns those into
//! HTTP responses.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Methods sequence calls between business logic in the
//! [`fulfillment`] crate and the infrastructure behind its port traits. They
//! contain no routing rules of their own.
//!
//! | Module | Operation |
//! |--------|-----------|
//! | [`ingest`] | `order.completed` checkout webhook |
//! | [`shipment`] | Vendor shipment notices |
//! | [`tracking`] | Customer order-status lookup |
//! | [`settings`] | Read and update autopilot toggles |
//! | [`stats`] | Ledger financial summary |

use std::sync::Arc;

use fulfillment::{Alert, AlertNotifier, Autopilot, OrderLedger, SettingsStore};
use tracing::{info, warn};

pub mod ingest;
pub mod settings;
pub mod shipment;
pub mod stats;
pub mod tracking;

pub use ingest::IngestOutcome;
pub use settings::{SettingUpdate, SettingUpdated};
pub use shipment::ShipmentOutcome;
pub use tracking::{TrackingQuery, TrackingResult};

/// Default mailbox for manual-action alerts.
pub const DEFAULT_ALERT_EMAIL: &str = "alerts@infinitebondmemorials.com";

/// Default mailbox for emergency alerts.
pub const DEFAULT_EMERGENCY_EMAIL: &str = "emergency@infinitebondmemorials.com";

/// Where alerts are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecipients {
    /// Receives manual-action alerts.
    pub manual_action: String,
    /// Receives alerts about failed order logging.
    pub emergency: String,
}

impl Default for AlertRecipients {
    fn default() -> Self {
        Self {
            manual_action: DEFAULT_ALERT_EMAIL.to_string(),
            emergency: DEFAULT_EMERGENCY_EMAIL.to_string(),
        }
    }
}

/// Entry point for every webhook operation.
///
/// Cheap to clone; all ports are shared behind `Arc`.
#[derive(Clone)]
pub struct FulfillmentService {
    ledger: Arc<dyn OrderLedger>,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn AlertNotifier>,
    autopilot: Autopilot,
    recipients: AlertRecipients,
}

impl FulfillmentService {
    pub fn new(
        ledger: Arc<dyn OrderLedger>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn AlertNotifier>,
        autopilot: Autopilot,
        recipients: AlertRecipients,
    ) -> Self {
        Self {
            ledger,
            settings,
            notifier,
            autopilot,
            recipients,
        }
    }

    /// Sends `alert`, logging instead of failing when delivery does not work.
    async fn send_alert(&self, alert: Alert) {
        match self.notifier.send(&alert).await {
            Ok(()) => info!(recipient = %alert.email, "alert sent"),
            Err(err) => warn!(recipient = %alert.email, error = %err, "failed to send alert"),
        }
    }
}
