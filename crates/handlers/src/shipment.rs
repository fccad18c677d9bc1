//! Vendor shipment notices.

use fulfillment::{FulfillmentError, LookupKey, ShipmentNotice, ShipmentProvider};
use serde_json::Value;
use tracing::{info, instrument};

use crate::FulfillmentService;

/// Result of applying a shipment notice. Every variant is acknowledged with
/// success so vendors do not retry notices we cannot use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipmentOutcome {
    /// The payload matched no provider, or carried no order id.
    NoExternalId,
    /// The order was marked shipped.
    Updated {
        provider: ShipmentProvider,
        order_id: String,
    },
    /// No ledger row carries this order id.
    UnknownOrder {
        provider: ShipmentProvider,
        order_id: String,
    },
}

impl ShipmentOutcome {
    /// Acknowledgement text returned to the vendor.
    pub fn message(&self) -> String {
        match self {
            Self::NoExternalId => "Skipped: No External ID found".to_string(),
            Self::Updated { order_id, .. } => format!("Updated order {order_id}"),
            Self::UnknownOrder { .. } => "Order ID not found in database".to_string(),
        }
    }
}

impl FulfillmentService {
    /// Applies a raw shipment webhook body to the ledger.
    #[instrument(skip(self, body))]
    pub async fn apply_shipment(&self, body: &Value) -> Result<ShipmentOutcome, FulfillmentError> {
        let Some(notice) = ShipmentNotice::classify(body) else {
            info!("shipment payload matched no known provider");
            return Ok(ShipmentOutcome::NoExternalId);
        };
        let update = notice.normalize();
        let provider = update.provider;

        let Some((order_id, key)) = update
            .external_id
            .as_deref()
            .and_then(|id| LookupKey::new(id).map(|key| (id.to_string(), key)))
        else {
            info!(%provider, "shipment notice carried no order id");
            return Ok(ShipmentOutcome::NoExternalId);
        };

        info!(%provider, %order_id, "processing shipment notice");
        let updated = self
            .ledger
            .mark_shipped(
                &key,
                update.tracking_number.as_deref(),
                update.carrier.as_deref(),
            )
            .await?;

        if updated {
            Ok(ShipmentOutcome::Updated { provider, order_id })
        } else {
            info!(%provider, %order_id, "order not found in ledger");
            Ok(ShipmentOutcome::UnknownOrder { provider, order_id })
        }
    }
}
