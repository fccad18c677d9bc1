//! Customer order-status lookup.

use fulfillment::{FulfillmentError, LookupKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::FulfillmentService;

/// Query parameters of a tracking request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackingQuery {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Order status as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResult {
    pub found: bool,
    pub order_id: String,
    pub status: String,
    pub date: String,
    pub tracking_number: String,
    pub courier: String,
    pub is_rush: bool,
}

/// Message for a request missing either parameter.
pub const MISSING_PARAMS: &str = "Missing Order ID or Email";

/// Message for a lookup that matched no order.
pub const ORDER_NOT_FOUND: &str = "Order not found";

impl FulfillmentService {
    /// Finds the order matching both id and email.
    ///
    /// Both parameters are required and validated before the ledger is read.
    /// Matching ignores case and surrounding whitespace on both sides.
    #[instrument(skip(self, query))]
    pub async fn track_order(&self, query: TrackingQuery) -> Result<TrackingResult, FulfillmentError> {
        let id = query.id.as_deref().and_then(LookupKey::new);
        let email = query.email.as_deref().and_then(LookupKey::new);
        let (Some(id), Some(email)) = (id, email) else {
            return Err(FulfillmentError::validation(MISSING_PARAMS));
        };

        let orders = self.ledger.list_orders().await?;
        let order = orders
            .into_iter()
            .find(|o| id.matches(&o.order_id) && email.matches(&o.email))
            .ok_or_else(|| FulfillmentError::not_found(ORDER_NOT_FOUND))?;

        debug!(order_id = %order.order_id, status = %order.status, "tracking lookup matched");
        Ok(TrackingResult {
            found: true,
            order_id: order.order_id,
            status: order.status,
            date: order.date,
            tracking_number: order.tracking_number,
            courier: order.courier,
            is_rush: order.is_rush,
        })
    }
}
