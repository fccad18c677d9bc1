//! Checkout webhook ingestion.

use fulfillment::{
    Alert, CheckoutEvent, FulfillmentError, FulfillmentStatus, ManualActionContext,
    RoutingOutcome,
};
use tracing::{error, info, instrument, warn, Span};

use crate::FulfillmentService;

/// Result of handling a checkout webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Not an `order.completed` event; acknowledged without action.
    Ignored,
    /// The order was routed and appended to the ledger.
    Logged {
        /// Ledger order id.
        order_id: String,
        /// Status written to the ledger.
        status: FulfillmentStatus,
        /// Router outcome, echoed back to the caller.
        router: RoutingOutcome,
    },
}

impl FulfillmentService {
    /// Routes a completed checkout, alerts an operator if a human is needed,
    /// and appends the order to the ledger.
    ///
    /// Routing failures do not fail the request; the order is logged with a
    /// routing-error status instead. A ledger failure fails the request and
    /// triggers an emergency alert.
    #[instrument(skip(self, event), fields(order_id = tracing::field::Empty))]
    pub async fn ingest_checkout(
        &self,
        event: CheckoutEvent,
    ) -> Result<IngestOutcome, FulfillmentError> {
        let Some(content) = event.completed_order() else {
            info!("ignoring non order.completed event");
            return Ok(IngestOutcome::Ignored);
        };

        let order = content.to_new_order()?;
        Span::current().record("order_id", order.order_id.as_str());

        let router = self
            .autopilot
            .route(self.settings.as_ref(), content.item_names())
            .await;
        let status = FulfillmentStatus::from_routing(&router);
        let notes = router.notes();
        info!(%status, action = ?router, "autopilot finished");

        if status.needs_attention() {
            warn!(%status, "order needs manual attention; alerting");
            let alert = Alert::manual_action(
                self.recipients.manual_action.clone(),
                ManualActionContext {
                    order_id: order.order_id.as_str(),
                    customer_name: &order.customer_name,
                    status: status.label(),
                    notes: &notes,
                    items_summary: &order.items_summary,
                },
            );
            self.send_alert(alert).await;
        }

        let order_id = order.order_id.to_string();
        let record = order.into_record(status, &notes);
        if let Err(err) = self.ledger.append_order(&record).await {
            error!(error = %err, "failed to log order");
            self.send_alert(Alert::emergency(
                self.recipients.emergency.clone(),
                &err.to_string(),
            ))
            .await;
            return Err(err.into());
        }

        Ok(IngestOutcome::Logged {
            order_id,
            status,
            router,
        })
    }
}
