//! Operator alerts.
//!
//! Two alerts exist: a manual-action alert when an order needs a human, and
//! an emergency alert when order logging itself fails. Both are delivered by
//! an [`crate::ports::AlertNotifier`] as a `{ email, message }` JSON body.

use serde::{Deserialize, Serialize};

/// Alert payload posted to the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Recipient mailbox.
    pub email: String,
    /// Plain-text body.
    pub message: String,
}

/// Context for a manual-action alert.
#[derive(Debug, Clone, Copy)]
pub struct ManualActionContext<'a> {
    pub order_id: &'a str,
    pub customer_name: &'a str,
    pub status: &'a str,
    pub notes: &'a [String],
    pub items_summary: &'a str,
}

impl Alert {
    /// Alert asking an operator to place (part of) an order by hand.
    pub fn manual_action(recipient: impl Into<String>, ctx: ManualActionContext<'_>) -> Self {
        let instructions = backup_instructions(ctx.items_summary, ctx.order_id);
        let message = format!(
            "🚨 ACTION REQUIRED: Order Alert\n\n\
             Order ID: {}\n\
             Customer: {}\n\n\
             STATUS: {}\n\n\
             REASON:\n{}\n\n\
             {}\n\n\
             Please check the service logs or the order sheet immediately.",
            ctx.order_id,
            ctx.customer_name,
            ctx.status,
            ctx.notes.join("\n"),
            instructions,
        );
        Self {
            email: recipient.into(),
            message,
        }
    }

    /// Alert sent when the ingestion handler could not log an order.
    pub fn emergency(recipient: impl Into<String>, error: &str) -> Self {
        Self {
            email: recipient.into(),
            message: format!("CRITICAL SYSTEM FAILURE: Order processing crashed.\nError: {error}"),
        }
    }
}

/// Picks the backup ordering procedure for the vendor most likely involved,
/// judged from the lower-cased items summary.
pub fn backup_instructions(items_summary: &str, order_id: &str) -> String {
    let lower = items_summary.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if mentions(&["pillow", "blanket"]) {
        format!(
            "👉 BACKUP PROTOCOL (CustomCat Down?):\n\
             1. Log in to Printify (printify.com)\n\
             2. Select Provider: \"Monster Digital\" (Fastest alternative)\n\
             3. Create order with reference: {order_id}"
        )
    } else if mentions(&["rug", "premium"]) {
        "👉 BACKUP PROTOCOL (Contrado Down?):\n\
         1. Log in to Prodigi (prodigi.com) OR Printful\n\
         2. Select closest matching premium product\n\
         3. Ship via \"Expedited Traceable\""
            .to_string()
    } else if mentions(&["urn"]) {
        "👉 BACKUP PROTOCOL (Trupoint Down?):\n\
         1. Go to FuneralHomeGifts.com (Manual Order)\n\
         2. Place order for similar SKU\n\
         3. Use customer shipping address and pay with business card"
            .to_string()
    } else {
        "Please log in to the vendor dashboard and place this order manually.".to_string()
    }
}
