//! Snipcart checkout webhook payload.
//!
//! Only the fields the ingestion handler reads are modelled; everything else
//! in the payload is ignored. Optional fields default rather than fail so a
//! partially populated test order from the Snipcart dashboard still logs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::{FinancialEstimate, FulfillmentError, Money, NewOrder, OrderId};

/// Event name of the only webhook the ingestion handler acts on.
pub const ORDER_COMPLETED: &str = "order.completed";

/// Custom field carrying the customer's processing-time choice.
const PROCESSING_TIME_FIELD: &str = "Processing Time";

/// Envelope of every Snipcart webhook.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutEvent {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub content: Option<CheckoutContent>,
}

impl CheckoutEvent {
    /// Returns the order content if this is an `order.completed` event.
    pub fn completed_order(self) -> Option<CheckoutContent> {
        if self.event_name.as_deref() == Some(ORDER_COMPLETED) {
            self.content
        } else {
            None
        }
    }
}

/// The `content` object of an `order.completed` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContent {
    /// Snipcart order token; becomes the ledger `Order ID`.
    #[serde(default)]
    pub token: String,
    /// RFC 3339 completion timestamp.
    #[serde(default)]
    pub completion_date: String,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub user: Option<Customer>,
    /// Present once Snipcart has issued an invoice; revenue is only counted then.
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub final_grand_total: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub shippable: bool,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutContent {
    /// Name to ship to: the shipping address when the first item is
    /// shippable, otherwise the billing address.
    pub fn customer_name(&self) -> String {
        let first_shippable = self.items.first().is_some_and(|item| item.shippable);
        let address = if first_shippable {
            self.shipping_address.as_ref()
        } else {
            self.billing_address.as_ref()
        };
        address
            .and_then(|a| a.full_name.clone())
            .unwrap_or_default()
    }

    /// Customer email, empty when Snipcart sent none.
    pub fn email(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.email.clone())
            .unwrap_or_default()
    }

    /// `true` if any item asked for rush processing.
    pub fn is_rush(&self) -> bool {
        self.items.iter().flat_map(|i| &i.custom_fields).any(|f| {
            f.name == PROCESSING_TIME_FIELD
                && f.value.as_deref().is_some_and(|v| v.contains("Rush"))
        })
    }

    /// `"2x Keepsake Pillow, 1x Urn"`.
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("{}x {}", i.quantity, i.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Item names in order, as fed to the router.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.name.as_str())
    }

    /// Grand total when invoiced, otherwise zero.
    pub fn revenue(&self) -> Money {
        let invoiced = self
            .invoice_number
            .as_deref()
            .is_some_and(|n| !n.is_empty());
        if invoiced {
            self.final_grand_total
                .and_then(Money::new)
                .unwrap_or_default()
        } else {
            Money::zero()
        }
    }

    /// UTC calendar date of completion.
    pub fn completion_day(&self) -> Result<NaiveDate, FulfillmentError> {
        DateTime::parse_from_rfc3339(self.completion_date.trim())
            .map(|dt| dt.with_timezone(&Utc).date_naive())
            .map_err(|e| {
                FulfillmentError::validation(format!(
                    "invalid completionDate '{}': {e}",
                    self.completion_date
                ))
            })
    }

    /// Validates the content and derives everything the ledger row needs
    /// except the routing-dependent status and notes.
    pub fn to_new_order(&self) -> Result<NewOrder, FulfillmentError> {
        let order_id = OrderId::new(self.token.clone())
            .ok_or_else(|| FulfillmentError::validation("order token is missing"))?;
        let date = self.completion_day()?;
        let items_summary = self.items_summary();
        let financials = FinancialEstimate::estimate(&items_summary, self.revenue());

        Ok(NewOrder {
            order_id,
            date,
            customer_name: self.customer_name(),
            email: self.email(),
            items_summary,
            is_rush: self.is_rush(),
            financials,
        })
    }
}
