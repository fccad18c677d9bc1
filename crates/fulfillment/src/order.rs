//! Ledger records and the values derived when an order is first logged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Money, OrderId, RoutingOutcome};

// ---------------------------------------------------------------------------
// Fulfillment status
// ---------------------------------------------------------------------------

/// Status written to the ledger when an order is logged, or when a shipment
/// notice arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    /// Nothing was sent automatically and nothing needs a human.
    Processing,
    /// At least one item went to a vendor API and none need a human.
    SentToVendor,
    /// At least one item needs a manual order.
    ActionRequired,
    /// The router could not run; every item needs a human.
    RoutingError,
    /// A vendor reported the package as shipped.
    Shipped,
}

impl FulfillmentStatus {
    /// Derives the initial status from the routing outcome.
    ///
    /// A routing error outranks manual items, which outrank API successes.
    pub fn from_routing(outcome: &RoutingOutcome) -> Self {
        if outcome.error_message().is_some() {
            Self::RoutingError
        } else if outcome.needs_manual() {
            Self::ActionRequired
        } else if outcome.any_api_success() {
            Self::SentToVendor
        } else {
            Self::Processing
        }
    }

    /// Text written to the `Status` column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::SentToVendor => "Sent to Vendor",
            Self::ActionRequired => "⚠️ ACTION REQUIRED",
            Self::RoutingError => "⚠️ ROUTING ERROR",
            Self::Shipped => "Shipped",
        }
    }

    /// Returns `true` if an operator must be alerted.
    pub fn needs_attention(self) -> bool {
        self.label().contains('⚠')
    }

    /// `Status` cell for a new order, flagging rush orders.
    pub fn ledger_label(self, is_rush: bool) -> String {
        if is_rush {
            format!("{} (RUSH)", self.label())
        } else {
            self.label().to_string()
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Financial estimate
// ---------------------------------------------------------------------------

/// Per-category unit cost, matched against the lower-cased items summary.
/// The first matching row wins; only one cost is charged per order.
const CATEGORY_COSTS: &[(&[&str], f64)] = &[
    (&["pillow"], 23.50),
    (&["blanket"], 44.00),
    (&["shirt", "tee"], 14.00),
    (&["urn"], 80.00),
    (&["rug"], 35.00),
    (&["panel"], 35.00),
];

/// Share of revenue assumed as cost when no category matches.
const UNKNOWN_COST_RATIO: f64 = 0.5;

/// Revenue, estimated vendor cost, and resulting profit for one order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialEstimate {
    /// Amount charged to the customer.
    pub revenue: Money,
    /// Estimated vendor cost.
    pub est_cost: Money,
    /// `revenue - est_cost`.
    pub profit: Money,
}

impl FinancialEstimate {
    /// Estimates cost from the items summary text.
    pub fn estimate(items_summary: &str, revenue: Money) -> Self {
        let lower = items_summary.to_lowercase();
        let unit = CATEGORY_COSTS
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
            .map(|(_, cost)| *cost)
            .unwrap_or(revenue.as_f64() * UNKNOWN_COST_RATIO);
        let est_cost = Money::new(unit).unwrap_or_default();

        Self {
            revenue,
            est_cost,
            profit: revenue - est_cost,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger record
// ---------------------------------------------------------------------------

/// One row of the order ledger.
///
/// Free-text columns are kept as strings because operators edit the sheet by
/// hand; only the money columns are parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    /// `YYYY-MM-DD` as stored.
    pub date: String,
    pub customer_name: String,
    pub email: String,
    /// `"2x Keepsake Pillow, 1x Urn"`.
    pub items: String,
    pub is_rush: bool,
    pub status: String,
    pub tracking_number: String,
    pub courier: String,
    pub revenue: Money,
    pub est_cost: Money,
    pub profit: Money,
    pub notes: String,
}

/// Everything needed to log a freshly completed order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub date: NaiveDate,
    pub customer_name: String,
    pub email: String,
    pub items_summary: String,
    pub is_rush: bool,
    pub financials: FinancialEstimate,
}

impl NewOrder {
    /// Builds the ledger row for this order once routing has finished.
    pub fn into_record(self, status: FulfillmentStatus, notes: &[String]) -> OrderRecord {
        OrderRecord {
            order_id: self.order_id.to_string(),
            date: self.date.format("%Y-%m-%d").to_string(),
            customer_name: self.customer_name,
            email: self.email,
            items: self.items_summary,
            is_rush: self.is_rush,
            status: status.ledger_label(self.is_rush),
            tracking_number: String::new(),
            courier: String::new(),
            revenue: self.financials.revenue,
            est_cost: self.financials.est_cost,
            profit: self.financials.profit,
            notes: notes.join("\n"),
        }
    }
}
