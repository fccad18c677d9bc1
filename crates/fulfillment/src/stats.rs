//! Financial summary over the order ledger.

use serde::{Deserialize, Serialize};

use crate::{Money, OrderRecord};

/// Number of most recent orders included in the summary.
pub const RECENT_ORDER_COUNT: usize = 5;

/// Totals and recent activity for the admin dashboard widget.
///
/// Amounts are pre-formatted strings (two decimals; margin one decimal) so
/// the dashboard can render them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: String,
    pub total_cost: String,
    pub total_profit: String,
    /// Profit as a percentage of revenue; `"0.0"` when there is no revenue.
    pub margin: String,
    pub order_count: usize,
    /// Newest first.
    pub recent_orders: Vec<RecentOrder>,
}

/// One row of the recent-orders list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub id: String,
    pub date: String,
    pub customer: String,
    pub profit: String,
    pub status: String,
}

impl FinancialSummary {
    /// Summarises `orders`, which must be in ledger order (oldest first).
    pub fn from_orders(orders: &[OrderRecord]) -> Self {
        let mut revenue = Money::zero();
        let mut cost = Money::zero();
        let mut profit = Money::zero();
        for order in orders {
            revenue += order.revenue;
            cost += order.est_cost;
            profit += order.profit;
        }

        let margin = if revenue.as_f64() > 0.0 {
            format!("{:.1}", profit.as_f64() / revenue.as_f64() * 100.0)
        } else {
            "0.0".to_string()
        };

        let recent_orders = orders
            .iter()
            .rev()
            .take(RECENT_ORDER_COUNT)
            .map(|o| RecentOrder {
                id: o.order_id.clone(),
                date: o.date.clone(),
                customer: o.customer_name.clone(),
                profit: o.profit.to_cell(),
                status: o.status.clone(),
            })
            .collect();

        Self {
            total_revenue: revenue.to_cell(),
            total_cost: cost.to_cell(),
            total_profit: profit.to_cell(),
            margin,
            order_count: orders.len(),
            recent_orders,
        }
    }
}
