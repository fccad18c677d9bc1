//! Ledger financial summary.

use fulfillment::{FinancialSummary, FulfillmentError};
use tracing::instrument;

use crate::FulfillmentService;

impl FulfillmentService {
    /// Totals, margin, and the five most recent orders.
    #[instrument(skip(self))]
    pub async fn financial_summary(&self) -> Result<FinancialSummary, FulfillmentError> {
        let orders = self.ledger.list_orders().await?;
        Ok(FinancialSummary::from_orders(&orders))
    }
}
