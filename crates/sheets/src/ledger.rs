//! [`OrderLedger`] over the Orders table.

use std::sync::Arc;

use async_trait::async_trait;
use fulfillment::{LookupKey, Money, OrderLedger, OrderRecord, StoreError};
use tracing::{debug, info};

use crate::{Cells, Row, RowStore, SheetError};

/// Column names of the Orders table, in the order new tables are created.
pub mod columns {
    pub const ORDER_ID: &str = "Order ID";
    pub const DATE: &str = "Date";
    pub const CUSTOMER_NAME: &str = "Customer Name";
    pub const EMAIL: &str = "Email";
    pub const ITEMS: &str = "Items";
    pub const RUSH: &str = "Rush Order?";
    pub const STATUS: &str = "Status";
    pub const TRACKING_NUMBER: &str = "Tracking Number";
    pub const COURIER: &str = "Courier";
    pub const REVENUE: &str = "Revenue";
    pub const EST_COST: &str = "Est. Cost";
    pub const PROFIT: &str = "Profit";
    pub const NOTES: &str = "Notes";

    pub const ALL: [&str; 13] = [
        ORDER_ID,
        DATE,
        CUSTOMER_NAME,
        EMAIL,
        ITEMS,
        RUSH,
        STATUS,
        TRACKING_NUMBER,
        COURIER,
        REVENUE,
        EST_COST,
        PROFIT,
        NOTES,
    ];
}

/// Status written when a vendor reports the package shipped.
const SHIPPED: &str = "Shipped";

/// The order ledger stored in one table of a [`RowStore`].
#[derive(Clone)]
pub struct SheetOrderLedger {
    store: Arc<dyn RowStore>,
    table: String,
}

impl SheetOrderLedger {
    /// Ledger in `table` of `store`.
    pub fn new(store: Arc<dyn RowStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Data rows, treating a missing table as an empty ledger.
    async fn rows(&self) -> Result<Vec<Row>, SheetError> {
        match self.store.get_rows(&self.table).await {
            Err(SheetError::TableNotFound { .. }) => Ok(Vec::new()),
            other => other,
        }
    }
}

fn record_to_cells(record: &OrderRecord) -> Cells {
    use columns::*;

    [
        (ORDER_ID, record.order_id.clone()),
        (DATE, record.date.clone()),
        (CUSTOMER_NAME, record.customer_name.clone()),
        (EMAIL, record.email.clone()),
        (ITEMS, record.items.clone()),
        (RUSH, if record.is_rush { "YES" } else { "NO" }.to_string()),
        (STATUS, record.status.clone()),
        (TRACKING_NUMBER, record.tracking_number.clone()),
        (COURIER, record.courier.clone()),
        (REVENUE, record.revenue.to_cell()),
        (EST_COST, record.est_cost.to_cell()),
        (PROFIT, record.profit.to_cell()),
        (NOTES, record.notes.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Reads a row leniently: operators edit the sheet by hand, so unparseable
/// money cells count as zero rather than failing the whole request.
fn row_to_record(row: &Row) -> OrderRecord {
    use columns::*;

    let money = |header: &str| Money::parse_cell(row.get(header)).unwrap_or_default();
    OrderRecord {
        order_id: row.get(ORDER_ID).to_string(),
        date: row.get(DATE).to_string(),
        customer_name: row.get(CUSTOMER_NAME).to_string(),
        email: row.get(EMAIL).to_string(),
        items: row.get(ITEMS).to_string(),
        is_rush: row.get(RUSH).eq_ignore_ascii_case("YES"),
        status: row.get(STATUS).to_string(),
        tracking_number: row.get(TRACKING_NUMBER).to_string(),
        courier: row.get(COURIER).to_string(),
        revenue: money(REVENUE),
        est_cost: money(EST_COST),
        profit: money(PROFIT),
        notes: row.get(NOTES).to_string(),
    }
}

#[async_trait]
impl OrderLedger for SheetOrderLedger {
    async fn append_order(&self, record: &OrderRecord) -> Result<(), StoreError> {
        // Older sheets predate the financial columns; add whatever is missing.
        self.store.ensure_table(&self.table, &columns::ALL).await?;
        self.store
            .add_row(&self.table, &record_to_cells(record))
            .await?;
        info!(order_id = %record.order_id, table = %self.table, "order appended to ledger");
        Ok(())
    }

    async fn find_order(&self, id: &LookupKey) -> Result<Option<OrderRecord>, StoreError> {
        let rows = self.rows().await?;
        Ok(rows
            .iter()
            .find(|row| id.matches(row.get(columns::ORDER_ID)))
            .map(row_to_record))
    }

    async fn mark_shipped(
        &self,
        id: &LookupKey,
        tracking_number: Option<&str>,
        courier: Option<&str>,
    ) -> Result<bool, StoreError> {
        let rows = self.rows().await?;
        let Some(mut row) = rows
            .into_iter()
            .find(|row| id.matches(row.get(columns::ORDER_ID)))
        else {
            debug!(%id, "no ledger row for shipped order");
            return Ok(false);
        };

        row.set(columns::STATUS, SHIPPED);
        if let Some(tracking) = tracking_number.filter(|t| !t.is_empty()) {
            row.set(columns::TRACKING_NUMBER, tracking);
        }
        if let Some(courier) = courier.filter(|c| !c.is_empty()) {
            row.set(columns::COURIER, courier);
        }
        self.store.save_row(&self.table, &row).await?;
        Ok(true)
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        Ok(self.rows().await?.iter().map(row_to_record).collect())
    }
}
