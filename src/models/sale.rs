use crate::entity::Record;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sale header. The total is never stored; see [`Tables::sale_total`](crate::repository::Tables::sale_total).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub customer_id: i64,
    pub created_at: DateTime<Utc>,
    /// One-way flag: `Active -> Voided`.
    pub voided: bool,
}

impl Sale {
    pub fn new(customer_id: i64) -> Self {
        Self {
            id: 0,
            customer_id,
            created_at: Utc::now(),
            voided: false,
        }
    }
}

impl Record for Sale {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn table_name() -> &'static str {
        "sale"
    }
}

/// One product/quantity/price entry of a sale.
///
/// `unit_price` is a snapshot of the product price at the time the line was
/// written and does not follow later price changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl SaleLineItem {
    pub fn new(sale_id: i64, product_id: i64, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            id: 0,
            sale_id,
            product_id,
            quantity,
            unit_price,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

impl Record for SaleLineItem {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn table_name() -> &'static str {
        "sale line item"
    }
}

/// A sale joined with its customer name, line items and live total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaleView {
    pub sale: Sale,
    pub customer_name: String,
    pub lines: Vec<LineView>,
    pub total: Decimal,
}

/// A line item joined with its product name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineView {
    #[serde(flatten)]
    pub item: SaleLineItem,
    pub product_name: String,
    pub subtotal: Decimal,
}
