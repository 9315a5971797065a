use crate::entity::Record;
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest accepted price: ten significant digits, two of them fractional.
const MAX_PRICE_CENTS: i64 = 9_999_999_999;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price, always scale 2.
    pub price: Decimal,
    pub stock: u32,
    pub active: bool,
}

impl Product {
    /// Build an active, not yet stored product from validated fields.
    pub fn new(fields: ProductFields) -> Self {
        Self {
            id: 0,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            stock: fields.stock,
            active: true,
        }
    }

    /// Overwrite the editable fields, keeping id and active state.
    pub fn apply(&mut self, fields: ProductFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.stock = fields.stock;
    }
}

impl Record for Product {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn table_name() -> &'static str {
        "product"
    }
}

/// Editable product fields, as accepted by create and update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
}

impl ProductFields {
    /// Check the field-level constraints and normalise the price to two
    /// fractional digits.
    ///
    /// # Errors
    ///
    /// `Error::Validation` for a blank name, a negative price, a price with
    /// more than two fractional digits or one that does not fit in ten
    /// digits.
    pub fn validate(mut self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("product name is required"));
        }
        if self.name.len() > 100 {
            return Err(Error::validation(
                "product name must be at most 100 characters",
            ));
        }

        self.price = normalize_price(self.price)?;
        Ok(self)
    }
}

/// Validate a unit price and rescale it to exactly two fractional digits.
///
/// # Errors
///
/// `Error::Validation` when the price is negative, carries more than two
/// significant fractional digits or exceeds ten digits overall.
pub fn normalize_price(price: Decimal) -> Result<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(Error::validation("price cannot be negative"));
    }

    let mut normalized = price.normalize();
    if normalized.scale() > 2 {
        return Err(Error::validation(format!(
            "price {} has more than two decimal places",
            price
        )));
    }

    normalized.rescale(2);
    if normalized.mantissa() > i128::from(MAX_PRICE_CENTS) {
        return Err(Error::validation(format!("price {} is too large", price)));
    }

    Ok(normalized)
}
