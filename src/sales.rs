//! Sale creation, editing, voiding and listing.
//!
//! Every write runs as a single [`Store::transaction`]: the request is
//! validated against the tables inside the transaction and the writes follow
//! only once every line has passed. A rejected request leaves stock, sales and
//! line items exactly as they were.
//!
//! # Stock accounting
//!
//! | Operation | Effect on `product.stock` |
//! |-----------|---------------------------|
//! | create    | `stock - quantity` per line |
//! | edit      | every previous quantity credited back, then `- quantity` per new line |
//! | void      | none |
//!
//! The quantity available to an edit is therefore `stock + previous`, where
//! `previous` is what the sale already holds of that product (0 if none).

use crate::backend::Store;
use crate::customers;
use crate::error::{Error, Result};
use crate::models::{Customer, LineView, Product, Sale, SaleLineItem, SaleView};
use crate::products;
use crate::repository::Tables;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One requested line: a product and the quantity exactly as submitted.
///
/// The quantity stays a string until validation so that "invalid quantity"
/// is reported in line order, after the product lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: String,
}

impl LineRequest {
    pub fn new(product_id: i64, quantity: impl Into<String>) -> Self {
        LineRequest {
            product_id,
            quantity: quantity.into(),
        }
    }
}

/// Input of [`SaleWorkflow::create`] and [`SaleWorkflow::edit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub customer_id: i64,
    pub lines: Vec<LineRequest>,
}

/// Parse a submitted quantity.
///
/// Surrounding whitespace is ignored. Anything that is not a positive whole
/// number fitting in a `u32` is rejected.
///
/// # Errors
/// `Error::Validation("invalid quantity")`.
pub fn parse_quantity(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|q| *q > 0)
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| Error::validation("invalid quantity"))
}

/// A product offered by the sale form search, with the quantity that can
/// still be sold.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductOption {
    #[serde(flatten)]
    pub product: Product,
    /// Stock, plus on the edit form what the sale already holds.
    pub available: u32,
}

/// Search results backing the create-sale form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaleSearch {
    pub customers: Vec<Customer>,
    pub products: Vec<ProductOption>,
}

/// Everything the edit-sale form shows.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SaleEditForm {
    pub sale: SaleView,
    pub customers: Vec<Customer>,
    pub products: Vec<ProductOption>,
    /// Quantity per product id currently on the sale, used to pre-fill the
    /// form.
    pub previous_quantities: BTreeMap<i64, u32>,
}

/// A validated line, ready to be written.
struct PlannedLine {
    product_id: i64,
    quantity: u32,
    unit_price: Decimal,
}

/// Sale operations over a [`Store`].
///
/// # Example
///
/// ```
/// use sales_kit::backend::InMemoryStore;
/// use sales_kit::customers::CustomerStore;
/// use sales_kit::models::{CustomerFields, ProductFields};
/// use sales_kit::products::ProductStore;
/// use sales_kit::sales::{LineRequest, SaleRequest, SaleWorkflow};
/// use rust_decimal::Decimal;
///
/// # #[tokio::main]
/// # async fn main() -> sales_kit::Result<()> {
/// let store = InMemoryStore::new();
/// let customer = CustomerStore::new(store.clone())
///     .create(CustomerFields {
///         first_name: "Ana".to_string(),
///         last_name: "Pérez".to_string(),
///         email: "ana@example.com".to_string(),
///         phone: None,
///     })
///     .await?;
/// let tea = ProductStore::new(store.clone())
///     .create(ProductFields {
///         name: "Té".to_string(),
///         description: String::new(),
///         price: Decimal::new(250, 2),
///         stock: 5,
///     })
///     .await?;
///
/// let sales = SaleWorkflow::new(store);
/// let sale = sales
///     .create(SaleRequest {
///         customer_id: customer.id,
///         lines: vec![LineRequest::new(tea.id, "2")],
///     })
///     .await?;
///
/// assert_eq!(sale.total, Decimal::new(500, 2));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SaleWorkflow<S: Store> {
    store: S,
}

impl<S: Store> SaleWorkflow<S> {
    pub fn new(store: S) -> Self {
        SaleWorkflow { store }
    }

    /// Record a new sale and take its quantities out of stock.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound`: the customer or a product does not exist
    /// - `Error::Validation`: a quantity is invalid, a product appears twice
    ///   or stock is insufficient
    ///
    /// Nothing is written when any line fails.
    pub async fn create(&self, request: SaleRequest) -> Result<SaleView> {
        let SaleRequest { customer_id, lines } = request;

        let view = self
            .store
            .transaction(move |tables| {
                tables.customers.fetch(customer_id)?;
                let planned = plan_lines(tables, &lines, &BTreeMap::new())?;

                let sale = tables.sales.insert(Sale::new(customer_id));
                write_lines(tables, sale.id, &planned)?;
                view_of(tables, &sale)
            })
            .await?;

        info!(
            "[Sales] Created sale {} for customer {} ({} lines, total {})",
            view.sale.id,
            view.sale.customer_id,
            view.lines.len(),
            view.total
        );
        Ok(view)
    }

    /// Replace the customer and the whole line-item set of a sale.
    ///
    /// Each product may be sold up to its stock plus what the sale already
    /// holds of it. Products dropped from the sale get their quantity back.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound`: the sale, the customer or a product does not exist
    /// - `Error::Validation`: the sale is voided, a quantity is invalid, a
    ///   product appears twice or stock is insufficient
    pub async fn edit(&self, sale_id: i64, request: SaleRequest) -> Result<SaleView> {
        let SaleRequest { customer_id, lines } = request;

        let view = self
            .store
            .transaction(move |tables| {
                let sale = tables.sales.fetch(sale_id)?;
                if sale.voided {
                    return Err(Error::validation("voided sale cannot be edited"));
                }
                tables.customers.fetch(customer_id)?;

                let previous = previous_quantities(tables, sale_id);
                let planned = plan_lines(tables, &lines, &previous)?;

                for (&product_id, &quantity) in &previous {
                    credit_stock(tables, product_id, quantity)?;
                }
                tables.line_items.delete_where(|item| item.sale_id == sale_id);

                let sale = tables
                    .sales
                    .modify(sale_id, |s| s.customer_id = customer_id)?;
                write_lines(tables, sale.id, &planned)?;
                view_of(tables, &sale)
            })
            .await?;

        info!(
            "[Sales] Edited sale {} ({} lines, total {})",
            sale_id,
            view.lines.len(),
            view.total
        );
        Ok(view)
    }

    /// Mark a sale as voided. Stock and line items are left untouched.
    ///
    /// Voiding an already voided sale is a no-op.
    ///
    /// # Errors
    /// `Error::NotFound` if no sale has this id.
    pub async fn void(&self, sale_id: i64) -> Result<Sale> {
        let sale = self
            .store
            .transaction(move |tables| tables.sales.modify(sale_id, |s| s.voided = true))
            .await?;

        info!("[Sales] Voided sale {}", sale_id);
        Ok(sale)
    }

    /// A sale with its customer, lines and live total.
    ///
    /// # Errors
    /// `Error::NotFound` if no sale has this id.
    pub async fn get(&self, sale_id: i64) -> Result<SaleView> {
        self.store
            .read(move |tables| {
                let sale = tables.sales.fetch(sale_id)?;
                view_of(tables, sale)
            })
            .await
    }

    /// Active sales, newest first.
    pub async fn list_active(&self) -> Result<Vec<SaleView>> {
        self.list(false).await
    }

    /// Voided sales, newest first.
    pub async fn list_voided(&self) -> Result<Vec<SaleView>> {
        self.list(true).await
    }

    async fn list(&self, voided: bool) -> Result<Vec<SaleView>> {
        self.store
            .read(move |tables| {
                let mut sales = tables.sales.filter(|s| s.voided == voided);
                sales.sort_by(|a, b| {
                    b.created_at
                        .cmp(&a.created_at)
                        .then(b.id.cmp(&a.id))
                });
                sales.iter().map(|sale| view_of(tables, sale)).collect()
            })
            .await
    }

    /// Customer and product search for the create-sale form.
    ///
    /// Customers match on first name; products match on name and must have
    /// stock left. Blank queries return nothing.
    pub async fn search_form(&self, customer_query: &str, product_query: &str) -> Result<SaleSearch> {
        let customer_query = customer_query.to_string();
        let product_query = product_query.to_string();

        self.store
            .read(move |tables| {
                Ok(SaleSearch {
                    customers: customers::search_in(tables, &customer_query),
                    products: product_options(tables, &product_query, &BTreeMap::new()),
                })
            })
            .await
    }

    /// The edit-sale form: the current sale, search results and the
    /// quantities already on the sale.
    ///
    /// Product availability includes the quantity the sale already holds, so
    /// a product whose shelf is empty still shows up if this sale has some.
    ///
    /// # Errors
    /// `Error::NotFound` if no sale has this id.
    pub async fn edit_form(
        &self,
        sale_id: i64,
        customer_query: &str,
        product_query: &str,
    ) -> Result<SaleEditForm> {
        let customer_query = customer_query.to_string();
        let product_query = product_query.to_string();

        self.store
            .read(move |tables| {
                let sale = tables.sales.fetch(sale_id)?;
                let previous = previous_quantities(tables, sale_id);

                Ok(SaleEditForm {
                    sale: view_of(tables, sale)?,
                    customers: customers::search_in(tables, &customer_query),
                    products: product_options(tables, &product_query, &previous),
                    previous_quantities: previous,
                })
            })
            .await
    }
}

/// Quantity per product currently on a sale.
fn previous_quantities(tables: &Tables, sale_id: i64) -> BTreeMap<i64, u32> {
    let mut previous = BTreeMap::new();
    for item in tables.line_items.iter().filter(|i| i.sale_id == sale_id) {
        let entry = previous.entry(item.product_id).or_insert(0u32);
        *entry = entry.saturating_add(item.quantity);
    }
    previous
}

/// Validate every requested line in order, stopping at the first failure.
fn plan_lines(
    tables: &Tables,
    lines: &[LineRequest],
    previous: &BTreeMap<i64, u32>,
) -> Result<Vec<PlannedLine>> {
    let mut seen = BTreeSet::new();
    let mut planned = Vec::with_capacity(lines.len());

    for line in lines {
        let product = tables.products.fetch(line.product_id)?;
        if !seen.insert(product.id) {
            return Err(Error::validation(format!(
                "{} was selected more than once",
                product.name
            )));
        }

        let quantity = parse_quantity(&line.quantity)?;
        let held = previous.get(&product.id).copied().unwrap_or(0);
        let available = u64::from(product.stock) + u64::from(held);
        if u64::from(quantity) > available {
            debug!(
                "✗ Product {} has {} available, {} requested",
                product.id, available, quantity
            );
            return Err(Error::validation(format!(
                "insufficient stock for {}",
                product.name
            )));
        }

        planned.push(PlannedLine {
            product_id: product.id,
            quantity,
            unit_price: product.price,
        });
    }

    Ok(planned)
}

/// Insert the line items of a sale at the captured prices and take the
/// quantities out of stock.
fn write_lines(tables: &mut Tables, sale_id: i64, planned: &[PlannedLine]) -> Result<()> {
    for line in planned {
        let product = tables.products.fetch(line.product_id)?;
        let remaining = product.stock.checked_sub(line.quantity).ok_or_else(|| {
            Error::validation(format!("insufficient stock for {}", product.name))
        })?;

        tables.line_items.insert(SaleLineItem::new(
            sale_id,
            line.product_id,
            line.quantity,
            line.unit_price,
        ));
        tables
            .products
            .modify(line.product_id, |p| p.stock = remaining)?;
    }
    Ok(())
}

fn credit_stock(tables: &mut Tables, product_id: i64, quantity: u32) -> Result<()> {
    let product = tables.products.fetch(product_id)?;
    let credited = product.stock.checked_add(quantity).ok_or_else(|| {
        Error::validation(format!("stock of {} would overflow", product.name))
    })?;
    tables.products.modify(product_id, |p| p.stock = credited)?;
    Ok(())
}

fn product_options(
    tables: &Tables,
    query: &str,
    previous: &BTreeMap<i64, u32>,
) -> Vec<ProductOption> {
    let held = |id: i64| previous.get(&id).copied().unwrap_or(0);

    products::search_in(tables, query, &held)
        .into_iter()
        .map(|product| ProductOption {
            available: product.stock.saturating_add(held(product.id)),
            product,
        })
        .collect()
}

fn view_of(tables: &Tables, sale: &Sale) -> Result<SaleView> {
    let customer = tables.customers.fetch(sale.customer_id)?;

    let lines = tables
        .line_items_of(sale.id)
        .into_iter()
        .map(|item| -> Result<LineView> {
            let product = tables.products.fetch(item.product_id)?;
            Ok(LineView {
                product_name: product.name.clone(),
                subtotal: item.subtotal(),
                item,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SaleView {
        sale: sale.clone(),
        customer_name: customer.full_name(),
        total: tables.sale_total(sale.id),
        lines,
    })
}
