//! Product records, stock counts and active state.

use crate::backend::Store;
use crate::error::Result;
use crate::models::{Product, ProductFields};
use crate::notice::RemoveOutcome;
use crate::repository::{icontains, Tables};

/// Product operations over a [`Store`].
///
/// Stock is only ever changed here through [`update`](ProductStore::update);
/// sales adjust it through the [`SaleWorkflow`](crate::sales::SaleWorkflow).
#[derive(Clone)]
pub struct ProductStore<S: Store> {
    store: S,
}

impl<S: Store> ProductStore<S> {
    pub fn new(store: S) -> Self {
        ProductStore { store }
    }

    /// Active products ordered by name, then id.
    pub async fn list_active(&self) -> Result<Vec<Product>> {
        self.list(true).await
    }

    /// Deactivated products ordered by name, then id.
    pub async fn list_inactive(&self) -> Result<Vec<Product>> {
        self.list(false).await
    }

    async fn list(&self, active: bool) -> Result<Vec<Product>> {
        self.store
            .read(move |tables| {
                let mut products = tables.products.filter(|p| p.active == active);
                sort_by_name(&mut products);
                Ok(products)
            })
            .await
    }

    /// # Errors
    /// `Error::NotFound` if no product has this id.
    pub async fn get(&self, id: i64) -> Result<Product> {
        self.store
            .read(move |tables| tables.products.fetch(id).cloned())
            .await
    }

    /// # Errors
    /// `Error::Validation` if a field is invalid.
    pub async fn create(&self, fields: ProductFields) -> Result<Product> {
        let fields = clean(fields).validate()?;

        let product = self
            .store
            .transaction(move |tables| Ok(tables.products.insert(Product::new(fields))))
            .await?;

        info!(
            "[Products] Created product {} '{}' (stock {})",
            product.id, product.name, product.stock
        );
        Ok(product)
    }

    /// # Errors
    /// `Error::NotFound` if absent, `Error::Validation` if a field is invalid.
    pub async fn update(&self, id: i64, fields: ProductFields) -> Result<Product> {
        let fields = clean(fields).validate()?;

        let product = self
            .store
            .transaction(move |tables| tables.products.modify(id, |p| p.apply(fields)))
            .await?;

        info!("[Products] Updated product {} (stock {})", id, product.stock);
        Ok(product)
    }

    /// Whether any line item, on an active or voided sale, references the
    /// product.
    ///
    /// # Errors
    /// `Error::NotFound` if no product has this id.
    pub async fn was_sold(&self, id: i64) -> Result<bool> {
        self.store
            .read(move |tables| {
                tables.products.fetch(id)?;
                Ok(on_any_line(tables, id))
            })
            .await
    }

    /// Delete the product, or deactivate it if any line item references it.
    ///
    /// # Errors
    /// `Error::NotFound` if no product has this id.
    pub async fn remove(&self, id: i64) -> Result<RemoveOutcome> {
        let outcome = self
            .store
            .transaction(move |tables| {
                tables.products.fetch(id)?;
                if on_any_line(tables, id) {
                    tables.products.modify(id, |p| p.active = false)?;
                    Ok(RemoveOutcome::Deactivated)
                } else {
                    tables.products.delete(id);
                    Ok(RemoveOutcome::Deleted)
                }
            })
            .await?;

        match outcome {
            RemoveOutcome::Deleted => info!("[Products] Deleted product {}", id),
            RemoveOutcome::Deactivated => {
                warn!("[Products] Product {} was sold, marked inactive", id)
            }
        }
        Ok(outcome)
    }

    /// Products whose name contains `query` (ignoring case) and that have
    /// stock left. A blank query matches nothing.
    pub async fn search_in_stock(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.to_string();
        self.store
            .read(move |tables| Ok(search_in(tables, &query, |_| 0)))
            .await
    }
}

/// Name matches for `query` that can still be sold, sorted by name.
///
/// `held(id)` is stock the caller already holds of a product and counts as
/// available on top of `stock`.
pub(crate) fn search_in<H>(tables: &Tables, query: &str, held: H) -> Vec<Product>
where
    H: Fn(i64) -> u32,
{
    let mut found = tables
        .products
        .filter(|p| icontains(&p.name, query) && (p.stock > 0 || held(p.id) > 0));
    sort_by_name(&mut found);
    found
}

fn sort_by_name(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

fn on_any_line(tables: &Tables, product_id: i64) -> bool {
    tables.line_items.exists(|item| item.product_id == product_id)
}

fn clean(fields: ProductFields) -> ProductFields {
    ProductFields {
        name: fields.name.trim().to_string(),
        description: fields.description.trim().to_string(),
        ..fields
    }
}
