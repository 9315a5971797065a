//! Service container for web applications.
//!
//! Bundles the customer, product and sale operations over one shared store
//! so a single value can be handed to every request handler.

use crate::backend::Store;
use crate::customers::CustomerStore;
use crate::error::Result;
use crate::products::ProductStore;
use crate::sales::SaleWorkflow;
use std::sync::Arc;

/// All application operations over one store.
///
/// Cloning is cheap (one `Arc` increment) and every clone sees the same
/// data, so it can live directly in the router state.
///
/// # Example
///
/// ```
/// use sales_kit::{InMemoryStore, SalesService};
///
/// # #[tokio::main]
/// # async fn main() -> sales_kit::Result<()> {
/// let service = SalesService::new(InMemoryStore::new());
/// let handle = service.clone();
///
/// assert!(handle.customers().list_active().await?.is_empty());
/// assert!(service.health_check().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SalesService<S: Store> {
    inner: Arc<Services<S>>,
}

struct Services<S: Store> {
    store: S,
    customers: CustomerStore<S>,
    products: ProductStore<S>,
    sales: SaleWorkflow<S>,
}

impl<S: Store> SalesService<S> {
    pub fn new(store: S) -> Self {
        SalesService {
            inner: Arc::new(Services {
                customers: CustomerStore::new(store.clone()),
                products: ProductStore::new(store.clone()),
                sales: SaleWorkflow::new(store.clone()),
                store,
            }),
        }
    }

    pub fn customers(&self) -> &CustomerStore<S> {
        &self.inner.customers
    }

    pub fn products(&self) -> &ProductStore<S> {
        &self.inner.products
    }

    pub fn sales(&self) -> &SaleWorkflow<S> {
        &self.inner.sales
    }

    /// # Errors
    /// Returns `Err` if the store is not accessible.
    pub async fn health_check(&self) -> Result<bool> {
        self.inner.store.health_check().await
    }
}
