//! In-memory store (default, thread-safe, async).
//!
//! Holds all tables behind one `tokio::sync::RwLock`. Reads share the lock;
//! a transaction takes it exclusively, works on a copy of the tables and
//! swaps the copy in only on success. Optionally writes a snapshot file after
//! every commit so data survives restarts.

use super::Store;
use crate::error::Result;
use crate::repository::Tables;
use crate::serialization::{decode_snapshot, encode_snapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe async in-memory store.
///
/// Cloning is cheap and every clone shares the same tables.
///
/// # Example
///
/// ```no_run
/// use sales_kit::backend::{InMemoryStore, Store};
/// use sales_kit::models::{Customer, CustomerFields};
///
/// #[tokio::main]
/// async fn main() -> sales_kit::Result<()> {
///     let store = InMemoryStore::open("sales.snapshot").await?;
///
///     let customer = store
///         .transaction(|tables| {
///             Ok(tables.customers.insert(Customer::new(CustomerFields {
///                 first_name: "Ana".to_string(),
///                 last_name: "Pérez".to_string(),
///                 email: "ana@example.com".to_string(),
///                 phone: None,
///             })))
///         })
///         .await?;
///
///     let count = store.read(|tables| Ok(tables.customers.len())).await?;
///     assert_eq!(count, 1);
///     assert_eq!(customer.id, 1);
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    snapshot_path: Option<Arc<PathBuf>>,
}

impl InMemoryStore {
    /// Create an empty store without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `tables`, without persistence.
    pub fn with_tables(tables: Tables) -> Self {
        InMemoryStore {
            tables: Arc::new(RwLock::new(tables)),
            snapshot_path: None,
        }
    }

    /// Open a store persisted at `path`.
    ///
    /// Loads the snapshot if the file exists, otherwise starts empty. Every
    /// committed transaction rewrites the file.
    ///
    /// # Errors
    /// Returns `Err` if the file exists but cannot be read or decoded.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let tables: Tables = decode_snapshot(&bytes)?;
                info!(
                    "Loaded snapshot {} ({} customers, {} products, {} sales)",
                    path.display(),
                    tables.customers.len(),
                    tables.products.len(),
                    tables.sales.len()
                );
                tables
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot at {}, starting empty", path.display());
                Tables::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(InMemoryStore {
            tables: Arc::new(RwLock::new(tables)),
            snapshot_path: Some(Arc::new(path)),
        })
    }

    /// Path of the snapshot file, if persistence is enabled.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref().map(PathBuf::as_path)
    }

    /// Clone of the current tables.
    pub async fn snapshot(&self) -> Tables {
        self.tables.read().await.clone()
    }

    /// Row counts per table.
    pub async fn stats(&self) -> StoreStats {
        let tables = self.tables.read().await;
        StoreStats {
            customers: tables.customers.len(),
            products: tables.products.len(),
            sales: tables.sales.len(),
            line_items: tables.line_items.len(),
        }
    }

    /// Print store statistics to debug log.
    pub async fn log_stats(&self) {
        let stats = self.stats().await;
        debug!(
            "Store Stats: {} customers, {} products, {} sales, {} line items",
            stats.customers, stats.products, stats.sales, stats.line_items
        );
    }
}

/// Write the snapshot to a sibling `.tmp` file, then rename it over `path`.
async fn write_snapshot(path: &Path, tables: &Tables) -> Result<()> {
    let bytes = encode_snapshot(tables)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!("✓ Snapshot written to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

impl Store for InMemoryStore {
    async fn read<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Tables) -> Result<R> + Send,
        R: Send,
    {
        let tables = self.tables.read().await;
        f(&tables)
    }

    async fn transaction<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Tables) -> Result<R> + Send,
        R: Send,
    {
        let mut tables = self.tables.write().await;
        let mut working = tables.clone();

        let value = match f(&mut working) {
            Ok(value) => value,
            Err(e) => {
                debug!("✗ Transaction rolled back: {}", e);
                return Err(e);
            }
        };

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = write_snapshot(path, &working).await {
                warn!("⚠ Snapshot write failed, transaction rolled back: {}", e);
                return Err(e);
            }
        }

        *tables = working;
        debug!("✓ Transaction committed");
        Ok(value)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Store statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreStats {
    pub customers: usize,
    pub products: usize,
    pub sales: usize,
    pub line_items: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{Product, ProductFields};
    use rust_decimal::Decimal;

    fn product(name: &str, stock: u32) -> Product {
        Product::new(ProductFields {
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(150, 2),
            stock,
        })
    }

    #[tokio::test]
    async fn test_transaction_commits_all_writes() {
        let store = InMemoryStore::new();

        store
            .transaction(|tables| {
                tables.products.insert(product("Té", 3));
                tables.products.insert(product("Yerba", 5));
                Ok(())
            })
            .await
            .expect("transaction should commit");

        assert_eq!(store.stats().await.products, 2);
    }

    #[tokio::test]
    async fn test_failed_transaction_leaves_no_trace() {
        let store = InMemoryStore::new();
        store
            .transaction(|tables| {
                tables.products.insert(product("Té", 3));
                Ok(())
            })
            .await
            .unwrap();

        let result: Result<()> = store
            .transaction(|tables| {
                tables.products.modify(1, |p| p.stock = 0)?;
                tables.products.insert(product("Yerba", 5));
                Err(Error::validation("abort"))
            })
            .await;
        assert!(result.is_err());

        let tables = store.snapshot().await;
        assert_eq!(tables.products.len(), 1);
        assert_eq!(tables.products.get(1).map(|p| p.stock), Some(3));

        // The aborted insert must not have consumed an id either
        let next = store
            .transaction(|tables| Ok(tables.products.insert(product("Mate", 1))))
            .await
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        clone
            .transaction(|tables| Ok(tables.products.insert(product("Té", 3))))
            .await
            .unwrap();

        let count = store.read(|tables| Ok(tables.products.len())).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_snapshot_persists_across_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sales.snapshot");

        let store = InMemoryStore::open(&path).await.expect("open empty");
        assert_eq!(store.snapshot_path(), Some(path.as_path()));
        store
            .transaction(|tables| Ok(tables.products.insert(product("Té", 3))))
            .await
            .unwrap();

        let reopened = InMemoryStore::open(&path).await.expect("reopen");
        let tables = reopened.snapshot().await;
        assert_eq!(tables.products.get(1).map(|p| p.name.as_str()), Some("Té"));
    }

    #[tokio::test]
    async fn test_open_rejects_garbage_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("garbage.snapshot");
        tokio::fs::write(&path, b"not a snapshot").await.unwrap();

        assert!(matches!(
            InMemoryStore::open(&path).await,
            Err(Error::InvalidSnapshot(_))
        ));
    }
}
