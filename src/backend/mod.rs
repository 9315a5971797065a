//! Store backends.

use crate::error::Result;
use crate::repository::Tables;

pub mod inmemory;

pub use inmemory::{InMemoryStore, StoreStats};

/// Trait for transactional store implementations.
///
/// Stores and workflows never touch tables outside of these two entry points:
///
/// - [`read`](Store::read) runs a closure against a consistent view of all
///   tables.
/// - [`transaction`](Store::transaction) runs a closure against mutable
///   tables. If the closure returns `Err`, none of its writes become
///   visible; if it returns `Ok`, all of them do.
///
/// Closures are synchronous: a transaction is a bounded unit of work with no
/// I/O of its own.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait Store: Send + Sync + Clone {
    /// Run `f` against a read-only view of the tables.
    ///
    /// # Errors
    /// Returns whatever `f` returns, or a backend error.
    async fn read<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Tables) -> Result<R> + Send,
        R: Send;

    /// Run `f` as one all-or-nothing unit of work.
    ///
    /// # Errors
    /// Returns whatever `f` returns (after rolling back), or a backend error
    /// raised while committing.
    async fn transaction<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Tables) -> Result<R> + Send,
        R: Send;

    /// Health check - verify the store is usable.
    ///
    /// # Errors
    /// Returns `Err` if the store is not accessible
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
