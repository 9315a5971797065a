//! Core record trait that every stored entity implements.

use serde::{Deserialize, Serialize};

/// Trait that all records kept in a [`Table`](crate::repository::Table) must implement.
///
/// Ids are positive integers assigned by the table on insert, in insertion
/// order. A record built before insertion carries id `0`; the table
/// overwrites it through [`Record::assign_id`].
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use sales_kit::Record;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Supplier {
///     pub id: i64,
///     pub name: String,
/// }
///
/// impl Record for Supplier {
///     fn record_id(&self) -> i64 {
///         self.id
///     }
///
///     fn assign_id(&mut self, id: i64) {
///         self.id = id;
///     }
///
///     fn table_name() -> &'static str {
///         "supplier"
///     }
/// }
/// ```
pub trait Record: Send + Sync + Serialize + for<'de> Deserialize<'de> + Clone {
    /// Return the record's id.
    fn record_id(&self) -> i64;

    /// Overwrite the record's id. Called by the table on insert.
    fn assign_id(&mut self, id: i64);

    /// Return the table name for this record type.
    ///
    /// Used in log lines and in [`Error::NotFound`](crate::Error::NotFound).
    fn table_name() -> &'static str;
}
