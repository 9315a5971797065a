//! Generic record access: tables with filter, insert, update, delete and count.
//!
//! `Table<T>` is the record-access interface every store and workflow is
//! written against. It knows nothing about customers or sales; the domain
//! rules live in [`customers`](crate::customers), [`products`](crate::products)
//! and [`sales`](crate::sales).
//!
//! `Tables` groups the four tables of the application. A
//! [`Store`](crate::backend::Store) hands out `&Tables` for reads and
//! `&mut Tables` inside a transaction.
//!
//! # Example
//!
//! ```
//! use sales_kit::repository::Tables;
//! use sales_kit::models::{Customer, CustomerFields};
//!
//! let mut tables = Tables::default();
//! let stored = tables.customers.insert(Customer::new(CustomerFields {
//!     first_name: "Ana".to_string(),
//!     last_name: "Pérez".to_string(),
//!     email: "ana@example.com".to_string(),
//!     phone: None,
//! }));
//!
//! assert_eq!(stored.id, 1);
//! assert_eq!(tables.customers.count(|c| c.active), 1);
//! ```

use crate::entity::Record;
use crate::error::{Error, Result};
use crate::models::{Customer, Product, Sale, SaleLineItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered collection of records keyed by id.
///
/// Iteration and [`filter`](Table::filter) results are in id order, which is
/// also insertion order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Record> Table<T> {
    /// Create an empty table whose first id will be `1`.
    pub fn new() -> Self {
        Table {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Look up a record by id.
    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Look up a record by id, failing when absent.
    ///
    /// # Errors
    /// `Error::NotFound` if no record has this id.
    pub fn fetch(&self, id: i64) -> Result<&T> {
        self.rows
            .get(&id)
            .ok_or_else(|| Error::not_found(T::table_name(), id))
    }

    /// Insert a record, assigning it the next id. Returns the stored copy.
    pub fn insert(&mut self, mut record: T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        record.assign_id(id);
        self.rows.insert(id, record.clone());
        debug!("✓ INSERT {} {}", T::table_name(), id);
        record
    }

    /// Replace a stored record with the given one (matched by id).
    ///
    /// # Errors
    /// `Error::NotFound` if the record was never inserted or has been deleted.
    pub fn update(&mut self, record: T) -> Result<T> {
        let id = record.record_id();
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = record.clone();
                debug!("✓ UPDATE {} {}", T::table_name(), id);
                Ok(record)
            }
            None => Err(Error::not_found(T::table_name(), id)),
        }
    }

    /// Mutate a stored record in place and return the updated copy.
    ///
    /// # Errors
    /// `Error::NotFound` if no record has this id.
    pub fn modify<F>(&mut self, id: i64, f: F) -> Result<T>
    where
        F: FnOnce(&mut T),
    {
        let slot = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(T::table_name(), id))?;
        f(slot);
        debug!("✓ UPDATE {} {}", T::table_name(), id);
        Ok(slot.clone())
    }

    /// Physically remove a record. Returns it if it existed.
    pub fn delete(&mut self, id: i64) -> Option<T> {
        let removed = self.rows.remove(&id);
        if removed.is_some() {
            debug!("✓ DELETE {} {}", T::table_name(), id);
        }
        removed
    }

    /// Physically remove every record matching `pred`. Returns how many went.
    pub fn delete_where<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|_, record| !pred(record));
        let removed = before - self.rows.len();
        debug!("✓ DELETE {} {} rows", T::table_name(), removed);
        removed
    }

    /// Clone out every record matching `pred`, in id order.
    pub fn filter<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows.values().filter(|r| pred(r)).cloned().collect()
    }

    /// First record (lowest id) matching `pred`.
    pub fn find<F>(&self, pred: F) -> Option<&T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows.values().find(|r| pred(r))
    }

    /// Whether any record matches `pred`.
    pub fn exists<F>(&self, pred: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.rows.values().any(pred)
    }

    /// Number of records matching `pred`.
    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.rows.values().filter(|r| pred(r)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The four tables of the application.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tables {
    pub customers: Table<Customer>,
    pub products: Table<Product>,
    pub sales: Table<Sale>,
    pub line_items: Table<SaleLineItem>,
}

impl Tables {
    /// Line items of a sale, in insertion order.
    pub fn line_items_of(&self, sale_id: i64) -> Vec<SaleLineItem> {
        self.line_items.filter(|item| item.sale_id == sale_id)
    }

    /// Live total of a sale: sum of quantity × unit price over its current
    /// line items.
    pub fn sale_total(&self, sale_id: i64) -> Decimal {
        self.line_items
            .iter()
            .filter(|item| item.sale_id == sale_id)
            .map(SaleLineItem::subtotal)
            .sum()
    }
}

/// Case-insensitive substring match used by the search boxes.
///
/// An empty or blank `needle` matches nothing.
pub fn icontains(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
