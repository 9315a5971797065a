//! Customer records and their active state.
//!
//! A customer that owns a sale is never physically deleted: removing it
//! flips `active` off instead, so historical sales keep a valid reference.

use crate::backend::Store;
use crate::error::{Error, Result};
use crate::models::{Customer, CustomerFields};
use crate::notice::RemoveOutcome;
use crate::repository::{icontains, Tables};

/// Customer operations over a [`Store`].
///
/// # Example
///
/// ```
/// use sales_kit::backend::InMemoryStore;
/// use sales_kit::customers::CustomerStore;
/// use sales_kit::models::CustomerFields;
///
/// # #[tokio::main]
/// # async fn main() -> sales_kit::Result<()> {
/// let customers = CustomerStore::new(InMemoryStore::new());
///
/// let ana = customers
///     .create(CustomerFields {
///         first_name: "Ana".to_string(),
///         last_name: "Pérez".to_string(),
///         email: "ana@example.com".to_string(),
///         phone: None,
///     })
///     .await?;
///
/// assert_eq!(customers.search("an").await?[0].id, ana.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CustomerStore<S: Store> {
    store: S,
}

impl<S: Store> CustomerStore<S> {
    pub fn new(store: S) -> Self {
        CustomerStore { store }
    }

    /// Active customers ordered by first name, then id.
    pub async fn list_active(&self) -> Result<Vec<Customer>> {
        self.list(true).await
    }

    /// Deactivated customers, same ordering as [`list_active`](Self::list_active).
    pub async fn list_inactive(&self) -> Result<Vec<Customer>> {
        self.list(false).await
    }

    async fn list(&self, active: bool) -> Result<Vec<Customer>> {
        self.store
            .read(move |tables| {
                let mut customers = tables.customers.filter(|c| c.active == active);
                sort_by_first_name(&mut customers);
                Ok(customers)
            })
            .await
    }

    /// # Errors
    /// `Error::NotFound` if no customer has this id.
    pub async fn get(&self, id: i64) -> Result<Customer> {
        self.store
            .read(move |tables| tables.customers.fetch(id).cloned())
            .await
    }

    /// Create an active customer.
    ///
    /// # Errors
    /// `Error::Validation` if a field is invalid or the email belongs to
    /// another customer.
    pub async fn create(&self, fields: CustomerFields) -> Result<Customer> {
        let fields = clean(fields);
        fields.validate()?;

        let customer = self
            .store
            .transaction(move |tables| {
                ensure_email_free(tables, &fields.email, None)?;
                Ok(tables.customers.insert(Customer::new(fields)))
            })
            .await?;

        info!("[Customers] Created customer {} <{}>", customer.id, customer.email);
        Ok(customer)
    }

    /// Replace the editable fields of a customer.
    ///
    /// # Errors
    /// `Error::NotFound` if absent, `Error::Validation` if a field is invalid
    /// or the email belongs to another customer.
    pub async fn update(&self, id: i64, fields: CustomerFields) -> Result<Customer> {
        let fields = clean(fields);
        fields.validate()?;

        let customer = self
            .store
            .transaction(move |tables| {
                tables.customers.fetch(id)?;
                ensure_email_free(tables, &fields.email, Some(id))?;
                tables.customers.modify(id, |c| c.apply(fields))
            })
            .await?;

        info!("[Customers] Updated customer {}", id);
        Ok(customer)
    }

    /// Whether any sale, active or voided, references the customer.
    ///
    /// # Errors
    /// `Error::NotFound` if no customer has this id.
    pub async fn has_sales(&self, id: i64) -> Result<bool> {
        self.store
            .read(move |tables| {
                tables.customers.fetch(id)?;
                Ok(owns_sales(tables, id))
            })
            .await
    }

    /// Delete the customer, or deactivate it if it owns any sale.
    ///
    /// # Errors
    /// `Error::NotFound` if no customer has this id.
    pub async fn remove(&self, id: i64) -> Result<RemoveOutcome> {
        let outcome = self
            .store
            .transaction(move |tables| {
                tables.customers.fetch(id)?;
                if owns_sales(tables, id) {
                    tables.customers.modify(id, |c| c.active = false)?;
                    Ok(RemoveOutcome::Deactivated)
                } else {
                    tables.customers.delete(id);
                    Ok(RemoveOutcome::Deleted)
                }
            })
            .await?;

        match outcome {
            RemoveOutcome::Deleted => info!("[Customers] Deleted customer {}", id),
            RemoveOutcome::Deactivated => {
                warn!("[Customers] Customer {} has sales, marked inactive", id)
            }
        }
        Ok(outcome)
    }

    /// Customers whose first name contains `query`, ignoring case.
    ///
    /// A blank query matches nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Customer>> {
        let query = query.to_string();
        self.store
            .read(move |tables| Ok(search_in(tables, &query)))
            .await
    }
}

pub(crate) fn search_in(tables: &Tables, query: &str) -> Vec<Customer> {
    let mut found = tables
        .customers
        .filter(|c| icontains(&c.first_name, query));
    sort_by_first_name(&mut found);
    found
}

fn sort_by_first_name(customers: &mut [Customer]) {
    customers.sort_by(|a, b| a.first_name.cmp(&b.first_name).then(a.id.cmp(&b.id)));
}

fn owns_sales(tables: &Tables, customer_id: i64) -> bool {
    tables.sales.exists(|s| s.customer_id == customer_id)
}

fn ensure_email_free(tables: &Tables, email: &str, except: Option<i64>) -> Result<()> {
    let wanted = email.to_lowercase();
    let owner = tables
        .customers
        .find(|c| Some(c.id) != except && c.email.to_lowercase() == wanted);
    if let Some(owner) = owner {
        debug!("[Customers] Email {} already used by customer {}", email, owner.id);
        return Err(Error::validation(format!(
            "a customer with email {} already exists",
            email
        )));
    }
    Ok(())
}

fn clean(fields: CustomerFields) -> CustomerFields {
    CustomerFields {
        first_name: fields.first_name.trim().to_string(),
        last_name: fields.last_name.trim().to_string(),
        email: fields.email.trim().to_string(),
        phone: fields
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    }
}
