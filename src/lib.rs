//! # sales-kit
//!
//! Sales management for a small shop: customers, products with stock, and
//! sales whose line items draw that stock down.
//!
//! ## Features
//!
//! - **Stock-safe sales:** every create or edit validates all lines inside one
//!   transaction; a rejected sale writes nothing
//! - **Edit with credit-back:** editing a sale credits its previous quantities
//!   before the new lines are taken out of stock
//! - **Soft delete:** customers and products still referenced by a sale are
//!   deactivated instead of deleted
//! - **Snapshot persistence:** the in-memory store can be written to a
//!   versioned postcard file after every commit
//! - **HTTP layer:** an axum router over the whole workflow
//!
//! ## Quick Start
//!
//! ```
//! use sales_kit::models::{CustomerFields, ProductFields};
//! use sales_kit::sales::{LineRequest, SaleRequest};
//! use sales_kit::{InMemoryStore, SalesService};
//! use rust_decimal::Decimal;
//!
//! # #[tokio::main]
//! # async fn main() -> sales_kit::Result<()> {
//! let service = SalesService::new(InMemoryStore::new());
//!
//! let customer = service
//!     .customers()
//!     .create(CustomerFields {
//!         first_name: "Ana".to_string(),
//!         last_name: "Pérez".to_string(),
//!         email: "ana@example.com".to_string(),
//!         phone: None,
//!     })
//!     .await?;
//! let coffee = service
//!     .products()
//!     .create(ProductFields {
//!         name: "Café".to_string(),
//!         description: "Molido 500g".to_string(),
//!         price: Decimal::new(450, 2),
//!         stock: 5,
//!     })
//!     .await?;
//!
//! let sale = service
//!     .sales()
//!     .create(SaleRequest {
//!         customer_id: customer.id,
//!         lines: vec![LineRequest::new(coffee.id, "2")],
//!     })
//!     .await?;
//!
//! assert_eq!(sale.total, Decimal::new(900, 2));
//! assert_eq!(service.products().get(coffee.id).await?.stock, 3);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod api_error;
pub mod backend;
pub mod config;
pub mod customers;
pub mod entity;
pub mod error;
pub mod forms;
pub mod models;
pub mod notice;
pub mod pagination;
pub mod products;
pub mod repository;
pub mod routes;
pub mod sales;
pub mod serialization;
pub mod service;

// Re-exports for convenience
pub use backend::{InMemoryStore, Store};
pub use entity::Record;
pub use error::{Error, Result};
pub use notice::{Notice, NoticeLevel, RemoveOutcome};
pub use pagination::{Page, Paginator};
pub use repository::{Table, Tables};
pub use service::SalesService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
