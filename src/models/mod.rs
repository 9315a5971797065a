//! Domain records: customers, products, sales and their line items.

pub mod customer;
pub mod product;
pub mod sale;

pub use customer::*;
pub use product::*;
pub use sale::*;
