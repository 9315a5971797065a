//! Typed boundary inputs parsed from `application/x-www-form-urlencoded`
//! bodies.
//!
//! Field names are the ones the HTML forms submit. Each form converts into
//! the input struct of its store or workflow, turning malformed fields into
//! `Error::Validation`. The forms are also serialised back to the client
//! unchanged when a submission is rejected.

use crate::error::{Error, Result};
use crate::models::{Customer, CustomerFields, Product, ProductFields};
use crate::sales::{LineRequest, SaleRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

const QUANTITY_PREFIX: &str = "cantidad_";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
}

impl CustomerForm {
    pub fn into_fields(self) -> CustomerFields {
        let phone = self.telefono.trim().to_string();
        CustomerFields {
            first_name: self.nombre,
            last_name: self.apellido,
            email: self.email,
            phone: (!phone.is_empty()).then_some(phone),
        }
    }
}

impl From<&Customer> for CustomerForm {
    fn from(customer: &Customer) -> Self {
        CustomerForm {
            nombre: customer.first_name.clone(),
            apellido: customer.last_name.clone(),
            email: customer.email.clone(),
            telefono: customer.phone.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub nombre: String,
    pub descripcion: String,
    pub precio: String,
    pub stock: String,
}

impl ProductForm {
    /// # Errors
    /// `Error::Validation` if the price is not a decimal number or the stock
    /// is not a non-negative whole number.
    pub fn into_fields(self) -> Result<ProductFields> {
        let price = Decimal::from_str(self.precio.trim())
            .map_err(|_| Error::validation(format!("invalid price: {}", self.precio)))?;
        let stock = self.stock.trim().parse::<u32>().map_err(|_| {
            Error::validation(format!(
                "stock must be a non-negative whole number: {}",
                self.stock
            ))
        })?;

        Ok(ProductFields {
            name: self.nombre,
            description: self.descripcion,
            price,
            stock,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        ProductForm {
            nombre: product.name.clone(),
            descripcion: product.description.clone(),
            precio: product.price.to_string(),
            stock: product.stock.to_string(),
        }
    }
}

/// Sale form: a customer, the selected product ids and one
/// `cantidad_<product id>` field per selected product.
///
/// Built from raw key/value pairs because `productos` repeats.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SaleForm {
    pub cliente: String,
    pub productos: Vec<String>,
    /// Submitted quantities keyed by the raw product id.
    pub cantidades: BTreeMap<String, String>,
}

impl SaleForm {
    /// Collect the form from decoded pairs. Unknown fields are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = SaleForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "cliente" => form.cliente = value,
                "productos" => form.productos.push(value),
                _ => {
                    if let Some(id) = key.strip_prefix(QUANTITY_PREFIX) {
                        form.cantidades.insert(id.to_string(), value);
                    }
                }
            }
        }
        form
    }

    /// Pre-fill the form from a stored sale.
    pub fn prefill(customer_id: i64, quantities: &BTreeMap<i64, u32>) -> Self {
        SaleForm {
            cliente: customer_id.to_string(),
            productos: quantities.keys().map(i64::to_string).collect(),
            cantidades: quantities
                .iter()
                .map(|(id, qty)| (id.to_string(), qty.to_string()))
                .collect(),
        }
    }

    /// Convert into a [`SaleRequest`].
    ///
    /// Quantities are passed through unparsed; a selected product without a
    /// quantity field gets an empty one and fails as an invalid quantity
    /// during validation.
    ///
    /// # Errors
    /// `Error::Validation` if no customer is selected or a product id is not
    /// a number.
    pub fn to_request(&self) -> Result<SaleRequest> {
        let customer_id = self
            .cliente
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::validation("a customer must be selected"))?;

        let lines = self
            .productos
            .iter()
            .map(|raw| -> Result<LineRequest> {
                let product_id = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| Error::validation(format!("invalid product: {}", raw)))?;
                let quantity = self.cantidades.get(raw).cloned().unwrap_or_default();
                Ok(LineRequest::new(product_id, quantity))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SaleRequest { customer_id, lines })
    }
}
