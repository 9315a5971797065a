use crate::entity::Record;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl Customer {
    /// Build an active, not yet stored customer from validated fields.
    pub fn new(fields: CustomerFields) -> Self {
        let CustomerFields {
            first_name,
            last_name,
            email,
            phone,
        } = fields;

        Self {
            id: 0,
            first_name,
            last_name,
            email,
            phone,
            created_at: Utc::now(),
            active: true,
        }
    }

    /// Overwrite the editable fields, keeping id, creation time and state.
    pub fn apply(&mut self, fields: CustomerFields) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.email = fields.email;
        self.phone = fields.phone;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Customer {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn table_name() -> &'static str {
        "customer"
    }
}

/// Editable customer fields, as accepted by create and update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl CustomerFields {
    /// Check the field-level constraints.
    ///
    /// Email uniqueness is a table-level constraint and is checked by
    /// [`CustomerStore`](crate::customers::CustomerStore) instead.
    ///
    /// # Errors
    ///
    /// `Error::Validation` when a required field is blank or the email is
    /// malformed.
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(Error::validation("first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::validation("last name is required"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(Error::validation("email is required"));
        }
        if email.len() > 100 || !is_plausible_email(email) {
            return Err(Error::validation(format!("invalid email: {}", email)));
        }

        if self.phone.as_ref().is_some_and(|p| p.len() > 20) {
            return Err(Error::validation("phone must be at most 20 characters"));
        }

        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
