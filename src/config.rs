//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SERVER_HOST` | `127.0.0.1` |
//! | `SERVER_PORT` | `8080` |
//! | `SNAPSHOT_PATH` | unset (no persistence) |
//! | `CUSTOMERS_PER_PAGE` | `4` |
//! | `PRODUCTS_PER_PAGE` | `4` |
//! | `SALES_PER_PAGE` | `2` |
//!
//! A `.env` file is honoured when the binary loads it with `dotenv` first.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Page sizes of the paginated listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSizes {
    pub customers: usize,
    pub products: usize,
    pub sales: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        PageSizes {
            customers: 4,
            products: 4,
            sales: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub snapshot_path: Option<PathBuf>,
    pub page_sizes: PageSizes,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            snapshot_path: None,
            page_sizes: PageSizes::default(),
        }
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    /// `Error::Config` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// `Error::Config` if a numeric variable does not parse or a page size
    /// is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = AppConfig {
            host: var("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "SERVER_PORT", defaults.port)?,
            snapshot_path: var("SNAPSHOT_PATH").map(PathBuf::from),
            page_sizes: PageSizes {
                customers: page_size(&var, "CUSTOMERS_PER_PAGE", defaults.page_sizes.customers)?,
                products: page_size(&var, "PRODUCTS_PER_PAGE", defaults.page_sizes.products)?,
                sales: page_size(&var, "SALES_PER_PAGE", defaults.page_sizes.sales)?,
            },
        };

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

fn page_size<F>(var: &F, key: &str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let size = parse_var(var, key, default)?;
    if size == 0 {
        return Err(Error::Config(format!("{} must be at least 1", key)));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.page_sizes.sales, 2);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "3000"),
            ("SNAPSHOT_PATH", "/var/lib/sales.snapshot"),
            ("SALES_PER_PAGE", "10"),
            ("PRODUCTS_PER_PAGE", " "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/var/lib/sales.snapshot"))
        );
        assert_eq!(config.page_sizes.sales, 10);
        assert_eq!(config.page_sizes.products, 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for vars in [
            [("SERVER_PORT", "http")],
            [("SERVER_PORT", "70000")],
            [("CUSTOMERS_PER_PAGE", "-1")],
            [("SALES_PER_PAGE", "0")],
        ] {
            assert!(
                matches!(AppConfig::from_lookup(lookup(&vars)), Err(Error::Config(_))),
                "{:?} should be rejected",
                vars
            );
        }
    }
}
