use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// A typed representation of the accounting API endpoints this crate reads.
#[derive(Debug, Clone)]
pub enum Endpoint {
    Invoices,
    Invoice(String),
    Contact(String),
}

impl Endpoint {
    /// The endpoint's path relative to the API base URL.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Invoices => "/invoices/".to_string(),
            Self::Invoice(id) => format!("/invoices/{id}/"),
            Self::Contact(id) => format!("/contacts/{id}/"),
        }
    }

    /// Resolves the endpoint against the configured base URL.
    ///
    /// The path is appended to the base rather than joined, so a base URL
    /// that carries a path prefix (e.g. `https://host/api/v2`) keeps it.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        let base = base.as_str().trim_end_matches('/');
        let path = self.path();
        Url::parse(&format!("{base}{path}")).map_err(|_| Error::InvalidEndpoint)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
