use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::utils::serde_helpers::{opt_decimal, opt_id_string, opt_nonempty_string};

/// Query parameters for the paged invoice listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListParameters {
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// An invoice record as returned by the API.
///
/// Field names vary by API version (`invoice_number` vs `number`,
/// `invoice_date` vs `date`, `contact` vs `contact_id`), so every field is
/// optional here and the normalizer resolves each one through an ordered
/// fallback chain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawInvoice {
    #[serde(deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub number: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub invoice_date: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "opt_id_string")]
    pub contact: Option<String>,
    #[serde(deserialize_with = "opt_id_string")]
    pub contact_id: Option<String>,
    pub line_items: Option<Vec<RawLineItem>>,
}

impl RawInvoice {
    /// The customer identifier, whichever field this API variant used.
    #[must_use]
    pub fn contact_ref(&self) -> Option<&str> {
        self.contact.as_deref().or(self.contact_id.as_deref())
    }
}

/// A single billable entry within an invoice, with the same field-name
/// tolerance as [`RawInvoice`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLineItem {
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_decimal")]
    pub quantity: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub qty: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub line_amount: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub amount: Option<Decimal>,
    #[serde(deserialize_with = "opt_decimal")]
    pub total: Option<Decimal>,
}

/// One page of the invoice collection.
///
/// Some deployments wrap the records in a `results` or `invoices` key next to
/// a `next` cursor; others return a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageBody {
    Keyed {
        #[serde(default)]
        results: Option<Vec<RawInvoice>>,
        #[serde(default)]
        invoices: Option<Vec<RawInvoice>>,
        #[serde(default)]
        next: Option<String>,
    },
    Bare(Vec<RawInvoice>),
}

impl PageBody {
    /// The next-page cursor, when the body is a keyed structure.
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        match self {
            Self::Keyed { next, .. } => next.as_deref(),
            Self::Bare(_) => None,
        }
    }

    /// Extracts the invoice collection from whichever shape was returned.
    #[must_use]
    pub fn into_records(self) -> Vec<RawInvoice> {
        match self {
            Self::Keyed {
                results, invoices, ..
            } => results
                .filter(|records| !records.is_empty())
                .or(invoices)
                .unwrap_or_default(),
            Self::Bare(records) => records,
        }
    }
}

/// Retrieve one page of invoices.
#[instrument(skip(client))]
pub async fn list(client: &mut Client, parameters: &ListParameters) -> Result<PageBody> {
    client.get_endpoint(Endpoint::Invoices, parameters).await
}

/// Retrieve a single invoice by id, including its line items.
#[instrument(skip(client))]
pub async fn get(client: &mut Client, invoice_id: &str) -> Result<RawInvoice> {
    client
        .get_endpoint(
            Endpoint::Invoice(invoice_id.to_string()),
            &Vec::<(String, String)>::new(),
        )
        .await
}
