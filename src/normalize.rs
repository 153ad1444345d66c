use rust_decimal::Decimal;

use crate::client::Client;
use crate::entities::invoice::{RawInvoice, RawLineItem};
use crate::resolver::{ContactResolver, NO_CONTACT};

/// Placeholder for absent text fields.
pub const MISSING: &str = "-";

/// The canonical, export-ready representation of one line item (or of an
/// invoice without line items). Immutable once created.
///
/// The header fields are always non-empty; `unit_price` and `line_total` are
/// either both two-decimal strings or both empty (the placeholder row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub invoice_number: String,
    pub date: String,
    pub customer: String,
    pub status: String,
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
    pub line_total: String,
}

/// Maps a raw invoice to canonical rows, resolving the customer name through
/// the memoizing resolver.
pub async fn normalize(
    client: &mut Client,
    resolver: &mut ContactResolver,
    invoice: &RawInvoice,
) -> Vec<ExportRow> {
    let customer = match invoice.contact_ref() {
        Some(id) => resolver.resolve(client, Some(id)).await,
        None => NO_CONTACT.to_string(),
    };
    rows_for(invoice, &customer)
}

/// Builds the canonical rows for an invoice once the customer display name is
/// known. Every field resolves through its fallback chain to a total default,
/// so malformed records never fail.
#[must_use]
pub fn rows_for(invoice: &RawInvoice, customer: &str) -> Vec<ExportRow> {
    let invoice_number = first_filled(&[&invoice.invoice_number, &invoice.number]);
    let date = first_filled(&[&invoice.invoice_date, &invoice.date]);
    let status = invoice
        .status
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| MISSING.to_string());

    let items = invoice.line_items.as_deref().unwrap_or(&[]);
    if items.is_empty() {
        return vec![ExportRow {
            invoice_number,
            date,
            customer: customer.to_string(),
            status,
            description: MISSING.to_string(),
            unit_price: String::new(),
            quantity: String::new(),
            line_total: String::new(),
        }];
    }

    items
        .iter()
        .map(|item| {
            let (quantity, unit_price, line_total) = amounts_for(item);
            ExportRow {
                invoice_number: invoice_number.clone(),
                date: date.clone(),
                customer: customer.to_string(),
                status: status.clone(),
                description: item
                    .description
                    .clone()
                    .or_else(|| item.name.clone())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| MISSING.to_string()),
                unit_price,
                quantity,
                line_total,
            }
        })
        .collect()
}

fn amounts_for(item: &RawLineItem) -> (String, String, String) {
    let quantity = item.quantity.or(item.qty).unwrap_or(Decimal::ONE);
    let line_total = item
        .line_amount
        .or(item.amount)
        .or(item.total)
        .unwrap_or(Decimal::ZERO);
    let unit_price = if quantity.is_zero() {
        line_total
    } else {
        line_total / quantity
    };
    (
        quantity.normalize().to_string(),
        money(unit_price),
        money(line_total),
    )
}

/// Two-decimal formatting keeps the export stable across API numeric types.
fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn first_filled(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .find_map(|candidate| candidate.as_ref().filter(|s| !s.is_empty()).cloned())
        .unwrap_or_else(|| MISSING.to_string())
}
