use std::collections::HashSet;

use crate::client::Client;
use crate::entities::invoice::{self, ListParameters, PageBody, RawInvoice};
use crate::error::{Error, Result};
use crate::normalize::{self, ExportRow};
use crate::resolver::ContactResolver;

/// Hard cap on fetch iterations; a safety valve against pathological APIs.
pub const MAX_ITERATIONS: usize = 500;

/// Statuses excluded from the export, compared lower-cased.
const SKIPPED_STATUSES: [&str; 3] = ["deleted", "delete", "archived"];

/// Cursor state for one fetch run; discarded afterwards.
#[derive(Debug, Default)]
pub struct PageCursor {
    pub seen_ids: HashSet<String>,
    pub next_url: Option<String>,
    pub previous_next_url: Option<String>,
    pub page_number: u32,
}

impl PageCursor {
    #[must_use]
    pub fn start() -> Self {
        Self {
            page_number: 1,
            ..Self::default()
        }
    }
}

/// Everything a run produces: the ordered rows plus the summary counters.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub rows: Vec<ExportRow>,
    /// Every record returned by the API, repeated and filtered ones included.
    pub total_records_seen: usize,
    /// Emitted rows: line-item rows plus placeholder rows.
    pub total_rows_kept: usize,
}

/// Drives the page-by-page retrieval of the invoice collection.
///
/// Supports both cursor-driven and page-number-driven deployments within a
/// single run, deduplicates records by id across pages, and never discards
/// rows gathered before a later page fails.
#[derive(Debug, Clone, Default)]
pub struct PaginationEngine {
    page_size: Option<u32>,
    organization: Option<String>,
}

impl PaginationEngine {
    #[must_use]
    pub fn new(page_size: Option<u32>, organization: Option<String>) -> Self {
        Self {
            page_size,
            organization,
        }
    }

    fn list_parameters(&self, page: u32) -> ListParameters {
        ListParameters {
            page,
            page_size: self.page_size,
            organization: self.organization.clone(),
        }
    }

    /// Fetches pages until one of the termination conditions fires.
    ///
    /// A page-level failure ends pagination and keeps the rows gathered so
    /// far; the only error that escapes is [`Error::NoRefreshToken`], which
    /// no amount of retrying can recover from.
    pub async fn run(
        &self,
        client: &mut Client,
        resolver: &mut ContactResolver,
    ) -> Result<FetchReport> {
        let mut cursor = PageCursor::start();
        let mut report = FetchReport::default();

        for iteration in 0..MAX_ITERATIONS {
            let fetched: Result<PageBody> = match &cursor.next_url {
                Some(url) => {
                    client
                        .get(url.as_str(), &Vec::<(String, String)>::new())
                        .await
                }
                None => {
                    invoice::list(client, &self.list_parameters(cursor.page_number)).await
                }
            };

            let page = match fetched {
                Ok(page) => page,
                Err(Error::NotFound { .. }) => {
                    debug!(page = cursor.page_number, "no more pages");
                    break;
                }
                Err(Error::NoRefreshToken) => return Err(Error::NoRefreshToken),
                Err(err) => {
                    warn!(
                        page = cursor.page_number,
                        iteration,
                        error = ?err,
                        "page fetch failed, keeping rows gathered so far"
                    );
                    break;
                }
            };

            let next = page.next_url().map(str::to_string);
            let records = page.into_records();
            report.total_records_seen += records.len();

            // Primary defense against an API that repeats the same page: a
            // page that contributes no unseen ids ends the run.
            let new_ids: HashSet<String> = records
                .iter()
                .filter_map(|record| record.id.clone())
                .filter(|id| !cursor.seen_ids.contains(id))
                .collect();
            if new_ids.is_empty() {
                debug!(
                    page = cursor.page_number,
                    "page contained no unseen invoices, stopping"
                );
                break;
            }

            for record in &records {
                if !emits(record, &new_ids) {
                    continue;
                }
                let rows = normalize::normalize(client, resolver, record).await;
                report.total_rows_kept += rows.len();
                report.rows.extend(rows);
            }
            cursor.seen_ids.extend(new_ids);

            match next {
                Some(next) => {
                    // A cursor that fails to advance would loop forever.
                    if cursor.previous_next_url.as_deref() == Some(next.as_str()) {
                        debug!(cursor = %next, "next-page cursor did not advance, stopping");
                        break;
                    }
                    cursor.previous_next_url = Some(next.clone());
                    cursor.next_url = Some(next);
                }
                None => {
                    cursor.page_number += 1;
                    cursor.next_url = None;
                }
            }
        }

        info!(
            records_seen = report.total_records_seen,
            rows_kept = report.total_rows_kept,
            "pagination finished"
        );
        Ok(report)
    }
}

/// A record is emitted when it is not status-filtered and is either new this
/// page or carries no id at all (id-less records cannot be deduplicated).
fn emits(record: &RawInvoice, new_ids: &HashSet<String>) -> bool {
    if is_skipped(record) {
        return false;
    }
    match &record.id {
        Some(id) => new_ids.contains(id),
        None => true,
    }
}

fn is_skipped(record: &RawInvoice) -> bool {
    record
        .status
        .as_deref()
        .is_some_and(|status| SKIPPED_STATUSES.contains(&status.to_lowercase().as_str()))
}
