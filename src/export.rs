use std::path::{Path, PathBuf};

use comfy_table::{Cell, CellAlignment, Table, presets};

use crate::error::Result;
use crate::normalize::ExportRow;
use crate::pagination::FetchReport;

/// Column headers shared by the CSV snapshot and the console table.
const HEADERS: [&str; 8] = [
    "invoice_number",
    "date",
    "customer",
    "status",
    "description",
    "unit_price",
    "qty",
    "line_total",
];

/// Renders canonical rows to a console table and a CSV snapshot.
///
/// Pure with respect to its input rows; its only side effects are file and
/// console writes.
#[derive(Debug, Clone)]
pub struct Exporter {
    destination: PathBuf,
}

impl Exporter {
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// Prints the table and the run summary, then writes the CSV snapshot.
    /// Writes no file when the run produced no rows.
    pub fn export(&self, report: &FetchReport) -> Result<()> {
        println!("{}", render_table(&report.rows));
        println!(
            "Total records returned by the API: {}",
            report.total_records_seen
        );
        println!("Total rows kept: {}", report.total_rows_kept);

        if report.rows.is_empty() {
            info!("no rows to export, skipping CSV snapshot");
            return Ok(());
        }

        write_csv(&report.rows, &self.destination)?;
        info!(
            path = %self.destination.display(),
            rows = report.rows.len(),
            "CSV snapshot saved"
        );
        println!("CSV saved to {}", self.destination.display());
        Ok(())
    }
}

/// Renders the rows as a console table.
#[must_use]
pub fn render_table(rows: &[ExportRow]) -> String {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL).set_header(HEADERS);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.invoice_number),
            Cell::new(&row.date),
            Cell::new(&row.customer),
            Cell::new(&row.status),
            Cell::new(&row.description),
            Cell::new(&row.unit_price).set_alignment(CellAlignment::Right),
            Cell::new(&row.quantity).set_alignment(CellAlignment::Right),
            Cell::new(&row.line_total).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

/// Writes the header and one record per row to `path`.
pub fn write_csv(rows: &[ExportRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record([
            row.invoice_number.as_str(),
            row.date.as_str(),
            row.customer.as_str(),
            row.status.as_str(),
            row.description.as_str(),
            row.unit_price.as_str(),
            row.quantity.as_str(),
            row.line_total.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
