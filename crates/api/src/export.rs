// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record export.
//!
//! Exports use the same column names the import normalizer recognizes, so
//! a file exported here and imported again against unchanged data yields
//! only updates.

use booth_map_domain::{
    AssignmentRecord, Category, CompanyRecord, EventYear, Record, RecordKind, SubscriptionRecord,
};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};
use serde_json::{Map, Value};
use thiserror::Error;
use time::Date;
use tracing::debug;

use crate::parse::FileFormat;

/// Company export columns, followed by one column per known category.
pub const COMPANY_COLUMNS: [&str; 7] = [
    "Name",
    "Contact",
    "Phone",
    "Email",
    "Website",
    "Info",
    "Categories",
];

/// Subscription export columns.
pub const SUBSCRIPTION_COLUMNS: [&str; 9] = [
    "Company",
    "Year",
    "Contact",
    "Phone",
    "Email",
    "Booths",
    "Breakfast",
    "Coins",
    "Notes",
];

/// Assignment export columns.
pub const ASSIGNMENT_COLUMNS: [&str; 4] = ["Company", "Booth", "Year", "Info"];

const CATEGORY_SET: &str = "+";
const CATEGORY_UNSET: &str = "-";

/// Export failures. These indicate a writer fault, never bad data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The workbook could not be written.
    #[error("Failed to write workbook: {0}")]
    Workbook(#[from] XlsxError),

    /// A CSV record could not be written.
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The JSON document could not be serialized.
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The output buffer could not be flushed.
    #[error("Failed to flush export: {0}")]
    Io(#[from] std::io::Error),

    /// The table is wider than a worksheet allows.
    #[error("Too many columns for a worksheet: {count}")]
    TooManyColumns { count: usize },
}

/// A request to export the current records of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportJob {
    /// The record kind to export.
    pub kind: RecordKind,
    /// Restricts year-scoped kinds to one event year. Ignored for companies.
    pub year: Option<EventYear>,
    /// The output format.
    pub format: FileFormat,
}

/// A finished export, ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// `<kind-slug>-<YYYY-MM-DD>.<ext>`.
    pub file_name: String,
    /// The MIME type of `bytes`.
    pub content_type: &'static str,
    /// The encoded file.
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Wraps encoded bytes with the download name for `kind` on `date`.
    #[must_use]
    pub fn new(kind: RecordKind, format: FileFormat, date: Date, bytes: Vec<u8>) -> Self {
        Self {
            file_name: export_file_name(kind, format, date),
            content_type: format.content_type(),
            bytes,
        }
    }
}

/// Returns the download name for an export of `kind` made on `date`.
#[must_use]
pub fn export_file_name(kind: RecordKind, format: FileFormat, date: Date) -> String {
    format!(
        "{}-{:04}-{:02}-{:02}.{}",
        kind.as_str(),
        date.year(),
        u8::from(date.month()),
        date.day(),
        format.extension()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cell {
    Text(String),
    Number(u32),
}

impl Cell {
    fn text(value: Option<&str>) -> Self {
        Self::Text(value.unwrap_or_default().to_string())
    }

    fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::from(*n),
        }
    }
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Encodes records of `kind` in `format`.
///
/// Records of other kinds are skipped. `categories` supplies the
/// per-category columns of a company export and is ignored otherwise.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn export(
    records: &[Record],
    categories: &[Category],
    kind: RecordKind,
    format: FileFormat,
) -> Result<Vec<u8>, ExportError> {
    let table: Table = build_table(records, categories, kind);
    debug!(%kind, %format, rows = table.rows.len(), "Encoding export");

    match format {
        FileFormat::Excel => write_excel(&table, kind),
        FileFormat::Csv => write_csv(&table),
        FileFormat::Json => write_json(&table),
    }
}

fn build_table(records: &[Record], categories: &[Category], kind: RecordKind) -> Table {
    let mut headers: Vec<String> = match kind {
        RecordKind::Company => COMPANY_COLUMNS.iter().map(ToString::to_string).collect(),
        RecordKind::Subscription => SUBSCRIPTION_COLUMNS
            .iter()
            .map(ToString::to_string)
            .collect(),
        RecordKind::Assignment => ASSIGNMENT_COLUMNS.iter().map(ToString::to_string).collect(),
    };
    if kind == RecordKind::Company {
        headers.extend(categories.iter().map(|c| c.name.clone()));
    }

    let rows: Vec<Vec<Cell>> = records
        .iter()
        .filter_map(|record| match (kind, record) {
            (RecordKind::Company, Record::Company(c)) => Some(company_cells(c, categories)),
            (RecordKind::Subscription, Record::Subscription(s)) => Some(subscription_cells(s)),
            (RecordKind::Assignment, Record::Assignment(a)) => Some(assignment_cells(a)),
            _ => None,
        })
        .collect();

    Table { headers, rows }
}

fn company_cells(company: &CompanyRecord, categories: &[Category]) -> Vec<Cell> {
    let mut cells: Vec<Cell> = vec![
        Cell::Text(company.name.clone()),
        Cell::text(company.contact.as_deref()),
        Cell::text(company.phone.as_deref()),
        Cell::text(company.email.as_deref()),
        Cell::text(company.website.as_deref()),
        Cell::text(company.info.as_deref()),
        Cell::Text(company.categories.join(", ")),
    ];
    cells.extend(categories.iter().map(|category| {
        let tagged: bool = company
            .categories
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&category.name));
        Cell::Text(String::from(if tagged { CATEGORY_SET } else { CATEGORY_UNSET }))
    }));
    cells
}

fn subscription_cells(subscription: &SubscriptionRecord) -> Vec<Cell> {
    vec![
        Cell::Text(subscription.company_name.clone()),
        Cell::Number(u32::from(subscription.year.year())),
        Cell::text(subscription.contact.as_deref()),
        Cell::text(subscription.phone.as_deref()),
        Cell::text(subscription.email.as_deref()),
        Cell::Number(subscription.booth_count),
        Cell::Text(String::from(if subscription.breakfast { "yes" } else { "no" })),
        Cell::Number(subscription.coins),
        Cell::text(subscription.notes.as_deref()),
    ]
}

fn assignment_cells(assignment: &AssignmentRecord) -> Vec<Cell> {
    vec![
        Cell::Text(assignment.company_name.clone()),
        Cell::Text(assignment.booth.clone()),
        Cell::Number(u32::from(assignment.year.year())),
        Cell::text(assignment.info.as_deref()),
    ]
}

fn write_excel(table: &Table, kind: RecordKind) -> Result<Vec<u8>, ExportError> {
    let header_format: Format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x00D9_E1F2))
        .set_border_bottom(FormatBorder::Thin);
    let band_format: Format = Format::new().set_background_color(Color::RGB(0x00F2_F2F2));
    let plain_format: Format = Format::new();

    let mut workbook: Workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(kind))?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, header, &header_format)?;
    }

    for (row_offset, cells) in (1_u32..).zip(&table.rows) {
        let format: &Format = if row_offset % 2 == 0 {
            &band_format
        } else {
            &plain_format
        };
        for (col, cell) in cells.iter().enumerate() {
            let col = column_index(col)?;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string_with_format(row_offset, col, s, format)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number_with_format(row_offset, col, f64::from(*n), format)?;
                }
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

const fn sheet_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Company => "Companies",
        RecordKind::Subscription => "Subscriptions",
        RecordKind::Assignment => "Assignments",
    }
}

fn column_index(col: usize) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::TooManyColumns { count: col + 1 })
}

fn write_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for cells in &table.rows {
        writer.write_record(cells.iter().map(Cell::as_text))?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

fn write_json(table: &Table) -> Result<Vec<u8>, ExportError> {
    let objects: Vec<Value> = table
        .rows
        .iter()
        .map(|cells| {
            let object: Map<String, Value> = table
                .headers
                .iter()
                .zip(cells)
                .map(|(header, cell)| (header.clone(), cell.to_json()))
                .collect();
            Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&objects)?)
}
