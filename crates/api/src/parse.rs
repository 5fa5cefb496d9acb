// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Upload parsing.
//!
//! Every supported format is reduced to an ordered list of `RawRow`s: the
//! first row (or the object keys, for JSON) names the columns and every
//! following row maps those names to cell text. Parsing is all-or-nothing;
//! a file that cannot be read yields a single `ParseError`.

use std::io::Cursor;
use std::str::FromStr;

use booth_map::RawRow;
use calamine::{Data, Range, Reader, Xlsx};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::macros::{datetime, format_description};
use time::{Duration, PrimitiveDateTime};
use tracing::debug;

/// Local file header signature shared by every ZIP container, including xlsx.
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

const UTF8_BOM: &str = "\u{feff}";

/// Delimiters considered for CSV files, in tie-break order.
const DELIMITER_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// File-level parse failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The bytes are not a readable file of the declared format.
    #[error("File could not be read: {reason}")]
    Unreadable { reason: String },

    /// The file has no data rows.
    #[error("File contains no data rows")]
    EmptyFile,

    /// The file is readable but not laid out as a table.
    #[error("File has an unexpected shape: {reason}")]
    InvalidShape { reason: String },

    /// The format name or content type is not supported.
    #[error("Unsupported file format '{format}'")]
    UnsupportedFormat { format: String },
}

/// The file formats accepted for import and produced by export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// An Office Open XML workbook (`.xlsx`).
    Excel,
    /// Delimited text.
    Csv,
    /// An array of flat JSON objects.
    Json,
}

impl FileFormat {
    /// Chooses a format from a file extension, with or without the dot.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" | "xlsm" | "excel" => Some(Self::Excel),
            "csv" | "txt" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Chooses a format from a MIME type, ignoring parameters such as `charset`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime: String = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match mime.as_str() {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel.sheet.macroenabled.12" => Some(Self::Excel),
            "text/csv" | "application/csv" | "text/plain" => Some(Self::Csv),
            "application/json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Returns the file extension written on exports.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Returns the MIME type written on exports.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

impl FromStr for FileFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ParseError::UnsupportedFormat {
            format: s.to_string(),
        })
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &str = match self {
            Self::Excel => "excel",
            Self::Csv => "csv",
            Self::Json => "json",
        };
        write!(f, "{name}")
    }
}

/// Parses an uploaded file into raw rows in file order.
///
/// # Arguments
///
/// * `bytes` - The file contents
/// * `format` - The format the caller declared for the file
///
/// # Errors
///
/// Returns an error if:
/// - The content does not match the declared format (`Unreadable`)
/// - The file has a header but no data rows (`EmptyFile`)
/// - A JSON file is not an array of flat objects (`InvalidShape`)
pub fn parse(bytes: &[u8], format: FileFormat) -> Result<Vec<RawRow>, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let is_zip: bool = bytes.starts_with(ZIP_SIGNATURE);
    match (format, is_zip) {
        (FileFormat::Excel, false) => {
            return Err(ParseError::Unreadable {
                reason: String::from("file is not an Excel workbook"),
            });
        }
        (FileFormat::Csv | FileFormat::Json, true) => {
            return Err(ParseError::Unreadable {
                reason: format!("file declared as {format} is a ZIP archive"),
            });
        }
        _ => {}
    }

    let rows: Vec<RawRow> = match format {
        FileFormat::Excel => parse_excel(bytes)?,
        FileFormat::Csv => parse_csv(bytes)?,
        FileFormat::Json => parse_json(bytes)?,
    };

    if rows.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    debug!(%format, rows = rows.len(), "Parsed import file");
    Ok(rows)
}

fn parse_excel(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    let mut workbook: Xlsx<Cursor<&[u8]>> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ParseError::Unreadable {
            reason: format!("invalid workbook: {e}"),
        })?;

    let range: Range<Data> = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::EmptyFile)?
        .map_err(|e| ParseError::Unreadable {
            reason: format!("first worksheet cannot be read: {e}"),
        })?;

    let mut lines = range.rows();
    let Some(header_cells) = lines.next() else {
        return Err(ParseError::EmptyFile);
    };
    let headers: Vec<String> = header_cells.iter().map(cell_text).collect();

    let rows: Vec<RawRow> = lines
        .map(|cells| zip_row(&headers, cells.iter().map(cell_text)))
        .collect();
    Ok(drop_trailing_blank(rows))
}

/// Renders a worksheet cell the way it reads in a spreadsheet.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        // f64 Display prints integral values without a fraction.
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => String::from("TRUE"),
        Data::Bool(false) => String::from("FALSE"),
        Data::DateTime(dt) => excel_serial_text(dt.as_f64()),
        Data::Error(e) => e.to_string(),
    }
}

/// Converts an Excel serial date to `YYYY-MM-DD` (plus the time when not midnight).
fn excel_serial_text(serial: f64) -> String {
    let epoch: PrimitiveDateTime = datetime!(1899-12-30 0:00);
    let Some(moment) = epoch.checked_add(Duration::seconds_f64(serial * 86_400.0)) else {
        return serial.to_string();
    };

    let formatted = if moment.time() == time::Time::MIDNIGHT {
        moment.format(format_description!("[year]-[month]-[day]"))
    } else {
        moment.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
    };
    formatted.unwrap_or_else(|_| serial.to_string())
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    let text: &str = std::str::from_utf8(bytes).map_err(|e| ParseError::Unreadable {
        reason: format!("file is not valid UTF-8 text: {e}"),
    })?;
    let text: &str = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile);
    }

    let delimiter: u8 = detect_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::Unreadable {
            reason: format!("failed to read CSV header: {e}"),
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<RawRow> = Vec::new();
    for result in reader.records() {
        let record: StringRecord = result.map_err(csv_record_error)?;
        rows.push(zip_row(&headers, record.iter().map(str::to_string)));
    }
    Ok(drop_trailing_blank(rows))
}

/// A record the CSV reader cannot decode makes the whole file unreadable.
pub(crate) fn csv_record_error(err: csv::Error) -> ParseError {
    ParseError::Unreadable {
        reason: format!("malformed CSV record: {err}"),
    }
}

/// Picks the CSV delimiter by counting unquoted candidates in the header line.
///
/// Ties resolve to comma, then semicolon.
#[must_use]
pub fn detect_delimiter(text: &str) -> u8 {
    let mut counts: [usize; 3] = [0; 3];
    let mut in_quotes: bool = false;

    for byte in text.bytes() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(pos) = DELIMITER_CANDIDATES.iter().position(|c| *c == byte) {
                    counts[pos] += 1;
                }
            }
            _ => {}
        }
    }

    DELIMITER_CANDIDATES
        .iter()
        .zip(counts)
        .fold((b',', 0), |best, (candidate, count)| {
            if count > best.1 {
                (*candidate, count)
            } else {
                best
            }
        })
        .0
}

fn parse_json(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    let bytes: &[u8] = bytes.strip_prefix(UTF8_BOM.as_bytes()).unwrap_or(bytes);
    let value: Value = serde_json::from_slice(bytes).map_err(|e| ParseError::Unreadable {
        reason: format!("invalid JSON: {e}"),
    })?;

    let Value::Array(items) = value else {
        return Err(ParseError::InvalidShape {
            reason: String::from("top level must be an array of objects"),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| json_row(i + 1, item))
        .collect()
}

fn json_row(position: usize, item: Value) -> Result<RawRow, ParseError> {
    let Value::Object(map) = item else {
        return Err(ParseError::InvalidShape {
            reason: format!("element {position} is not an object"),
        });
    };

    let mut row: RawRow = RawRow::new();
    for (key, value) in map {
        let text: String = match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            Value::Array(_) | Value::Object(_) => {
                return Err(ParseError::InvalidShape {
                    reason: format!("element {position} field '{key}' is not a scalar value"),
                });
            }
        };
        row.push(key, text);
    }
    Ok(row)
}

/// Pairs header names with cells by position, padding short rows.
fn zip_row<I>(headers: &[String], cells: I) -> RawRow
where
    I: Iterator<Item = String>,
{
    let mut cells = cells;
    headers
        .iter()
        .map(|header| (header.clone(), cells.next().unwrap_or_default()))
        .collect()
}

fn drop_trailing_blank(mut rows: Vec<RawRow>) -> Vec<RawRow> {
    while rows.last().is_some_and(RawRow::is_blank) {
        rows.pop();
    }
    rows
}
