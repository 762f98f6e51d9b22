//! Normalizes turnpike toll statements into canonical [`TollRecord`]s.
//!
//! Two input shapes are accepted: delimited text (CSV export) and workbook
//! bytes (xlsx/xls). A workbook is converted first-sheet-to-CSV and fed
//! through the same column-mapping path, so both shapes produce identical
//! record semantics from a single parser.

pub mod error;
mod fields;
mod headers;

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use models::{TollRecord, MISSING_LOCATION};

pub use crate::error::FormatError;
use crate::error::Result;
use crate::fields::{parse_cell_amount, parse_cell_datetime};
use crate::headers::find_column;

pub const PARSER_NAME: &str = "turnpike";

// Acceptable header names per logical field, preferred alias first. The
// containment rule in `headers` covers qualified variants of these.
const AMOUNT_COLUMNS: &[&str] = &["Amount"];
const POSTING_DATE_COLUMNS: &[&str] = &["Posting Date"];
const EXIT_DATE_COLUMNS: &[&str] = &["Exit Date"];
const TRANSACTION_COLUMNS: &[&str] = &["Transaction"];
const TRANSPONDER_COLUMNS: &[&str] = &["Transponder"];
const EXIT_INTERCHANGE_COLUMNS: &[&str] = &["Exit Interchange"];
const VEHICLE_CLASS_COLUMNS: &[&str] = &["Class"];
const LICENSE_STATE_COLUMNS: &[&str] = &["License State"];
const LICENSE_PLATE_COLUMNS: &[&str] = &["License Plate", "License"];

/// Resolved column indexes for one statement. Only the amount column is
/// mandatory; every other field degrades to empty/absent when its column is
/// missing from the export.
struct ColumnMap {
    amount: usize,
    posting_date: Option<usize>,
    exit_date: Option<usize>,
    transaction: Option<usize>,
    transponder: Option<usize>,
    exit_interchange: Option<usize>,
    vehicle_class: Option<usize>,
    license_state: Option<usize>,
    license_plate: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self> {
        let amount =
            find_column(headers, AMOUNT_COLUMNS).ok_or(FormatError::MissingAmountColumn)?;
        Ok(Self {
            amount,
            posting_date: find_column(headers, POSTING_DATE_COLUMNS),
            exit_date: find_column(headers, EXIT_DATE_COLUMNS),
            transaction: find_column(headers, TRANSACTION_COLUMNS),
            transponder: find_column(headers, TRANSPONDER_COLUMNS),
            exit_interchange: find_column(headers, EXIT_INTERCHANGE_COLUMNS),
            vehicle_class: find_column(headers, VEHICLE_CLASS_COLUMNS),
            license_state: find_column(headers, LICENSE_STATE_COLUMNS),
            license_plate: find_column(headers, LICENSE_PLATE_COLUMNS),
        })
    }
}

/// Parse a statement file by extension: `.csv` as delimited text, `.xlsx` /
/// `.xls` / `.ods` as a workbook. Anything else is refused up front.
pub fn parse_statement(file_name: &str, bytes: &[u8]) -> Result<Vec<TollRecord>> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".csv") {
        parse_delimited(&String::from_utf8_lossy(bytes))
    } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") || lower.ends_with(".ods") {
        parse_workbook(bytes)
    } else {
        let ext = lower.rsplit('.').next().unwrap_or(&lower).to_string();
        Err(FormatError::UnsupportedFileType(ext))
    }
}

/// Parse delimited statement text into records, in row order.
///
/// Fails only at statement level (empty input, no header row, no amount
/// column). Individual rows that cannot be read are skipped with a warning;
/// individual cells that cannot be parsed degrade to `0` / absent.
pub fn parse_delimited(text: &str) -> Result<Vec<TollRecord>> {
    if text.trim().is_empty() {
        return Err(FormatError::EmptyInput);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(FormatError::MissingHeader);
    }

    let columns = ColumnMap::resolve(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(err) => {
                warn!("skipping unreadable row {}: {}", idx + 1, err);
                continue;
            }
        };
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(map_row(&columns, &row));
    }
    Ok(records)
}

/// Parse workbook bytes: the first sheet is rendered to delimited text and
/// handed to [`parse_delimited`], keeping one normalization path for both
/// input shapes.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<TollRecord>> {
    if bytes.is_empty() {
        return Err(FormatError::EmptyInput);
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = workbook
        .sheet_names()
        .get(0)
        .cloned()
        .ok_or(FormatError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let text = range_to_delimited(&range)?;
    if text.trim().is_empty() {
        return Err(FormatError::EmptySheet);
    }
    parse_delimited(&text)
}

/// Map one row through the resolved columns into a canonical record.
fn map_row(columns: &ColumnMap, row: &StringRecord) -> TollRecord {
    let cell = |idx: Option<usize>| -> &str {
        idx.and_then(|i| row.get(i)).unwrap_or("").trim()
    };

    let amount_raw = row.get(columns.amount).unwrap_or("").trim();
    let amount_cents = parse_cell_amount(amount_raw);
    if amount_cents == 0 && !amount_raw.is_empty() && amount_raw != "0" {
        debug!("amount cell '{}' did not parse, using 0", amount_raw);
    }

    let posting_raw = cell(columns.posting_date);
    let posting_date = parse_cell_datetime(posting_raw);
    if posting_date.is_none() && !posting_raw.is_empty() {
        debug!("posting date cell '{}' did not parse", posting_raw);
    }

    let exit_raw = cell(columns.exit_date);
    let exit_date = parse_cell_datetime(exit_raw);
    if exit_date.is_none() && !exit_raw.is_empty() {
        debug!("exit date cell '{}' did not parse", exit_raw);
    }

    // Exit time is when travel actually happened; posting is a fallback.
    let date = exit_date.or(posting_date);

    let exit_interchange = match cell(columns.exit_interchange) {
        "" => MISSING_LOCATION.to_string(),
        loc => loc.to_string(),
    };

    TollRecord {
        amount_cents,
        date,
        posting_date,
        exit_date,
        transaction: cell(columns.transaction).to_string(),
        transponder: cell(columns.transponder).to_string(),
        exit_interchange,
        vehicle_class: cell(columns.vehicle_class).to_string(),
        license_state: cell(columns.license_state).to_string(),
        license_plate: cell(columns.license_plate).to_string(),
        raw: row.iter().map(|c| c.to_string()).collect(),
    }
}

/// Render a sheet range as CSV text. Datetime cells are printed in the
/// canonical `MM/DD/YYYY HH:MM` shape so the text path parses them the same
/// way it parses native CSV exports.
fn range_to_delimited(range: &calamine::Range<Data>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in range.rows() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        writer.write_record(&cells)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| FormatError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| d.format("%m/%d/%Y %H:%M").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Excel serial datetime using the 1899-12-30 base (common convention).
/// The fractional part is the time of day.
fn excel_serial_to_datetime(v: f64) -> Option<NaiveDateTime> {
    if !v.is_finite() {
        return None;
    }
    let days = v.floor() as i64;
    let secs = ((v - v.floor()) * 86_400.0).round() as i64;
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(days))?
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::seconds(secs))
}
