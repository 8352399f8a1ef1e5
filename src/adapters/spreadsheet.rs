//! Workbook and CSV readers.
//!
//! Cell typing happens here, so the normalizer only ever sees
//! [`CellValue`]s:
//!
//! | source cell                         | value                  |
//! |-------------------------------------|------------------------|
//! | empty, error (`#N/A`, `#REF!`, ...) | `Null`                 |
//! | integer                             | `Integer`              |
//! | float                               | `Decimal`              |
//! | date-formatted number / ISO date    | `Date`                 |
//! | boolean                             | `Text("true"/"false")` |
//! | string (empty string is `Null`)     | `Text`                 |

use crate::core::TableSource;
use crate::domain::model::{CellValue, Table};
use crate::utils::error::{ExportError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// CSV 中視為空值的字串
const NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Reads `.csv` files with the csv crate and every other supported
/// extension (xlsx, xlsm, xlsb, xls, ods) with calamine.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetSource;

impl SpreadsheetSource {
    pub fn new() -> Self {
        Self
    }
}

impl TableSource for SpreadsheetSource {
    fn read_table(&self, path: &Path, sheet: &str) -> Result<Table> {
        if !path.exists() {
            return Err(ExportError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        let table = if is_csv {
            tracing::debug!("Reading CSV {} (sheet name ignored)", path.display());
            read_csv(path)?
        } else {
            tracing::debug!("Reading sheet '{}' from {}", sheet, path.display());
            read_workbook(path, sheet)?
        };

        tracing::info!(
            "📄 {} [{}]: {} rows, {} columns",
            path.display(),
            sheet,
            table.row_count(),
            table.columns().len()
        );
        Ok(table)
    }
}

fn read_workbook(path: &Path, sheet: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(ExportError::SheetNotFoundError {
            path: path.display().to_string(),
            sheet: sheet.to_string(),
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    table_from_range(&range)
}

/// First row of the used range is the header.
pub fn table_from_range(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let headers = header
        .iter()
        .enumerate()
        .map(|(index, cell)| header_name(index, cell_value(cell)))
        .collect();
    let data = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Table::from_rows(headers, data)
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, field)| header_name(index, text_cell_value(field)))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(text_cell_value).collect());
    }

    Table::from_rows(headers, rows)
}

fn header_name(index: usize, value: CellValue) -> String {
    match value {
        CellValue::Null => format!("Unnamed: {}", index),
        CellValue::Text(s) => s,
        other => crate::core::normalizer::cell_to_text(other),
    }
}

pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Decimal(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Decimal(dt.as_f64()),
        // as_datetime 會依活頁簿的 1900/1904 日期系統換算
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(CellValue::Decimal(dt.as_f64()), CellValue::Date),
        Data::DateTimeIso(s) => parse_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// CSV 沒有型別資訊，依內容推斷：整數、浮點數、日期，其餘為文字
pub fn text_cell_value(field: &str) -> CellValue {
    let trimmed = field.trim();
    if NA_VALUES.contains(&trimmed) {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Decimal(f);
        }
    }
    if let Some(dt) = parse_datetime(trimmed) {
        return CellValue::Date(dt);
    }
    CellValue::Text(field.to_string())
}
