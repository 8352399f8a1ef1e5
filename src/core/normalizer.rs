use crate::domain::model::{CellValue, Column, ColumnKind, NormalizedTable, Record, Table};
use crate::utils::error::{ExportError, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Number, Value};
use std::collections::{HashMap, HashSet};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const JSON_INDENT: &[u8] = b"    ";
/// 2^63；i64 可表示的整數範圍為 [-2^63, 2^63)
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
/// 超過此值的 f64 已沒有小數位可捨入
const ROUNDING_LIMIT: f64 = 1e15;

/// 單張表的正規化選項
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// 來源欄名 -> 輸出欄名
    pub rename: HashMap<String, String>,
    /// 不在 rename 中的欄位是否保留
    pub keep_unmapped: bool,
    /// rename 中的來源欄位不存在時是否略過
    pub allow_missing_columns: bool,
    /// 日期欄的空值輸出為 null 而非 ""
    pub preserve_null_dates: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            rename: HashMap::new(),
            keep_unmapped: true,
            allow_missing_columns: false,
            preserve_null_dates: false,
        }
    }
}

impl NormalizeOptions {
    pub fn with_rename<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rename
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Runs the full normalization: rename, drop empty rows, format dates,
/// normalize numeric precision, coerce text columns, build records.
pub fn normalize(identifier: &str, table: Table, options: &NormalizeOptions) -> Result<NormalizedTable> {
    let input_rows = table.row_count();
    let columns = rename_columns(identifier, table, options)?;
    let columns = drop_empty_rows(columns);
    let row_count = columns.first().map_or(0, |c| c.values.len());
    let dropped_rows = input_rows - row_count;

    if dropped_rows > 0 {
        tracing::debug!("🧹 {}: dropped {} empty rows", identifier, dropped_rows);
    }

    let mut fields = Vec::with_capacity(columns.len());
    let mut normalized = Vec::with_capacity(columns.len());
    for column in columns {
        let kind = column.kind();
        tracing::debug!("{}.{} -> {:?}", identifier, column.name, kind);
        normalized.push(normalize_column(kind, column.values, options));
        fields.push(column.name);
    }

    let records = (0..row_count)
        .map(|row| {
            fields
                .iter()
                .zip(&normalized)
                .map(|(field, values)| (field.clone(), values[row].clone()))
                .collect::<Record>()
        })
        .collect();

    Ok(NormalizedTable {
        identifier: identifier.to_string(),
        fields,
        records,
        dropped_rows,
    })
}

fn rename_columns(identifier: &str, table: Table, options: &NormalizeOptions) -> Result<Vec<Column>> {
    if !options.allow_missing_columns {
        let mut sources: Vec<&String> = options.rename.keys().collect();
        sources.sort();
        if let Some(missing) = sources.into_iter().find(|s| table.column(s).is_none()) {
            return Err(ExportError::MissingColumnError {
                table: identifier.to_string(),
                column: missing.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for mut column in table.into_columns() {
        match options.rename.get(&column.name) {
            Some(target) => column.name = target.clone(),
            None if options.keep_unmapped => {}
            None => continue,
        }

        if !seen.insert(column.name.clone()) {
            return Err(ExportError::DuplicateColumnError {
                table: identifier.to_string(),
                column: column.name,
            });
        }
        columns.push(column);
    }

    Ok(columns)
}

fn drop_empty_rows(columns: Vec<Column>) -> Vec<Column> {
    let row_count = columns.first().map_or(0, |c| c.values.len());
    let keep: Vec<bool> = (0..row_count)
        .map(|row| columns.iter().any(|c| !c.values[row].is_null()))
        .collect();

    if keep.iter().all(|k| *k) {
        return columns;
    }

    columns
        .into_iter()
        .map(|column| Column {
            name: column.name,
            values: column
                .values
                .into_iter()
                .zip(&keep)
                .filter_map(|(value, keep)| keep.then_some(value))
                .collect(),
        })
        .collect()
}

fn normalize_column(kind: ColumnKind, values: Vec<CellValue>, options: &NormalizeOptions) -> Vec<Value> {
    match kind {
        ColumnKind::Date => values
            .into_iter()
            .map(|value| match value {
                CellValue::Date(dt) => Value::String(dt.format(DATE_FORMAT).to_string()),
                _ if options.preserve_null_dates => Value::Null,
                _ => Value::String(String::new()),
            })
            .collect(),
        ColumnKind::Integer => values
            .into_iter()
            .map(|value| match value {
                CellValue::Integer(i) => Value::from(i),
                _ => Value::Null,
            })
            .collect(),
        ColumnKind::Decimal => normalize_decimal(&values),
        ColumnKind::Text => values
            .into_iter()
            .map(|value| Value::String(cell_to_text(value)))
            .collect(),
    }
}

fn normalize_decimal(values: &[CellValue]) -> Vec<Value> {
    let numbers: Vec<Option<f64>> = values
        .iter()
        .map(|value| match value {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Decimal(f) if f.is_finite() => Some(*f),
            _ => None,
        })
        .collect();

    let mut non_null = numbers.iter().flatten().peekable();
    let integral = non_null.peek().is_some() && non_null.all(|x| x.fract() == 0.0 && fits_i64(*x));

    numbers
        .into_iter()
        .map(|number| match number {
            Some(x) if integral => Value::from(x as i64),
            Some(x) => Number::from_f64(round2(x)).map_or(Value::Null, Value::Number),
            None => Value::Null,
        })
        .collect()
}

fn fits_i64(x: f64) -> bool {
    (-I64_BOUND..I64_BOUND).contains(&x)
}

/// 四捨六入五成雙 (round half to even)
pub(crate) fn round2(x: f64) -> f64 {
    if x.abs() >= ROUNDING_LIMIT {
        return x;
    }
    (x * 100.0).round_ties_even() / 100.0
}

pub(crate) fn cell_to_text(value: CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Decimal(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        CellValue::Decimal(f) => f.to_string(),
        CellValue::Date(dt) => dt.format(DATETIME_TEXT_FORMAT).to_string(),
        CellValue::Text(s) => s,
    }
}

/// 以 4 空白縮排輸出 JSON 陣列；非 ASCII 字元保持原樣
pub fn records_to_json(records: &[Record]) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(JSON_INDENT));
    records.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| ExportError::ValidationError {
        message: format!("JSON output is not valid UTF-8: {}", e),
    })
}
