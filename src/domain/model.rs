use crate::utils::error::{ExportError, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

/// 單一儲存格的值，型別在讀取時就已經決定
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Decimal(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// 欄位的邏輯型別，決定 normalizer 走哪一條分支
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Integer,
    Decimal,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Infers the logical type from the non-null cells.
    ///
    /// A column with no values at all is treated as `Decimal` so it takes the
    /// numeric branch and stays null. Integers become `Decimal` as soon as the
    /// column also holds a null or a float.
    pub fn kind(&self) -> ColumnKind {
        let mut non_null = self.values.iter().filter(|v| !v.is_null()).peekable();
        if non_null.peek().is_none() {
            return ColumnKind::Decimal;
        }

        let mut all_dates = true;
        let mut all_integers = true;
        let mut all_numbers = true;
        for value in non_null {
            match value {
                CellValue::Date(_) => {
                    all_integers = false;
                    all_numbers = false;
                }
                CellValue::Integer(_) => all_dates = false,
                CellValue::Decimal(_) => {
                    all_dates = false;
                    all_integers = false;
                }
                CellValue::Text(_) | CellValue::Null => {
                    all_dates = false;
                    all_integers = false;
                    all_numbers = false;
                }
            }
        }

        let has_nulls = self.values.iter().any(CellValue::is_null);
        if all_dates {
            ColumnKind::Date
        } else if all_integers && !has_nulls {
            ColumnKind::Integer
        } else if all_numbers {
            ColumnKind::Decimal
        } else {
            ColumnKind::Text
        }
    }
}

/// 以欄為主的資料表；所有欄位長度一致
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(ExportError::SchemaError {
                    message: format!(
                        "column '{}' has {} rows, expected {}",
                        bad.name,
                        bad.values.len(),
                        expected
                    ),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Builds a table from a header row and row-major data. Short rows are
    /// padded with nulls; cells past the header width must be empty.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(rows.len())))
            .collect();

        for (index, mut row) in rows.into_iter().enumerate() {
            if row.iter().skip(columns.len()).any(|v| !v.is_null()) {
                return Err(ExportError::SchemaError {
                    message: format!(
                        "data row {} has {} cells but the header has {} columns",
                        index + 1,
                        row.len(),
                        columns.len()
                    ),
                });
            }
            row.resize(columns.len(), CellValue::Null);
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }

        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

pub type Record = serde_json::Map<String, serde_json::Value>;

/// 一張表正規化後的結果
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedTable {
    pub identifier: String,
    pub fields: Vec<String>,
    pub records: Vec<Record>,
    pub dropped_rows: usize,
}

/// 一次匯出中讀入的表，依設定順序排列
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub identifier: String,
    pub table: Table,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub tables: Vec<NormalizedTable>,
}

impl TransformResult {
    pub fn total_records(&self) -> usize {
        self.tables.iter().map(|t| t.records.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_kind_inference() {
        let dates = Column::new("d", vec![date(2024, 1, 1), CellValue::Null]);
        assert_eq!(dates.kind(), ColumnKind::Date);

        let ints = Column::new("i", vec![CellValue::Integer(1), CellValue::Integer(2)]);
        assert_eq!(ints.kind(), ColumnKind::Integer);

        let ints_with_null = Column::new("i", vec![CellValue::Integer(1), CellValue::Null]);
        assert_eq!(ints_with_null.kind(), ColumnKind::Decimal);

        let mixed_numbers = Column::new("n", vec![CellValue::Integer(1), CellValue::Decimal(1.5)]);
        assert_eq!(mixed_numbers.kind(), ColumnKind::Decimal);

        let text = Column::new("t", vec![CellValue::Text("a".into()), CellValue::Integer(1)]);
        assert_eq!(text.kind(), ColumnKind::Text);

        let date_and_text = Column::new("x", vec![date(2024, 1, 1), CellValue::Text("n/a".into())]);
        assert_eq!(date_and_text.kind(), ColumnKind::Text);
    }

    #[test]
    fn test_all_null_column_is_decimal() {
        let empty = Column::new("e", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(empty.kind(), ColumnKind::Decimal);
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = Table::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![CellValue::Integer(1)], vec![CellValue::Integer(2), CellValue::Integer(3)]],
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("b").unwrap().values, vec![CellValue::Null, CellValue::Integer(3)]);
    }

    #[test]
    fn test_from_rows_drops_empty_trailing_cells() {
        let table = Table::from_rows(
            vec!["a".to_string()],
            vec![vec![CellValue::Integer(1), CellValue::Null, CellValue::Null]],
        )
        .unwrap();
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.column("a").unwrap().values, vec![CellValue::Integer(1)]);
    }

    #[test]
    fn test_from_rows_rejects_values_past_header() {
        let result = Table::from_rows(
            vec!["a".to_string()],
            vec![vec![CellValue::Integer(1)], vec![CellValue::Integer(2), CellValue::Text("extra".into())]],
        );
        match result {
            Err(ExportError::SchemaError { message }) => assert!(message.contains("data row 2")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::new("a", vec![CellValue::Null]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(result, Err(ExportError::SchemaError { .. })));
    }
}
