use crate::domain::model::{ExtractedTable, Table, TransformResult};
use crate::utils::error::Result;
use std::path::Path;

/// 讀取工作表；回傳的 Table 欄位型別已在這一層決定
pub trait TableSource {
    fn read_table(&self, path: &Path, sheet: &str) -> Result<Table>;
}

pub trait Storage {
    fn write_file(&self, path: &Path, data: &[u8]) -> Result<()>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<Vec<ExtractedTable>>;
    fn transform(&self, tables: Vec<ExtractedTable>) -> Result<TransformResult>;
    fn load(&self, result: TransformResult) -> Result<String>;
}
