use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Sheet '{sheet}' not found in {path}")]
    SheetNotFoundError { path: String, sheet: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Column '{column}' not found in table '{table}'")]
    MissingColumnError { table: String, column: String },

    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumnError { table: String, column: String },

    #[error("Schema error: {message}")]
    SchemaError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Schema,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl ErrorSeverity {
    /// 失敗一律回傳非零退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ExportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::IoError(_)
            | ExportError::CsvError(_)
            | ExportError::WorkbookError(_)
            | ExportError::SheetNotFoundError { .. } => ErrorCategory::Input,
            ExportError::ConfigError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ExportError::MissingColumnError { .. }
            | ExportError::DuplicateColumnError { .. }
            | ExportError::SchemaError { .. }
            | ExportError::ValidationError { .. } => ErrorCategory::Schema,
            ExportError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Schema => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ExportError::IoError(_) => "檢查檔案路徑與讀寫權限",
            ExportError::CsvError(_) => "確認 CSV 檔案格式與編碼 (UTF-8)",
            ExportError::WorkbookError(_) => {
                "確認檔案是有效的 xlsx/xls/ods 活頁簿，且未被其他程式鎖定"
            }
            ExportError::SheetNotFoundError { .. } => "檢查設定檔中的 sheet 名稱 (大小寫需一致)",
            ExportError::ConfigError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::MissingConfigError { .. } => "修正 TOML 設定檔後重新執行",
            ExportError::MissingColumnError { .. } => {
                "更新 rename 對照表，或設定 allow_missing_columns = true"
            }
            ExportError::DuplicateColumnError { .. } => "確認 rename 後的欄位名稱不重複",
            ExportError::SchemaError { .. } | ExportError::ValidationError { .. } => {
                "檢查來源工作表的結構"
            }
            ExportError::SerializationError(_) => "回報此問題：輸出資料含有無法序列化的值",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("無法讀取輸入資料: {}", self),
            ErrorCategory::Configuration => format!("設定錯誤: {}", self),
            ErrorCategory::Schema => format!("資料結構錯誤: {}", self),
            ErrorCategory::Output => format!("輸出失敗: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
