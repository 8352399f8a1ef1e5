// Adapters layer: concrete implementations for spreadsheet input and file output.

pub mod spreadsheet;
pub mod storage;

pub use spreadsheet::SpreadsheetSource;
pub use storage::LocalStorage;
