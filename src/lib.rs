pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, SpreadsheetSource};
pub use app::pipelines::ExportPipeline;
pub use config::ExportConfig;
pub use crate::core::etl::EtlEngine;
pub use crate::core::normalizer::{normalize, NormalizeOptions};
pub use utils::error::{ExportError, Result};
