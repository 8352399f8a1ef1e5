pub mod etl;
pub mod normalizer;
pub mod render;

pub use crate::domain::model::{ExtractedTable, NormalizedTable, Record, Table, TransformResult};
pub use crate::domain::ports::{Pipeline, Storage, TableSource};
pub use crate::utils::error::Result;
