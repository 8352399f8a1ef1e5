use crate::config::toml_config::ExportConfig;
use crate::core::normalizer::normalize;
use crate::core::render::render_document;
use crate::core::{ExtractedTable, Pipeline, Result, Storage, TableSource, TransformResult};
use crate::utils::error::ExportError;

/// 讀取設定中的每張表，正規化後寫成單一 JS 檔
pub struct ExportPipeline<R: TableSource, S: Storage> {
    pub(crate) source: R,
    pub(crate) storage: S,
    pub(crate) config: ExportConfig,
}

impl<R: TableSource, S: Storage> ExportPipeline<R, S> {
    pub fn new(source: R, storage: S, config: ExportConfig) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Extract + transform without touching the output file.
    pub fn preview(&self) -> Result<TransformResult> {
        let tables = self.extract()?;
        self.transform(tables)
    }
}

impl<R: TableSource, S: Storage> Pipeline for ExportPipeline<R, S> {
    fn extract(&self) -> Result<Vec<ExtractedTable>> {
        self.config
            .tables
            .iter()
            .map(|table_config| {
                let path = self.config.resolve_path(&table_config.path);
                tracing::info!(
                    "📥 Reading {} from {} [{}]",
                    table_config.identifier,
                    path.display(),
                    table_config.sheet
                );
                let table = self.source.read_table(&path, &table_config.sheet)?;
                Ok(ExtractedTable {
                    identifier: table_config.identifier.clone(),
                    table,
                })
            })
            .collect()
    }

    fn transform(&self, tables: Vec<ExtractedTable>) -> Result<TransformResult> {
        let mut normalized = Vec::with_capacity(tables.len());

        for extracted in tables {
            let table_config = self
                .config
                .tables
                .iter()
                .find(|t| t.identifier == extracted.identifier)
                .ok_or_else(|| ExportError::ConfigError {
                    message: format!("No table configuration for '{}'", extracted.identifier),
                })?;

            let table = normalize(
                &extracted.identifier,
                extracted.table,
                &table_config.normalize_options(),
            )?;
            tracing::info!(
                "✅ {}: {} records, {} fields ({} empty rows dropped)",
                table.identifier,
                table.records.len(),
                table.fields.len(),
                table.dropped_rows
            );
            normalized.push(table);
        }

        Ok(TransformResult { tables: normalized })
    }

    fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = self.config.output_path();
        let document = render_document(self.config.declaration_keyword(), &result.tables)?;

        tracing::debug!(
            "Writing {} declarations ({} bytes)",
            result.tables.len(),
            document.len()
        );
        self.storage.write_file(&output_path, document.as_bytes())?;

        Ok(output_path.display().to_string())
    }
}
