use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting export...");

        // Extract
        let tables = self.pipeline.extract()?;
        let rows: usize = tables.iter().map(|t| t.table.row_count()).sum();
        tracing::info!("📥 Extracted {} tables ({} rows)", tables.len(), rows);

        // Transform
        let result = self.pipeline.transform(tables)?;
        tracing::info!("🔄 Normalized {} records", result.total_records());

        // Load
        let output_path = self.pipeline.load(result)?;
        tracing::info!(
            "💾 Output saved to: {} ({:.2?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
