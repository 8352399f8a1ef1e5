use clap::Parser;
use sheet_export::config::CliArgs;
use sheet_export::utils::{logger, validation::Validate};
use sheet_export::{EtlEngine, ExportConfig, ExportPipeline, LocalStorage, SpreadsheetSource};

fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting sheet-export");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match ExportConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(output) = &args.output {
        if let Err(e) = config.override_output_path(output) {
            eprintln!("❌ Failed to resolve output path '{}': {}", output, e);
            std::process::exit(e.severity().exit_code());
        }
        tracing::info!("🔧 Output path overridden to: {}", config.output_path().display());
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let pipeline = ExportPipeline::new(SpreadsheetSource::new(), LocalStorage::new(), config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - output file will not be written");
        match pipeline.preview() {
            Ok(result) => {
                println!("🔍 Dry Run Analysis:");
                for table in &result.tables {
                    println!(
                        "  {}: {} records ({} empty rows dropped)",
                        table.identifier,
                        table.records.len(),
                        table.dropped_rows
                    );
                    println!("    Fields: {}", table.fields.join(", "));
                }
                println!();
                println!("✅ Dry run complete. Would write: {}", pipeline.config().output_path().display());
            }
            Err(e) => exit_with_error(&e),
        }
        return;
    }

    let engine = EtlEngine::new(pipeline);
    match engine.run() {
        Ok(output_path) => {
            tracing::info!("✅ Export completed successfully!");
            println!("✔ Data written successfully to: {}", output_path);
        }
        Err(e) => exit_with_error(&e),
    }
}

fn exit_with_error(e: &sheet_export::ExportError) -> ! {
    tracing::error!(
        "❌ Export failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    std::process::exit(e.severity().exit_code());
}

fn display_config_summary(config: &ExportConfig, args: &CliArgs) {
    println!("📋 Configuration Summary:");
    if let Some(name) = &config.export.name {
        println!("  Export: {}", name);
    }
    println!("  Output: {}", config.output_path().display());
    println!("  Tables:");
    for table in &config.tables {
        println!(
            "    {} <- {} [{}] ({} renamed columns)",
            table.identifier,
            config.resolve_path(&table.path).display(),
            table.sheet,
            table.rename.len()
        );
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
