use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "sheet-export")]
#[command(about = "Export spreadsheet tables as JavaScript data declarations")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sheet-export.toml")]
    pub config: String,

    /// Override export.output_path from config
    #[arg(short, long)]
    pub output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Read and normalize every table, but do not write the output file
    #[arg(long)]
    pub dry_run: bool,
}
