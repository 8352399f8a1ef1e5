use crate::core::normalizer::NormalizeOptions;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_js_identifier, validate_non_empty_string, validate_path,
    validate_unique, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"];
const DECLARATION_KEYWORDS: &[&str] = &["const", "let", "var", ""];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub export: ExportSettings,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub name: Option<String>,
    pub output_path: String,
    #[serde(default = "default_declaration_keyword")]
    pub declaration_keyword: String,
    /// 相對路徑的基準目錄；從檔案載入時預設為設定檔所在目錄
    pub base_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub identifier: String,
    pub path: String,
    pub sheet: String,
    #[serde(default)]
    pub rename: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub keep_unmapped: bool,
    #[serde(default)]
    pub allow_missing_columns: bool,
    #[serde(default)]
    pub preserve_null_dates: bool,
}

fn default_declaration_keyword() -> String {
    "const".to_string()
}

fn default_true() -> bool {
    true
}

impl TableConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            rename: self.rename.clone(),
            keep_unmapped: self.keep_unmapped,
            allow_missing_columns: self.allow_missing_columns,
            preserve_null_dates: self.preserve_null_dates,
        }
    }

    fn is_csv(&self) -> bool {
        Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}

impl ExportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;

        if config.export.base_dir.is_none() {
            let dir = path
                .as_ref()
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            config.export.base_dir = Some(dir.display().to_string());
        }

        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("export.output_path", &self.export.output_path)?;

        if !DECLARATION_KEYWORDS.contains(&self.export.declaration_keyword.as_str()) {
            return Err(ExportError::InvalidConfigValueError {
                field: "export.declaration_keyword".to_string(),
                value: self.export.declaration_keyword.clone(),
                reason: "Expected one of: const, let, var, or empty".to_string(),
            });
        }

        if self.tables.is_empty() {
            return Err(ExportError::MissingConfigError {
                field: "tables".to_string(),
            });
        }

        for table in &self.tables {
            validate_js_identifier("tables.identifier", &table.identifier)?;
            validate_path("tables.path", &table.path)?;
            validate_file_extension("tables.path", &table.path, SUPPORTED_EXTENSIONS)?;
            if !table.is_csv() {
                validate_non_empty_string("tables.sheet", &table.sheet)?;
            }
            for target in table.rename.values() {
                validate_non_empty_string("tables.rename", target)?;
            }
            validate_unique("tables.rename", table.rename.values().map(String::as_str))?;
        }

        validate_unique(
            "tables.identifier",
            self.tables.iter().map(|t| t.identifier.as_str()),
        )
    }

    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.export.base_dir {
            Some(base) if path.is_relative() => Path::new(base).join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 命令列給的輸出路徑以目前工作目錄為準，不跟隨設定檔所在目錄
    pub fn override_output_path(&mut self, output: &str) -> Result<()> {
        validate_path("--output", output)?;
        let path = Path::new(output);
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        self.export.output_path = resolved.to_string_lossy().into_owned();
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve_path(&self.export.output_path)
    }

    pub fn declaration_keyword(&self) -> &str {
        &self.export.declaration_keyword
    }
}

impl Validate for ExportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[export]
name = "dashboard"
output_path = "data-source.js"

[[tables]]
identifier = "orderBookData"
path = "order_sales.xlsx"
sheet = "ORDER BOOK"

[tables.rename]
"PO Number" = "poNumber"
"Login Date" = "date"

[[tables]]
identifier = "salesBookData"
path = "order_sales.xlsx"
sheet = "SALES BOOK"
keep_unmapped = false
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = ExportConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.export.name.as_deref(), Some("dashboard"));
        assert_eq!(config.declaration_keyword(), "const");
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[0].identifier, "orderBookData");
        assert_eq!(config.tables[0].rename.get("PO Number").unwrap(), "poNumber");
        assert!(config.tables[0].keep_unmapped);
        assert!(!config.tables[1].keep_unmapped);
        assert!(!config.tables[1].preserve_null_dates);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalize_options_from_table() {
        let config = ExportConfig::from_toml_str(BASIC).unwrap();
        let options = config.tables[0].normalize_options();
        assert_eq!(options.rename.len(), 2);
        assert!(options.keep_unmapped);
        assert!(!options.allow_missing_columns);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHEET_EXPORT_TEST_OUT", "dist/data.js");

        let content = r#"
[export]
output_path = "${SHEET_EXPORT_TEST_OUT}"

[[tables]]
identifier = "itemMasterData"
path = "${SHEET_EXPORT_TEST_UNSET}/item_master.xlsx"
sheet = "Shaily Gupta"
"#;

        let config = ExportConfig::from_toml_str(content).unwrap();
        assert_eq!(config.export.output_path, "dist/data.js");
        assert_eq!(config.tables[0].path, "${SHEET_EXPORT_TEST_UNSET}/item_master.xlsx");

        std::env::remove_var("SHEET_EXPORT_TEST_OUT");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ExportConfig::from_toml_str(BASIC).unwrap();
        config.tables[1].identifier = "orderBookData".to_string();
        assert!(config.validate().is_err());

        let mut config = ExportConfig::from_toml_str(BASIC).unwrap();
        config.tables[0].identifier = "order book".to_string();
        assert!(config.validate().is_err());

        let mut config = ExportConfig::from_toml_str(BASIC).unwrap();
        config.tables[0].path = "order_sales.txt".to_string();
        assert!(config.validate().is_err());

        let mut config = ExportConfig::from_toml_str(BASIC).unwrap();
        config.export.declaration_keyword = "export".to_string();
        assert!(config.validate().is_err());

        let mut config = ExportConfig::from_toml_str(BASIC).unwrap();
        config
            .tables[0]
            .rename
            .insert("Login".to_string(), "poNumber".to_string());
        assert!(config.validate().is_err());

        let mut config = ExportConfig::from_toml_str(BASIC).unwrap();
        config.tables.clear();
        assert!(matches!(
            config.validate(),
            Err(ExportError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_csv_table_may_omit_sheet_name() {
        let content = r#"
[export]
output_path = "out.js"

[[tables]]
identifier = "rows"
path = "rows.csv"
sheet = ""
"#;
        let config = ExportConfig::from_toml_str(content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ExportConfig::from_toml_str("[export\noutput_path = 1").unwrap_err();
        assert!(matches!(err, ExportError::ConfigError { .. }));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = ExportConfig::from_file(temp_file.path()).unwrap();
        let dir = temp_file.path().parent().unwrap();

        assert_eq!(config.output_path(), dir.join("data-source.js"));
        assert_eq!(
            config.resolve_path(&config.tables[0].path),
            dir.join("order_sales.xlsx")
        );
    }

    #[test]
    fn test_output_override_resolves_against_working_dir() {
        let config_dir = tempfile::tempdir().unwrap();
        let config_path = config_dir.path().join("export.toml");
        std::fs::write(&config_path, BASIC).unwrap();

        let mut config = ExportConfig::from_file(&config_path).unwrap();
        config.override_output_path("out/data-source.js").unwrap();
        assert_eq!(
            config.output_path(),
            std::env::current_dir().unwrap().join("out/data-source.js")
        );
        assert_eq!(
            config.resolve_path(&config.tables[0].path),
            config_dir.path().join("order_sales.xlsx")
        );

        let absolute = config_dir.path().join("abs.js");
        config.override_output_path(absolute.to_str().unwrap()).unwrap();
        assert_eq!(config.output_path(), absolute);

        assert!(config.override_output_path("").is_err());
    }
}
