use crate::data::column::VerticalAlign;
use crate::data::data_exporter::{
    ExportOptions, ExportOrientation, PageFormat, DEFAULT_DOCUMENT_MARGIN,
    DEFAULT_FILE_BASE_NAME, DEFAULT_SHEET_NAME, DEFAULT_TOTAL_CHARS,
};
use crate::data::export_writer::ExportTargets;
use crate::utils::app_paths::AppPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows per page
    pub items_per_page: usize,

    /// Show the page navigation bar
    pub show_pagination: bool,

    /// Show the search input
    pub show_filter: bool,

    /// Size columns to their content instead of the resolved widths
    pub fit_content: bool,

    /// Vertical alignment for cells without their own
    pub vertical_align: VerticalAlign,

    pub previous_label: String,
    pub next_label: String,
    pub showing_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name without extension
    pub file_base_name: String,

    /// "horizontal" (landscape) or "vertical" (portrait)
    pub orientation: ExportOrientation,

    pub show_csv: bool,
    pub show_excel: bool,
    pub show_pdf: bool,

    pub sheet_name: String,

    /// Width of the whole sheet in character units
    pub spreadsheet_total_chars: f64,

    /// Left/right document margin in page units
    pub document_margin: f64,

    pub page_format: PageFormat,

    /// Quote every CSV field
    pub csv_quote_all: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when REPORT_TABLE_LOG is unset
    pub level: String,

    /// Also write logs to a timestamped file
    pub log_to_file: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            items_per_page: 25,
            show_pagination: true,
            show_filter: true,
            fit_content: false,
            vertical_align: VerticalAlign::Middle,
            previous_label: "Previo".to_string(),
            next_label: "Siguiente".to_string(),
            showing_label: "Mostrando".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_base_name: DEFAULT_FILE_BASE_NAME.to_string(),
            orientation: ExportOrientation::Horizontal,
            show_csv: true,
            show_excel: true,
            show_pdf: true,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            spreadsheet_total_chars: DEFAULT_TOTAL_CHARS,
            document_margin: DEFAULT_DOCUMENT_MARGIN,
            page_format: PageFormat::Tabloid,
            csv_quote_all: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            log_to_file: false,
        }
    }
}

impl ExportConfig {
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            file_base_name: self.file_base_name.clone(),
            orientation: self.orientation,
            sheet_name: self.sheet_name.clone(),
            total_chars: self.spreadsheet_total_chars,
            page_format: self.page_format,
            margin: self.document_margin,
        }
    }

    pub fn targets(&self) -> ExportTargets {
        ExportTargets {
            csv: self.show_csv,
            spreadsheet: self.show_excel,
            document: self.show_pdf,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Report Table Configuration File
# Location: ~/.config/report-table/config.toml (Linux)
#           ~/Library/Application Support/report-table/config.toml (macOS)
#           %APPDATA%\report-table\config.toml (Windows)

[display]
# Rows shown per page
items_per_page = 25

# Show the page navigation bar
show_pagination = true

# Show the search input
show_filter = true

# Size columns to their content instead of the configured widths
fit_content = false

# Default vertical alignment: "top", "middle", "bottom"
vertical_align = "middle"

# Pagination labels
previous_label = "Previo"
next_label = "Siguiente"
showing_label = "Mostrando"

[export]
# File name used for every export, without extension
file_base_name = "Reporte de Datos"

# "horizontal" exports landscape documents, "vertical" portrait
orientation = "horizontal"

# Which artifacts to produce
show_csv = true
show_excel = true
show_pdf = true

# Spreadsheet worksheet name
sheet_name = "Datos"

# Total spreadsheet width in character units, split by column width
spreadsheet_total_chars = 100.0

# Document side margin (mm)
document_margin = 20.0

# Page size: "tabloid", "a4", "letter"
page_format = "tabloid"

# Quote every CSV field
csv_quote_all = true

[logging]
# Used when REPORT_TABLE_LOG is not set: "error", "warn", "info", "debug", "trace"
level = "warn"

# Also write logs to a timestamped file in the log directory
log_to_file = false
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("Report Table Configuration Setup");
        println!("================================");

        let mut config = Config::default();

        let answer = Self::prompt("Rows per page [25]: ")?;
        if !answer.is_empty() {
            config.display.items_per_page = answer
                .parse()
                .with_context(|| format!("'{}' is not a number", answer))?;
        }

        let answer = Self::prompt("Export orientation (horizontal/vertical) [horizontal]: ")?;
        if !answer.is_empty() {
            config.export.orientation = ExportOrientation::from_name(&answer);
        }

        let answer = Self::prompt("Export file name [Reporte de Datos]: ")?;
        if !answer.is_empty() {
            config.export.file_base_name = answer;
        }

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }

    fn prompt(question: &str) -> Result<String> {
        print!("{}", question);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}
