use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use report_table::config::config::Config;
use report_table::config::table_definition::TableDefinition;
use report_table::data::data_exporter::ExportOrientation;
use report_table::data::export_writer::ExportWriter;
use report_table::data::record::load_json_records;
use report_table::services::table_orchestrator::{TableOptions, TableOrchestrator};
use report_table::state::events::TableEvent;
use report_table::utils::app_paths::AppPaths;
use report_table::utils::logging::{init_tracing, LogOptions};
use std::path::PathBuf;
use tracing::{debug, warn};

mod table_display;

use table_display::display_render;

fn print_help() {
    println!("{}", "Report Table - paginated, searchable tables with export".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  report-table RECORDS.json --columns TABLE.toml [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}      - Column definition file (TOML or JSON)", "--columns FILE".green());
    println!("  {}       - Filter rows by a search term", "--search TERM".green());
    println!("  {}             - Show page N (one-based)", "--page N".green());
    println!("  {}         - Rows per page", "--per-page N".green());
    println!("  {}         - Write CSV, spreadsheet and document exports", "--export DIR".green());
    println!("  {}          - Export file base name", "--name BASE".green());
    println!("  {} - horizontal or vertical", "--orientation ORIENT".green());
    println!("  {}            - Debug logging", "--verbose".green());
    println!("  {}           - Also log to a file in the log directory", "--log-file".green());
    println!("  {}        - Initialize configuration with wizard", "--init-config".green());
    println!("  {}    - Generate config file with defaults", "--generate-config".green());
    println!();
}

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    records: Option<PathBuf>,
    columns: Option<PathBuf>,
    search: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
    export_dir: Option<PathBuf>,
    name: Option<String>,
    orientation: Option<ExportOrientation>,
    verbose: bool,
    log_file: bool,
    help: bool,
    init_config: bool,
    generate_config: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cli = CliArgs::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let flag = arg.as_str();
            let mut value = |name: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{} requires a value", name))
            };

            match flag {
                "--columns" => cli.columns = Some(PathBuf::from(value(flag)?)),
                "--search" => cli.search = Some(value(flag)?),
                "--page" => cli.page = Some(parse_number(arg, &value(flag)?)?),
                "--per-page" => cli.per_page = Some(parse_number(arg, &value(flag)?)?),
                "--export" => cli.export_dir = Some(PathBuf::from(value(flag)?)),
                "--name" => cli.name = Some(value(flag)?),
                "--orientation" => {
                    cli.orientation = Some(ExportOrientation::from_name(&value(flag)?))
                }
                "--verbose" | "-v" => cli.verbose = true,
                "--log-file" => cli.log_file = true,
                "--help" | "-h" => cli.help = true,
                "--init-config" => cli.init_config = true,
                "--generate-config" => cli.generate_config = true,
                unknown if unknown.starts_with("--") => {
                    return Err(anyhow!("Unknown option {}", unknown))
                }
                path => {
                    if cli.records.is_some() {
                        return Err(anyhow!("Unexpected argument {}", path));
                    }
                    cli.records = Some(PathBuf::from(path));
                }
            }
        }
        Ok(cli)
    }
}

fn parse_number(flag: &str, text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("{} expects a positive number, got '{}'", flag, text))
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize your tables.");
    Ok(())
}

fn run(cli: CliArgs) -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Using default configuration: {}", e).yellow());
        Config::default()
    });

    let log_file = if cli.log_file || config.logging.log_to_file {
        Some(AppPaths::new_log_file()?)
    } else {
        None
    };
    init_tracing(&LogOptions {
        verbose: cli.verbose,
        level: config.logging.level.clone(),
        log_file,
    })?;

    let records_path = cli
        .records
        .ok_or_else(|| anyhow!("Missing records file (see --help)"))?;
    let columns_path = cli
        .columns
        .ok_or_else(|| anyhow!("Missing --columns definition file"))?;

    let records = load_json_records(&records_path)?;
    let definition = TableDefinition::load(&columns_path)?;

    let mut options = TableOptions::from_config(&config);
    options.filter_fields = definition.filter_fields()?;
    if let Some(per_page) = cli.per_page {
        options.items_per_page = per_page;
    }
    if let Some(name) = cli.name {
        options.export.file_base_name = name;
    }
    if let Some(orientation) = cli.orientation {
        options.export.orientation = orientation;
    }

    let mut table = TableOrchestrator::new(records, definition.build_columns()?, options)?;
    debug!(
        target: "table",
        "Table ready: {} records, {} columns",
        table.records().len(),
        table.columns().len()
    );

    if let Some(title) = &definition.title {
        println!("{}", title.as_str().bold());
    }

    if let Some(term) = cli.search {
        if config.display.show_filter {
            table.handle(TableEvent::TermChanged(term))?;
        } else {
            warn!(target: "table", "Search is disabled in the configuration, ignoring --search");
        }
    }
    if let Some(page) = cli.page {
        table.handle(TableEvent::PageChanged(page))?;
    }

    display_render(&table.render(), &config.display);

    if let Some(dir) = cli.export_dir {
        let bundle = table.build_export();
        let written = ExportWriter::new(dir)
            .with_targets(config.export.targets())
            .with_quote_all(config.export.csv_quote_all)
            .write_all(&bundle)?;
        for path in written {
            println!("{}", format!("Exported {}", path.display()).green());
        }
    }

    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(2);
        }
    };

    if cli.help || args.is_empty() {
        print_help();
        return;
    }

    // Check for config initialization
    if cli.init_config {
        match Config::init_wizard() {
            Ok(_) => println!("\nConfiguration initialized successfully!"),
            Err(e) => {
                eprintln!("Error initializing config: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Check for config file generation
    if cli.generate_config {
        if let Err(e) = generate_config() {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = CliArgs::parse(&args(&[
            "data.json",
            "--columns",
            "table.toml",
            "--search",
            "ana",
            "--page",
            "2",
            "--orientation",
            "vertical",
            "--verbose",
        ]))
        .unwrap();
        assert_eq!(cli.records, Some(PathBuf::from("data.json")));
        assert_eq!(cli.columns, Some(PathBuf::from("table.toml")));
        assert_eq!(cli.search.as_deref(), Some("ana"));
        assert_eq!(cli.page, Some(2));
        assert_eq!(cli.orientation, Some(ExportOrientation::Vertical));
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_errors() {
        assert!(CliArgs::parse(&args(&["--page"])).is_err());
        assert!(CliArgs::parse(&args(&["--page", "two"])).is_err());
        assert!(CliArgs::parse(&args(&["--bogus"])).is_err());
        assert!(CliArgs::parse(&args(&["a.json", "b.json"])).is_err());
    }
}
