use anyhow::{anyhow, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "report-table";

pub struct AppPaths;

impl AppPaths {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?
            .join(APP_DIR_NAME))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Log directory, created on demand
    pub fn log_dir() -> Result<PathBuf> {
        let log_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join(APP_DIR_NAME)
            .join("logs");

        fs::create_dir_all(&log_dir)?;
        Ok(log_dir)
    }

    /// A fresh timestamped log file path
    pub fn new_log_file() -> Result<PathBuf> {
        Ok(Self::log_dir()?.join(Self::log_file_name(&Local::now())))
    }

    pub fn log_file_name(at: &chrono::DateTime<Local>) -> String {
        format!("{}_{}.log", APP_DIR_NAME, at.format("%Y%m%d_%H%M%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(AppPaths::log_file_name(&at), "report-table_20240309_140507.log");
    }
}
