//! Utility functions and helpers
//!
//! Locale-aware number and date formatting, logging setup and
//! application directories.

pub mod app_paths;
pub mod date_format;
pub mod logging;
pub mod number_format;
