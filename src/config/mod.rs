//! Configuration module
//!
//! User settings (`config`) and declarative table definitions
//! (`table_definition`).

pub mod config;
pub mod table_definition;
