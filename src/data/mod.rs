//! Format-agnostic table pipeline
//!
//! Records and column descriptors go in; filtered, paged and formatted
//! projections plus export payloads come out.

pub mod cell_formatter;
pub mod column;
pub mod column_layout;
pub mod data_exporter;
pub mod data_view;
pub mod export_writer;
pub mod pagination;
pub mod record;
pub mod search_filter;
