pub mod config;
pub mod data;
pub mod error;
pub mod services;
pub mod state;
pub mod utils;

pub use data::column::{Accessor, ColumnDescriptor, FormatRule};
pub use data::record::{DataValue, Record, RecordSet};
pub use error::TableConfigError;
pub use services::{TableOptions, TableOrchestrator};
pub use state::TableEvent;
