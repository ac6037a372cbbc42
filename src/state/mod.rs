//! Events consumed by the table orchestrator

pub mod events;

pub use events::TableEvent;
