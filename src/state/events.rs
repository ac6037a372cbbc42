//! Table events

use crate::data::column::ColumnDescriptor;
use crate::data::data_view::SortSpec;
use crate::data::record::RecordSet;
use std::fmt;

/// External events that drive the table orchestrator
#[derive(Clone)]
pub enum TableEvent {
    /// New record set supplied by the caller
    DataChanged(RecordSet),

    /// Column configuration replaced
    ColumnsChanged(Vec<ColumnDescriptor>),

    /// Search input edited; an empty string clears the search
    TermChanged(String),

    /// Page button pressed (one-based)
    PageChanged(usize),

    /// External loading flag toggled
    LoadingChanged(bool),

    /// Header clicked; `None` clears sorting
    SortChanged(Option<SortSpec>),

    /// Items per page changed
    PageSizeChanged(usize),
}

impl TableEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            TableEvent::DataChanged(_) => "DataChanged",
            TableEvent::ColumnsChanged(_) => "ColumnsChanged",
            TableEvent::TermChanged(_) => "TermChanged",
            TableEvent::PageChanged(_) => "PageChanged",
            TableEvent::LoadingChanged(_) => "LoadingChanged",
            TableEvent::SortChanged(_) => "SortChanged",
            TableEvent::PageSizeChanged(_) => "PageSizeChanged",
        }
    }
}

impl fmt::Debug for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableEvent::DataChanged(records) => write!(f, "DataChanged({} records)", records.len()),
            TableEvent::ColumnsChanged(columns) => {
                write!(f, "ColumnsChanged({} columns)", columns.len())
            }
            TableEvent::TermChanged(term) => write!(f, "TermChanged({:?})", term),
            TableEvent::PageChanged(page) => write!(f, "PageChanged({})", page),
            TableEvent::LoadingChanged(loading) => write!(f, "LoadingChanged({})", loading),
            TableEvent::SortChanged(sort) => write!(f, "SortChanged({:?})", sort),
            TableEvent::PageSizeChanged(size) => write!(f, "PageSizeChanged({})", size),
        }
    }
}
