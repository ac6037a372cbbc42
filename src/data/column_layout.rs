//! Column width allocation.
//!
//! Explicit widths are taken as-is and whatever remains of 100% is split
//! evenly between the columns without one. The same resolver feeds the
//! on-screen layout and every export sink, so proportions always match.

use crate::data::column::ColumnDescriptor;
use std::ops::Deref;
use tracing::{trace, warn};

/// The width basis every layout is computed against
pub const TOTAL_WIDTH: f64 = 100.0;

/// A column with its resolved share of the total width
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub column: ColumnDescriptor,
    pub calculated_width: f64,
}

impl Deref for ResolvedColumn {
    type Target = ColumnDescriptor;

    fn deref(&self) -> &Self::Target {
        &self.column
    }
}

/// Share given to each column without an explicit width.
///
/// Negative when explicit widths add up to more than 100; this is kept
/// as-is and logged.
pub fn default_share<'a, I>(columns: I) -> f64
where
    I: IntoIterator<Item = &'a ColumnDescriptor>,
{
    let mut specified_total = 0.0;
    let mut unspecified = 0usize;
    for column in columns {
        match column.explicit_width() {
            Some(width) => specified_total += width,
            None => unspecified += 1,
        }
    }

    if specified_total > TOTAL_WIDTH {
        warn!(
            target: "layout",
            "Explicit column widths add up to {}%, unspecified columns get a negative share",
            specified_total
        );
    }

    if unspecified > 0 {
        (TOTAL_WIDTH - specified_total) / unspecified as f64
    } else {
        0.0
    }
}

/// Resolve a width for every column. No rounding is applied.
pub fn resolve_column_widths(columns: &[ColumnDescriptor]) -> Vec<ResolvedColumn> {
    resolve_refs(columns.iter())
}

/// Same as [`resolve_column_widths`] over borrowed columns, e.g. an exportable subset
pub fn resolve_refs<'a, I>(columns: I) -> Vec<ResolvedColumn>
where
    I: IntoIterator<Item = &'a ColumnDescriptor>,
    I::IntoIter: Clone,
{
    let columns = columns.into_iter();
    let share = default_share(columns.clone());

    let resolved: Vec<ResolvedColumn> = columns
        .map(|column| ResolvedColumn {
            calculated_width: column.explicit_width().unwrap_or(share),
            column: column.clone(),
        })
        .collect();

    trace!(
        target: "layout",
        "Resolved {} columns, default share {}",
        resolved.len(),
        share
    );
    resolved
}

/// Sum of resolved widths
pub fn total_width(columns: &[ResolvedColumn]) -> f64 {
    columns.iter().map(|c| c.calculated_width).sum()
}
