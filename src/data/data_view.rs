use crate::data::column::Accessor;
use crate::data::record::{compare_values, Record, RecordSet};

/// Sort order requested for the displayed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Index into the table's columns
    pub column: usize,
    pub ascending: bool,
}

/// A view over a shared record set that can filter, sort and page
/// without copying records
#[derive(Debug, Clone)]
pub struct DataView {
    /// The underlying immutable data source
    source: RecordSet,

    /// Record indices that are visible (after filtering/sorting)
    visible_rows: Vec<usize>,

    /// Limit and offset for pagination
    limit: Option<usize>,
    offset: usize,
}

impl DataView {
    /// Create a new view showing all records
    pub fn new(source: RecordSet) -> Self {
        let row_count = source.len();
        Self {
            source,
            visible_rows: (0..row_count).collect(),
            limit: None,
            offset: 0,
        }
    }

    /// Create a view with specific rows
    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.visible_rows = rows;
        self
    }

    /// Apply limit and offset
    pub fn with_limit(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Stable sort of the visible rows by an accessor's value
    pub fn sort_by(mut self, accessor: &Accessor, ascending: bool) -> Self {
        let source = &self.source;
        let mut keyed: Vec<(usize, _)> = self
            .visible_rows
            .iter()
            .filter_map(|&idx| source.get(idx).map(|record| (idx, accessor.value(record))))
            .collect();

        keyed.sort_by(|(_, a), (_, b)| {
            let cmp = compare_values(a, b);
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });

        self.visible_rows = keyed.into_iter().map(|(idx, _)| idx).collect();
        self
    }

    /// Number of visible rows (respecting limit/offset)
    pub fn row_count(&self) -> usize {
        let available = self.visible_rows.len().saturating_sub(self.offset);
        match self.limit {
            Some(limit) => available.min(limit),
            None => available,
        }
    }

    /// Get a row by index (respecting limit/offset)
    pub fn get_row(&self, index: usize) -> Option<&Record> {
        if let Some(limit) = self.limit {
            if index >= limit {
                return None;
            }
        }
        let row_idx = *self.visible_rows.get(index + self.offset)?;
        self.source.get(row_idx)
    }

    /// Visible rows (respecting limit/offset)
    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        (0..self.row_count()).filter_map(move |i| self.get_row(i))
    }

    /// Source index of each row (respecting limit/offset)
    pub fn row_indices(&self) -> &[usize] {
        let start = self.offset.min(self.visible_rows.len());
        let end = start + self.row_count();
        &self.visible_rows[start..end]
    }

    /// Visible row indices (before limit/offset)
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn source() -> RecordSet {
        Arc::new(
            (1..=7)
                .map(|i| Record::new().with("n", i).with("even", i % 2 == 0))
                .collect(),
        )
    }

    #[test]
    fn test_page_slice() {
        let view = DataView::new(source()).with_limit(3, 6);
        assert_eq!(view.row_count(), 1);
        assert_eq!(view.row_indices(), &[6]);
        assert!(view.get_row(1).is_none());
    }

    #[test]
    fn test_sort_descending_over_selected_rows() {
        let view = DataView::new(source())
            .with_rows(vec![1, 3, 5])
            .sort_by(&Accessor::field("n"), false);
        assert_eq!(view.visible_row_indices(), &[5, 3, 1]);
    }

    #[test]
    fn test_offset_past_end() {
        let view = DataView::new(source()).with_limit(5, 20);
        assert_eq!(view.row_count(), 0);
        assert!(view.row_indices().is_empty());
        assert_eq!(view.rows().count(), 0);
    }
}
