use crate::config::config::Config;
use crate::data::cell_formatter::{CellContent, CellFormatter};
use crate::data::column::{validate_columns, Align, ColumnDescriptor, VerticalAlign};
use crate::data::column_layout::{resolve_column_widths, ResolvedColumn};
use crate::data::data_exporter::{ExportBundle, ExportCoordinator, ExportOptions};
use crate::data::data_view::{DataView, SortSpec};
use crate::data::pagination::{compute_window, total_pages, PageState, PaginationWindow};
use crate::data::record::{Record, RecordSet};
use crate::data::search_filter::{FieldSetCache, FilterFields, FilterState, SearchFilter};
use crate::error::TableConfigError;
use crate::state::events::TableEvent;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Idle,
    /// Content is hidden and nothing is recomputed
    Loading,
}

pub type RowColorFn = Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>;

/// Background color of body rows
#[derive(Clone)]
pub enum RowColor {
    Fixed(String),
    Computed(RowColorFn),
}

impl RowColor {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Option<String> + Send + Sync + 'static,
    {
        RowColor::Computed(Arc::new(f))
    }

    pub fn resolve(&self, record: &Record) -> Option<String> {
        match self {
            RowColor::Fixed(color) => Some(color.clone()),
            RowColor::Computed(f) => f(record),
        }
    }
}

impl fmt::Debug for RowColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowColor::Fixed(color) => f.debug_tuple("Fixed").field(color).finish(),
            RowColor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Table-level settings
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub items_per_page: usize,
    pub filter_fields: FilterFields,
    pub show_pagination: bool,
    pub export: ExportOptions,
    pub row_color: Option<RowColor>,
    pub vertical_align: VerticalAlign,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            filter_fields: FilterFields::All,
            show_pagination: true,
            export: ExportOptions::default(),
            row_color: None,
            vertical_align: VerticalAlign::Middle,
        }
    }
}

impl TableOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            items_per_page: config.display.items_per_page,
            show_pagination: config.display.show_pagination,
            export: config.export.options(),
            vertical_align: config.display.vertical_align,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewHeader {
    pub label: String,
    pub align: Align,
    pub width: f64,
    pub sortable: bool,
    /// `Some(ascending)` when the table is sorted by this column
    pub sorted: Option<bool>,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
    pub style: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewCell {
    pub content: CellContent,
    pub align: Align,
    pub vertical_align: VerticalAlign,
    pub width: f64,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
    /// Column style properties, e.g. `color` or `font-weight`
    pub style: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub cells: Vec<ViewCell>,
    pub color: Option<String>,
    /// Index of the record in the caller's record set
    pub source_index: usize,
}

/// The rendered current page
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<ViewHeader>,
    pub rows: Vec<ViewRow>,
    /// `None` when pagination is hidden
    pub pagination: Option<PaginationWindow>,
    pub filtered_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRender {
    Loading,
    Ready(TableView),
}

/// Owns search and page state and recomputes the table on each event.
///
/// Recompute order is always filter, then layout, then pagination.
pub struct TableOrchestrator {
    records: RecordSet,
    columns: Vec<ColumnDescriptor>,
    resolved: Vec<ResolvedColumn>,
    options: TableOptions,
    state: TableState,
    filter: FilterState,
    page: PageState,
    sort: Option<SortSpec>,
    field_cache: FieldSetCache,
    /// Matching record indices in original order
    filtered: Vec<usize>,
    /// `filtered` after sorting
    ordered: Vec<usize>,
    pagination: Option<PaginationWindow>,
    recomputes: usize,
}

impl TableOrchestrator {
    pub fn new(
        records: RecordSet,
        columns: Vec<ColumnDescriptor>,
        options: TableOptions,
    ) -> Result<Self, TableConfigError> {
        validate_columns(&columns)?;

        let mut orchestrator = Self {
            records,
            columns,
            resolved: Vec::new(),
            filter: FilterState::new(options.filter_fields.clone()),
            page: PageState::new(options.items_per_page),
            options,
            state: TableState::Idle,
            sort: None,
            field_cache: FieldSetCache::new(),
            filtered: Vec::new(),
            ordered: Vec::new(),
            pagination: None,
            recomputes: 0,
        };
        orchestrator.recompute();
        Ok(orchestrator)
    }

    pub fn builder() -> TableOrchestratorBuilder {
        TableOrchestratorBuilder::new()
    }

    /// Apply one external event
    pub fn handle(&mut self, event: TableEvent) -> Result<(), TableConfigError> {
        debug!(target: "table", "Handling {:?} in state {:?}", event, self.state);

        match event {
            TableEvent::DataChanged(records) => {
                if Arc::ptr_eq(&self.records, &records) {
                    trace!(target: "table", "Same record set, recomputing without reset");
                } else {
                    self.records = records;
                    self.filter.term.clear();
                    self.page.index = 0;
                    if !self.is_idle() {
                        // Indices must never outlive the record set they point into
                        self.refilter();
                        self.repaginate();
                    }
                }
                self.recompute();
            }
            TableEvent::ColumnsChanged(columns) => {
                validate_columns(&columns)?;
                self.columns = columns;
                if self.sort.is_some_and(|s| !self.is_sortable(s.column)) {
                    self.sort = None;
                }
                self.recompute();
            }
            TableEvent::TermChanged(term) => {
                self.filter.term = term;
                if self.is_idle() {
                    self.refilter();
                    self.page.index = 0;
                    self.repaginate();
                } else {
                    self.page.index = 0;
                }
            }
            TableEvent::PageChanged(page) => {
                let pages = total_pages(self.filtered.len(), self.page.size);
                if page == 0 || page > pages {
                    warn!(
                        target: "table",
                        "Ignoring page {} outside 1..={}",
                        page,
                        pages
                    );
                    return Ok(());
                }
                self.page.index = page - 1;
                if self.is_idle() {
                    self.repaginate();
                }
            }
            TableEvent::LoadingChanged(loading) => {
                self.state = if loading {
                    TableState::Loading
                } else {
                    TableState::Idle
                };
                self.recompute();
            }
            TableEvent::SortChanged(sort) => {
                if let Some(spec) = sort {
                    if !self.is_sortable(spec.column) {
                        debug!(target: "table", "Column {} is not sortable", spec.column);
                        return Ok(());
                    }
                }
                self.sort = sort;
                self.page.index = 0;
                if self.is_idle() {
                    self.reorder();
                    self.repaginate();
                }
            }
            TableEvent::PageSizeChanged(size) => {
                self.page.size = PageState::sanitize_size(size);
                self.page.index = 0;
                if self.is_idle() {
                    self.repaginate();
                }
            }
        }
        Ok(())
    }

    fn is_idle(&self) -> bool {
        self.state == TableState::Idle
    }

    fn is_sortable(&self, column: usize) -> bool {
        self.columns.get(column).is_some_and(|c| !c.sort_disabled)
    }

    /// Full pipeline; a no-op while loading
    fn recompute(&mut self) {
        if !self.is_idle() {
            trace!(target: "table", "Loading, recompute deferred");
            return;
        }
        self.refilter();
        self.resolved = resolve_column_widths(&self.columns);
        self.repaginate();
        self.recomputes += 1;
    }

    fn refilter(&mut self) {
        let fields = self.field_cache.resolve(&self.records, &self.filter.fields);
        let filtered = SearchFilter::filter_indices(&self.records, fields, &self.filter.term);
        self.filtered = filtered;
        self.reorder();
    }

    fn reorder(&mut self) {
        let view = DataView::new(self.records.clone()).with_rows(self.filtered.clone());
        self.ordered = match self.sort.and_then(|s| self.columns.get(s.column).map(|c| (c, s))) {
            Some((column, spec)) => view
                .sort_by(&column.accessor, spec.ascending)
                .visible_row_indices()
                .to_vec(),
            None => self.filtered.clone(),
        };
    }

    fn repaginate(&mut self) {
        let pages = total_pages(self.filtered.len(), self.page.size);
        if self.page.index >= pages {
            debug!(
                target: "table",
                "Page index {} past {} pages, moving to last page",
                self.page.index,
                pages
            );
            self.page.index = pages - 1;
        }

        self.pagination = if self.options.show_pagination && !self.filtered.is_empty() {
            Some(compute_window(
                self.filtered.len(),
                self.page.size,
                self.page.display_page(),
            ))
        } else {
            None
        };
    }

    fn page_view(&self) -> DataView {
        DataView::new(self.records.clone())
            .with_rows(self.ordered.clone())
            .with_limit(self.page.size, self.page.offset())
    }

    /// Records passing the search, in original order
    pub fn filtered_records(&self) -> Vec<Record> {
        self.filtered
            .iter()
            .filter_map(|&idx| self.records.get(idx).cloned())
            .collect()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// Records on the current page, sorted when a sort is active
    pub fn current_page_rows(&self) -> Vec<Record> {
        self.page_view().rows().cloned().collect()
    }

    pub fn pagination(&self) -> Option<&PaginationWindow> {
        self.pagination.as_ref()
    }

    pub fn resolved_columns(&self) -> &[ResolvedColumn] {
        &self.resolved
    }

    /// Project the current page for a rendering surface
    pub fn render(&self) -> TableRender {
        if !self.is_idle() {
            return TableRender::Loading;
        }

        let headers = self
            .resolved
            .iter()
            .enumerate()
            .map(|(idx, column)| ViewHeader {
                label: column.label(),
                align: column.header_align.or(column.align).unwrap_or(Align::Center),
                width: column.calculated_width,
                sortable: !column.sort_disabled,
                sorted: self
                    .sort
                    .filter(|s| s.column == idx)
                    .map(|s| s.ascending),
                min_width: column.min_width.clone(),
                max_width: column.max_width.clone(),
                style: column.style.clone(),
            })
            .collect();

        let view = self.page_view();
        let rows = view
            .row_indices()
            .iter()
            .filter_map(|&source_index| {
                let record = self.records.get(source_index)?;
                Some(ViewRow {
                    cells: self
                        .resolved
                        .iter()
                        .map(|column| ViewCell {
                            content: CellFormatter::format_record(column, record),
                            align: CellFormatter::text_align(column),
                            vertical_align: column
                                .vertical_align
                                .unwrap_or(self.options.vertical_align),
                            width: column.calculated_width,
                            min_width: column.min_width.clone(),
                            max_width: column.max_width.clone(),
                            style: column.style.clone(),
                        })
                        .collect(),
                    color: self.options.row_color.as_ref().and_then(|c| c.resolve(record)),
                    source_index,
                })
            })
            .collect();

        TableRender::Ready(TableView {
            headers,
            rows,
            pagination: self.pagination.clone(),
            filtered_count: self.filtered.len(),
            total_count: self.records.len(),
        })
    }

    /// Export payloads over every filtered record, whatever the current page
    pub fn build_export(&self) -> ExportBundle {
        ExportCoordinator::build_export(
            &self.columns,
            &self.filtered_records(),
            &self.options.export,
        )
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Number of full pipeline runs so far
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    /// Number of times the default search fields were derived
    pub fn field_derivations(&self) -> usize {
        self.field_cache.derivations()
    }
}

/// Builder pattern for creating the orchestrator with configuration
pub struct TableOrchestratorBuilder {
    records: RecordSet,
    columns: Vec<ColumnDescriptor>,
    options: TableOptions,
}

impl Default for TableOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            columns: Vec::new(),
            options: TableOptions::default(),
        }
    }

    pub fn with_records(mut self, records: RecordSet) -> Self {
        self.records = records;
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.options.items_per_page = items_per_page;
        self
    }

    pub fn with_filter_fields(mut self, fields: FilterFields) -> Self {
        self.options.filter_fields = fields;
        self
    }

    pub fn with_row_color(mut self, color: RowColor) -> Self {
        self.options.row_color = Some(color);
        self
    }

    pub fn build(self) -> Result<TableOrchestrator, TableConfigError> {
        TableOrchestrator::new(self.records, self.columns, self.options)
    }
}
