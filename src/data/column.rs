use crate::data::cell_formatter::CellContent;
use crate::data::record::{DataValue, Record};
use crate::error::TableConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Prefix for the synthetic key of columns backed by an accessor function
pub const CUSTOM_FIELD_PREFIX: &str = "custom_field_";

pub type ComputedFn = Arc<dyn Fn(&Record) -> DataValue + Send + Sync>;
pub type Predicate = Arc<dyn Fn(&DataValue, &Record) -> bool + Send + Sync>;
pub type CellRenderFn = Arc<dyn Fn(&DataValue, &Record) -> CellContent + Send + Sync>;
pub type RouteFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// How a column reads its value from a record
#[derive(Clone)]
pub enum Accessor {
    /// Value of a named field
    Field(String),
    /// Value derived from the whole record; must be pure
    Computed(ComputedFn),
}

impl Accessor {
    pub fn field(name: impl Into<String>) -> Self {
        Accessor::Field(name.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Record) -> DataValue + Send + Sync + 'static,
    {
        Accessor::Computed(Arc::new(f))
    }

    /// Extract the value; `None` when a named field is absent
    pub fn lookup(&self, record: &Record) -> Option<DataValue> {
        match self {
            Accessor::Field(name) => record.get(name).cloned(),
            Accessor::Computed(f) => Some(f(record)),
        }
    }

    /// Extract the value; missing fields read as null
    pub fn value(&self, record: &Record) -> DataValue {
        self.lookup(record).unwrap_or(DataValue::Null)
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Accessor::Field(name) => Some(name),
            Accessor::Computed(_) => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Accessor::Computed(_))
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Column header label
#[derive(Clone)]
pub enum Header {
    Text(String),
    /// Produced on demand; takes no input
    Computed(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Header {
    pub fn label(&self) -> String {
        match self {
            Header::Text(text) => text.clone(),
            Header::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Header::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for Header {
    fn from(value: &str) -> Self {
        Header::Text(value.to_string())
    }
}

impl From<String> for Header {
    fn from(value: String) -> Self {
        Header::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Whether a formatter applies, and at which precision
#[derive(Clone)]
pub enum Activation {
    Disabled,
    /// Always applies; `None` uses the formatter's default precision
    Enabled(Option<u32>),
    /// Applies only when the predicate holds for `(value, record)`;
    /// otherwise the raw value is shown
    Conditional(Predicate, Option<u32>),
}

impl Activation {
    pub fn always() -> Self {
        Activation::Enabled(None)
    }

    pub fn with_precision(precision: u32) -> Self {
        Activation::Enabled(Some(precision))
    }

    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&DataValue, &Record) -> bool + Send + Sync + 'static,
    {
        Activation::Conditional(Arc::new(predicate), None)
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Activation::Disabled)
    }

    pub fn precision(&self, default: u32) -> u32 {
        match self {
            Activation::Disabled => default,
            Activation::Enabled(p) | Activation::Conditional(_, p) => p.unwrap_or(default),
        }
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Disabled => f.write_str("Disabled"),
            Activation::Enabled(p) => f.debug_tuple("Enabled").field(p).finish(),
            Activation::Conditional(_, p) => write!(f, "Conditional(.., {:?})", p),
        }
    }
}

/// Per-column value formatting
#[derive(Clone, Default)]
pub enum FormatRule {
    #[default]
    None,
    Currency(Activation),
    Date(Activation),
    Percentage(Activation),
    /// `"amount-description"` strings
    CompositeCurrency(Activation),
    /// Two-way positive/negative emphasis
    Categorical,
    Custom(CellRenderFn),
}

impl FormatRule {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&DataValue, &Record) -> CellContent + Send + Sync + 'static,
    {
        FormatRule::Custom(Arc::new(f))
    }

    /// Rules whose output is numeric and reads best right-aligned
    pub fn is_numeric(&self) -> bool {
        match self {
            FormatRule::Currency(a)
            | FormatRule::Percentage(a)
            | FormatRule::CompositeCurrency(a) => a.is_enabled(),
            _ => false,
        }
    }
}

impl fmt::Debug for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatRule::None => f.write_str("None"),
            FormatRule::Currency(a) => f.debug_tuple("Currency").field(a).finish(),
            FormatRule::Date(a) => f.debug_tuple("Date").field(a).finish(),
            FormatRule::Percentage(a) => f.debug_tuple("Percentage").field(a).finish(),
            FormatRule::CompositeCurrency(a) => {
                f.debug_tuple("CompositeCurrency").field(a).finish()
            }
            FormatRule::Categorical => f.write_str("Categorical"),
            FormatRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Where a cell links to
#[derive(Clone)]
pub enum LinkRule {
    Static(String),
    Computed(RouteFn),
    /// `prefix + record[field] + suffix`
    Field {
        field: String,
        prefix: String,
        suffix: String,
    },
}

impl LinkRule {
    /// Route for this record; `None` when it resolves to nothing
    pub fn resolve(&self, record: &Record) -> Option<String> {
        let route = match self {
            LinkRule::Static(route) => route.clone(),
            LinkRule::Computed(f) => f(record),
            LinkRule::Field {
                field,
                prefix,
                suffix,
            } => {
                let base = record.get(field).and_then(DataValue::as_text)?;
                format!("{}{}{}", prefix, base, suffix)
            }
        };
        (!route.is_empty()).then_some(route)
    }
}

impl fmt::Debug for LinkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkRule::Static(route) => f.debug_tuple("Static").field(route).finish(),
            LinkRule::Computed(_) => f.write_str("Computed(..)"),
            LinkRule::Field {
                field,
                prefix,
                suffix,
            } => f
                .debug_struct("Field")
                .field("field", field)
                .field("prefix", prefix)
                .field("suffix", suffix)
                .finish(),
        }
    }
}

/// Text shown for a link instead of the cell value
#[derive(Clone)]
pub enum LinkText {
    Static(String),
    Computed(RouteFn),
}

impl LinkText {
    pub fn resolve(&self, record: &Record) -> String {
        match self {
            LinkText::Static(text) => text.clone(),
            LinkText::Computed(f) => f(record),
        }
    }
}

impl fmt::Debug for LinkText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkText::Static(text) => f.debug_tuple("Static").field(text).finish(),
            LinkText::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Configuration of one output column
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub header: Header,
    pub accessor: Accessor,
    /// Explicit share of the total width, 0-100
    pub width_percentage: Option<f64>,
    pub align: Option<Align>,
    pub header_align: Option<Align>,
    pub vertical_align: Option<VerticalAlign>,
    pub exportable: bool,
    pub format_rule: FormatRule,
    pub sort_disabled: bool,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
    pub style: BTreeMap<String, String>,
    pub link: Option<LinkRule>,
    pub link_text: Option<LinkText>,
}

impl ColumnDescriptor {
    pub fn new(header: impl Into<Header>, accessor: Accessor) -> Self {
        Self {
            header: header.into(),
            accessor,
            width_percentage: None,
            align: None,
            header_align: None,
            vertical_align: None,
            exportable: true,
            format_rule: FormatRule::None,
            sort_disabled: false,
            min_width: None,
            max_width: None,
            style: BTreeMap::new(),
            link: None,
            link_text: None,
        }
    }

    /// Column reading a named field
    pub fn field(header: impl Into<Header>, name: impl Into<String>) -> Self {
        Self::new(header, Accessor::field(name))
    }

    /// Column computed from the whole record
    pub fn computed<F>(header: impl Into<Header>, f: F) -> Self
    where
        F: Fn(&Record) -> DataValue + Send + Sync + 'static,
    {
        Self::new(header, Accessor::computed(f))
    }

    pub fn with_width(mut self, percentage: f64) -> Self {
        self.width_percentage = Some(percentage);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn with_header_align(mut self, align: Align) -> Self {
        self.header_align = Some(align);
        self
    }

    pub fn with_vertical_align(mut self, align: VerticalAlign) -> Self {
        self.vertical_align = Some(align);
        self
    }

    pub fn with_export(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    pub fn with_format(mut self, rule: FormatRule) -> Self {
        self.format_rule = rule;
        self
    }

    pub fn without_sort(mut self) -> Self {
        self.sort_disabled = true;
        self
    }

    pub fn with_min_width(mut self, width: impl Into<String>) -> Self {
        self.min_width = Some(width.into());
        self
    }

    pub fn with_max_width(mut self, width: impl Into<String>) -> Self {
        self.max_width = Some(width.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    pub fn with_link(mut self, link: LinkRule) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_link_text(mut self, text: LinkText) -> Self {
        self.link_text = Some(text);
        self
    }

    /// Stable identifier: the field name, or `custom_field_<position>` for
    /// computed columns
    pub fn id(&self, position: usize) -> String {
        match &self.accessor {
            Accessor::Field(name) => name.clone(),
            Accessor::Computed(_) => format!("{}{}", CUSTOM_FIELD_PREFIX, position),
        }
    }

    /// Explicit width that takes part in layout. A zero width counts as unspecified.
    pub fn explicit_width(&self) -> Option<f64> {
        self.width_percentage.filter(|w| *w != 0.0 && !w.is_nan())
    }

    pub fn label(&self) -> String {
        self.header.label()
    }

    /// Reject columns that cannot be rendered
    pub fn validate(&self, index: usize) -> Result<(), TableConfigError> {
        if let Header::Text(text) = &self.header {
            if text.trim().is_empty() {
                return Err(TableConfigError::MissingHeader { index });
            }
        }
        if let Accessor::Field(name) = &self.accessor {
            if name.trim().is_empty() {
                return Err(TableConfigError::MissingAccessor { index });
            }
        }
        if let Some(width) = self.width_percentage {
            if width.is_nan() || !(0.0..=100.0).contains(&width) {
                return Err(TableConfigError::InvalidWidth { index, width });
            }
        }
        Ok(())
    }
}

/// Validate every column of a table
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<(), TableConfigError> {
    columns
        .iter()
        .enumerate()
        .try_for_each(|(idx, column)| column.validate(idx))
}
