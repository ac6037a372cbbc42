use crate::data::column::{Activation, Align, ColumnDescriptor, FormatRule};
use crate::data::record::{DataValue, Record};
use crate::utils::date_format::format_date;
use crate::utils::number_format::{
    format_currency_cop, format_money_with_note, format_percentage, CURRENCY_FALLBACK,
    DEFAULT_PRECISION,
};
use std::fmt;

/// Values rendered with positive emphasis by the categorical rule
pub const POSITIVE_CATEGORIES: [&str; 2] = ["ingreso", "Desbloqueado"];

/// Emphasis class of a categorical cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    /// Suggested display color
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Positive => "#90EE90",
            Tone::Negative => "#FF6961",
        }
    }
}

/// What a cell displays, independent of the rendering surface
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// The value itself, left to the renderer
    Raw(DataValue),
    /// Formatted text
    Text(String),
    /// Emphasized text
    Emphasis { text: String, tone: Tone },
    /// A navigable link
    Link { route: String, text: String },
}

impl CellContent {
    pub fn text(&self) -> String {
        match self {
            CellContent::Raw(value) => value.to_string(),
            CellContent::Text(text)
            | CellContent::Emphasis { text, .. }
            | CellContent::Link { text, .. } => text.clone(),
        }
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Resolves which formatting rule applies to a cell
pub struct CellFormatter;

impl CellFormatter {
    /// Format `value` (read from `record`) for `column`. Never fails.
    pub fn format(column: &ColumnDescriptor, value: &DataValue, record: &Record) -> CellContent {
        let formatted = match &column.format_rule {
            FormatRule::None => None,
            FormatRule::Currency(activation) => {
                Self::gated(activation, value, record, DEFAULT_PRECISION, |p| {
                    CellContent::Text(format_currency_cop(value, p))
                })
            }
            FormatRule::Date(activation) => {
                Self::gated(activation, value, record, DEFAULT_PRECISION, |_| {
                    CellContent::Text(format_date(value))
                })
            }
            FormatRule::Percentage(activation) => {
                Self::gated(activation, value, record, DEFAULT_PRECISION, |p| {
                    match format_percentage(value, p) {
                        Some(text) => CellContent::Text(text),
                        None => CellContent::Raw(value.clone()),
                    }
                })
            }
            FormatRule::CompositeCurrency(activation) => {
                Self::gated(activation, value, record, 0, |p| {
                    CellContent::Text(format_money_with_note(value, p))
                })
            }
            FormatRule::Categorical => Some(CellContent::Emphasis {
                text: value.to_string(),
                tone: Self::categorize(value),
            }),
            FormatRule::Custom(render) => Some(render(value, record)),
        };

        formatted.unwrap_or_else(|| Self::render_default(column, value, record))
    }

    /// Read the column's value from the record and format it
    pub fn format_record(column: &ColumnDescriptor, record: &Record) -> CellContent {
        match column.accessor.lookup(record) {
            Some(value) => Self::format(column, &value, record),
            None => Self::format_missing(column, record),
        }
    }

    /// A field absent from the record. Currency shows its fallback where a
    /// present null would read as zero; every other rule sees null.
    fn format_missing(column: &ColumnDescriptor, record: &Record) -> CellContent {
        let value = DataValue::Null;
        if let FormatRule::Currency(activation) = &column.format_rule {
            let fallback = Self::gated(activation, &value, record, DEFAULT_PRECISION, |_| {
                CellContent::Text(CURRENCY_FALLBACK.to_string())
            });
            if let Some(content) = fallback {
                return content;
            }
        }
        Self::format(column, &value, record)
    }

    /// Explicit alignment wins; numeric rules default to the right
    pub fn text_align(column: &ColumnDescriptor) -> Align {
        if let Some(align) = column.align {
            return align;
        }
        if column.format_rule.is_numeric() {
            Align::Right
        } else {
            Align::Left
        }
    }

    pub fn categorize(value: &DataValue) -> Tone {
        match value.as_str() {
            Some(text) if POSITIVE_CATEGORIES.contains(&text) => Tone::Positive,
            _ => Tone::Negative,
        }
    }

    /// `None` when the rule is off, letting default rendering take over.
    /// A failing predicate shows the raw value.
    fn gated<F>(
        activation: &Activation,
        value: &DataValue,
        record: &Record,
        default_precision: u32,
        apply: F,
    ) -> Option<CellContent>
    where
        F: FnOnce(u32) -> CellContent,
    {
        match activation {
            Activation::Disabled => None,
            Activation::Enabled(precision) => Some(apply(precision.unwrap_or(default_precision))),
            Activation::Conditional(predicate, precision) => {
                if predicate(value, record) {
                    Some(apply(precision.unwrap_or(default_precision)))
                } else {
                    Some(CellContent::Raw(value.clone()))
                }
            }
        }
    }

    fn render_default(column: &ColumnDescriptor, value: &DataValue, record: &Record) -> CellContent {
        let Some(link) = &column.link else {
            return CellContent::Raw(value.clone());
        };

        let text = column
            .link_text
            .as_ref()
            .map(|t| t.resolve(record))
            .unwrap_or_else(|| value.to_string());

        match link.resolve(record) {
            Some(route) => CellContent::Link { route, text },
            None => CellContent::Text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::{LinkRule, LinkText};

    fn record() -> Record {
        Record::new()
            .with("saldo", 1500)
            .with("tipo", "ingreso")
            .with("id", 9)
    }

    #[test]
    fn test_currency_enabled() {
        let column = ColumnDescriptor::field("Saldo", "saldo")
            .with_format(FormatRule::Currency(Activation::always()));
        let out = CellFormatter::format_record(&column, &record());
        assert_eq!(out, CellContent::Text("$\u{a0}1.500,00".to_string()));
    }

    #[test]
    fn test_currency_precision_flag() {
        let column = ColumnDescriptor::field("Saldo", "saldo")
            .with_format(FormatRule::Currency(Activation::with_precision(0)));
        assert_eq!(
            CellFormatter::format_record(&column, &record()).text(),
            "$\u{a0}1.500"
        );
    }

    #[test]
    fn test_conditional_falsy_passes_value_through() {
        let column = ColumnDescriptor::field("Saldo", "saldo").with_format(FormatRule::Currency(
            Activation::when(|_, rec| rec.get("tipo") == Some(&DataValue::from("egreso"))),
        ));
        assert_eq!(
            CellFormatter::format_record(&column, &record()),
            CellContent::Raw(DataValue::Integer(1500))
        );
    }

    #[test]
    fn test_conditional_truthy_applies_formatter() {
        let column = ColumnDescriptor::field("Saldo", "saldo")
            .with_format(FormatRule::Currency(Activation::when(|v, _| !v.is_null())));
        assert_eq!(
            CellFormatter::format_record(&column, &record()).text(),
            "$\u{a0}1.500,00"
        );
    }

    #[test]
    fn test_currency_null_reads_as_zero_missing_falls_back() {
        let column = ColumnDescriptor::field("Saldo", "saldo")
            .with_format(FormatRule::Currency(Activation::always()));
        let null_saldo = Record::new().with("saldo", DataValue::Null);
        assert_eq!(
            CellFormatter::format_record(&column, &null_saldo).text(),
            "$\u{a0}0,00"
        );
        assert_eq!(
            CellFormatter::format_record(&column, &Record::new().with("otro", 1)).text(),
            "0 COP"
        );
    }

    #[test]
    fn test_percentage_non_numeric_unchanged() {
        let column =
            ColumnDescriptor::field("Tasa", "tasa").with_format(FormatRule::Percentage(Activation::always()));
        let rec = Record::new().with("tasa", "n/a");
        assert_eq!(
            CellFormatter::format_record(&column, &rec),
            CellContent::Raw(DataValue::from("n/a"))
        );
    }

    #[test]
    fn test_categorical_tones() {
        assert_eq!(CellFormatter::categorize(&DataValue::from("ingreso")), Tone::Positive);
        assert_eq!(
            CellFormatter::categorize(&DataValue::from("Desbloqueado")),
            Tone::Positive
        );
        assert_eq!(CellFormatter::categorize(&DataValue::from("egreso")), Tone::Negative);
        assert_eq!(CellFormatter::categorize(&DataValue::from("Ingreso")), Tone::Negative);
    }

    #[test]
    fn test_custom_renderer() {
        let column = ColumnDescriptor::field("Tipo", "tipo").with_format(FormatRule::custom(
            |value, _| CellContent::Text(format!("<{}>", value)),
        ));
        assert_eq!(CellFormatter::format_record(&column, &record()).text(), "<ingreso>");
    }

    #[test]
    fn test_default_link_rendering() {
        let column = ColumnDescriptor::field("Id", "id")
            .with_link(LinkRule::Field {
                field: "id".to_string(),
                prefix: "/detalle/".to_string(),
                suffix: String::new(),
            })
            .with_link_text(LinkText::Static("Ver".to_string()));
        assert_eq!(
            CellFormatter::format_record(&column, &record()),
            CellContent::Link {
                route: "/detalle/9".to_string(),
                text: "Ver".to_string()
            }
        );
    }

    #[test]
    fn test_alignment_defaults() {
        let currency = ColumnDescriptor::field("S", "saldo")
            .with_format(FormatRule::Currency(Activation::always()));
        let plain = ColumnDescriptor::field("N", "name");
        let explicit = ColumnDescriptor::field("S", "saldo")
            .with_format(FormatRule::Percentage(Activation::always()))
            .with_align(Align::Center);
        assert_eq!(CellFormatter::text_align(&currency), Align::Right);
        assert_eq!(CellFormatter::text_align(&plain), Align::Left);
        assert_eq!(CellFormatter::text_align(&explicit), Align::Center);
    }
}
