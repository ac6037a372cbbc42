//! Declarative table definitions, loaded from TOML or JSON.
//!
//! ```toml
//! filters = ["name", "city"]
//!
//! [[columns]]
//! header = "Saldo"
//! accessor = "saldo"
//! width_percentage = 20
//! format = { kind = "currency", precision = 0 }
//!
//! [[columns]]
//! header = "Detalle"
//! accessor = "id"
//! link = { field = "id", prefix = "/detalle/" }
//! link_text = "Ver"
//! ```

use crate::data::column::{
    validate_columns, Activation, Align, ColumnDescriptor, FormatRule, LinkRule, LinkText,
    VerticalAlign,
};
use crate::data::search_filter::FilterFields;
use crate::error::TableConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDefinition {
    pub title: Option<String>,
    /// Search fields; absent or empty searches every field
    pub filters: Option<Vec<String>>,
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub header: String,
    /// Field name to read
    pub accessor: String,
    pub width_percentage: Option<f64>,
    pub align: Option<Align>,
    pub header_align: Option<Align>,
    pub vertical_align: Option<VerticalAlign>,
    pub export: bool,
    pub format: Option<FormatSpec>,
    pub sort_disabled: bool,
    pub min_width: Option<String>,
    pub max_width: Option<String>,
    pub style: BTreeMap<String, String>,
    pub link: Option<LinkSpec>,
    pub link_text: Option<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            header: String::new(),
            accessor: String::new(),
            width_percentage: None,
            align: None,
            header_align: None,
            vertical_align: None,
            export: true,
            format: None,
            sort_disabled: false,
            min_width: None,
            max_width: None,
            style: BTreeMap::new(),
            link: None,
            link_text: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatSpec {
    Currency {
        #[serde(default)]
        precision: Option<u32>,
    },
    Date,
    Percentage {
        #[serde(default)]
        precision: Option<u32>,
    },
    CompositeCurrency {
        #[serde(default)]
        precision: Option<u32>,
    },
    Categorical,
}

impl FormatSpec {
    pub fn to_rule(&self) -> FormatRule {
        match self {
            FormatSpec::Currency { precision } => FormatRule::Currency(Activation::Enabled(*precision)),
            FormatSpec::Date => FormatRule::Date(Activation::always()),
            FormatSpec::Percentage { precision } => {
                FormatRule::Percentage(Activation::Enabled(*precision))
            }
            FormatSpec::CompositeCurrency { precision } => {
                FormatRule::CompositeCurrency(Activation::Enabled(*precision))
            }
            FormatSpec::Categorical => FormatRule::Categorical,
        }
    }
}

/// A fixed route, or one built from a record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkSpec {
    Route(String),
    Field {
        field: String,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
}

impl LinkSpec {
    pub fn to_rule(&self) -> LinkRule {
        match self {
            LinkSpec::Route(route) => LinkRule::Static(route.clone()),
            LinkSpec::Field {
                field,
                prefix,
                suffix,
            } => LinkRule::Field {
                field: field.clone(),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            },
        }
    }
}

impl ColumnConfig {
    pub fn to_descriptor(&self) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::field(self.header.as_str(), self.accessor.as_str());
        column.width_percentage = self.width_percentage;
        column.align = self.align;
        column.header_align = self.header_align;
        column.vertical_align = self.vertical_align;
        column.exportable = self.export;
        column.format_rule = self.format.as_ref().map(FormatSpec::to_rule).unwrap_or_default();
        column.sort_disabled = self.sort_disabled;
        column.min_width = self.min_width.clone();
        column.max_width = self.max_width.clone();
        column.style = self.style.clone();
        column.link = self.link.as_ref().map(LinkSpec::to_rule);
        column.link_text = self.link_text.clone().map(LinkText::Static);
        column
    }
}

impl TableDefinition {
    /// Load from a file; `.json` is read as JSON, anything else as TOML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| TableConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let definition = if is_json {
            Self::from_json_str(&contents).map_err(|e| TableConfigError::parse(path, e))?
        } else {
            Self::from_toml_str(&contents).map_err(|e| TableConfigError::parse(path, e))?
        };

        debug!(
            target: "table",
            "Loaded table definition {} with {} columns",
            path.display(),
            definition.columns.len()
        );
        Ok(definition)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Validated column descriptors, in declared order
    pub fn build_columns(&self) -> Result<Vec<ColumnDescriptor>, TableConfigError> {
        let columns: Vec<ColumnDescriptor> =
            self.columns.iter().map(ColumnConfig::to_descriptor).collect();
        validate_columns(&columns)?;
        Ok(columns)
    }

    pub fn filter_fields(&self) -> Result<FilterFields, TableConfigError> {
        if let Some(fields) = &self.filters {
            if let Some(index) = fields.iter().position(|f| f.trim().is_empty()) {
                return Err(TableConfigError::EmptyFilterField { index });
            }
        }
        Ok(FilterFields::from_list(self.filters.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"
        filters = ["name"]

        [[columns]]
        header = "Nombre"
        accessor = "name"
        width_percentage = 30.0

        [[columns]]
        header = "Saldo"
        accessor = "saldo"
        format = { kind = "currency", precision = 0 }
        align = "right"

        [[columns]]
        header = "Ver"
        accessor = "id"
        export = false
        link = { field = "id", prefix = "/detalle/" }
        link_text = "Abrir"
    "#;

    #[test]
    fn test_toml_definition() {
        let definition = TableDefinition::from_toml_str(DEFINITION).unwrap();
        let columns = definition.build_columns().unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].width_percentage, Some(30.0));
        assert!(matches!(
            columns[1].format_rule,
            FormatRule::Currency(Activation::Enabled(Some(0)))
        ));
        assert_eq!(columns[1].align, Some(Align::Right));
        assert!(!columns[2].exportable);
        assert!(matches!(columns[2].link, Some(LinkRule::Field { .. })));
        assert_eq!(
            definition.filter_fields().unwrap(),
            FilterFields::Only(vec!["name".to_string()])
        );
    }

    #[test]
    fn test_format_kinds() {
        let spec: FormatSpec = serde_json::from_str(r#"{"kind":"composite_currency"}"#).unwrap();
        assert_eq!(spec, FormatSpec::CompositeCurrency { precision: None });
        let spec: FormatSpec = serde_json::from_str(r#"{"kind":"date"}"#).unwrap();
        assert_eq!(spec, FormatSpec::Date);
    }

    #[test]
    fn test_route_link() {
        let spec: LinkSpec = serde_json::from_str(r#""/inicio""#).unwrap();
        assert_eq!(spec, LinkSpec::Route("/inicio".to_string()));
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let definition = TableDefinition::from_toml_str(
            r#"
            [[columns]]
            accessor = "name"
            "#,
        )
        .unwrap();
        assert!(matches!(
            definition.build_columns(),
            Err(TableConfigError::MissingHeader { index: 0 })
        ));
    }

    #[test]
    fn test_blank_filter_field_is_rejected() {
        let definition = TableDefinition {
            filters: Some(vec!["name".to_string(), " ".to_string()]),
            ..TableDefinition::default()
        };
        assert!(matches!(
            definition.filter_fields(),
            Err(TableConfigError::EmptyFilterField { index: 1 })
        ));
    }
}
