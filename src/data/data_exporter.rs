//! Projection of the filtered record set into the three export payloads.
//!
//! The coordinator does no I/O. Writing payloads to disk is the job of
//! [`crate::data::export_writer`].

use crate::data::column::ColumnDescriptor;
use crate::data::column_layout::{resolve_refs, ResolvedColumn, TOTAL_WIDTH};
use crate::data::record::{DataValue, Record};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_FILE_BASE_NAME: &str = "Reporte de Datos";
pub const DEFAULT_SHEET_NAME: &str = "Datos";
/// Total spreadsheet width in character units
pub const DEFAULT_TOTAL_CHARS: f64 = 100.0;
pub const DEFAULT_DOCUMENT_MARGIN: f64 = 20.0;

/// Export orientation as configured on the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportOrientation {
    #[default]
    Horizontal,
    Vertical,
}

impl ExportOrientation {
    /// `"horizontal"` selects landscape, anything else portrait
    pub fn from_name(name: &str) -> Self {
        if name == "horizontal" {
            ExportOrientation::Horizontal
        } else {
            ExportOrientation::Vertical
        }
    }

    pub fn page_orientation(&self) -> PageOrientation {
        match self {
            ExportOrientation::Horizontal => PageOrientation::Landscape,
            ExportOrientation::Vertical => PageOrientation::Portrait,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Landscape,
    Portrait,
}

/// Paper size in millimetres (portrait width x height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    Tabloid,
    A4,
    Letter,
}

impl PageFormat {
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageFormat::Tabloid => (279.4, 431.8),
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

impl FromStr for PageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tabloid" => Ok(PageFormat::Tabloid),
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            other => Err(anyhow::anyhow!("Unknown page format '{}'", other)),
        }
    }
}

/// Page size and margin of the document sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub fn new(format: PageFormat, orientation: PageOrientation, margin: f64) -> Self {
        let (short, long) = format.dimensions();
        let (width, height) = match orientation {
            PageOrientation::Portrait => (short, long),
            PageOrientation::Landscape => (long, short),
        };
        Self {
            width,
            height,
            margin,
        }
    }

    /// Width left for the table between the side margins
    pub fn available_width(&self) -> f64 {
        self.width - self.margin * 2.0
    }
}

/// CSV header entry: display label and the row key it reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvHeader {
    pub label: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvPayload {
    pub file_name: String,
    pub headers: Vec<CsvHeader>,
    /// One object per record keyed by `CsvHeader::key`
    pub rows: Vec<Record>,
}

impl CsvPayload {
    /// Render as delimited text, header labels first
    pub fn to_csv_string(&self, quote_all: bool) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(if quote_all {
                csv::QuoteStyle::Always
            } else {
                csv::QuoteStyle::Necessary
            })
            .from_writer(Vec::new());

        writer.write_record(self.headers.iter().map(|h| h.label.as_str()))?;
        for row in &self.rows {
            writer.write_record(self.headers.iter().map(|h| {
                row.get(&h.key).map(|v| v.to_string()).unwrap_or_default()
            }))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV buffer: {}", e))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetPayload {
    pub file_name: String,
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<DataValue>>,
    /// Column widths in character units (`wch`)
    pub column_widths: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPayload {
    pub file_name: String,
    pub orientation: PageOrientation,
    pub geometry: PageGeometry,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<DataValue>>,
    /// Column widths in page units
    pub column_widths: Vec<f64>,
}

/// The three payloads built from one export request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    pub csv: CsvPayload,
    pub spreadsheet: SpreadsheetPayload,
    pub document: DocumentPayload,
}

impl ExportBundle {
    /// Row count of each sink, in csv/spreadsheet/document order
    pub fn row_counts(&self) -> [usize; 3] {
        [
            self.csv.rows.len(),
            self.spreadsheet.rows.len(),
            self.document.rows.len(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub file_base_name: String,
    pub orientation: ExportOrientation,
    pub sheet_name: String,
    pub total_chars: f64,
    pub page_format: PageFormat,
    pub margin: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_base_name: DEFAULT_FILE_BASE_NAME.to_string(),
            orientation: ExportOrientation::Horizontal,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            total_chars: DEFAULT_TOTAL_CHARS,
            page_format: PageFormat::Tabloid,
            margin: DEFAULT_DOCUMENT_MARGIN,
        }
    }
}

impl ExportOptions {
    pub fn new(file_base_name: impl Into<String>, orientation: ExportOrientation) -> Self {
        Self {
            file_base_name: file_base_name.into(),
            orientation,
            ..Self::default()
        }
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(
            self.page_format,
            self.orientation.page_orientation(),
            self.margin,
        )
    }
}

/// Builds export payloads from columns and the filtered records
pub struct ExportCoordinator;

impl ExportCoordinator {
    pub fn build_export(
        columns: &[ColumnDescriptor],
        records: &[Record],
        options: &ExportOptions,
    ) -> ExportBundle {
        let exportable: Vec<&ColumnDescriptor> = columns.iter().filter(|c| c.exportable).collect();
        let resolved = resolve_refs(exportable.iter().copied());

        let labels: Vec<String> = resolved.iter().map(|c| c.label()).collect();
        let keys: Vec<String> = resolved
            .iter()
            .enumerate()
            .map(|(idx, c)| c.id(idx))
            .collect();

        // Accessors run once per record; every sink reads this matrix
        let matrix: Vec<Vec<DataValue>> = records
            .iter()
            .map(|record| resolved.iter().map(|c| c.accessor.value(record)).collect())
            .collect();

        let csv_rows: Vec<Record> = matrix
            .iter()
            .map(|values| keys.iter().cloned().zip(values.iter().cloned()).collect())
            .collect();

        let geometry = options.geometry();
        let base = &options.file_base_name;

        debug!(
            target: "export",
            "Built export '{}': {} of {} columns, {} rows",
            base,
            resolved.len(),
            columns.len(),
            records.len()
        );

        ExportBundle {
            csv: CsvPayload {
                file_name: format!("{}.csv", base),
                headers: labels
                    .iter()
                    .zip(&keys)
                    .map(|(label, key)| CsvHeader {
                        label: label.clone(),
                        key: key.clone(),
                    })
                    .collect(),
                rows: csv_rows,
            },
            spreadsheet: SpreadsheetPayload {
                file_name: format!("{}.xlsx", base),
                sheet_name: options.sheet_name.clone(),
                headers: labels.clone(),
                rows: matrix.clone(),
                column_widths: Self::scaled_widths(&resolved, options.total_chars),
            },
            document: DocumentPayload {
                file_name: format!("{}.pdf", base),
                orientation: options.orientation.page_orientation(),
                geometry,
                headers: labels,
                rows: matrix,
                column_widths: Self::scaled_widths(&resolved, geometry.available_width()),
            },
        }
    }

    /// `calculated_width` as a share of `total`
    fn scaled_widths(columns: &[ResolvedColumn], total: f64) -> Vec<f64> {
        columns
            .iter()
            .map(|c| c.calculated_width * total / TOTAL_WIDTH)
            .collect()
    }
}

/// Build all payloads with default sink settings
pub fn build_export(
    columns: &[ColumnDescriptor],
    records: &[Record],
    file_base_name: &str,
    orientation: ExportOrientation,
) -> ExportBundle {
    ExportCoordinator::build_export(
        columns,
        records,
        &ExportOptions::new(file_base_name, orientation),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::field("Nombre", "name").with_width(40.0),
            ColumnDescriptor::field("Interno", "secret").with_export(false),
            ColumnDescriptor::computed("Doble", |r| match r.get("n") {
                Some(DataValue::Integer(n)) => DataValue::Integer(n * 2),
                _ => DataValue::Null,
            }),
        ]
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("name", "Ana").with("secret", "x").with("n", 2),
            Record::new().with("name", "Luis").with("secret", "y").with("n", 5),
        ]
    }

    #[test]
    fn test_exportable_subset_in_order() {
        let bundle = build_export(&columns(), &records(), "r", ExportOrientation::Horizontal);
        assert_eq!(bundle.spreadsheet.headers, vec!["Nombre", "Doble"]);
        assert_eq!(bundle.document.headers, vec!["Nombre", "Doble"]);
        let keys: Vec<&str> = bundle.csv.headers.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "custom_field_1"]);
    }

    #[test]
    fn test_computed_values_in_every_sink() {
        let bundle = build_export(&columns(), &records(), "r", ExportOrientation::Horizontal);
        assert_eq!(
            bundle.csv.rows[1].get("custom_field_1"),
            Some(&DataValue::Integer(10))
        );
        assert_eq!(bundle.spreadsheet.rows[1][1], DataValue::Integer(10));
        assert_eq!(bundle.document.rows[0][1], DataValue::Integer(4));
    }

    #[test]
    fn test_widths_over_exportable_subset() {
        let bundle = build_export(&columns(), &records(), "r", ExportOrientation::Horizontal);
        assert_eq!(bundle.spreadsheet.column_widths, vec![40.0, 60.0]);

        let available = 431.8 - 40.0;
        let widths = &bundle.document.column_widths;
        assert!((widths[0] - 0.4 * available).abs() < 1e-9);
        assert!((widths[1] - 0.6 * available).abs() < 1e-9);
    }

    #[test]
    fn test_orientation_and_file_names() {
        let bundle = build_export(&columns(), &[], "Ventas", ExportOrientation::Vertical);
        assert_eq!(bundle.csv.file_name, "Ventas.csv");
        assert_eq!(bundle.spreadsheet.file_name, "Ventas.xlsx");
        assert_eq!(bundle.document.file_name, "Ventas.pdf");
        assert_eq!(bundle.document.orientation, PageOrientation::Portrait);
        assert_eq!(bundle.document.geometry.width, 279.4);
        assert_eq!(bundle.row_counts(), [0, 0, 0]);
    }

    #[test]
    fn test_csv_text() {
        let bundle = build_export(&columns(), &records(), "r", ExportOrientation::Horizontal);
        let text = bundle.csv.to_csv_string(true).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(r#""Nombre","Doble""#));
        assert_eq!(lines.next(), Some(r#""Ana","4""#));

        let plain = bundle.csv.to_csv_string(false).unwrap();
        assert!(plain.starts_with("Nombre,Doble\n"));
    }

    #[test]
    fn test_orientation_names() {
        assert_eq!(
            ExportOrientation::from_name("horizontal"),
            ExportOrientation::Horizontal
        );
        assert_eq!(
            ExportOrientation::from_name("vertical"),
            ExportOrientation::Vertical
        );
        assert_eq!(ExportOrientation::from_name("other"), ExportOrientation::Vertical);
        assert_eq!("A4".parse::<PageFormat>().unwrap(), PageFormat::A4);
        assert!("a3".parse::<PageFormat>().is_err());
    }
}
