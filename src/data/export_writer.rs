use crate::data::data_exporter::{DocumentPayload, ExportBundle, SpreadsheetPayload};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Turns a spreadsheet payload into a file
pub trait SpreadsheetEncoder {
    /// Write `payload` into `dir`, returning the file written
    fn encode(&self, payload: &SpreadsheetPayload, dir: &Path) -> Result<PathBuf>;
}

/// Turns a paginated document payload into a file
pub trait DocumentEncoder {
    fn encode(&self, payload: &DocumentPayload, dir: &Path) -> Result<PathBuf>;
}

/// Writes payloads as JSON manifests (`<name>.json`) for an external
/// binary encoder to pick up
pub struct JsonManifestEncoder;

impl JsonManifestEncoder {
    fn write<T: serde::Serialize>(value: &T, dir: &Path, file_name: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}.json", file_name));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        writer.flush()?;
        Ok(path)
    }
}

impl SpreadsheetEncoder for JsonManifestEncoder {
    fn encode(&self, payload: &SpreadsheetPayload, dir: &Path) -> Result<PathBuf> {
        Self::write(payload, dir, &payload.file_name)
    }
}

impl DocumentEncoder for JsonManifestEncoder {
    fn encode(&self, payload: &DocumentPayload, dir: &Path) -> Result<PathBuf> {
        Self::write(payload, dir, &payload.file_name)
    }
}

/// Which artifacts to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTargets {
    pub csv: bool,
    pub spreadsheet: bool,
    pub document: bool,
}

impl Default for ExportTargets {
    fn default() -> Self {
        Self {
            csv: true,
            spreadsheet: true,
            document: true,
        }
    }
}

impl ExportTargets {
    pub fn any(&self) -> bool {
        self.csv || self.spreadsheet || self.document
    }
}

/// Saves an [`ExportBundle`] to a directory
pub struct ExportWriter {
    dir: PathBuf,
    targets: ExportTargets,
    quote_all: bool,
    spreadsheet_encoder: Box<dyn SpreadsheetEncoder>,
    document_encoder: Box<dyn DocumentEncoder>,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            targets: ExportTargets::default(),
            quote_all: true,
            spreadsheet_encoder: Box::new(JsonManifestEncoder),
            document_encoder: Box::new(JsonManifestEncoder),
        }
    }

    pub fn with_targets(mut self, targets: ExportTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_quote_all(mut self, quote_all: bool) -> Self {
        self.quote_all = quote_all;
        self
    }

    pub fn with_spreadsheet_encoder(mut self, encoder: Box<dyn SpreadsheetEncoder>) -> Self {
        self.spreadsheet_encoder = encoder;
        self
    }

    pub fn with_document_encoder(mut self, encoder: Box<dyn DocumentEncoder>) -> Self {
        self.document_encoder = encoder;
        self
    }

    /// Write every enabled artifact, returning the paths written
    pub fn write_all(&self, bundle: &ExportBundle) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        if !self.targets.any() {
            debug!(target: "export", "All export targets disabled, nothing written");
            return Ok(written);
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export dir {}", self.dir.display()))?;

        if self.targets.csv {
            let path = self.dir.join(&bundle.csv.file_name);
            let text = bundle.csv.to_csv_string(self.quote_all)?;
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            written.push(path);
        }
        if self.targets.spreadsheet {
            written.push(
                self.spreadsheet_encoder
                    .encode(&bundle.spreadsheet, &self.dir)?,
            );
        }
        if self.targets.document {
            written.push(self.document_encoder.encode(&bundle.document, &self.dir)?);
        }

        info!(
            target: "export",
            "Exported {} rows to {} file(s) in {}",
            bundle.csv.rows.len(),
            written.len(),
            self.dir.display()
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::ColumnDescriptor;
    use crate::data::data_exporter::{build_export, ExportOrientation};
    use crate::data::record::Record;
    use tempfile::TempDir;

    fn bundle() -> ExportBundle {
        let columns = vec![ColumnDescriptor::field("Nombre", "name")];
        let records = vec![Record::new().with("name", "Ana, María")];
        build_export(&columns, &records, "Reporte", ExportOrientation::Horizontal)
    }

    #[test]
    fn test_writes_all_targets() {
        let dir = TempDir::new().unwrap();
        let paths = ExportWriter::new(dir.path()).write_all(&bundle()).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Reporte.csv", "Reporte.xlsx.json", "Reporte.pdf.json"]);

        let csv = fs::read_to_string(dir.path().join("Reporte.csv")).unwrap();
        assert_eq!(csv, "\"Nombre\"\n\"Ana, María\"\n");
    }

    #[test]
    fn test_disabled_targets_write_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let targets = ExportTargets {
            csv: false,
            spreadsheet: false,
            document: false,
        };
        let paths = ExportWriter::new(&out)
            .with_targets(targets)
            .write_all(&bundle())
            .unwrap();
        assert!(paths.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn test_custom_encoder() {
        struct Counting;
        impl SpreadsheetEncoder for Counting {
            fn encode(&self, payload: &SpreadsheetPayload, dir: &Path) -> Result<PathBuf> {
                let path = dir.join(&payload.file_name);
                fs::write(&path, payload.rows.len().to_string())?;
                Ok(path)
            }
        }

        let dir = TempDir::new().unwrap();
        let targets = ExportTargets {
            csv: false,
            spreadsheet: true,
            document: false,
        };
        ExportWriter::new(dir.path())
            .with_targets(targets)
            .with_spreadsheet_encoder(Box::new(Counting))
            .write_all(&bundle())
            .unwrap();
        let body = fs::read_to_string(dir.path().join("Reporte.xlsx")).unwrap();
        assert_eq!(body, "1");
    }
}
