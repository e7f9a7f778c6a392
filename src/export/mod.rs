//! Export module for ledger-etl
//!
//! Renders a consolidated dataset as:
//! - JSON: an array of records with the canonical field names
//! - XLSX: a single-sheet workbook, one row per record
//! - CSV: the same columns as plain text
//!
//! Every format is rendered from the in-memory dataset, never from another
//! format's output.

pub mod csv;
pub mod json;
pub mod naming;
pub mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{EtlError, EtlResult};
use crate::models::ConsolidatedDataset;

pub use self::csv::{export_csv, to_csv_bytes};
pub use json::{export_json, parse_json, to_json_bytes};
pub use naming::{ExportName, FileFormat};
pub use xlsx::to_xlsx_bytes;

/// JSON and spreadsheet renderings of one dataset
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub json: Vec<u8>,
    pub xlsx: Vec<u8>,
}

/// Render the dataset as pretty JSON and as a workbook
pub fn export(dataset: &ConsolidatedDataset) -> EtlResult<ExportBundle> {
    export_with(dataset, true)
}

/// Render the dataset, choosing JSON indentation
pub fn export_with(dataset: &ConsolidatedDataset, pretty_json: bool) -> EtlResult<ExportBundle> {
    Ok(ExportBundle {
        json: to_json_bytes(dataset, pretty_json)?,
        xlsx: to_xlsx_bytes(dataset)?,
    })
}

/// Write the requested formats into `dir`, returning the written paths
///
/// CSV is rendered from the dataset on demand; JSON and XLSX come from the
/// bundle.
pub fn write_files(
    dir: &Path,
    name: &ExportName,
    dataset: &ConsolidatedDataset,
    bundle: &ExportBundle,
    formats: &[FileFormat],
) -> EtlResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| {
        EtlError::Export(format!(
            "Failed to create output directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(name.file_name(*format));
        let bytes = match format {
            FileFormat::Json => bundle.json.clone(),
            FileFormat::Xlsx => bundle.xlsx.clone(),
            FileFormat::Csv => to_csv_bytes(dataset)?,
        };

        fs::write(&path, bytes).map_err(|e| {
            EtlError::Export(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "export written");
        written.push(path);
    }

    Ok(written)
}
