//! CSV export
//!
//! Same header and column order as the spreadsheet.

use std::io::Write;

use crate::error::{EtlError, EtlResult};
use crate::models::{ConsolidatedDataset, COLUMNS};

/// Write the dataset as CSV with a header row
pub fn export_csv<W: Write>(dataset: &ConsolidatedDataset, writer: W) -> EtlResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(COLUMNS)
        .map_err(|e| EtlError::Export(e.to_string()))?;

    for record in dataset {
        csv_writer
            .write_record(record.to_row())
            .map_err(|e| EtlError::Export(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| EtlError::Export(e.to_string()))?;
    Ok(())
}

/// Render the dataset as CSV bytes
pub fn to_csv_bytes(dataset: &ConsolidatedDataset) -> EtlResult<Vec<u8>> {
    let mut buffer = Vec::new();
    export_csv(dataset, &mut buffer)?;
    Ok(buffer)
}
