//! JSON export
//!
//! The dataset is written as a plain array of records. Field names and order
//! follow [`crate::models::COLUMNS`].

use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{EtlError, EtlResult};
use crate::models::{ConsolidatedDataset, NormalizedRecord};

/// Write the dataset as JSON; pretty output is indented by four spaces
pub fn export_json<W: Write>(
    dataset: &ConsolidatedDataset,
    writer: &mut W,
    pretty: bool,
) -> EtlResult<()> {
    let result = if pretty {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(writer, formatter);
        dataset.serialize(&mut serializer)
    } else {
        serde_json::to_writer(writer, dataset)
    };

    result.map_err(|e| EtlError::Export(e.to_string()))
}

/// Render the dataset as UTF-8 JSON bytes
pub fn to_json_bytes(dataset: &ConsolidatedDataset, pretty: bool) -> EtlResult<Vec<u8>> {
    let mut buffer = Vec::new();
    export_json(dataset, &mut buffer, pretty)?;
    Ok(buffer)
}

/// Read records back from a JSON export
pub fn parse_json(bytes: &[u8]) -> EtlResult<Vec<NormalizedRecord>> {
    serde_json::from_slice(bytes).map_err(|e| EtlError::Json(e.to_string()))
}
