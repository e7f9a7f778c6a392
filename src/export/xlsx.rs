//! Spreadsheet export
//!
//! One sheet, a bold frozen header row and one row per record. The amount
//! column is written as a number so it can be summed in the spreadsheet.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{EtlError, EtlResult};
use crate::models::{ConsolidatedDataset, COLUMNS};

/// Name of the single worksheet
pub const SHEET_NAME: &str = "Libro Mayor";

const AMOUNT_COLUMN: usize = 2;

/// Render the dataset as an in-memory XLSX workbook
pub fn to_xlsx_bytes(dataset: &ConsolidatedDataset) -> EtlResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (idx, record) in dataset.iter().enumerate() {
        let row = u32::try_from(idx + 1)
            .map_err(|_| EtlError::Export("Too many rows for a worksheet".into()))?;

        for (col, value) in record.to_row().iter().enumerate() {
            if col == AMOUNT_COLUMN {
                let amount = record.net_amount.to_f64().ok_or_else(|| {
                    EtlError::Export(format!("Amount out of range: {}", record.net_amount))
                })?;
                worksheet.write_number(row, col as u16, amount)?;
            } else {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}
