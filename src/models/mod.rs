//! Data models for ledger-etl
//!
//! - `raw`: untrusted payloads as the accounting API returns them
//! - `record`: the canonical normalized ledger record
//! - `month`: calendar-month windows the extraction iterates over
//! - `dataset`: the consolidated, insertion-ordered record collection

pub mod dataset;
pub mod month;
pub mod raw;
pub mod record;

pub use dataset::ConsolidatedDataset;
pub use month::{month_end, month_windows, MonthWindow};
pub use raw::{AccountPlanItem, ItemsEnvelope, RawLedgerEntry};
pub use record::{EntryType, NormalizeOptions, NormalizedRecord, COLUMNS};
