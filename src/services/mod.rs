//! Service layer for ledger-etl
//!
//! The extraction pipeline, leaves first:
//!
//! - `accounts`: resolves a company's leaf accounts from the chart of accounts
//! - `ledger`: offset-paginated ledger retrieval for one date window
//! - `extraction`: one calendar month, fetched and normalized
//! - `consolidation`: every month from January through the end date
//! - `pipeline`: wires the above to a transport and the exporter

pub mod accounts;
pub mod consolidation;
pub mod extraction;
pub mod ledger;
pub mod pipeline;
pub mod progress;

pub use accounts::{AccountPlan, AccountPlanResolver};
pub use consolidation::{Consolidation, MonthReport, RangeConsolidator, RunSummary};
pub use extraction::{MonthExtraction, MonthStatus, MonthlyExtractor};
pub use ledger::{FetchStop, LedgerFetcher, LedgerPages};
pub use pipeline::{Pipeline, RunOutcome};
pub use progress::{CancelFlag, ChannelObserver, NoopObserver, ProgressObserver};
