//! Display formatting for terminal output
//!
//! Renders run summaries and company listings, and reports progress while a
//! run is in flight.

pub mod companies;
pub mod progress;
pub mod summary;

pub use companies::format_company_list;
pub use progress::ConsoleProgress;
pub use summary::{format_run_summary, format_written_files};
