//! ledger-etl - monthly general-ledger extraction
//!
//! This library pulls a company's general ledger from the accounting API one
//! calendar month at a time, normalizes every entry into a flat record, and
//! renders the consolidated range as JSON and as a spreadsheet.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, settings and the API token
//! - `error`: Custom error types
//! - `client`: HTTP transport port, reqwest adapter and retry policy
//! - `models`: Raw API payloads, normalized records and month windows
//! - `services`: Account plan, ledger pagination, extraction and consolidation
//! - `export`: JSON, XLSX and CSV renderings plus file naming
//! - `directory`: Company name to RUT lookup
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_etl::config::{ApiToken, Settings};
//! use ledger_etl::services::{NoopObserver, Pipeline};
//!
//! let pipeline = Pipeline::connect(Settings::default(), ApiToken::new(token)?)?;
//! let outcome = pipeline.run("76543210", "Acme SA", end_date, &NoopObserver, None)?;
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod directory;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;

pub use error::{EtlError, EtlResult};
