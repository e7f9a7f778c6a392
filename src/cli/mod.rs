//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod companies;
pub mod extract;

pub use companies::{handle_companies_command, CompaniesCommands};
pub use extract::{handle_extract_command, ExportFormat, ExtractArgs};

use std::path::PathBuf;

use crate::config::{EtlPaths, Settings};
use crate::directory::CsvCompanyDirectory;
use crate::error::EtlResult;

/// Load the company directory from an explicit file or the configured one
pub(crate) fn load_directory(
    paths: &EtlPaths,
    settings: &Settings,
    explicit: Option<PathBuf>,
) -> EtlResult<CsvCompanyDirectory> {
    let path = explicit.unwrap_or_else(|| settings.directory_path(paths));
    CsvCompanyDirectory::from_path(&path)
}
