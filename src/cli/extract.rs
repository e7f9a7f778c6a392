//! Ledger extraction command
//!
//! Resolves the company, runs the pipeline from January through the chosen
//! month, and writes the requested export files.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use tracing::info;

use super::load_directory;
use crate::config::{ApiToken, EtlPaths, Settings};
use crate::directory::CompanyDirectory;
use crate::display::{format_run_summary, format_written_files, ConsoleProgress};
use crate::error::{EtlError, EtlResult};
use crate::export::{write_files, ExportName, FileFormat};
use crate::models::month_end;
use crate::services::{Pipeline, RunOutcome};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// JSON array of records
    Json,
    /// Excel workbook
    Xlsx,
    /// Plain CSV
    Csv,
    /// JSON and Excel
    All,
}

impl ExportFormat {
    /// Files this choice produces
    pub fn file_formats(self) -> Vec<FileFormat> {
        match self {
            Self::Json => vec![FileFormat::Json],
            Self::Xlsx => vec![FileFormat::Xlsx],
            Self::Csv => vec![FileFormat::Csv],
            Self::All => vec![FileFormat::Json, FileFormat::Xlsx],
        }
    }
}

/// Arguments of the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Company name as it appears in the directory
    #[arg(short, long)]
    pub company: String,

    /// Company RUT; looked up in the directory when omitted
    #[arg(short, long)]
    pub rut: Option<String>,

    /// Fiscal year to extract
    #[arg(short, long, required_unless_present = "until")]
    pub year: Option<i32>,

    /// Last month to extract (1-12); January through this month is exported
    #[arg(short, long, required_unless_present = "until", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Explicit end date (YYYY-MM-DD) instead of --year/--month
    #[arg(long, conflicts_with_all = ["year", "month"])]
    pub until: Option<NaiveDate>,

    /// Files to write
    #[arg(short, long, value_enum, default_value = "all")]
    pub format: ExportFormat,

    /// Output directory (defaults to the configured one)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// API token (prompted for when not given)
    #[arg(long, env = "LEDGER_ETL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Company directory CSV (defaults to the configured file)
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
}

impl ExtractArgs {
    /// Last day of the extraction range
    pub fn end_date(&self) -> EtlResult<NaiveDate> {
        if let Some(until) = self.until {
            return Ok(until);
        }
        match (self.year, self.month) {
            (Some(year), Some(month)) => month_end(year, month),
            _ => Err(EtlError::InvalidDate(
                "either --until or both --year and --month are required".into(),
            )),
        }
    }
}

/// Handle the extract command
pub fn handle_extract_command(
    paths: &EtlPaths,
    settings: Settings,
    args: ExtractArgs,
) -> EtlResult<()> {
    let end_date = args.end_date()?;
    let company = args.company.trim().to_string();

    let rut = match args.rut.as_deref().map(str::trim) {
        Some(rut) if !rut.is_empty() => rut.to_string(),
        _ => {
            let directory = load_directory(paths, &settings, args.directory.clone())?;
            directory.resolve_company_tax_id(&company).map_err(|e| {
                if e.is_not_found() {
                    EtlError::Config(format!(
                        "No RUT found for company '{}'. Check the company name.",
                        company
                    ))
                } else {
                    e
                }
            })?
        }
    };

    let token = match args.token {
        Some(token) => ApiToken::new(token)?,
        None => ApiToken::prompt()?,
    };

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| settings.output_dir.clone())
        .unwrap_or_else(|| paths.exports_dir());

    info!(company = %company, rut = %rut, end = %end_date, "starting extraction");
    println!("Extracting {} ({}) through {}", company, rut, end_date);

    let pipeline = Pipeline::connect(settings, token)?;
    let outcome = pipeline.run(&rut, &company, end_date, &ConsoleProgress::new(), None)?;

    println!();
    print!("{}", format_run_summary(outcome.summary()));

    match outcome {
        RunOutcome::Exported {
            dataset, bundle, ..
        } => {
            let name = ExportName::for_range(&company, end_date);
            let written = write_files(
                &output_dir,
                &name,
                &dataset,
                &bundle,
                &args.format.file_formats(),
            )?;
            println!();
            println!("Exported {} records to:", dataset.len());
            print!("{}", format_written_files(&written));
        }
        RunOutcome::NoData(_) => {
            println!();
            println!("No data was generated to consolidate. Try a different period.");
        }
        RunOutcome::Cancelled(_) => {
            println!();
            println!("Extraction cancelled; nothing was written.");
        }
    }

    Ok(())
}
