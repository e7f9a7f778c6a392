//! Export file naming
//!
//! `<Company>_<YYYY>-<MM>.<ext>` for a range that ends before December, and
//! `<Company>_Anual_<YYYY>.<ext>` for a range that covers the whole year.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Xlsx,
    Csv,
}

impl FileFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Base name shared by every file of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportName {
    stem: String,
}

impl ExportName {
    /// Name for a range running from January through `end_date`
    pub fn for_range(company_name: &str, end_date: NaiveDate) -> Self {
        let company = sanitize_company(company_name);
        let stem = if end_date.month() == 12 && end_date.day() == 31 {
            format!("{}_Anual_{}", company, end_date.year())
        } else {
            format!("{}_{}-{:02}", company, end_date.year(), end_date.month())
        };
        Self { stem }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Full file name for a format
    pub fn file_name(&self, format: FileFormat) -> String {
        format!("{}.{}", self.stem, format.extension())
    }
}

/// Spaces become underscores; path separators are dropped
fn sanitize_company(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
