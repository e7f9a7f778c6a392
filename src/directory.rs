//! Company directory
//!
//! Maps company names to tax identifiers (RUT without the check-digit dash).
//! The directory is maintained as a spreadsheet; this module reads its CSV
//! export.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{EtlError, EtlResult};

/// Default header of the tax identifier column
pub const TAX_ID_HEADER: &str = "Rut sin guión";

/// Default header of the company name column
pub const NAME_HEADER: &str = "Empresa Accountfy";

/// Lookup and enumeration of known companies
pub trait CompanyDirectory {
    /// Tax identifier for a company name
    fn resolve_company_tax_id(&self, company_name: &str) -> EtlResult<String>;

    /// Company name registered for a tax identifier
    fn company_name_for(&self, tax_id: &str) -> EtlResult<String>;

    /// Every company name, sorted, without duplicates
    fn list_company_names(&self) -> Vec<String>;
}

/// Header names of the two columns the directory needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryColumns {
    pub tax_id: String,
    pub name: String,
}

impl Default for DirectoryColumns {
    fn default() -> Self {
        Self {
            tax_id: TAX_ID_HEADER.to_string(),
            name: NAME_HEADER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct DirectoryRow {
    name: String,
    tax_id: String,
}

/// Directory backed by a CSV export of the companies sheet
#[derive(Debug, Clone, Default)]
pub struct CsvCompanyDirectory {
    rows: Vec<DirectoryRow>,
    by_name: HashMap<String, usize>,
}

impl CsvCompanyDirectory {
    /// Load the directory from a CSV file with the default headers
    pub fn from_path(path: &Path) -> EtlResult<Self> {
        let file = File::open(path).map_err(|e| {
            EtlError::Directory(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// Load the directory from any CSV source with the default headers
    pub fn from_reader<R: Read>(reader: R) -> EtlResult<Self> {
        Self::from_reader_with(reader, &DirectoryColumns::default())
    }

    /// Load the directory using custom column headers
    pub fn from_reader_with<R: Read>(reader: R, columns: &DirectoryColumns) -> EtlResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader.headers()?.clone();
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
                .ok_or_else(|| EtlError::Directory(format!("Missing column '{}'", wanted)))
        };
        let tax_idx = find(&columns.tax_id)?;
        let name_idx = find(&columns.name)?;

        let mut directory = Self::default();
        for record in reader.records() {
            let record = record?;
            let name = record.get(name_idx).unwrap_or("").trim();
            let tax_id = record.get(tax_idx).unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }

            // First row wins when a name repeats
            let key = name.to_lowercase();
            if directory.by_name.contains_key(&key) {
                continue;
            }
            directory.by_name.insert(key, directory.rows.len());
            directory.rows.push(DirectoryRow {
                name: name.to_string(),
                tax_id: tax_id.to_string(),
            });
        }

        debug!(companies = directory.rows.len(), "company directory loaded");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CompanyDirectory for CsvCompanyDirectory {
    fn resolve_company_tax_id(&self, company_name: &str) -> EtlResult<String> {
        let key = company_name.trim().to_lowercase();
        self.by_name
            .get(&key)
            .map(|&idx| &self.rows[idx])
            .filter(|row| !row.tax_id.is_empty())
            .map(|row| row.tax_id.clone())
            .ok_or_else(|| EtlError::company_not_found(company_name.trim()))
    }

    fn company_name_for(&self, tax_id: &str) -> EtlResult<String> {
        let tax_id = tax_id.trim();
        self.rows
            .iter()
            .find(|row| row.tax_id == tax_id)
            .map(|row| row.name.clone())
            .ok_or_else(|| EtlError::company_not_found(tax_id))
    }

    fn list_company_names(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
