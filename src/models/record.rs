//! Canonical ledger record
//!
//! Field names and order are the column layout of every export.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::raw::RawLedgerEntry;
use crate::error::EtlResult;

/// Width of the code prefix in the composite `cuenta` field
pub const ACCOUNT_CODE_WIDTH: usize = 10;

/// Export column headers, in record field order
pub const COLUMNS: [&str; 10] = [
    "Código de Cuenta",
    "Cuenta",
    "Crédito - Débito",
    "Tipo",
    "Detalles",
    "Fecha de Contabilización",
    "Centro de Costo",
    "Empresa",
    "Información Adicional",
    "Contraparte",
];

/// Sign of the credit minus debit difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit: the difference is negative
    #[serde(rename = "D")]
    Debit,
    /// Credit: the difference is zero or positive
    #[serde(rename = "C")]
    Credit,
}

impl EntryType {
    /// Classify a credit minus debit difference
    pub fn from_net(net: Decimal) -> Self {
        if net.is_sign_negative() && !net.is_zero() {
            Self::Debit
        } else {
            Self::Credit
        }
    }

    /// Single-letter code used in exports
    pub fn code(&self) -> &'static str {
        match self {
            Self::Debit => "D",
            Self::Credit => "C",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-run values that are not carried by the raw entry
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Company name written to every record
    pub company_name: String,
    /// Cost-center placeholder
    pub cost_center: String,
    /// Keep at most this many characters of the details text
    pub detail_limit: Option<usize>,
}

impl NormalizeOptions {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            cost_center: "N/A".to_string(),
            detail_limit: None,
        }
    }

    pub fn with_cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = cost_center.into();
        self
    }

    pub fn with_detail_limit(mut self, limit: Option<usize>) -> Self {
        self.detail_limit = limit;
        self
    }
}

/// One normalized ledger line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(rename = "Código de Cuenta")]
    pub account_code: String,

    #[serde(rename = "Cuenta")]
    pub account_name: String,

    /// Written as a JSON number through `f64`; exact up to about 15
    /// significant digits, which covers two-decimal amounts below 10^13
    #[serde(rename = "Crédito - Débito", with = "rust_decimal::serde::float")]
    pub net_amount: Decimal,

    #[serde(rename = "Tipo")]
    pub entry_type: EntryType,

    #[serde(rename = "Detalles")]
    pub details: String,

    #[serde(rename = "Fecha de Contabilización")]
    pub posting_date: String,

    #[serde(rename = "Centro de Costo")]
    pub cost_center: String,

    #[serde(rename = "Empresa")]
    pub company: String,

    #[serde(rename = "Información Adicional")]
    pub additional_info: String,

    #[serde(rename = "Contraparte")]
    pub counterparty: String,
}

impl NormalizedRecord {
    /// Normalize a raw entry
    ///
    /// Opening-balance filtering is the caller's job; this only fails when
    /// `credito` or `debito` cannot be read.
    pub fn from_raw(raw: &RawLedgerEntry, options: &NormalizeOptions) -> EtlResult<Self> {
        let credit = raw.amount("credito")?;
        let debit = raw.amount("debito")?;
        let net_amount = credit - debit;

        let (account_code, account_name) = split_account(&raw.account());

        let details = match options.detail_limit {
            Some(limit) => truncate_chars(&raw.details(), limit),
            None => raw.details(),
        };

        Ok(Self {
            account_code,
            account_name,
            net_amount,
            entry_type: EntryType::from_net(net_amount),
            details,
            posting_date: raw.text("fecha_contabilizacion_humana"),
            cost_center: options.cost_center.clone(),
            company: options.company_name.clone(),
            additional_info: format!("Asiento {}", raw.text("numero_asiento")),
            counterparty: raw.text("contraparte"),
        })
    }

    /// Cell values as text, in [`COLUMNS`] order
    pub fn to_row(&self) -> [String; 10] {
        [
            self.account_code.clone(),
            self.account_name.clone(),
            self.net_amount.normalize().to_string(),
            self.entry_type.code().to_string(),
            self.details.clone(),
            self.posting_date.clone(),
            self.cost_center.clone(),
            self.company.clone(),
            self.additional_info.clone(),
            self.counterparty.clone(),
        ]
    }
}

/// Split `cuenta` into the fixed-width code and the trimmed name
///
/// Values shorter than the code width are all code and no name.
pub fn split_account(cuenta: &str) -> (String, String) {
    match cuenta.char_indices().nth(ACCOUNT_CODE_WIDTH) {
        Some((idx, _)) => (cuenta[..idx].to_string(), cuenta[idx..].trim().to_string()),
        None => (cuenta.to_string(), String::new()),
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
