//! Paginated ledger retrieval
//!
//! Pages are requested with a growing `offset` until the API answers with an
//! empty page. A rejected or failed page ends pagination but keeps every page
//! already collected.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::client::{ApiRequest, HttpTransport};
use crate::error::EtlError;
use crate::models::{ItemsEnvelope, RawLedgerEntry};

/// Ledger endpoint
pub const LEDGER_ENDPOINT: &str = "libro_mayor";

/// Pages requested for one window before giving up on reaching an empty page
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Why pagination stopped
#[derive(Debug)]
pub enum FetchStop {
    /// An empty page signalled the end of the data
    Exhausted,
    /// The API answered a page with a non-retryable, non-success status
    Status(u16),
    /// A page could not be obtained (retries spent) or decoded
    Failed(EtlError),
}

/// Everything collected for one window
#[derive(Debug)]
pub struct LedgerPages {
    /// Entries in page order
    pub entries: Vec<RawLedgerEntry>,
    /// Requests issued, the terminating one included
    pub requests: u32,
    pub stop: FetchStop,
}

impl LedgerPages {
    /// Whether pagination ran to the empty end-of-data page
    pub fn is_complete(&self) -> bool {
        matches!(self.stop, FetchStop::Exhausted)
    }

    /// The failure that interrupted pagination, if any
    pub fn failure(&self) -> Option<&EtlError> {
        match &self.stop {
            FetchStop::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Offset-paginated ledger fetcher
pub struct LedgerFetcher<'a> {
    transport: &'a dyn HttpTransport,
    page_size: u32,
    max_pages: u32,
    ledger_kind: String,
}

impl<'a> LedgerFetcher<'a> {
    /// Create a fetcher requesting `page_size` entries per page
    pub fn new(transport: &'a dyn HttpTransport, page_size: u32, ledger_kind: impl Into<String>) -> Self {
        Self {
            transport,
            page_size: page_size.max(1),
            max_pages: DEFAULT_MAX_PAGES,
            ledger_kind: ledger_kind.into(),
        }
    }

    /// Stop after `max_pages` non-empty pages
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn page_request(
        &self,
        company_id: &str,
        account_codes: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
        offset: u64,
    ) -> ApiRequest {
        ApiRequest::new(LEDGER_ENDPOINT)
            .param("tipo", &self.ledger_kind)
            .param("ordenar_por", "fecha_contabilizacion")
            .param("cuenta", account_codes)
            .param("rut_empresa", company_id)
            .param("fecha_desde", date_from.format("%Y-%m-%d"))
            .param("fecha_hasta", date_to.format("%Y-%m-%d"))
            .param("limit", self.page_size)
            .param("offset", offset)
    }

    /// Fetch every entry posted between `date_from` and `date_to` inclusive
    pub fn fetch_ledger(
        &self,
        company_id: &str,
        account_codes: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> LedgerPages {
        let mut entries = Vec::new();
        let mut offset: u64 = 0;
        let mut requests: u32 = 0;

        let stop = loop {
            let request = self.page_request(company_id, account_codes, date_from, date_to, offset);
            requests += 1;

            let response = match self.transport.get(&request) {
                Ok(response) => response,
                Err(err) => {
                    warn!(offset, error = %err, "ledger page failed, keeping earlier pages");
                    break FetchStop::Failed(err);
                }
            };

            if !response.is_success() {
                warn!(offset, status = response.status, "ledger page rejected");
                break FetchStop::Status(response.status);
            }

            let page = match response.json::<ItemsEnvelope<RawLedgerEntry>>() {
                Ok(envelope) => envelope.into_items(),
                Err(err) => {
                    warn!(offset, error = %err, "ledger page unreadable");
                    break FetchStop::Failed(err);
                }
            };

            if page.is_empty() {
                break FetchStop::Exhausted;
            }

            debug!(offset, entries = page.len(), "ledger page");
            entries.extend(page);
            offset += u64::from(self.page_size);

            if requests >= self.max_pages {
                warn!(pages = requests, "ledger page limit reached, keeping collected pages");
                break FetchStop::Failed(EtlError::PageLimit { pages: requests });
            }
        };

        debug!(
            company = company_id,
            from = %date_from,
            to = %date_to,
            entries = entries.len(),
            requests,
            "ledger window fetched"
        );

        LedgerPages {
            entries,
            requests,
            stop,
        }
    }
}
