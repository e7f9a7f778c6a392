//! Monthly extraction step
//!
//! One calendar month: resolve the account plan, fetch the ledger window,
//! drop opening-balance entries and normalize the rest.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

use super::accounts::{AccountPlan, AccountPlanResolver};
use super::ledger::{FetchStop, LedgerFetcher};
use crate::client::HttpTransport;
use crate::config::Settings;
use crate::error::EtlResult;
use crate::models::{MonthWindow, NormalizeOptions, NormalizedRecord};

/// How a month's extraction ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthStatus {
    /// Every page was fetched
    Complete,
    /// No account plan; the month contributes nothing
    PlanUnavailable(String),
    /// Pagination stopped early; collected pages were kept
    FetchInterrupted(String),
    /// An entry could not be normalized; the month was dropped
    Malformed(String),
}

impl MonthStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for MonthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "ok"),
            Self::PlanUnavailable(_) => write!(f, "no account plan"),
            Self::FetchInterrupted(_) => write!(f, "interrupted"),
            Self::Malformed(_) => write!(f, "malformed entry"),
        }
    }
}

/// Result of one month
#[derive(Debug, Clone)]
pub struct MonthExtraction {
    pub window: MonthWindow,
    /// Normalized records in fetch order
    pub records: Vec<NormalizedRecord>,
    /// Raw entries received from the API
    pub fetched: usize,
    /// Opening-balance entries left out
    pub opening_skipped: usize,
    pub status: MonthStatus,
}

impl MonthExtraction {
    fn empty(window: MonthWindow, status: MonthStatus) -> Self {
        Self {
            window,
            records: Vec::new(),
            fetched: 0,
            opening_skipped: 0,
            status,
        }
    }
}

/// Extracts and normalizes one month of ledger entries
pub struct MonthlyExtractor<'a> {
    resolver: AccountPlanResolver<'a>,
    fetcher: LedgerFetcher<'a>,
    cost_center: String,
    detail_limit: Option<usize>,
    plan_cache: Option<RefCell<HashMap<String, AccountPlan>>>,
}

impl<'a> MonthlyExtractor<'a> {
    /// Create an extractor configured from settings
    pub fn new(transport: &'a dyn HttpTransport, settings: &Settings) -> Self {
        Self {
            resolver: AccountPlanResolver::new(transport),
            fetcher: LedgerFetcher::new(transport, settings.page_size, settings.ledger_kind.clone())
                .with_max_pages(settings.max_pages),
            cost_center: settings.cost_center_placeholder.clone(),
            detail_limit: settings.detail_limit(),
            plan_cache: settings
                .cache_account_plan
                .then(|| RefCell::new(HashMap::new())),
        }
    }

    fn account_plan(&self, company_id: &str) -> EtlResult<AccountPlan> {
        let Some(cache) = &self.plan_cache else {
            return self.resolver.resolve_accounts(company_id);
        };

        if let Some(plan) = cache.borrow().get(company_id) {
            debug!(company = company_id, "account plan from cache");
            return Ok(plan.clone());
        }

        let plan = self.resolver.resolve_accounts(company_id)?;
        cache
            .borrow_mut()
            .insert(company_id.to_string(), plan.clone());
        Ok(plan)
    }

    /// Extract the full calendar month starting at `month_start`
    pub fn extract_month(
        &self,
        company_id: &str,
        company_name: &str,
        month_start: NaiveDate,
    ) -> EtlResult<MonthExtraction> {
        let window = MonthWindow::full(month_start.year(), month_start.month())?;
        self.extract_window(company_id, company_name, window)
    }

    /// Extract an arbitrary window inside one month
    ///
    /// A missing account plan and interrupted pagination both degrade to
    /// what could be collected. An entry without `credito`/`debito` fails
    /// the whole month with [`crate::error::EtlError::MalformedEntry`].
    pub fn extract_window(
        &self,
        company_id: &str,
        company_name: &str,
        window: MonthWindow,
    ) -> EtlResult<MonthExtraction> {
        let plan = match self.account_plan(company_id) {
            Ok(plan) => plan,
            Err(err) if err.is_plan_unavailable() => {
                info!(month = %window, error = %err, "skipping month without account plan");
                return Ok(MonthExtraction::empty(
                    window,
                    MonthStatus::PlanUnavailable(err.to_string()),
                ));
            }
            Err(err) => return Err(err),
        };

        let pages = self
            .fetcher
            .fetch_ledger(company_id, &plan.comma_joined(), window.start, window.end);

        let status = match &pages.stop {
            FetchStop::Exhausted => MonthStatus::Complete,
            FetchStop::Status(status) => MonthStatus::FetchInterrupted(format!("HTTP {}", status)),
            FetchStop::Failed(err) => MonthStatus::FetchInterrupted(err.to_string()),
        };
        if !status.is_complete() {
            warn!(
                month = %window,
                kept = pages.entries.len(),
                "ledger pagination interrupted"
            );
        }

        let options = NormalizeOptions::new(company_name)
            .with_cost_center(self.cost_center.clone())
            .with_detail_limit(self.detail_limit);

        let fetched = pages.entries.len();
        let mut records = Vec::with_capacity(fetched);
        let mut opening_skipped = 0;

        for raw in &pages.entries {
            if raw.is_opening_balance() {
                opening_skipped += 1;
                continue;
            }
            records.push(NormalizedRecord::from_raw(raw, &options)?);
        }

        debug!(
            month = %window,
            fetched,
            opening_skipped,
            records = records.len(),
            "month extracted"
        );

        Ok(MonthExtraction {
            window,
            records,
            fetched,
            opening_skipped,
            status,
        })
    }
}
