//! Range consolidation
//!
//! Drives the monthly extraction from January through the end date, strictly
//! one month after another, and collects the records in month order.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::extraction::{MonthExtraction, MonthStatus, MonthlyExtractor};
use super::progress::{CancelFlag, ProgressObserver};
use crate::error::EtlResult;
use crate::models::{month_windows, ConsolidatedDataset, MonthWindow};

/// Per-month line of a run summary
#[derive(Debug, Clone)]
pub struct MonthReport {
    pub window: MonthWindow,
    pub records: usize,
    pub fetched: usize,
    pub opening_skipped: usize,
    pub status: MonthStatus,
}

impl MonthReport {
    fn from_extraction(extraction: &MonthExtraction) -> Self {
        Self {
            window: extraction.window,
            records: extraction.records.len(),
            fetched: extraction.fetched,
            opening_skipped: extraction.opening_skipped,
            status: extraction.status.clone(),
        }
    }

    fn malformed(window: MonthWindow, reason: String) -> Self {
        Self {
            window,
            records: 0,
            fetched: 0,
            opening_skipped: 0,
            status: MonthStatus::Malformed(reason),
        }
    }
}

/// What happened during a run, month by month
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub company_id: String,
    pub company_name: String,
    pub months: Vec<MonthReport>,
    /// Conditions worth showing the user even though the run continued
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// Total records across all months
    pub fn total_records(&self) -> usize {
        self.months.iter().map(|m| m.records).sum()
    }

    /// Months whose extraction did not complete cleanly
    pub fn degraded_months(&self) -> usize {
        self.months.iter().filter(|m| !m.status.is_complete()).count()
    }
}

/// Records and summary for a consolidated range
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub dataset: ConsolidatedDataset,
    pub summary: RunSummary,
    /// Whether the run stopped early on request
    pub cancelled: bool,
}

impl Consolidation {
    /// Nothing to export after the whole range
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Runs the monthly extraction across a date range
pub struct RangeConsolidator<'a> {
    extractor: &'a MonthlyExtractor<'a>,
    observer: &'a dyn ProgressObserver,
    cancel: Option<CancelFlag>,
}

impl<'a> RangeConsolidator<'a> {
    /// Create a consolidator reporting progress to `observer`
    pub fn new(extractor: &'a MonthlyExtractor<'a>, observer: &'a dyn ProgressObserver) -> Self {
        Self {
            extractor,
            observer,
            cancel: None,
        }
    }

    /// Stop between months once `flag` is raised
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    /// Consolidate every month from January 1st of `end_date`'s year
    ///
    /// Months without data, with an interrupted fetch or with a malformed
    /// entry contribute nothing (or what was collected) and never abort the
    /// run; they show up in the summary instead.
    pub fn consolidate(
        &self,
        company_id: &str,
        company_name: &str,
        end_date: NaiveDate,
    ) -> EtlResult<Consolidation> {
        let windows = month_windows(end_date)?;
        let mut dataset = ConsolidatedDataset::new();
        let mut summary = RunSummary {
            company_id: company_id.to_string(),
            company_name: company_name.to_string(),
            ..RunSummary::default()
        };
        let mut cancelled = false;

        info!(
            company = company_name,
            months = windows.len(),
            until = %end_date,
            "consolidating ledger"
        );

        for window in windows {
            if self.is_cancelled() {
                warn!(month = %window, "run cancelled");
                summary
                    .warnings
                    .push(format!("Cancelled before {}", window.label()));
                cancelled = true;
                break;
            }

            match self.extractor.extract_window(company_id, company_name, window) {
                Ok(extraction) => {
                    match &extraction.status {
                        MonthStatus::PlanUnavailable(reason) => summary
                            .warnings
                            .push(format!("{}: no account plan ({})", window.label(), reason)),
                        MonthStatus::FetchInterrupted(reason) => summary.warnings.push(format!(
                            "{}: ledger fetch interrupted, kept {} entries ({})",
                            window.label(),
                            extraction.fetched,
                            reason
                        )),
                        _ => {}
                    }
                    summary.months.push(MonthReport::from_extraction(&extraction));
                    dataset.append_month(extraction.records);
                }
                Err(err) if err.is_malformed() => {
                    warn!(month = %window, error = %err, "month dropped");
                    summary
                        .warnings
                        .push(format!("{}: month skipped, {}", window.label(), err));
                    summary
                        .months
                        .push(MonthReport::malformed(window, err.to_string()));
                }
                Err(err) => return Err(err),
            }

            self.observer.on_month_processed(&window.label());
        }

        info!(records = dataset.len(), "consolidation finished");
        Ok(Consolidation {
            dataset,
            summary,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{items_response, ledger_item, plan_item, FakeTransport};
    use crate::client::ApiResponse;
    use crate::config::Settings;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingObserver {
        labels: RefCell<Vec<String>>,
        cancel_after: Option<(usize, CancelFlag)>,
    }

    impl ProgressObserver for RecordingObserver {
        fn on_month_processed(&self, month_label: &str) {
            self.labels.borrow_mut().push(month_label.to_string());
            if let Some((after, flag)) = &self.cancel_after {
                if self.labels.borrow().len() >= *after {
                    flag.cancel();
                }
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Each month's first page holds one entry tagged with the month number
    fn monthly_api() -> FakeTransport {
        FakeTransport::new(|request| match request.endpoint.as_str() {
            "plan_cuenta" => Ok(items_response(vec![plan_item("1101001001", "Caja", 4)])),
            _ if request.query_value("offset") == Some("0") => {
                let from = request.query_value("fecha_desde").unwrap_or_default();
                let month: i64 = from[5..7].parse().unwrap();
                Ok(items_response(vec![
                    ledger_item("1101001001 Caja", month * 10, 0, "Venta", month),
                    ledger_item("1101001001 Caja", 0, 0, "apertura", 0),
                ]))
            }
            _ => Ok(items_response(vec![])),
        })
    }

    #[test]
    fn test_records_in_month_order() {
        let fake = monthly_api();
        let extractor = MonthlyExtractor::new(&fake, &Settings::default());
        let observer = RecordingObserver::default();
        let consolidator = RangeConsolidator::new(&extractor, &observer);

        let result = consolidator
            .consolidate("76543210", "Acme SA", date(2024, 4, 30))
            .unwrap();

        let vouchers: Vec<_> = result
            .dataset
            .iter()
            .map(|r| r.additional_info.clone())
            .collect();
        assert_eq!(
            vouchers,
            vec!["Asiento 1", "Asiento 2", "Asiento 3", "Asiento 4"]
        );
        assert_eq!(
            *observer.labels.borrow(),
            vec!["2024-01", "2024-02", "2024-03", "2024-04"]
        );
        assert_eq!(result.summary.months.len(), 4);
        assert_eq!(result.summary.total_records(), 4);
        assert!(result.summary.warnings.is_empty());
        assert!(!result.cancelled);
    }

    #[test]
    fn test_last_window_truncated_to_end_date() {
        let fake = monthly_api();
        let extractor = MonthlyExtractor::new(&fake, &Settings::default());
        let consolidator = RangeConsolidator::new(&extractor, &crate::services::NoopObserver);

        consolidator
            .consolidate("76543210", "Acme SA", date(2024, 2, 10))
            .unwrap();

        let ledger = fake.requests_to("libro_mayor");
        let first_pages: Vec<_> = ledger
            .iter()
            .filter(|r| r.query_value("offset") == Some("0"))
            .map(|r| {
                (
                    r.query_value("fecha_desde").unwrap().to_string(),
                    r.query_value("fecha_hasta").unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            first_pages,
            vec![
                ("2024-01-01".to_string(), "2024-01-31".to_string()),
                ("2024-02-01".to_string(), "2024-02-10".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_month_skipped_others_kept() {
        let fake = FakeTransport::new(|request| match request.endpoint.as_str() {
            "plan_cuenta" => Ok(items_response(vec![plan_item("1101001001", "Caja", 4)])),
            _ if request.query_value("offset") != Some("0") => Ok(items_response(vec![])),
            _ if request.query_value("fecha_desde") == Some("2024-02-01") => {
                Ok(items_response(vec![serde_json::json!({"cuenta": "x", "debito": 1})]))
            }
            _ => Ok(items_response(vec![ledger_item("1101001001 Caja", 1, 0, "Venta", 7)])),
        });
        let extractor = MonthlyExtractor::new(&fake, &Settings::default());
        let consolidator = RangeConsolidator::new(&extractor, &crate::services::NoopObserver);

        let result = consolidator
            .consolidate("76543210", "Acme SA", date(2024, 3, 31))
            .unwrap();

        assert_eq!(result.dataset.len(), 2);
        assert_eq!(result.summary.warnings.len(), 1);
        assert!(matches!(
            result.summary.months[1].status,
            MonthStatus::Malformed(_)
        ));
        assert_eq!(result.summary.degraded_months(), 1);
    }

    #[test]
    fn test_every_month_empty_is_empty_consolidation() {
        let fake = FakeTransport::new(|_| Ok(ApiResponse::new(401, "no token")));
        let extractor = MonthlyExtractor::new(&fake, &Settings::default());
        let consolidator = RangeConsolidator::new(&extractor, &crate::services::NoopObserver);

        let result = consolidator
            .consolidate("76543210", "Acme SA", date(2024, 2, 29))
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.summary.months.len(), 2);
        assert_eq!(result.summary.warnings.len(), 2);
    }

    #[test]
    fn test_cancellation_between_months() {
        let fake = monthly_api();
        let extractor = MonthlyExtractor::new(&fake, &Settings::default());
        let flag = CancelFlag::new();
        let observer = RecordingObserver {
            cancel_after: Some((2, flag.clone())),
            ..RecordingObserver::default()
        };
        let consolidator = RangeConsolidator::new(&extractor, &observer).with_cancel(flag);

        let result = consolidator
            .consolidate("76543210", "Acme SA", date(2024, 6, 30))
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.summary.months.len(), 2);
        assert_eq!(result.dataset.len(), 2);
    }
}
