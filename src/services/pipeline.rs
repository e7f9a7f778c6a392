//! Pipeline entry point
//!
//! Owns the transport for one run and turns a company and an end date into
//! export-ready bytes, or into one of the distinct no-export outcomes.

use chrono::NaiveDate;
use tracing::info;

use super::consolidation::{Consolidation, RangeConsolidator, RunSummary};
use super::extraction::MonthlyExtractor;
use super::progress::{CancelFlag, ProgressObserver};
use crate::client::{HttpTransport, ReqwestTransport, RetryingTransport};
use crate::config::{ApiToken, Settings};
use crate::error::EtlResult;
use crate::export::{export_with, ExportBundle};
use crate::models::ConsolidatedDataset;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Records were found and rendered
    Exported {
        dataset: ConsolidatedDataset,
        bundle: ExportBundle,
        summary: RunSummary,
    },
    /// The whole range produced no records; try a different period
    NoData(RunSummary),
    /// The run was cancelled before reaching the end date
    Cancelled(RunSummary),
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            Self::Exported { summary, .. } => summary,
            Self::NoData(summary) | Self::Cancelled(summary) => summary,
        }
    }
}

/// The extraction pipeline for one run
pub struct Pipeline<T> {
    transport: T,
    settings: Settings,
}

impl Pipeline<RetryingTransport<ReqwestTransport>> {
    /// Build the production pipeline: reqwest with retry/backoff
    pub fn connect(settings: Settings, token: ApiToken) -> EtlResult<Self> {
        settings.validate()?;
        let http = ReqwestTransport::new(&settings.api_base_url, token, settings.request_timeout())?;
        let transport = RetryingTransport::new(http, settings.retry.clone());
        Ok(Self::with_transport(settings, transport))
    }
}

impl<T: HttpTransport> Pipeline<T> {
    /// Build a pipeline over any transport
    pub fn with_transport(settings: Settings, transport: T) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Collect the range without rendering it
    pub fn consolidate(
        &self,
        company_id: &str,
        company_name: &str,
        end_date: NaiveDate,
        observer: &dyn ProgressObserver,
        cancel: Option<CancelFlag>,
    ) -> EtlResult<Consolidation> {
        let extractor = MonthlyExtractor::new(&self.transport, &self.settings);
        let mut consolidator = RangeConsolidator::new(&extractor, observer);
        if let Some(flag) = cancel {
            consolidator = consolidator.with_cancel(flag);
        }
        consolidator.consolidate(company_id, company_name, end_date)
    }

    /// Collect the range and render it for download
    pub fn run(
        &self,
        company_id: &str,
        company_name: &str,
        end_date: NaiveDate,
        observer: &dyn ProgressObserver,
        cancel: Option<CancelFlag>,
    ) -> EtlResult<RunOutcome> {
        let consolidation = self.consolidate(company_id, company_name, end_date, observer, cancel)?;

        if consolidation.cancelled {
            return Ok(RunOutcome::Cancelled(consolidation.summary));
        }
        if consolidation.is_empty() {
            info!(company = company_name, "no data to export");
            return Ok(RunOutcome::NoData(consolidation.summary));
        }

        let bundle = export_with(&consolidation.dataset, self.settings.pretty_json)?;
        info!(
            records = consolidation.dataset.len(),
            json_bytes = bundle.json.len(),
            xlsx_bytes = bundle.xlsx.len(),
            "export rendered"
        );

        Ok(RunOutcome::Exported {
            dataset: consolidation.dataset,
            bundle,
            summary: consolidation.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{items_response, ledger_item, plan_item, FakeTransport};
    use crate::export::parse_json;
    use crate::services::NoopObserver;
    use std::cell::Cell;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Month 2 sees a chart of accounts without leaf accounts
    fn acme_api() -> FakeTransport {
        let plan_calls = Cell::new(0);
        FakeTransport::new(move |request| {
            if request.endpoint == "plan_cuenta" {
                plan_calls.set(plan_calls.get() + 1);
                return Ok(if plan_calls.get() == 2 {
                    items_response(vec![plan_item("11", "Activo Circulante", 2)])
                } else {
                    items_response(vec![
                        plan_item("1101001001", "Caja", 4),
                        plan_item("4101001001", "Ventas", 4),
                    ])
                });
            }
            if request.query_value("offset") != Some("0") {
                return Ok(items_response(vec![]));
            }
            Ok(match request.query_value("fecha_desde") {
                Some("2024-01-01") => items_response(vec![
                    ledger_item("1101001001 Caja", 0, 900, "Apertura ejercicio", 1),
                    ledger_item("1101001001 Caja", 0, 300, "Compra insumos", 2),
                    ledger_item("4101001001 Ventas", 1200, 0, "Venta", 3),
                ]),
                _ => items_response(vec![ledger_item("4101001001 Ventas", 50, 0, "Venta", 9)]),
            })
        })
    }

    #[test]
    fn test_end_to_end_first_quarter() {
        let fake = acme_api();
        let pipeline = Pipeline::with_transport(Settings::default(), &fake);

        let outcome = pipeline
            .run("76543210", "Acme SA", date(2024, 3, 31), &NoopObserver, None)
            .unwrap();

        assert_eq!(fake.requests_to("plan_cuenta").len(), 3);
        let windows: Vec<_> = fake
            .requests_to("libro_mayor")
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
            windows,
            vec![
                ("2024-01-01".to_string(), "2024-01-31".to_string()),
                ("2024-03-01".to_string(), "2024-03-31".to_string()),
            ]
        );

        let RunOutcome::Exported {
            dataset,
            bundle,
            summary,
        } = outcome
        else {
            panic!("expected an export");
        };

        // Two non-opening entries in January, one in March
        let parsed = parse_json(&bundle.json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed, dataset.records());
        assert_eq!(summary.months.len(), 3);
        assert_eq!(summary.months[1].records, 0);
        assert_eq!(summary.warnings.len(), 1);
        assert!(!bundle.xlsx.is_empty());
    }

    #[test]
    fn test_cached_plan_resolved_once() {
        let fake = acme_api();
        let settings = Settings {
            cache_account_plan: true,
            ..Settings::default()
        };
        let pipeline = Pipeline::with_transport(settings, &fake);

        pipeline
            .run("76543210", "Acme SA", date(2024, 3, 31), &NoopObserver, None)
            .unwrap();

        assert_eq!(fake.requests_to("plan_cuenta").len(), 1);
    }

    #[test]
    fn test_no_data_is_distinct_outcome() {
        let fake = FakeTransport::new(|request| match request.endpoint.as_str() {
            "plan_cuenta" => Ok(items_response(vec![plan_item("1101001001", "Caja", 4)])),
            _ => Ok(items_response(vec![])),
        });
        let pipeline = Pipeline::with_transport(Settings::default(), &fake);

        let outcome = pipeline
            .run("76543210", "Acme SA", date(2024, 2, 29), &NoopObserver, None)
            .unwrap();

        assert!(matches!(outcome, RunOutcome::NoData(_)));
        assert_eq!(outcome.summary().months.len(), 2);
    }

    #[test]
    fn test_cancelled_before_start() {
        let fake = acme_api();
        let pipeline = Pipeline::with_transport(Settings::default(), &fake);
        let flag = CancelFlag::new();
        flag.cancel();

        let outcome = pipeline
            .run("76543210", "Acme SA", date(2024, 3, 31), &NoopObserver, Some(flag))
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Cancelled(_)));
        assert_eq!(fake.request_count(), 0);
    }
}
