//! Calendar-month extraction windows

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EtlError, EtlResult};

/// An inclusive date range inside a single calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// The full calendar month
    pub fn full(year: i32, month: u32) -> EtlResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EtlError::InvalidDate(format!("{}-{:02}", year, month)))?;
        Ok(Self {
            start,
            end: month_end(year, month)?,
        })
    }

    /// Year of the window
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Month number (1-12)
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// `YYYY-MM` label used in progress messages and file names
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }

    /// Whether the window stops before the last day of its month
    pub fn is_partial(&self) -> bool {
        month_end(self.year(), self.month())
            .map(|end| self.end < end)
            .unwrap_or(false)
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Last calendar day of a month
pub fn month_end(year: i32, month: u32) -> EtlResult<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .filter(|_| (1..=12).contains(&month))
        .map(|d| d - Duration::days(1))
        .ok_or_else(|| EtlError::InvalidDate(format!("{}-{:02}", year, month)))
}

/// Windows from January 1st of `end_date`'s year through `end_date`
///
/// Every window covers a full month except the last, which stops at
/// `end_date`. At most twelve windows are produced.
pub fn month_windows(end_date: NaiveDate) -> EtlResult<Vec<MonthWindow>> {
    let year = end_date.year();
    let mut windows = Vec::with_capacity(end_date.month() as usize);

    for month in 1..=end_date.month() {
        let mut window = MonthWindow::full(year, month)?;
        if window.end > end_date {
            window.end = end_date;
        }
        windows.push(window);
    }

    Ok(windows)
}
