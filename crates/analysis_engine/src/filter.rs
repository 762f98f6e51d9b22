//! Period and tag filtering: selects the records that enter an analysis.

use chrono::{Datelike, Local, NaiveDate};

use models::{PeriodSpec, TollRecord, VehicleTagQuery};

/// Inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DayWindow {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

/// Select the analysis subset: positive-amount records inside the period
/// window whose transponder matches the tag query.
///
/// Refund/credit rows (`amount_cents <= 0`) are always dropped here, which
/// is why the raw record count and the analyzed count can differ. Records
/// without a date are kept by `All` (and by a `Custom` missing a bound);
/// every named calendar period excludes them.
pub fn filter_records(
    records: &[TollRecord],
    period: PeriodSpec,
    tags: &VehicleTagQuery,
) -> Vec<TollRecord> {
    let window = period_window(period);
    records
        .iter()
        .filter(|r| r.amount_cents > 0)
        .filter(|r| match window {
            None => true,
            Some(w) => r
                .day()
                .map(|d| w.start <= d && d <= w.end)
                .unwrap_or(false),
        })
        .filter(|r| tags.matches(&r.transponder))
        .cloned()
        .collect()
}

/// Records whose authoritative timestamp falls on the given calendar day.
pub fn records_on_day(records: &[TollRecord], day: NaiveDate) -> Vec<TollRecord> {
    records
        .iter()
        .filter(|r| r.day() == Some(day))
        .cloned()
        .collect()
}

/// Resolve a period spec to its day window; `None` means no date constraint.
/// A missing anchor resolves to the local current date; a custom period
/// missing a bound degrades to no constraint.
pub(crate) fn period_window(period: PeriodSpec) -> Option<DayWindow> {
    match period {
        PeriodSpec::All => None,
        PeriodSpec::Month(anchor) => Some(month_window(resolve_anchor(anchor))),
        PeriodSpec::Quarter(anchor) => Some(quarter_window(resolve_anchor(anchor))),
        PeriodSpec::Year(anchor) => Some(year_window(resolve_anchor(anchor))),
        PeriodSpec::Custom {
            start: Some(start),
            end: Some(end),
        } => Some(DayWindow { start, end }),
        PeriodSpec::Custom { .. } => None,
    }
}

fn resolve_anchor(anchor: Option<NaiveDate>) -> NaiveDate {
    anchor.unwrap_or_else(|| Local::now().date_naive())
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn month_window(anchor: NaiveDate) -> DayWindow {
    let start = first_of_month(anchor.year(), anchor.month());
    let next = if anchor.month() == 12 {
        first_of_month(anchor.year() + 1, 1)
    } else {
        first_of_month(anchor.year(), anchor.month() + 1)
    };
    DayWindow {
        start,
        end: next.pred_opt().unwrap(),
    }
}

fn quarter_window(anchor: NaiveDate) -> DayWindow {
    let quarter_month = ((anchor.month() - 1) / 3) * 3 + 1;
    let start = first_of_month(anchor.year(), quarter_month);
    let next = if quarter_month == 10 {
        first_of_month(anchor.year() + 1, 1)
    } else {
        first_of_month(anchor.year(), quarter_month + 3)
    };
    DayWindow {
        start,
        end: next.pred_opt().unwrap(),
    }
}

fn year_window(anchor: NaiveDate) -> DayWindow {
    DayWindow {
        start: first_of_month(anchor.year(), 1),
        end: NaiveDate::from_ymd_opt(anchor.year(), 12, 31).unwrap(),
    }
}
