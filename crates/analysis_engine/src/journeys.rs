//! Journey inference and the weekly travel-rate summary.
//!
//! A "trip" is one toll transaction; a journey is the group of same-day
//! trips separated by short gaps, approximating one continuous drive.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use models::{
    FuelEstimate, FuelParams, JourneySummary, PeriodSpec, TollRecord, TravelBehaviorSummary,
    WeekdayCount,
};

use crate::aggregate::top_locations;
use crate::filter::period_window;

/// Same-day passes separated by less than this many minutes merge into one
/// inferred journey.
const JOURNEY_GAP_MINUTES: i64 = 120;

/// How many top location codes the travel summary carries.
const SUMMARY_TOP_LOCATIONS: usize = 5;

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Greedy left-to-right partition of timestamped passes into journeys.
///
/// Passes are sorted ascending; a pass joins the current journey when it
/// shares the calendar day with the previous pass and follows it by under
/// the gap threshold. A day boundary or a gap at/over the threshold starts a
/// new journey; once drawn, boundaries are never revisited. Passes without a
/// timestamp cannot be merged and each count as their own journey.
pub fn infer_journeys(records: &[TollRecord]) -> JourneySummary {
    let mut stamps: Vec<NaiveDateTime> = records.iter().filter_map(|r| r.date).collect();
    stamps.sort();

    // Dateless records are singleton journeys.
    let mut journeys = records.len() - stamps.len();

    let mut prev: Option<NaiveDateTime> = None;
    for ts in stamps {
        let starts_new = match prev {
            None => true,
            Some(p) => {
                ts.date() != p.date() || ts - p >= Duration::minutes(JOURNEY_GAP_MINUTES)
            }
        };
        if starts_new {
            journeys += 1;
        }
        prev = Some(ts);
    }

    JourneySummary {
        total_transactions: records.len(),
        total_journeys: journeys,
    }
}

/// Weeks spanned by the requested period, never below half a week.
///
/// Named and fully-bounded custom periods use the requested calendar span,
/// not the span the data happens to cover. `All` (and a degraded custom)
/// falls back to the span between the earliest and latest dated record, or
/// exactly one week when fewer than two records are dated.
pub fn weeks_in_period(records: &[TollRecord], period: PeriodSpec) -> f64 {
    const MIN_WEEKS: f64 = 0.5;

    if let Some(w) = period_window(period) {
        let days = (w.end - w.start).num_days() + 1;
        return (days as f64 / 7.0).max(MIN_WEEKS);
    }

    let first = records.iter().filter_map(|r| r.day()).min();
    let last = records.iter().filter_map(|r| r.day()).max();
    let dated = records.iter().filter(|r| r.date.is_some()).count();
    match (first, last) {
        (Some(first), Some(last)) if dated >= 2 => {
            let days = (last - first).num_days() + 1;
            (days as f64 / 7.0).max(MIN_WEEKS)
        }
        _ => 1.0,
    }
}

/// Composite travel-behavior summary for a filtered subset and the period it
/// was selected by.
pub fn travel_summary(records: &[TollRecord], period: PeriodSpec) -> TravelBehaviorSummary {
    let total_trips = records.len();
    let weeks = weeks_in_period(records, period);
    TravelBehaviorSummary {
        total_trips,
        weeks_in_period: weeks,
        avg_weekly_trips: total_trips as f64 / weeks,
        top_location_names: top_locations(records, SUMMARY_TOP_LOCATIONS)
            .into_iter()
            .map(|l| l.location)
            .collect(),
        weekday_counts: weekday_counts(records),
    }
}

/// Dated records tallied per weekday, Sun..Sat. None when nothing is dated.
fn weekday_counts(records: &[TollRecord]) -> Option<Vec<WeekdayCount>> {
    let mut counts = [0usize; 7];
    let mut any = false;
    for r in records {
        if let Some(day) = r.day() {
            counts[day.weekday().num_days_from_sunday() as usize] += 1;
            any = true;
        }
    }
    any.then(|| {
        WEEKDAY_NAMES
            .iter()
            .zip(counts)
            .map(|(weekday, count)| WeekdayCount {
                weekday: weekday.to_string(),
                count,
            })
            .collect()
    })
}

/// Fuel estimate for the period's trips from user-supplied driving inputs.
/// Distance is never derived from toll data. Returns None unless miles per
/// trip and MPG are positive and the gas price is non-negative.
pub fn fuel_estimate(summary: &TravelBehaviorSummary, params: FuelParams) -> Option<FuelEstimate> {
    if !params.avg_miles_per_trip.is_finite() || params.avg_miles_per_trip <= 0.0 {
        return None;
    }
    if !params.mpg.is_finite() || params.mpg <= 0.0 {
        return None;
    }
    if !params.gas_price_per_gallon.is_finite() || params.gas_price_per_gallon < 0.0 {
        return None;
    }

    let total_miles = summary.total_trips as f64 * params.avg_miles_per_trip;
    let gallons = total_miles / params.mpg;
    let cost = gallons * params.gas_price_per_gallon;
    let weekly_cost = if summary.weeks_in_period > 0.0 {
        cost / summary.weeks_in_period
    } else {
        0.0
    };
    Some(FuelEstimate {
        total_miles,
        gallons,
        cost,
        weekly_cost,
    })
}
