use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Sentinel location code for transactions whose exit interchange is missing.
/// Kept non-empty so map keys and display cells never have to special-case "".
pub const MISSING_LOCATION: &str = "—";

// Canonical record

/// One toll transaction, normalized from a statement row.
///
/// Amounts are integer cents. Refund/credit rows keep their non-positive
/// amount here; the period filter is what excludes them from analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TollRecord {
    pub amount_cents: i64,
    /// Authoritative timestamp: exit date when present, else posting date.
    pub date: Option<NaiveDateTime>,
    pub posting_date: Option<NaiveDateTime>,
    pub exit_date: Option<NaiveDateTime>,
    /// Operator transaction id from the export, empty when the column is absent.
    #[serde(default)]
    pub transaction: String,
    /// Trimmed tag id; empty string means "unassigned", not "unknown".
    pub transponder: String,
    /// Raw location code, [`MISSING_LOCATION`] when the cell was blank.
    pub exit_interchange: String,
    #[serde(default)]
    pub vehicle_class: String,
    #[serde(default)]
    pub license_state: String,
    #[serde(default)]
    pub license_plate: String,
    /// Original row cells in column order. Traceability only; aggregation
    /// never reads this.
    #[serde(default)]
    pub raw: Vec<String>,
}

impl TollRecord {
    /// Calendar day of the authoritative timestamp.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.date())
    }

    /// Amount in the display unit (dollars). Presentation helper; all
    /// arithmetic stays in cents.
    pub fn amount_dollars(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }
}

// Filter inputs

/// Calendar window a record subset is selected by. Anchored variants select
/// the named calendar period containing the anchor; a missing anchor resolves
/// to the local current date at filter time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSpec {
    All,
    Month(Option<NaiveDate>),
    Quarter(Option<NaiveDate>),
    Year(Option<NaiveDate>),
    /// Explicit inclusive day range. If either bound is missing the period
    /// degrades to `All` (amount and tag constraints still apply).
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

/// Case-insensitive substring tokens matched against transponder ids.
/// An empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleTagQuery {
    tokens: Vec<String>,
}

impl VehicleTagQuery {
    /// Split user input on whitespace and commas into lowercase tokens.
    pub fn parse(input: &str) -> Self {
        let tokens = input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when any token is a substring of the transponder id.
    pub fn matches(&self, transponder: &str) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let id = transponder.to_lowercase();
        self.tokens.iter().any(|t| id.contains(t))
    }
}

// Derived aggregates

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendPoint {
    pub day: NaiveDate,
    pub total_cents: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleBreakdownRow {
    /// Raw transponder id, empty string for the unassigned group. The true
    /// grouping key; display labels live in a separate map.
    pub transponder: String,
    pub total_cents: i64,
    pub count: usize,
    /// Share of the grand total in percent, 0.0 when the grand total is 0.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRow {
    pub location: String,
    pub count: usize,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: usize,
}

/// A location ranking row enriched with the days travel occurred there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDays {
    pub location: String,
    pub count: usize,
    pub total_cents: i64,
    pub days: Vec<DayCount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneySummary {
    pub total_transactions: usize,
    /// Same-day passes separated by short gaps merge into one journey.
    pub total_journeys: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelBehaviorSummary {
    pub total_trips: usize,
    /// Span of the requested period in weeks, never below 0.5.
    pub weeks_in_period: f64,
    pub avg_weekly_trips: f64,
    /// Top-5 location codes by spend.
    pub top_location_names: Vec<String>,
    /// Dated transactions per weekday, Sun..Sat. None when nothing is dated.
    pub weekday_counts: Option<Vec<WeekdayCount>>,
}

/// User-supplied inputs for the fuel estimate. Distance is never derived
/// from toll data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelParams {
    pub avg_miles_per_trip: f64,
    pub mpg: f64,
    pub gas_price_per_gallon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelEstimate {
    pub total_miles: f64,
    pub gallons: f64,
    pub cost: f64,
    pub weekly_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_query_empty_matches_everything() {
        let q = VehicleTagQuery::parse("   ");
        assert!(q.is_empty());
        assert!(q.matches("11743677"));
        assert!(q.matches(""));
    }

    #[test]
    fn test_tag_query_any_token_suffices() {
        let q = VehicleTagQuery::parse("006, 11743677");
        assert!(q.matches("TAG-006-X"));
        assert!(q.matches("11743677"));
        assert!(!q.matches("999"));
    }

    #[test]
    fn test_tag_query_case_insensitive() {
        let q = VehicleTagQuery::parse("AbC");
        assert!(q.matches("xxabcyy"));
        assert!(q.matches("XXABCYY"));
    }

    #[test]
    fn test_record_day_uses_authoritative_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let record = TollRecord {
            amount_cents: 200,
            date: Some(date),
            posting_date: None,
            exit_date: Some(date),
            transaction: String::new(),
            transponder: String::new(),
            exit_interchange: MISSING_LOCATION.to_string(),
            vehicle_class: String::new(),
            license_state: String::new(),
            license_plate: String::new(),
            raw: Vec::new(),
        };
        assert_eq!(record.day(), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(record.amount_dollars(), 2.0);
    }
}
