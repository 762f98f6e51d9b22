//! Stateless reducers over a filtered record subset. Every function
//! recomputes from scratch and returns plain values; nothing is cached or
//! mutated in place, so superseded results can simply be discarded.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use models::{
    DailyTrendPoint, DayCount, LocationDays, LocationRow, TollRecord, VehicleBreakdownRow,
};

use crate::filter::records_on_day;

/// Grand total in cents over a subset.
pub fn total_spend(records: &[TollRecord]) -> i64 {
    records.iter().map(|r| r.amount_cents).sum()
}

/// Daily spending trend: one point per distinct calendar day among dated
/// records, ascending by day. Records without a date cannot sit on a day
/// axis and are skipped.
pub fn daily_trend(records: &[TollRecord]) -> Vec<DailyTrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, (i64, usize)> = BTreeMap::new();
    for r in records {
        let Some(day) = r.day() else { continue };
        let entry = by_day.entry(day).or_insert((0, 0));
        entry.0 += r.amount_cents;
        entry.1 += 1;
    }
    by_day
        .into_iter()
        .map(|(day, (total_cents, count))| DailyTrendPoint {
            day,
            total_cents,
            count,
        })
        .collect()
}

/// Spend grouped by trimmed transponder id, descending by total. The empty
/// id is the unassigned group and ranks like any other. The sort is stable,
/// so ties keep first-encounter order.
pub fn by_vehicle(records: &[TollRecord]) -> Vec<VehicleBreakdownRow> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<VehicleBreakdownRow> = Vec::new();
    let mut grand_total = 0i64;

    for r in records {
        let id = r.transponder.trim().to_string();
        grand_total += r.amount_cents;
        let i = *index.entry(id.clone()).or_insert_with(|| {
            rows.push(VehicleBreakdownRow {
                transponder: id.clone(),
                total_cents: 0,
                count: 0,
                percent: 0.0,
            });
            rows.len() - 1
        });
        rows[i].total_cents += r.amount_cents;
        rows[i].count += 1;
    }

    for row in &mut rows {
        row.percent = if grand_total == 0 {
            0.0
        } else {
            row.total_cents as f64 / grand_total as f64 * 100.0
        };
    }
    rows.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
    rows
}

/// Display labels keyed by raw transponder id: the unassigned group is
/// always "Unassigned", every other group is "Vehicle N" by its position in
/// the breakdown order. A presentation artifact of the current subset,
/// recomputed per view; the raw id stays the true key everywhere else.
pub fn vehicle_display_names(records: &[TollRecord]) -> HashMap<String, String> {
    by_vehicle(records)
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let label = if row.transponder.is_empty() {
                "Unassigned".to_string()
            } else {
                format!("Vehicle {}", i + 1)
            };
            (row.transponder.clone(), label)
        })
        .collect()
}

/// Toll locations ranked descending by total spend, truncated to `limit`.
/// The sort is stable, so ties keep first-encounter order. The one ranking
/// algorithm serves both the whole-period table and the single-day
/// breakdown; callers vary the subset and the limit.
pub fn top_locations(records: &[TollRecord], limit: usize) -> Vec<LocationRow> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<LocationRow> = Vec::new();

    for r in records {
        let location = r.exit_interchange.clone();
        let i = *index.entry(location.clone()).or_insert_with(|| {
            rows.push(LocationRow {
                location: location.clone(),
                count: 0,
                total_cents: 0,
            });
            rows.len() - 1
        });
        rows[i].count += 1;
        rows[i].total_cents += r.amount_cents;
    }

    rows.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
    rows.truncate(limit);
    rows
}

/// The location ranking enriched with the calendar days each location was
/// used, ascending by day.
pub fn top_locations_with_days(records: &[TollRecord], limit: usize) -> Vec<LocationDays> {
    top_locations(records, limit)
        .into_iter()
        .map(|row| {
            let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
            for r in records {
                if r.exit_interchange == row.location {
                    if let Some(day) = r.day() {
                        *by_day.entry(day).or_insert(0) += 1;
                    }
                }
            }
            LocationDays {
                location: row.location,
                count: row.count,
                total_cents: row.total_cents,
                days: by_day
                    .into_iter()
                    .map(|(day, count)| DayCount { day, count })
                    .collect(),
            }
        })
        .collect()
}

/// Location breakdown for one calendar day: the ranking reducer over the
/// day's subset with a generous limit.
pub fn day_location_breakdown(
    records: &[TollRecord],
    day: NaiveDate,
    limit: usize,
) -> Vec<LocationRow> {
    top_locations(&records_on_day(records, day), limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::MISSING_LOCATION;

    fn record(
        amount_cents: i64,
        date: Option<(i32, u32, u32)>,
        transponder: &str,
        location: &str,
    ) -> TollRecord {
        let date = date.map(|(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        });
        TollRecord {
            amount_cents,
            date,
            posting_date: date,
            exit_date: date,
            transaction: String::new(),
            transponder: transponder.to_string(),
            exit_interchange: location.to_string(),
            vehicle_class: String::new(),
            license_state: String::new(),
            license_plate: String::new(),
            raw: Vec::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_trend_ordered_and_summed() {
        let records = vec![
            record(300, Some((2024, 1, 3)), "", "A"),
            record(200, Some((2024, 1, 1)), "", "A"),
            record(300, Some((2024, 1, 1)), "", "B"),
            record(100, None, "", "A"),
        ];
        let trend = daily_trend(&records);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].day, day(2024, 1, 1));
        assert_eq!(trend[0].total_cents, 500);
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[1].day, day(2024, 1, 3));
        assert_eq!(trend[1].total_cents, 300);
    }

    #[test]
    fn test_daily_trend_total_matches_dated_spend() {
        let records = vec![
            record(250, Some((2024, 1, 1)), "", "A"),
            record(175, Some((2024, 1, 2)), "", "B"),
            record(999, None, "", "A"),
        ];
        let trend_total: i64 = daily_trend(&records).iter().map(|p| p.total_cents).sum();
        let dated_total: i64 = records
            .iter()
            .filter(|r| r.date.is_some())
            .map(|r| r.amount_cents)
            .sum();
        assert_eq!(trend_total, dated_total);
    }

    #[test]
    fn test_by_vehicle_totals_and_percentages() {
        let records = vec![
            record(300, None, "A1", "X"),
            record(100, None, "A1", "X"),
            record(600, None, "B2", "X"),
        ];
        let rows = by_vehicle(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].transponder, "B2");
        assert_eq!(rows[0].total_cents, 600);
        assert_eq!(rows[1].total_cents, 400);
        assert!((rows[0].percent - 60.0).abs() < 1e-9);
        assert!((rows.iter().map(|r| r.percent).sum::<f64>() - 100.0).abs() < 1e-9);

        let grand: i64 = rows.iter().map(|r| r.total_cents).sum();
        assert_eq!(grand, total_spend(&records));
    }

    #[test]
    fn test_by_vehicle_zero_grand_total_means_zero_percent() {
        let records = vec![record(0, None, "A1", "X"), record(0, None, "B2", "X")];
        let rows = by_vehicle(&records);
        assert!(rows.iter().all(|r| r.percent == 0.0));
    }

    #[test]
    fn test_by_vehicle_unassigned_is_its_own_group() {
        let records = vec![
            record(100, None, "", "X"),
            record(200, None, "  ", "X"),
            record(300, None, "A1", "X"),
        ];
        let rows = by_vehicle(&records);
        assert_eq!(rows.len(), 2);
        let unassigned = rows.iter().find(|r| r.transponder.is_empty()).unwrap();
        assert_eq!(unassigned.total_cents, 300);
        assert_eq!(unassigned.count, 2);
    }

    #[test]
    fn test_vehicle_display_names_follow_breakdown_order() {
        let records = vec![
            record(600, None, "B2", "X"),
            record(300, None, "", "X"),
            record(100, None, "A1", "X"),
        ];
        let names = vehicle_display_names(&records);
        assert_eq!(names.get("B2").map(String::as_str), Some("Vehicle 1"));
        assert_eq!(names.get("").map(String::as_str), Some("Unassigned"));
        assert_eq!(names.get("A1").map(String::as_str), Some("Vehicle 3"));
    }

    #[test]
    fn test_top_locations_ranked_and_truncated() {
        let records = vec![
            record(200, None, "", "A"),
            record(300, None, "", "B"),
            record(200, None, "", "A"),
            record(100, None, "", MISSING_LOCATION),
        ];
        let rows = top_locations(&records, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "A");
        assert_eq!(rows[0].total_cents, 400);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[1].location, "B");
    }

    #[test]
    fn test_top_locations_ties_keep_encounter_order() {
        let records = vec![
            record(200, None, "", "B"),
            record(200, None, "", "A"),
        ];
        let rows = top_locations(&records, 10);
        assert_eq!(rows[0].location, "B");
        assert_eq!(rows[1].location, "A");
    }

    #[test]
    fn test_top_locations_with_days() {
        let records = vec![
            record(200, Some((2024, 1, 1)), "", "A"),
            record(200, Some((2024, 1, 1)), "", "A"),
            record(200, Some((2024, 1, 3)), "", "A"),
        ];
        let rows = top_locations_with_days(&records, 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].days.len(), 2);
        assert_eq!(rows[0].days[0].day, day(2024, 1, 1));
        assert_eq!(rows[0].days[0].count, 2);
        assert_eq!(rows[0].days[1].count, 1);
    }

    #[test]
    fn test_day_location_breakdown_reuses_ranking() {
        let records = vec![
            record(200, Some((2024, 1, 1)), "", "A"),
            record(500, Some((2024, 1, 2)), "", "B"),
        ];
        let rows = day_location_breakdown(&records, day(2024, 1, 1), 20);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location, "A");
    }

    #[test]
    fn test_empty_input_yields_empty_results() {
        let records: Vec<TollRecord> = Vec::new();
        assert!(daily_trend(&records).is_empty());
        assert!(by_vehicle(&records).is_empty());
        assert!(top_locations(&records, 10).is_empty());
        assert_eq!(total_spend(&records), 0);
    }
}
