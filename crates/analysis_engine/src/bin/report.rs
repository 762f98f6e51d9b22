use std::collections::HashMap;
use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use analysis_engine::{
    by_vehicle, daily_trend, filter_records, infer_journeys, top_locations_with_days, total_spend,
    travel_summary, vehicle_display_names,
};
use models::{
    DailyTrendPoint, JourneySummary, LocationDays, PeriodSpec, TravelBehaviorSummary,
    VehicleBreakdownRow, VehicleTagQuery,
};

const TOP_LOCATIONS_LIMIT: usize = 10;

/// Everything the reporting layer needs from one statement, as one plain
/// JSON document.
#[derive(Serialize)]
struct Report {
    file: String,
    period: String,
    records_loaded: usize,
    records_analyzed: usize,
    total_cents: i64,
    total_display: String,
    daily_trend: Vec<DailyTrendPoint>,
    by_vehicle: Vec<VehicleBreakdownRow>,
    vehicle_labels: HashMap<String, String>,
    top_locations: Vec<LocationDays>,
    journeys: JourneySummary,
    travel: TravelBehaviorSummary,
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| anyhow!("bad date '{}': {}", s, e))
}

// Usage:
//   toll-report --input <statement.csv|.xlsx>
//               [--period all|month|quarter|year|custom]
//               [--anchor YYYY-MM-DD] [--start YYYY-MM-DD] [--end YYYY-MM-DD]
//               [--tags "006 11743677"] [--out report.json]
// If --out is omitted or "-", prints the report to stdout.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let input =
        arg_value(&args, "--input").ok_or_else(|| anyhow!("missing --input <statement file>"))?;
    let period_name = arg_value(&args, "--period").unwrap_or_else(|| "all".to_string());
    let anchor = arg_value(&args, "--anchor")
        .map(|s| parse_day(&s))
        .transpose()?;
    let start = arg_value(&args, "--start")
        .map(|s| parse_day(&s))
        .transpose()?;
    let end = arg_value(&args, "--end").map(|s| parse_day(&s)).transpose()?;
    let tags = VehicleTagQuery::parse(&arg_value(&args, "--tags").unwrap_or_default());
    let out = arg_value(&args, "--out").unwrap_or_else(|| "-".to_string());

    let period = match period_name.as_str() {
        "all" => PeriodSpec::All,
        "month" => PeriodSpec::Month(anchor),
        "quarter" => PeriodSpec::Quarter(anchor),
        "year" => PeriodSpec::Year(anchor),
        "custom" => PeriodSpec::Custom { start, end },
        other => return Err(anyhow!("unknown period '{}'", other)),
    };

    let bytes = fs::read(&input).with_context(|| format!("Reading {}", input))?;
    let records = turnpike_parser::parse_statement(&input, &bytes)
        .with_context(|| format!("Normalizing {}", input))?;
    let subset = filter_records(&records, period, &tags);

    let total_cents = total_spend(&subset);
    let report = Report {
        file: input,
        period: period_name,
        records_loaded: records.len(),
        records_analyzed: subset.len(),
        total_cents,
        total_display: format!("${:.2}", total_cents as f64 / 100.0),
        daily_trend: daily_trend(&subset),
        by_vehicle: by_vehicle(&subset),
        vehicle_labels: vehicle_display_names(&subset),
        top_locations: top_locations_with_days(&subset, TOP_LOCATIONS_LIMIT),
        journeys: infer_journeys(&subset),
        travel: travel_summary(&subset, period),
    };

    let json = serde_json::to_string_pretty(&report)?;
    if out == "-" {
        println!("{}", json);
    } else {
        fs::write(&out, &json).with_context(|| format!("Writing {}", out))?;
        println!("Wrote report to {}", out);
    }

    Ok(())
}
