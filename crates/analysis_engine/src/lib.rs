//! Stateless analysis over normalized toll records: period/tag filtering
//! plus the aggregate family a reporting layer renders (daily trend, vehicle
//! breakdown, location ranking, journey inference, travel summary).
//!
//! Every function here is a pure computation over an immutable slice and
//! returns plain serializable values, so callers can recompute on any input
//! change and simply discard superseded results.

pub mod aggregate;
pub mod filter;
pub mod journeys;

pub use crate::aggregate::{
    by_vehicle, daily_trend, day_location_breakdown, top_locations, top_locations_with_days,
    total_spend, vehicle_display_names,
};
pub use crate::filter::{filter_records, records_on_day};
pub use crate::journeys::{fuel_estimate, infer_journeys, travel_summary, weeks_in_period};
