use jiff::{Timestamp, civil::Weekday, tz::TimeZone};

use crate::location::Location;

/// The calendar context of one collection run, derived once at run start so
/// that every batch of the run shares the same timestamp, day and hour.
#[derive(Debug, Clone)]
pub struct RunStamp {
    pub collected_at: Timestamp,
    pub day_of_week: String,
    pub hour: i32,
}

impl RunStamp {
    pub fn now() -> Self {
        Self::from_timestamp(Timestamp::now())
    }

    pub fn from_timestamp(collected_at: Timestamp) -> Self {
        let zoned = collected_at.to_zoned(TimeZone::UTC);

        RunStamp {
            collected_at,
            day_of_week: weekday_name(zoned.weekday()).to_string(),
            hour: zoned.hour() as i32,
        }
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}

/// One normalized origin/destination cell of a provider response, before the
/// run context is attached. Indices refer to the origin and destination
/// slices the provider call was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixCell {
    pub origin: usize,
    pub dest: usize,
    pub distance_m: i32,
    pub duration_s: i32,
    pub duration_in_traffic_s: i32,
}

/// One row of the traffic_data table. Append-only; repeated runs accumulate
/// rows at hourly granularity by design.
#[derive(Debug, Clone)]
pub struct Observation {
    pub collected_at: Timestamp,
    pub day_of_week: String,
    pub hour: i32,
    pub origin_name: String,
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub dest_name: String,
    pub dest_lat: f64,
    pub dest_lng: f64,
    pub distance_m: i32,
    pub duration_s: i32,
    pub duration_in_traffic_s: i32,
}

impl Observation {
    pub fn from_cell(
        stamp: &RunStamp,
        origins: &[Location],
        destinations: &[Location],
        cell: &MatrixCell,
    ) -> Self {
        let origin = &origins[cell.origin];
        let dest = &destinations[cell.dest];

        Observation {
            collected_at: stamp.collected_at,
            day_of_week: stamp.day_of_week.clone(),
            hour: stamp.hour,
            origin_name: origin.name.clone(),
            origin_lat: origin.lat,
            origin_lng: origin.lng,
            dest_name: dest.name.clone(),
            dest_lat: dest.lat,
            dest_lng: dest.lng,
            distance_m: cell.distance_m,
            duration_s: cell.duration_s,
            duration_in_traffic_s: cell.duration_in_traffic_s,
        }
    }
}
