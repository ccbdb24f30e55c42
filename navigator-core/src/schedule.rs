use chrono::{DateTime, Utc};
use navigator_shared::{Flight, FlightStatus};
use std::ops::Deref;

/// Tracked flights split by departure time. Flights without a departure time
/// are in neither list.
#[derive(Debug, Clone, PartialEq)]
pub struct DeparturePartition<T> {
    pub upcoming: Vec<T>,
    pub past: Vec<T>,
}

impl<T> DeparturePartition<T>
where
    T: Deref<Target = Flight>,
{
    pub fn delayed_upcoming(&self) -> impl Iterator<Item = &T> {
        self.upcoming
            .iter()
            .filter(|flight| flight.status == FlightStatus::Delayed)
    }
}

/// `departure > now` is upcoming, `departure <= now` is past.
pub fn partition_by_departure<T>(flights: &[T], now: DateTime<Utc>) -> DeparturePartition<T>
where
    T: Deref<Target = Flight> + Clone,
{
    let mut partition = DeparturePartition { upcoming: Vec::new(), past: Vec::new() };
    for flight in flights {
        match flight.departure_time {
            Some(departure) if departure > now => partition.upcoming.push(flight.clone()),
            Some(_) => partition.past.push(flight.clone()),
            None => {}
        }
    }
    partition
}

/// Human readable time left before departure.
pub fn time_until_departure(departure: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<String> {
    let departure = departure?;
    let diff = departure - now;
    if diff.num_milliseconds() < 0 {
        return Some("Departed".to_string());
    }
    let hours = diff.num_hours();
    let minutes = diff.num_minutes() % 60;
    if hours == 0 {
        Some(format!("{}m", minutes))
    } else {
        Some(format!("{}h {}m", hours, minutes))
    }
}
