//! Domain models for trips, weather and packing lists

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::TripMateError;

/// Inclusive calendar date range with validated ordering
///
/// Constructed through [`DateRange::new`] or [`DateRange::parse`] only, so
/// a value always satisfies `start <= end`. Dates are day-granular; the
/// canonical string form is `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range
    pub start: NaiveDate,
    /// Last day of the range (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `end < start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TripMateError> {
        if end < start {
            return Err(TripMateError::validation(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from ISO `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, TripMateError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    /// Whether a date falls inside the range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Cache key for a location + range, canonicalized to day granularity
    #[must_use]
    pub fn cache_key(&self, location: &str) -> String {
        // NaiveDate's Display is already YYYY-MM-DD
        format!("{location}-{}-{}", self.start, self.end)
    }
}

/// Parse a single ISO `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate, TripMateError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| TripMateError::validation(format!("invalid date: {input}")))
}

/// A user's planned visit to a location over a date range
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    /// Trip id
    pub id: i64,
    /// Owning user reference (resolved by the auth collaborator)
    pub user_id: i64,
    /// Free-text place name
    pub location: String,
    /// First day of the trip
    pub start_date: NaiveDate,
    /// Last day of the trip (inclusive)
    pub end_date: NaiveDate,
}

impl Trip {
    /// The trip's current date range
    #[must_use]
    pub fn date_range(&self) -> DateRange {
        // Stored rows always came through DateRange validation
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// One calendar day's normalized forecast persisted for a trip
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeatherDay {
    /// Row id
    pub id: i64,
    /// Owning trip
    pub trip_id: i64,
    /// Calendar date
    pub date: NaiveDate,
    /// Minimum temperature
    pub tempmin: f64,
    /// Maximum temperature
    pub tempmax: f64,
    /// Precipitation probability in percent
    pub precipprob: f64,
    /// Condition label, e.g. "Rain, Partially cloudy"
    pub conditions: String,
    /// Icon token from the provider
    pub icon: String,
    /// Longer condition description, when the provider sends one
    pub description: Option<String>,
}

/// One day of the normalized weather payload (not yet persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    /// Calendar date
    pub date: NaiveDate,
    /// Minimum temperature
    pub tempmin: f64,
    /// Maximum temperature
    pub tempmax: f64,
    /// Precipitation probability in percent
    pub precipprob: f64,
    /// Condition label
    pub conditions: String,
    /// Icon token
    pub icon: String,
    /// Longer condition description
    pub description: Option<String>,
}

/// Current alert summary derived from the provider's alert list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    /// Alert event name, or "No current alerts"
    pub event: String,
    /// Link to alert details, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl WeatherAlert {
    /// The sentinel alert used when the provider reports none
    #[must_use]
    pub fn none() -> Self {
        Self {
            event: "No current alerts".to_string(),
            link: None,
        }
    }
}

/// Normalized weather payload for a trip's location and date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripWeather {
    /// Address the provider resolved the location to
    #[serde(rename = "resolvedAddress")]
    pub resolved_address: String,
    /// Overall description for the range
    pub description: String,
    /// Current alert summary (first alert only)
    pub alert: WeatherAlert,
    /// Day-by-day forecast
    pub days: Vec<DayForecast>,
}

/// An activity planned for a trip
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    /// Activity id
    pub id: i64,
    /// Owning trip
    pub trip_id: i64,
    /// Date the activity is planned for
    pub date: NaiveDate,
    /// Free-text description
    pub description: String,
}

/// An item on a trip's packing list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PackingItem {
    /// Item id
    pub id: i64,
    /// Owning trip
    pub trip_id: i64,
    /// Item name
    pub item_name: String,
    /// Optional category, e.g. "clothing"
    pub category: Option<String>,
    /// Whether the item has been packed
    pub is_checked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted_order() {
        let err = DateRange::new(date("2025-07-10"), date("2025-07-01")).unwrap_err();
        assert!(matches!(err, TripMateError::Validation { .. }));
    }

    #[test]
    fn test_date_range_allows_single_day() {
        let range = DateRange::new(date("2025-07-10"), date("2025-07-10")).unwrap();
        assert!(range.contains(date("2025-07-10")));
        assert!(!range.contains(date("2025-07-11")));
    }

    #[test]
    fn test_parse_rejects_ambiguous_input() {
        assert!(DateRange::parse("07/01/2025", "07/10/2025").is_err());
        assert!(DateRange::parse("2025-7-1x", "2025-07-10").is_err());
    }

    #[test]
    fn test_cache_key_is_canonical() {
        let range = DateRange::parse("2025-07-01", "2025-07-10").unwrap();
        assert_eq!(range.cache_key("Paris"), "Paris-2025-07-01-2025-07-10");
    }

    #[test]
    fn test_alert_sentinel() {
        let alert = WeatherAlert::none();
        assert_eq!(alert.event, "No current alerts");
        assert!(alert.link.is_none());
    }

    #[test]
    fn test_trip_weather_serializes_resolved_address() {
        let weather = TripWeather {
            resolved_address: "Paris, France".to_string(),
            description: "Mild".to_string(),
            alert: WeatherAlert::none(),
            days: vec![],
        };
        let json = serde_json::to_value(&weather).unwrap();
        assert_eq!(json["resolvedAddress"], "Paris, France");
        assert!(json["alert"].get("link").is_none());
    }
}
