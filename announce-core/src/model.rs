use chrono::{DateTime, FixedOffset, Timelike};
use std::fmt;

/// Provider-assigned identifier for a searched location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey(String);

impl LocationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One hour of forecast data, as reported by the weather provider.
///
/// The timestamp keeps the provider's UTC offset so that `hour()` is the
/// provider-local hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyForecastEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
    pub feels_like: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub precipitation_probability: u8,
}

impl HourlyForecastEntry {
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Result of an hourly forecast request that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Hourly(Vec<HourlyForecastEntry>),
    /// The provider answered with a failure status and its own error record.
    Failed { code: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkingStatus {
    InEffect,
    Suspended,
    Unknown,
}

impl ParkingStatus {
    pub fn from_calendar(status: &str) -> Self {
        match status {
            "IN EFFECT" => ParkingStatus::InEffect,
            "SUSPENDED" => ParkingStatus::Suspended,
            _ => ParkingStatus::Unknown,
        }
    }

    /// Sentence for the report. Unrecognized statuses produce nothing.
    pub fn sentence(&self) -> Option<&'static str> {
        match self {
            ParkingStatus::InEffect => Some("ASP is in effect today."),
            ParkingStatus::Suspended => Some("ASP is NOT in effect today."),
            ParkingStatus::Unknown => None,
        }
    }
}

/// A composed email, ready for a [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}
