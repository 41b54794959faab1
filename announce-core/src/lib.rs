//! Core library for the `announce` morning mailer.
//!
//! This crate defines:
//! - Configuration (environment secrets, TOML settings, the location key store)
//! - The AccuWeather forecast client and the NYC parking calendar client
//! - Report rendering and the SMTP notifier
//! - The pipeline that runs them in order
//!
//! It is used by `announce-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod notify;
pub mod parking;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod store;

pub use config::{Config, Settings};
pub use error::{LookupError, ParkingError};
pub use model::{ForecastOutcome, HourlyForecastEntry, LocationKey, ParkingStatus, Report};
pub use notify::{Notifier, SmtpNotifier};
pub use parking::{NycParkingClient, ParkingCalendar};
pub use provider::{ForecastProvider, accuweather::AccuWeatherClient};
pub use store::LocationStore;
