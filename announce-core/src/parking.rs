//! New York City alternate side parking calendar.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url, header::CACHE_CONTROL};
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config,
    error::ParkingError,
    http::{join, parse_base_url, truncate_body},
    model::ParkingStatus,
};

#[async_trait]
pub trait ParkingCalendar: Send + Sync + Debug {
    async fn status_for(&self, date: NaiveDate) -> Result<ParkingStatus, ParkingError>;
}

#[derive(Debug, Clone)]
pub struct NycParkingClient {
    subscription_key: String,
    calendar_url: Url,
    http: Client,
}

impl NycParkingClient {
    const SUBSCRIPTION_HEADER: &'static str = "Ocp-Apim-Subscription-Key";

    pub fn new(http: Client, base_url: &str, subscription_key: String) -> anyhow::Result<Self> {
        let base = parse_base_url(base_url, "NYC API")?;
        let calendar_url = join(&base, "GetCalendar")?;

        Ok(Self { subscription_key, calendar_url, http })
    }

    pub fn from_config(config: &Config, http: Client) -> anyhow::Result<Self> {
        Self::new(http, &config.settings.nyc_url, config.nyc_primary_key.clone())
    }
}

#[derive(Debug, Deserialize)]
struct CalendarItem {
    status: String,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    items: Vec<CalendarItem>,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    days: Vec<CalendarDay>,
}

/// Status of the first item of the first day, as the calendar reports it.
fn first_status(body: &str) -> Result<String, ParkingError> {
    let parsed: CalendarResponse = serde_json::from_str(body)?;

    let day = parsed.days.into_iter().next().ok_or(ParkingError::Missing("day"))?;
    let item = day.items.into_iter().next().ok_or(ParkingError::Missing("item"))?;

    Ok(item.status)
}

#[async_trait]
impl ParkingCalendar for NycParkingClient {
    async fn status_for(&self, date: NaiveDate) -> Result<ParkingStatus, ParkingError> {
        let day = date.format("%Y-%m-%d").to_string();

        let res = self
            .http
            .get(self.calendar_url.clone())
            .query(&[("fromdate", day.as_str()), ("todate", day.as_str())])
            .header(CACHE_CONTROL, "no-cache")
            .header(Self::SUBSCRIPTION_HEADER, self.subscription_key.as_str())
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ParkingError::Status { status, body: truncate_body(&body) });
        }

        let raw = first_status(&body)?;
        let parking = ParkingStatus::from_calendar(&raw);

        if parking == ParkingStatus::Unknown {
            tracing::warn!(message = "unrecognized parking status", status = %raw, date = %day);
        }

        Ok(parking)
    }
}
