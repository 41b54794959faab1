use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    error::LookupError,
    http::{join, parse_base_url, truncate_body},
    model::{ForecastOutcome, HourlyForecastEntry, LocationKey},
};

use super::ForecastProvider;

#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    api_key: String,
    base_url: Url,
    search_url: Url,
    http: Client,
}

impl AccuWeatherClient {
    pub fn new(http: Client, base_url: &str, api_key: String) -> Result<Self> {
        let base_url = parse_base_url(base_url, "AccuWeather")?;
        let search_url = join(&base_url, "locations/v1/cities/search")?;

        Ok(Self { api_key, base_url, search_url, http })
    }
}

#[derive(Debug, Deserialize)]
struct AwLocation {
    #[serde(rename = "Key")]
    key: String,
}

#[derive(Debug, Deserialize)]
struct AwValue {
    #[serde(rename = "Value")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct AwWind {
    #[serde(rename = "Speed")]
    speed: AwValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwHourly {
    date_time: DateTime<FixedOffset>,
    temperature: AwValue,
    real_feel_temperature: AwValue,
    wind: AwWind,
    wind_gust: AwWind,
    precipitation_probability: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AwError {
    code: String,
    message: String,
}

impl AwHourly {
    fn into_entry(self) -> HourlyForecastEntry {
        HourlyForecastEntry {
            timestamp: self.date_time,
            temperature: self.temperature.value,
            feels_like: self.real_feel_temperature.value,
            wind_speed: self.wind.speed.value,
            wind_gust: self.wind_gust.speed.value,
            precipitation_probability: self.precipitation_probability,
        }
    }
}

#[async_trait]
impl ForecastProvider for AccuWeatherClient {
    async fn search_location(&self, query: &str) -> Result<LocationKey, LookupError> {
        let res = self
            .http
            .get(self.search_url.clone())
            .query(&[("apikey", self.api_key.as_str()), ("q", query)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(LookupError::Status { status, body: truncate_body(&body) });
        }

        let candidates: Vec<AwLocation> = serde_json::from_str(&body)?;

        candidates
            .into_iter()
            .next()
            .map(|loc| LocationKey::new(loc.key))
            .ok_or_else(|| LookupError::NoCandidates(query.to_string()))
    }

    async fn hourly_forecast(&self, key: &LocationKey) -> Result<ForecastOutcome> {
        let url = join(&self.base_url, &format!("forecasts/v1/hourly/12hour/{key}"))?;

        let res = self
            .http
            .get(url)
            .query(&[("apikey", self.api_key.as_str()), ("details", "true")])
            .send()
            .await
            .context("Failed to send request to AccuWeather (12 hour forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read AccuWeather forecast response body")?;

        if !status.is_success() {
            let parsed: AwError = serde_json::from_str(&body).map_err(|e| {
                anyhow!(
                    "AccuWeather forecast request failed with status {} and an unreadable error body ({}): {}",
                    status,
                    e,
                    truncate_body(&body),
                )
            })?;

            return Ok(ForecastOutcome::Failed { code: parsed.code, message: parsed.message });
        }

        let parsed: Vec<AwHourly> =
            serde_json::from_str(&body).context("Failed to parse AccuWeather forecast JSON")?;

        Ok(ForecastOutcome::Hourly(parsed.into_iter().map(AwHourly::into_entry).collect()))
    }
}
