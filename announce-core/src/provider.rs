use crate::{
    Config, LocationKey,
    error::LookupError,
    model::ForecastOutcome,
    provider::accuweather::AccuWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod accuweather;

#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Resolve a zip code or "City, State" to the first matching location key.
    async fn search_location(&self, query: &str) -> Result<LocationKey, LookupError>;

    /// Fetch the next 12 hours of hourly forecast data.
    ///
    /// A provider failure status is returned as [`ForecastOutcome::Failed`];
    /// only transport and decoding failures are errors.
    async fn hourly_forecast(&self, key: &LocationKey) -> anyhow::Result<ForecastOutcome>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(
    config: &Config,
    http: reqwest::Client,
) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let client =
        AccuWeatherClient::new(http, &config.settings.accuweather_url, config.accu_api_key.clone())?;

    Ok(Box::new(client))
}
