//! The morning run: resolve location, fetch forecast, fetch parking status,
//! compose the report and hand it to a notifier. Every step is awaited in order.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::{
    model::{ForecastOutcome, LocationKey, Report},
    notify::Notifier,
    parking::ParkingCalendar,
    provider::ForecastProvider,
    report,
    store::LocationStore,
};

/// Look up `location` with the provider and append the key to the store.
pub async fn locate<P>(provider: &P, store: &LocationStore, location: &str) -> Result<LocationKey>
where
    P: ForecastProvider + ?Sized,
{
    tracing::info!(message = "resolving location", location = %location);

    let key = provider
        .search_location(location)
        .await
        .with_context(|| format!("Failed to resolve location '{location}'"))?;

    store.append_location_key(&key)?;
    Ok(key)
}

/// Use the cached key when there is one, otherwise ask for a location and resolve it.
pub async fn resolve_location_key<P, F>(
    cached: Option<&LocationKey>,
    provider: &P,
    store: &LocationStore,
    prompt: F,
) -> Result<LocationKey>
where
    P: ForecastProvider + ?Sized,
    F: FnOnce() -> Result<String>,
{
    if let Some(key) = cached {
        tracing::debug!(message = "using cached location key", key = %key);
        return Ok(key.clone());
    }

    let location = prompt()?;
    locate(provider, store, location.trim()).await
}

/// Forecast section text. Provider failure statuses are embedded, not raised.
pub async fn forecast_text<P>(provider: &P, key: &LocationKey) -> Result<String>
where
    P: ForecastProvider + ?Sized,
{
    let outcome = provider.hourly_forecast(key).await?;

    if let ForecastOutcome::Failed { code, message } = &outcome {
        tracing::warn!(message = "forecast provider returned an error", code = %code, detail = %message);
    }

    Ok(report::render_forecast(&outcome))
}

pub async fn parking_text<C>(calendar: &C, date: NaiveDate) -> Result<Option<&'static str>>
where
    C: ParkingCalendar + ?Sized,
{
    let status = calendar
        .status_for(date)
        .await
        .with_context(|| format!("Failed to fetch parking status for {date}"))?;

    tracing::info!(message = "fetched parking status", status = ?status);
    Ok(status.sentence())
}

pub async fn build_report<P, C>(
    provider: &P,
    calendar: &C,
    key: &LocationKey,
    today: NaiveDate,
) -> Result<Report>
where
    P: ForecastProvider + ?Sized,
    C: ParkingCalendar + ?Sized,
{
    let weather = forecast_text(provider, key).await?;
    tracing::info!(message = "fetched forecast", key = %key);

    let parking = parking_text(calendar, today).await?;

    Ok(report::compose(&weather, parking))
}

/// Build today's report and send it. Send failures are returned to the caller.
pub async fn announce<P, C, N>(
    provider: &P,
    calendar: &C,
    notifier: &N,
    key: &LocationKey,
    today: NaiveDate,
) -> Result<Report>
where
    P: ForecastProvider + ?Sized,
    C: ParkingCalendar + ?Sized,
    N: Notifier + ?Sized,
{
    let report = build_report(provider, calendar, key, today).await?;
    notifier.send(&report).await?;
    Ok(report)
}
