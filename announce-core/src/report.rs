//! Rendering of forecast entries and composition of the final email body.

use crate::model::{ForecastOutcome, HourlyForecastEntry, Report};

pub const SUBJECT: &str = "Morning Announcements";

/// Hours of the day (provider-local) that make it into the report.
pub const ALERT_HOURS: [u32; 2] = [9, 17];

const GREETING: &str = "Good Morning!\n\nHere are today's commute weather conditions:\n\n";
const SIGN_OFF: &str = "\n\nHave a good one!";

/// Entries at one of the alert hours, in payload order.
pub fn select_alert_entries(entries: &[HourlyForecastEntry]) -> Vec<&HourlyForecastEntry> {
    entries
        .iter()
        .filter(|e| ALERT_HOURS.contains(&e.hour()))
        .collect()
}

/// 12-hour label for a 24-hour hour. Noon is left as a bare "12".
pub fn hour_label(hour: u32) -> String {
    if hour > 12 {
        format!("{} p.m.", hour - 12)
    } else if hour < 12 {
        format!("{hour} a.m.")
    } else {
        hour.to_string()
    }
}

/// Round half to even, so 2.5 becomes 2 and 3.5 becomes 4.
pub fn round_whole(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub fn render_entry(entry: &HourlyForecastEntry) -> String {
    format!(
        "Weather at {}:\nTemp {}\u{b0}\nFeel {}\u{b0}\nWind {} mph\nGusts {} mph\nPrecip {}%\n\n",
        hour_label(entry.hour()),
        round_whole(entry.temperature),
        round_whole(entry.feels_like),
        round_whole(entry.wind_speed),
        round_whole(entry.wind_gust),
        entry.precipitation_probability,
    )
}

pub fn render_error(code: &str, message: &str) -> String {
    format!("Error code: {code}\nMessage: {message}\n\n")
}

/// Forecast section of the report. Provider failures become text, never errors.
pub fn render_forecast(outcome: &ForecastOutcome) -> String {
    match outcome {
        ForecastOutcome::Hourly(entries) => select_alert_entries(entries)
            .into_iter()
            .map(render_entry)
            .collect(),
        ForecastOutcome::Failed { code, message } => render_error(code, message),
    }
}

/// Wrap the forecast text and parking sentence in the fixed greeting and sign-off.
///
/// The parking sentence follows the forecast text directly; the forecast text
/// already ends with a blank line.
pub fn compose(forecast: &str, parking: Option<&str>) -> Report {
    let body = format!("{GREETING}{forecast}{}{SIGN_OFF}", parking.unwrap_or_default());

    Report { subject: SUBJECT.to_string(), body }
}
