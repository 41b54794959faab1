//! End-to-end runs of the morning pipeline against mock HTTP servers and a
//! recording notifier.

use announce_core::{
    AccuWeatherClient, Config, LocationKey, LocationStore, Notifier, NycParkingClient, Report,
    Settings, pipeline,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Report>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, report: &Report) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }
}

#[derive(Debug)]
struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _report: &Report) -> anyhow::Result<()> {
        anyhow::bail!("535 5.7.8 Username and Password not accepted")
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn hour(ts: &str, temp: f64, feel: f64, wind: f64, gust: f64, precip: u8) -> serde_json::Value {
    json!({
        "DateTime": ts,
        "Temperature": {"Value": temp, "Unit": "F"},
        "RealFeelTemperature": {"Value": feel, "Unit": "F"},
        "Wind": {"Speed": {"Value": wind, "Unit": "mi/h"}},
        "WindGust": {"Speed": {"Value": gust, "Unit": "mi/h"}},
        "PrecipitationProbability": precip
    })
}

async fn mount_forecast(server: &MockServer, key: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/forecasts/v1/hourly/12hour/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            hour("2026-10-19T08:00:00-04:00", 52.3, 49.9, 7.1, 12.2, 5),
            hour("2026-10-19T09:00:00-04:00", 54.6, 51.2, 9.2, 17.3, 7),
            hour("2026-10-19T12:00:00-04:00", 60.0, 60.0, 10.0, 15.0, 20),
            hour("2026-10-19T17:00:00-04:00", 63.4, 61.8, 11.6, 19.9, 40),
            hour("2026-10-19T20:00:00-04:00", 58.0, 57.0, 6.0, 9.0, 55),
        ])))
        .mount(server)
        .await;
}

async fn mount_parking(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/public/api/GetCalendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "days": [{"items": [{"status": status, "type": "Alternate Side Parking"}]}]
        })))
        .mount(server)
        .await;
}

fn clients(server: &MockServer) -> (AccuWeatherClient, NycParkingClient) {
    let http = reqwest::Client::new();
    let weather = AccuWeatherClient::new(http.clone(), &server.uri(), "KEY".into()).unwrap();
    let parking =
        NycParkingClient::new(http, &format!("{}/public/api/", server.uri()), "nyc".into()).unwrap();
    (weather, parking)
}

/// Config as a fresh process would see it after loading the env file.
fn config_from_env_file(env_file: &Path) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    for item in dotenvy::from_path_iter(env_file).unwrap() {
        let (name, value) = item.unwrap();
        vars.entry(name).or_insert(value);
    }

    Config::from_lookup(|name| vars.get(name).cloned(), Settings::default()).unwrap()
}

const ENV_FILE: &str = "ACCU_API_KEY='KEY'\n\
EMAIL_ORIGIN='me@example.com'\n\
EMAIL_DESTINATIONS='a@example.com, b@example.com'\n\
GMAIL_PWORD='secret'\n\
NYC_PRIMARY_KEY='nyc'";

#[tokio::test]
async fn cached_key_run_renders_two_blocks_then_parking() {
    let server = MockServer::start().await;
    mount_forecast(&server, "349727").await;
    mount_parking(&server, "SUSPENDED").await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Key": "999"}])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocationStore::new(dir.path().join(".env"));
    let (weather, parking) = clients(&server);
    let notifier = RecordingNotifier::default();
    let cached = LocationKey::new("349727");

    let key = pipeline::resolve_location_key(Some(&cached), &weather, &store, || {
        panic!("prompt must not run when a key is cached")
    })
    .await
    .unwrap();

    let report = pipeline::announce(&weather, &parking, &notifier, &key, today()).await.unwrap();

    let expected = "Good Morning!\n\nHere are today's commute weather conditions:\n\n\
        Weather at 9 a.m.:\nTemp 55°\nFeel 51°\nWind 9 mph\nGusts 17 mph\nPrecip 7%\n\n\
        Weather at 5 p.m.:\nTemp 63°\nFeel 62°\nWind 12 mph\nGusts 20 mph\nPrecip 40%\n\n\
        ASP is NOT in effect today.\n\nHave a good one!";

    assert_eq!(report.subject, "Morning Announcements");
    assert_eq!(report.body, expected);
    assert_eq!(report.body.matches("Weather at").count(), 2);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.as_slice(), [report]);
    assert!(!store.path().exists(), "cached runs must not touch the store");
}

#[tokio::test]
async fn forecast_failure_is_embedded_in_the_body() {
    let server = MockServer::start().await;
    mount_parking(&server, "IN EFFECT").await;

    Mock::given(method("GET"))
        .and(path("/forecasts/v1/hourly/12hour/349727"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "Code": "ServiceUnavailable",
            "Message": "The allowed number of requests has been exceeded."
        })))
        .mount(&server)
        .await;

    let (weather, parking) = clients(&server);
    let notifier = RecordingNotifier::default();

    let report = pipeline::announce(&weather, &parking, &notifier, &LocationKey::new("349727"), today())
        .await
        .unwrap();

    assert_eq!(
        report.body,
        "Good Morning!\n\nHere are today's commute weather conditions:\n\n\
         Error code: ServiceUnavailable\nMessage: The allowed number of requests has been exceeded.\n\n\
         ASP is in effect today.\n\nHave a good one!"
    );
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_parking_status_adds_nothing() {
    let server = MockServer::start().await;
    mount_forecast(&server, "349727").await;
    mount_parking(&server, "RULES SUSPENDED FOR SNOW").await;

    let (weather, parking) = clients(&server);

    let report = pipeline::build_report(&weather, &parking, &LocationKey::new("349727"), today())
        .await
        .unwrap();

    assert!(report.body.ends_with("Precip 40%\n\n\n\nHave a good one!"));
    assert!(!report.body.contains("ASP"));
}

#[tokio::test]
async fn send_failure_propagates() {
    let server = MockServer::start().await;
    mount_forecast(&server, "349727").await;
    mount_parking(&server, "IN EFFECT").await;

    let (weather, parking) = clients(&server);

    let err = pipeline::announce(&weather, &parking, &FailingNotifier, &LocationKey::new("349727"), today())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Username and Password not accepted"));
}

#[tokio::test]
async fn resolved_key_is_persisted_and_reused() {
    let server = MockServer::start().await;
    mount_forecast(&server, "349727").await;
    mount_parking(&server, "IN EFFECT").await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .and(query_param("q", "10001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Key": "349727"}])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, ENV_FILE).unwrap();
    let store = LocationStore::new(&env_file);
    let (weather, parking) = clients(&server);

    // First run: nothing cached, so the prompt answers and the resolver runs.
    let first = config_from_env_file(&env_file);
    assert_eq!(first.location_key, None);

    let key = pipeline::resolve_location_key(first.location_key.as_ref(), &weather, &store, || {
        Ok(" 10001 ".to_string())
    })
    .await
    .unwrap();
    assert_eq!(key, LocationKey::new("349727"));

    let notifier = RecordingNotifier::default();
    pipeline::announce(&weather, &parking, &notifier, &key, today()).await.unwrap();

    // Second run: the persisted key is picked up and no search happens.
    let second = config_from_env_file(&env_file);
    assert_eq!(second.location_key, Some(LocationKey::new("349727")));

    let again = pipeline::resolve_location_key(second.location_key.as_ref(), &weather, &store, || {
        panic!("prompt must not run on the second run")
    })
    .await
    .unwrap();
    assert_eq!(again, key);

    pipeline::announce(&weather, &parking, &notifier, &again, today()).await.unwrap();
    assert_eq!(notifier.sent.lock().unwrap().len(), 2);

    // The search mock's expect(1) is verified when the server drops.
}

#[tokio::test]
async fn failed_lookup_is_fatal_and_persists_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = LocationStore::new(dir.path().join(".env"));
    let (weather, _) = clients(&server);

    let err = pipeline::resolve_location_key(None, &weather, &store, || Ok("Atlantis".to_string()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to resolve location 'Atlantis'"));
    assert!(!store.path().exists());
}
