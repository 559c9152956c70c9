//! HTTP client for the sunrise-sunset.org JSON API.
//!
//! Requests `?lat=..&lng=..&date=YYYY-MM-DD&formatted=0`, which returns RFC 3339
//! UTC instants:
//!
//! ```json
//! {"results": {"sunrise": "2025-06-21T10:17:43+00:00", "sunset": "2025-06-22T01:29:51+00:00", "day_length": 54128}, "status": "OK"}
//! ```
//!
//! On dates without a sunrise or sunset both instants are `1970-01-01T00:00:01+00:00`
//! and `day_length` tells polar night (0) from midnight sun (86400).

use chrono::{DateTime, Local, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{FetchError, TimeWindowProvider};
use crate::config::Config;
use crate::core::window::{DayWindow, Location};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResults {
    sunrise: String,
    sunset: String,
    #[serde(default)]
    day_length: Option<u64>,
}

/// Unix time the API reports for a sunrise or sunset that does not happen.
const NO_EVENT_TIMESTAMP: i64 = 1;

const SECONDS_PER_DAY: u64 = 86_400;

/// Blocking provider backed by `reqwest`.
pub struct SunriseSunsetProvider {
    client: Client,
    api_url: String,
}

impl SunriseSunsetProvider {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("autotheme/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(config.api_url(), config.request_timeout())
    }
}

impl TimeWindowProvider for SunriseSunsetProvider {
    fn fetch(&self, location: &Location, date: NaiveDate) -> Result<DayWindow, FetchError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lng", location.longitude.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
                ("formatted", "0".to_string()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text()?;
        parse_response(&body, date)
    }

    fn name(&self) -> &'static str {
        "sunrise-sunset.org"
    }
}

/// Turn an API response body into a window for `date`.
pub(crate) fn parse_response(body: &str, date: NaiveDate) -> Result<DayWindow, FetchError> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if parsed.status != "OK" {
        return Err(FetchError::RemoteStatus(parsed.status));
    }

    // Error responses carry `"results": ""`, so the shape is only checked after the status.
    let results: ApiResults = serde_json::from_value(parsed.results)
        .map_err(|e| FetchError::Parse(format!("results: {e}")))?;

    let sunrise = parse_instant("sunrise", &results.sunrise)?;
    let sunset = parse_instant("sunset", &results.sunset)?;

    if sunrise.timestamp() == NO_EVENT_TIMESTAMP && sunset.timestamp() == NO_EVENT_TIMESTAMP {
        return polar_window(results.day_length, date);
    }

    Ok(DayWindow::new(sunrise, sunset, date)?)
}

fn polar_window(day_length: Option<u64>, date: NaiveDate) -> Result<DayWindow, FetchError> {
    match day_length {
        Some(0) => Ok(DayWindow::polar_night(date)),
        Some(seconds) if seconds >= SECONDS_PER_DAY => Ok(DayWindow::midnight_sun(date)),
        Some(seconds) => Err(FetchError::Parse(format!(
            "no sunrise or sunset on {date} but day_length is {seconds}"
        ))),
        None => Err(FetchError::Parse(format!(
            "no sunrise or sunset on {date} and no day_length"
        ))),
    }
}

fn parse_instant(field: &str, value: &str) -> Result<DateTime<Local>, FetchError> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Local))
        .map_err(|e| FetchError::Parse(format!("{field} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classification::{Classification, classify_current};
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 21).unwrap()
    }

    fn local(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 21, hour, minute, 0).unwrap()
    }

    fn body(sunrise: &str, sunset: &str, status: &str) -> String {
        format!(
            r#"{{"results":{{"sunrise":"{sunrise}","sunset":"{sunset}","solar_noon":"","day_length":0}},"status":"{status}"}}"#
        )
    }

    #[test]
    fn test_parse_ok_response() {
        let json = body(
            &local(5, 25).to_rfc3339(),
            &local(20, 31).to_rfc3339(),
            "OK",
        );
        let window = parse_response(&json, date()).unwrap();
        assert_eq!(window.day_start(), Some(local(5, 25)));
        assert_eq!(window.day_end(), Some(local(20, 31)));
        assert_eq!(window.for_date(), date());
    }

    fn polar_body(day_length: &str) -> String {
        format!(
            r#"{{"results":{{"sunrise":"1970-01-01T00:00:01+00:00","sunset":"1970-01-01T00:00:01+00:00","day_length":{day_length}}},"status":"OK"}}"#
        )
    }

    fn winter_solstice() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 21).unwrap()
    }

    #[test]
    fn test_parse_polar_night() {
        let window = parse_response(&polar_body("0"), winter_solstice()).unwrap();
        assert_eq!(window, DayWindow::polar_night(winter_solstice()));

        let noon = Local
            .with_ymd_and_hms(2025, 12, 21, 12, 0, 0)
            .earliest()
            .unwrap();
        assert_eq!(
            classify_current(noon, Some(&window)),
            Some(Classification::Night)
        );
    }

    #[test]
    fn test_parse_midnight_sun() {
        let window = parse_response(&polar_body("86400"), date()).unwrap();
        assert_eq!(window, DayWindow::midnight_sun(date()));
        assert_eq!(window.day_start(), None);

        let just_after_midnight = local(0, 30);
        assert_eq!(
            classify_current(just_after_midnight, Some(&window)),
            Some(Classification::Day)
        );
    }

    #[test]
    fn test_parse_missing_events_without_day_length() {
        let json = body("1970-01-01T00:00:01+00:00", "1970-01-01T00:00:01+00:00", "OK")
            .replace(r#","day_length":0"#, "");
        assert!(matches!(
            parse_response(&json, date()),
            Err(FetchError::Parse(msg)) if msg.contains("day_length")
        ));

        let partial = parse_response(&polar_body("3600"), date());
        assert!(matches!(partial, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_parse_remote_error_status() {
        let json = r#"{"results":"","status":"INVALID_REQUEST"}"#;
        match parse_response(json, date()) {
            Err(FetchError::RemoteStatus(status)) => assert_eq!(status, "INVALID_REQUEST"),
            other => panic!("expected RemoteStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_garbage_body() {
        assert!(matches!(
            parse_response("<html>busy</html>", date()),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_bad_timestamp() {
        let json = body("tomorrow-ish", &local(20, 31).to_rfc3339(), "OK");
        assert!(matches!(
            parse_response(&json, date()),
            Err(FetchError::Parse(msg)) if msg.contains("sunrise")
        ));
    }

    #[test]
    fn test_parse_inverted_window() {
        let json = body(
            &local(20, 31).to_rfc3339(),
            &local(5, 25).to_rfc3339(),
            "OK",
        );
        assert!(matches!(
            parse_response(&json, date()),
            Err(FetchError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let provider =
            SunriseSunsetProvider::new("http://127.0.0.1:9/json", Duration::from_secs(1)).unwrap();
        let location = Location::new(40.0, -88.0).unwrap();
        assert!(matches!(
            provider.fetch(&location, date()),
            Err(FetchError::Network(_))
        ));
    }
}
