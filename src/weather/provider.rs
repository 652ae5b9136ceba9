//! Open-Meteo weather provider. Synchronous: callers invoke this from a
//! slow refresh timer, never from the frame path.

use std::time::Duration;

use chrono::Timelike;
use serde::Deserialize;
use thiserror::Error;

use super::{WeatherSnapshot, wmo_lookup};

/// Timeout for the whole HTTP exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("weather response missing {0}")]
    Missing(&'static str),
}

/// Open-Meteo JSON response (partial — only the fields we consume).
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
    hourly: Option<Hourly>,
    daily: Option<Daily>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u16,
    is_day: u8,
}

#[derive(Debug, Deserialize)]
struct Hourly {
    cloudcover: Vec<f64>,
    precipitation: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Daily {
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

/// Fetch the current weather for a location. On failure the caller keeps
/// its previous snapshot; an `Err` never reaches the animation engine.
pub fn fetch(latitude: f64, longitude: f64) -> Result<WeatherSnapshot, WeatherError> {
    let url = format!(
        "https://api.open-meteo.com/v1/forecast?\
         latitude={:.4}&longitude={:.4}\
         &current_weather=true\
         &hourly=cloudcover,precipitation\
         &daily=sunrise,sunset&timezone=auto",
        latitude, longitude
    );

    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build()
        .new_agent();

    let response: ForecastResponse = agent.get(&url).call()?.body_mut().read_json()?;
    snapshot_from_response(response, chrono::Local::now().hour() as usize)
}

fn snapshot_from_response(
    response: ForecastResponse,
    current_hour: usize,
) -> Result<WeatherSnapshot, WeatherError> {
    let current = response
        .current_weather
        .ok_or(WeatherError::Missing("current_weather"))?;
    let (kind, intensity) = wmo_lookup(current.weathercode);

    let mut snapshot = WeatherSnapshot {
        temperature: current.temperature,
        windspeed: current.windspeed,
        kind,
        intensity,
        is_day: current.is_day != 0,
        ..WeatherSnapshot::default()
    };

    if let Some(hourly) = response.hourly {
        if let Some(&cc) = hourly.cloudcover.get(current_hour) {
            snapshot.cloudcover = cc;
        }
        if let Some(&pr) = hourly.precipitation.get(current_hour) {
            snapshot.precipitation = pr;
        }
    }

    if let Some(daily) = response.daily {
        if let Some(rise) = daily.sunrise.first().and_then(|s| parse_iso_hours(s)) {
            snapshot.sunrise = rise;
        }
        if let Some(set) = daily.sunset.first().and_then(|s| parse_iso_hours(s)) {
            snapshot.sunset = set;
        }
    }

    Ok(snapshot)
}

/// Parse an Open-Meteo local timestamp ("2026-08-06T05:58") into
/// fractional hours of the day.
fn parse_iso_hours(stamp: &str) -> Option<f64> {
    let dt = chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M").ok()?;
    Some(dt.hour() as f64 + dt.minute() as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherKind;

    fn sample_response() -> ForecastResponse {
        ForecastResponse {
            current_weather: Some(CurrentWeather {
                temperature: 14.2,
                windspeed: 22.0,
                weathercode: 63,
                is_day: 1,
            }),
            hourly: Some(Hourly {
                cloudcover: (0..24).map(|h| h as f64).collect(),
                precipitation: (0..24).map(|h| h as f64 * 0.1).collect(),
            }),
            daily: Some(Daily {
                sunrise: vec!["2026-08-06T05:58".to_string()],
                sunset: vec!["2026-08-06T20:45".to_string()],
            }),
        }
    }

    #[test]
    fn test_snapshot_from_response() {
        let snap = snapshot_from_response(sample_response(), 13).unwrap();
        assert_eq!(snap.kind, WeatherKind::Rain);
        assert!((snap.intensity - 0.6).abs() < 1e-12);
        assert!((snap.cloudcover - 13.0).abs() < 1e-12);
        assert!((snap.precipitation - 1.3).abs() < 1e-12);
        assert!(snap.is_day);
        assert!((snap.sunrise - (5.0 + 58.0 / 60.0)).abs() < 1e-9);
        assert!((snap.sunset - 20.75).abs() < 1e-9);
    }

    #[test]
    fn test_missing_current_weather_is_an_error() {
        let response = ForecastResponse {
            current_weather: None,
            hourly: None,
            daily: None,
        };
        assert!(snapshot_from_response(response, 0).is_err());
    }

    #[test]
    fn test_hour_index_out_of_range_keeps_defaults() {
        let mut response = sample_response();
        response.hourly = Some(Hourly {
            cloudcover: vec![50.0],
            precipitation: vec![0.2],
        });
        let snap = snapshot_from_response(response, 23).unwrap();
        // Falls back to the defaults instead of indexing out of bounds.
        assert!((snap.cloudcover - WeatherSnapshot::default().cloudcover).abs() < 1e-12);
    }

    #[test]
    fn test_parse_iso_hours() {
        assert_eq!(parse_iso_hours("2026-08-06T06:30"), Some(6.5));
        assert_eq!(parse_iso_hours("garbage"), None);
    }
}
