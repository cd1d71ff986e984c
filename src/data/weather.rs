//! Open-Meteo weather API client
//!
//! This module provides functionality to fetch current conditions and the daily
//! forecast from the Open-Meteo API and parse them into a `WeatherReport`.

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{ForecastEntry, WeatherReport, WeatherSnapshot};

/// Base URL for the Open-Meteo API
pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Daily variables requested alongside the current conditions
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Daily forecast arrays do not line up
    #[error("Daily forecast arrays have inconsistent lengths: {0}")]
    InconsistentDaily(String),
}

/// Client for fetching weather data from Open-Meteo API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Create a new WeatherClient with default settings
    pub fn new() -> Self {
        Self::with_client(Client::new(), OPEN_METEO_BASE_URL)
    }

    /// Create a new WeatherClient with a custom HTTP client and endpoint
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch current conditions and the daily forecast for the given coordinates
    ///
    /// # Arguments
    /// * `lat` - Latitude coordinate
    /// * `lon` - Longitude coordinate
    ///
    /// # Returns
    /// * `Ok(WeatherReport)` - Weather data for the location
    /// * `Err(WeatherError)` - If the request or parsing fails
    pub async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherReport, WeatherError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        tracing::debug!(%lat, %lon, "requesting weather");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("current_weather", "true"),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        let api_response: OpenMeteoResponse = serde_json::from_str(&text)?;

        parse_response(api_response)
    }
}

/// Parse the Open-Meteo API response into a WeatherReport
fn parse_response(response: OpenMeteoResponse) -> Result<WeatherReport, WeatherError> {
    let current = response.current_weather;

    Ok(WeatherReport {
        current: WeatherSnapshot {
            temperature: current.temperature,
            windspeed: current.windspeed,
            weather_code: current.weathercode,
        },
        forecast: parse_daily_data(&response.daily)?,
        fetched_at: Utc::now(),
    })
}

/// Zip the index-aligned daily arrays into forecast entries
fn parse_daily_data(daily: &DailyWeather) -> Result<Vec<ForecastEntry>, WeatherError> {
    let len = daily.time.len();

    if daily.temperature_2m_max.len() != len
        || daily.temperature_2m_min.len() != len
        || daily.precipitation_sum.len() != len
    {
        return Err(WeatherError::InconsistentDaily(format!(
            "time={}, max={}, min={}, precipitation={}",
            len,
            daily.temperature_2m_max.len(),
            daily.temperature_2m_min.len(),
            daily.precipitation_sum.len()
        )));
    }

    let forecast = daily
        .time
        .iter()
        .zip(&daily.temperature_2m_max)
        .zip(&daily.temperature_2m_min)
        .zip(&daily.precipitation_sum)
        .map(|(((date, max), min), precipitation)| ForecastEntry {
            date: date.clone(),
            max_temp: *max,
            min_temp: *min,
            precipitation: *precipitation,
        })
        .collect();

    Ok(forecast)
}

/// Open-Meteo API response structure
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    current_weather: CurrentWeather,
    daily: DailyWeather,
}

/// Current weather block from Open-Meteo
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: u8,
}

/// Daily forecast block from Open-Meteo (parallel arrays, values may be null)
#[derive(Debug, Deserialize)]
struct DailyWeather {
    time: Vec<String>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
}
