//! Core data models for wxlookup
//!
//! This module contains the data types shared by the provider clients and the
//! controller: the user's location, current conditions, the daily forecast,
//! and city autocomplete suggestions.

pub mod geocode;
pub mod geolocation;
pub mod weather;

pub use geocode::{GeocodeClient, GeocodeError};
pub use geolocation::{GeolocationClient, GeolocationError};
pub use weather::{WeatherClient, WeatherError};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Geographic coordinates of the user or a selected city
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Wind speed in km/h
    pub windspeed: f64,
    /// WMO weather code
    pub weather_code: u8,
}

/// Forecast for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Day of the forecast as reported by the provider (e.g. "2024-07-15")
    pub date: String,
    /// Maximum temperature in Celsius, if the provider had one
    pub max_temp: Option<f64>,
    /// Minimum temperature in Celsius, if the provider had one
    pub min_temp: Option<f64>,
    /// Precipitation sum in mm, if the provider had one
    pub precipitation: Option<f64>,
}

/// Everything a single weather fetch produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Current conditions
    pub current: WeatherSnapshot,
    /// Daily forecast, one entry per day in provider order
    pub forecast: Vec<ForecastEntry>,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
}

/// A city returned by the geocoding provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    /// Full human-readable place name
    pub display_name: String,
    /// Latitude coordinate
    pub latitude: f64,
    /// Longitude coordinate
    pub longitude: f64,
}

impl CitySuggestion {
    /// Coordinates of this suggestion
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Builds the HTTP client shared by all provider clients.
///
/// No request timeout is set; requests rely on the platform defaults.
pub fn http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(user_agent).build()
}
