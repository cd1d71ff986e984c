//! City search (forward geocoding) via Nominatim
//!
//! Backs the autocomplete list: a city name goes in, up to `limit` place
//! suggestions with coordinates come out. Nominatim reports coordinates as
//! strings, so they are parsed here.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::CitySuggestion;

/// Default geocoding endpoint
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Maximum number of suggestions requested per query
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Errors that can occur when searching for a city
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A coordinate string could not be parsed as a number
    #[error("Invalid coordinate '{value}' for {place}")]
    InvalidCoordinate { place: String, value: String },
}

/// Client for the geocoding provider
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
    limit: usize,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self::with_client(Client::new(), NOMINATIM_SEARCH_URL)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }

    /// Override how many suggestions are requested
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Search for cities matching `city`
    pub async fn search(&self, city: &str) -> Result<Vec<CitySuggestion>, GeocodeError> {
        tracing::debug!(city, "requesting city suggestions");
        let limit = self.limit.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("city", city),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let mut suggestions = parse_response(&text)?;
        suggestions.truncate(self.limit);
        Ok(suggestions)
    }
}

/// One Nominatim search hit
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

fn parse_response(text: &str) -> Result<Vec<CitySuggestion>, GeocodeError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(text)?;
    places.into_iter().map(to_suggestion).collect()
}

fn to_suggestion(place: NominatimPlace) -> Result<CitySuggestion, GeocodeError> {
    let latitude = parse_coordinate(&place.display_name, &place.lat)?;
    let longitude = parse_coordinate(&place.display_name, &place.lon)?;
    Ok(CitySuggestion {
        display_name: place.display_name,
        latitude,
        longitude,
    })
}

fn parse_coordinate(place: &str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidCoordinate {
            place: place.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS_RESPONSE: &str = r#"[
        {
            "place_id": 88066702,
            "osm_type": "relation",
            "lat": "48.8588897",
            "lon": "2.3200410",
            "display_name": "Paris, Île-de-France, France métropolitaine, France",
            "address": {"city": "Paris", "country": "France"}
        },
        {
            "place_id": 1210,
            "lat": "33.6617962",
            "lon": "-95.5555130",
            "display_name": "Paris, Lamar County, Texas, United States"
        }
    ]"#;

    #[test]
    fn test_parse_suggestions_keeps_order() {
        let suggestions = parse_response(PARIS_RESPONSE).expect("Should parse");

        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].display_name.starts_with("Paris, Île-de-France"));
        assert!((suggestions[0].latitude - 48.8588897).abs() < 1e-6);
        assert!((suggestions[1].longitude + 95.555513).abs() < 1e-6);
    }

    #[test]
    fn test_parse_empty_array() {
        let suggestions = parse_response("[]").expect("Should parse");
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_invalid_coordinate_is_reported() {
        let json = r#"[{"display_name": "Nowhere", "lat": "north", "lon": "1.0"}]"#;

        match parse_response(json) {
            Err(GeocodeError::InvalidCoordinate { place, value }) => {
                assert_eq!(place, "Nowhere");
                assert_eq!(value, "north");
            }
            other => panic!("Expected InvalidCoordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_with_limit() {
        let client = GeocodeClient::new().with_limit(3);
        assert_eq!(client.limit, 3);
        assert_eq!(GeocodeClient::default().limit, DEFAULT_SUGGESTION_LIMIT);
    }
}
