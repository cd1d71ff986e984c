//! Weather lookup controller
//!
//! Turns user and startup events into provider requests and applies their
//! results to the `ViewState`. Requests run as spawned tokio tasks that report
//! back over a channel; results are only applied on the caller's loop, via
//! [`Controller::drain_events`] or [`Controller::next_event`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::data::{
    http_client, CitySuggestion, GeocodeClient, GeolocationClient, Location, WeatherClient,
    WeatherReport,
};
use crate::debounce::Debouncer;
use crate::notify::Notifier;
use crate::view::{Focus, ViewState};

/// Messages sent from request tasks back to the controller
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The startup geolocation lookup succeeded
    Located(Location),
    /// The startup geolocation lookup failed
    LocateFailed(String),
    /// A weather request completed
    WeatherLoaded { seq: u64, report: WeatherReport },
    /// A weather request failed
    WeatherFailed { seq: u64, message: String },
    /// A city search completed
    SuggestionsLoaded {
        seq: u64,
        suggestions: Vec<CitySuggestion>,
    },
    /// A city search failed
    SuggestionsFailed { seq: u64, message: String },
}

/// Monotonic numbering of the requests of one pipeline.
///
/// Responses are applied only when they are newer than the last one applied,
/// so a slow early response cannot overwrite a fast later one.
#[derive(Debug, Default)]
struct RequestSequence {
    issued: Arc<AtomicU64>,
    applied: u64,
}

impl RequestSequence {
    fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.issued)
    }

    fn issue(&self) -> u64 {
        next_seq(&self.issued)
    }

    fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }

    /// Marks every request issued so far as stale
    fn supersede(&mut self) {
        self.applied = self.applied.max(self.issued.load(Ordering::SeqCst));
    }
}

fn next_seq(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

/// Orchestrates geolocation, weather fetches and city autocomplete
pub struct Controller {
    config: Config,
    geolocation: GeolocationClient,
    weather: WeatherClient,
    geocode: GeocodeClient,
    /// What the screen shows
    pub view: ViewState,
    /// Toast currently on screen
    pub notifier: Notifier,
    /// Location reported by the geolocation provider, once known
    location: Option<Location>,
    debouncer: Debouncer,
    weather_seq: RequestSequence,
    suggestion_seq: RequestSequence,
    events_tx: mpsc::Sender<ControllerEvent>,
    events_rx: mpsc::Receiver<ControllerEvent>,
}

impl Controller {
    /// Creates a controller talking to the endpoints named in `config`
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = http_client(&config.user_agent)?;
        let (events_tx, events_rx) = mpsc::channel(32);

        Ok(Self {
            geolocation: GeolocationClient::with_client(client.clone(), &config.geolocation_url),
            weather: WeatherClient::with_client(client.clone(), &config.weather_url),
            geocode: GeocodeClient::with_client(client, &config.geocode_url)
                .with_limit(config.suggestion_limit),
            view: ViewState::default(),
            notifier: Notifier::new(config.toast_duration),
            location: None,
            debouncer: Debouncer::new(config.debounce),
            weather_seq: RequestSequence::default(),
            suggestion_seq: RequestSequence::default(),
            events_tx,
            events_rx,
            config,
        })
    }

    /// Location reported at startup, if geolocation has succeeded
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Resolves the user's location and then fetches its weather.
    ///
    /// Run once at startup. Failure leaves the weather display empty.
    pub fn locate_and_fetch(&self) {
        let client = self.geolocation.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            let event = match client.locate().await {
                Ok(location) => ControllerEvent::Located(location),
                Err(e) => ControllerEvent::LocateFailed(e.to_string()),
            };
            let _ = tx.send(event).await;
        });
    }

    /// Requests current weather and the daily forecast for a position
    pub fn fetch_weather(&mut self, lat: f64, lon: f64) {
        let seq = self.weather_seq.issue();
        let client = self.weather.clone();
        let tx = self.events_tx.clone();
        tracing::info!(seq, lat, lon, "fetching weather");

        tokio::spawn(async move {
            let event = match client.fetch_weather(lat, lon).await {
                Ok(report) => ControllerEvent::WeatherLoaded { seq, report },
                Err(e) => ControllerEvent::WeatherFailed {
                    seq,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event).await;
        });
    }

    /// Debounced city search.
    ///
    /// Queries of `min_query_len` characters or fewer (after trimming) drop
    /// any pending or in-flight search and clear the list immediately. Longer queries
    /// replace the pending search; it fires once the input has been quiet
    /// for the configured delay.
    pub fn fetch_city_suggestions(&mut self, query: &str) {
        let query = query.trim().to_string();

        if query.chars().count() <= self.config.min_query_len {
            self.discard_suggestions();
            return;
        }

        let client = self.geocode.clone();
        let tx = self.events_tx.clone();
        let counter = self.suggestion_seq.counter();

        self.debouncer.schedule(async move {
            let seq = next_seq(&counter);
            tracing::debug!(seq, %query, "searching cities");
            let event = match client.search(&query).await {
                Ok(suggestions) => ControllerEvent::SuggestionsLoaded { seq, suggestions },
                Err(e) => ControllerEvent::SuggestionsFailed {
                    seq,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(event).await;
        });
    }

    /// The input text changed, or the user asked for weather explicitly.
    ///
    /// Both paths run the suggestion pipeline on the current input; a typed
    /// city name is never looked up directly.
    pub fn submit_query(&mut self) {
        let query = self.view.input.clone();
        self.fetch_city_suggestions(&query);
    }

    /// Picks a suggestion: fills the input, clears the list and fetches its weather.
    ///
    /// Returns false if `index` is out of range.
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        let Some(suggestion) = self.view.suggestions.get(index).cloned() else {
            return false;
        };

        let location = suggestion.location();
        self.view.input = suggestion.display_name;
        self.discard_suggestions();
        self.fetch_weather(location.latitude, location.longitude);
        true
    }

    /// Clears the list and keeps searches already sent from refilling it
    fn discard_suggestions(&mut self) {
        self.debouncer.cancel();
        self.suggestion_seq.supersede();
        self.view.clear_suggestions();
    }

    /// Flips between light and dark theme
    pub fn toggle_theme(&mut self) {
        self.view.toggle_theme();
    }

    /// Applies one request result to the view
    pub fn apply(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Located(location) => {
                tracing::info!(
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "located user"
                );
                self.location = Some(location);
                self.fetch_weather(location.latitude, location.longitude);
            }
            ControllerEvent::LocateFailed(message) => {
                self.notifier
                    .error(format!("Error fetching your location: {}", message));
            }
            ControllerEvent::WeatherLoaded { seq, report } => {
                if !self.weather_seq.accept(seq) {
                    tracing::debug!(seq, "dropping stale weather response");
                    return;
                }
                self.view.display_weather(&report);
                self.notifier.success("Weather data fetched successfully.");
            }
            ControllerEvent::WeatherFailed { seq, message } => {
                if !self.weather_seq.accept(seq) {
                    tracing::debug!(seq, "dropping stale weather failure");
                    return;
                }
                self.notifier
                    .error(format!("Error fetching weather data: {}", message));
            }
            ControllerEvent::SuggestionsLoaded { seq, suggestions } => {
                if !self.suggestion_seq.accept(seq) {
                    tracing::debug!(seq, "dropping stale suggestions");
                    return;
                }
                self.view.set_suggestions(suggestions);
                if self.view.suggestions.is_empty() {
                    self.view.focus = Focus::Input;
                }
            }
            ControllerEvent::SuggestionsFailed { seq, message } => {
                if !self.suggestion_seq.accept(seq) {
                    tracing::debug!(seq, "dropping stale suggestion failure");
                    return;
                }
                self.notifier
                    .error(format!("Error fetching city suggestions: {}", message));
            }
        }
    }

    /// Applies every result that has arrived, without waiting.
    ///
    /// Returns how many results were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next result and applies it
    pub async fn next_event(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ForecastEntry, WeatherSnapshot};
    use crate::notify::ToastKind;
    use chrono::Utc;

    fn controller() -> Controller {
        Controller::new(Config::default()).expect("client should build")
    }

    fn report(code: u8, temperature: f64) -> WeatherReport {
        WeatherReport {
            current: WeatherSnapshot {
                temperature,
                windspeed: 5.0,
                weather_code: code,
            },
            forecast: vec![ForecastEntry {
                date: "2024-07-15".to_string(),
                max_temp: Some(20.0),
                min_temp: Some(10.0),
                precipitation: Some(0.0),
            }],
            fetched_at: Utc::now(),
        }
    }

    fn suggestion(name: &str) -> CitySuggestion {
        CitySuggestion {
            display_name: name.to_string(),
            latitude: 48.85,
            longitude: 2.35,
        }
    }

    #[test]
    fn test_request_sequence_rejects_older() {
        let mut seq = RequestSequence::default();
        let first = seq.issue();
        let second = seq.issue();

        assert!(seq.accept(second));
        assert!(!seq.accept(first));
        assert!(!seq.accept(second));
    }

    #[test]
    fn test_superseded_requests_are_rejected() {
        let mut seq = RequestSequence::default();
        let in_flight = seq.issue();
        seq.supersede();

        assert!(!seq.accept(in_flight));
        let next = seq.issue();
        assert!(seq.accept(next));
    }

    #[tokio::test]
    async fn test_short_query_rejects_earlier_results() {
        let mut controller = controller();
        let in_flight = controller.suggestion_seq.issue();
        controller.fetch_city_suggestions("Pa");

        controller.apply(ControllerEvent::SuggestionsLoaded {
            seq: in_flight,
            suggestions: vec![suggestion("Paris, France")],
        });
        assert!(controller.view.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_weather_loaded_replaces_panels_and_toasts() {
        let mut controller = controller();
        controller.apply(ControllerEvent::WeatherLoaded {
            seq: 1,
            report: report(3, 12.0),
        });

        let panels = controller.view.panels.as_ref().expect("panels rendered");
        assert_eq!(panels.current.title, "Current Weather ☁️");
        let toast = controller.notifier.visible().expect("toast shown");
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Weather data fetched successfully.");
    }

    #[tokio::test]
    async fn test_stale_weather_response_is_dropped() {
        let mut controller = controller();
        controller.apply(ControllerEvent::WeatherLoaded {
            seq: 2,
            report: report(0, 25.0),
        });
        controller.apply(ControllerEvent::WeatherLoaded {
            seq: 1,
            report: report(95, 5.0),
        });

        let panels = controller.view.panels.as_ref().expect("panels rendered");
        assert_eq!(panels.current.temperature, "Temperature: 25 °C");
    }

    #[tokio::test]
    async fn test_weather_failure_keeps_previous_display() {
        let mut controller = controller();
        controller.apply(ControllerEvent::WeatherLoaded {
            seq: 1,
            report: report(1, 18.0),
        });
        controller.apply(ControllerEvent::WeatherFailed {
            seq: 2,
            message: "connection reset".to_string(),
        });

        assert!(controller.view.panels.is_some());
        let toast = controller.notifier.visible().expect("toast shown");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Error fetching weather data: connection reset");
    }

    #[tokio::test]
    async fn test_locate_failure_leaves_display_empty() {
        let mut controller = controller();
        controller.apply(ControllerEvent::LocateFailed("offline".to_string()));

        assert!(controller.view.panels.is_none());
        assert!(controller.location().is_none());
        let toast = controller.notifier.visible().expect("toast shown");
        assert_eq!(toast.message, "Error fetching your location: offline");
    }

    #[tokio::test]
    async fn test_suggestion_failure_keeps_prior_suggestions() {
        let mut controller = controller();
        controller.apply(ControllerEvent::SuggestionsLoaded {
            seq: 1,
            suggestions: vec![suggestion("Paris, France")],
        });
        controller.apply(ControllerEvent::SuggestionsFailed {
            seq: 2,
            message: "HTTP 503".to_string(),
        });

        assert_eq!(controller.view.suggestions.len(), 1);
        let toast = controller.notifier.visible().expect("toast shown");
        assert_eq!(toast.message, "Error fetching city suggestions: HTTP 503");
    }

    #[tokio::test]
    async fn test_short_query_clears_suggestions_immediately() {
        let mut controller = controller();
        controller.view.set_suggestions(vec![suggestion("Paris, France")]);

        controller.fetch_city_suggestions(" Pa ");

        assert!(controller.view.suggestions.is_empty());
        assert!(!controller.debouncer.has_pending());
    }

    #[tokio::test]
    async fn test_long_query_waits_for_debounce() {
        let mut controller = controller();
        controller.fetch_city_suggestions("Paris");

        assert!(controller.debouncer.has_pending());
        controller.fetch_city_suggestions("Pa");
        assert!(!controller.debouncer.has_pending());
    }

    #[tokio::test]
    async fn test_select_out_of_range_is_ignored() {
        let mut controller = controller();
        assert!(!controller.select_suggestion(0));
        assert!(controller.view.input.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_theme_twice_restores_initial() {
        let mut controller = controller();
        let initial = controller.view.theme;
        controller.toggle_theme();
        controller.toggle_theme();
        assert_eq!(controller.view.theme, initial);
    }
}
