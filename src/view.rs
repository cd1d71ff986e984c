//! View state and pure rendering of weather data
//!
//! `ViewState` is the single owner of everything the screen shows. The
//! functions here turn provider data into display panels without touching the
//! terminal, so the ratatui layer in `ui` only lays them out.

use crate::data::{CitySuggestion, WeatherReport};

/// Glyph shown for weather codes missing from the table
pub const DEFAULT_WEATHER_ICON: &str = "❓";

/// Shown in place of a forecast value the provider left empty
pub const MISSING_READING: &str = "N/A";

/// Weather code to glyph mapping
const WEATHER_ICONS: &[(u8, &str)] = &[
    (0, "☀️"),   // Clear sky
    (1, "🌤️"),  // Mainly clear
    (2, "🌥️"),  // Partly cloudy
    (3, "☁️"),   // Overcast
    (45, "🌫️"), // Fog
    (51, "🌧️"), // Drizzle
    (61, "🌧️"), // Rain
    (71, "❄️"),  // Snow
    (80, "🌧️"), // Rain showers
    (95, "⛈️"),  // Thunderstorm
];

/// Maps a WMO weather code to a display glyph
pub fn weather_icon(code: u8) -> &'static str {
    WEATHER_ICONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_WEATHER_ICON)
}

/// Colour scheme of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Icon of the theme switch: a moon while dark, a sun while light
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "☀",
            Theme::Dark => "🌙",
        }
    }
}

/// The "current weather" panel
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPanel {
    pub title: String,
    pub temperature: String,
    pub wind_speed: String,
}

/// Both weather panels, rebuilt in full from every report
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPanels {
    pub current: CurrentPanel,
    /// One line per forecast day
    pub forecast: Vec<String>,
}

/// Builds the display panels for a weather report
pub fn render_weather(report: &WeatherReport) -> WeatherPanels {
    let current = &report.current;
    let icon = weather_icon(current.weather_code);

    WeatherPanels {
        current: CurrentPanel {
            title: format!("Current Weather {}", icon),
            temperature: format!("Temperature: {} °C", current.temperature),
            wind_speed: format!("Wind Speed: {} km/h", current.windspeed),
        },
        forecast: report
            .forecast
            .iter()
            .map(|day| {
                format!(
                    "{}: Max Temp: {} °C, Min Temp: {} °C, Precipitation: {} mm",
                    day.date,
                    reading(day.max_temp),
                    reading(day.min_temp),
                    reading(day.precipitation)
                )
            })
            .collect(),
    }
}

/// Formats a forecast value, or the placeholder when the provider sent none
fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING_READING.to_string(), |v| v.to_string())
}

/// Which part of the widget receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Suggestions,
}

/// Everything the screen shows
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Contents of the city input field
    pub input: String,
    /// Autocomplete suggestions in provider order
    pub suggestions: Vec<CitySuggestion>,
    /// Highlighted suggestion while the list has focus
    pub selected_suggestion: usize,
    /// Rendered weather, `None` until the first successful fetch
    pub panels: Option<WeatherPanels>,
    pub theme: Theme,
    pub focus: Focus,
}

impl ViewState {
    /// Replaces the weather panels wholesale
    pub fn display_weather(&mut self, report: &WeatherReport) {
        self.panels = Some(render_weather(report));
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<CitySuggestion>) {
        self.suggestions = suggestions;
        self.selected_suggestion = 0;
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.selected_suggestion = 0;
        self.focus = Focus::Input;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }
}
