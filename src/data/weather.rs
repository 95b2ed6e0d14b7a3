//! Weather provider client
//!
//! Fetches current conditions and a short-term forecast from an
//! OpenWeatherMap-style API and converts them into our weather models.
//! Provider-native units are normalized here: visibility arrives in meters
//! and is converted to kilometers, precipitation probability arrives as a
//! 0.0-1.0 fraction and is converted to a percentage.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Coordinate, CurrentConditions};

/// Base URL for the weather API
const WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Environment variable holding the weather provider API key
pub const WEATHER_API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Visibility reported when the provider omits the field, in meters
const DEFAULT_VISIBILITY_METERS: f64 = 10_000.0;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider API key is not configured
    #[error("Weather API key is not configured (set {WEATHER_API_KEY_VAR})")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Service returned a non-success status
    #[error("Weather service returned status {0}")]
    ServiceStatus(u16),

    /// Failed to parse the provider response
    #[error("Failed to parse weather response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),
}

/// Current conditions at a place, as observed by the provider
#[derive(Debug, Clone)]
pub struct Observation {
    /// Provider place name for the observed coordinate
    pub place: String,
    /// Normalized current conditions
    pub conditions: CurrentConditions,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
}

/// A single provider forecast entry (3-hourly)
#[derive(Debug, Clone)]
pub struct ObservedForecast {
    /// Forecast time
    pub time: DateTime<Utc>,
    /// Forecast temperature in Celsius
    pub temperature_c: f64,
    /// Forecast condition label
    pub condition: String,
    /// Precipitation probability percentage (0-100)
    pub precip_probability: u8,
}

/// Client for fetching weather data from the provider
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    /// Creates a new client with the given API key
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            base_url: WEATHER_BASE_URL.to_string(),
        }
    }

    /// Creates a client with the API key from the environment
    pub fn from_env() -> Self {
        Self::new(std::env::var(WEATHER_API_KEY_VAR).ok())
    }

    /// Creates a client with a custom base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }

    /// Fetches current conditions for the given coordinate
    ///
    /// # Returns
    /// * `Ok(Observation)` - Normalized current conditions
    /// * `Err(WeatherError::MissingApiKey)` - No key configured; no request made
    /// * `Err(_)` - Transport or parse failure
    pub async fn fetch_current(&self, coordinate: Coordinate) -> Result<Observation, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, coordinate.latitude, coordinate.longitude, api_key
        );

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::ServiceStatus(response.status().as_u16()));
        }

        let text = response.text().await?;
        let api_response: CurrentResponse = serde_json::from_str(&text)?;

        parse_current(api_response)
    }

    /// Fetches the 3-hourly forecast for the given coordinate
    pub async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
    ) -> Result<Vec<ObservedForecast>, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            self.base_url, coordinate.latitude, coordinate.longitude, api_key
        );

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::ServiceStatus(response.status().as_u16()));
        }

        let text = response.text().await?;
        let api_response: ForecastResponse = serde_json::from_str(&text)?;

        Ok(parse_forecast(api_response))
    }
}

/// Converts the provider's current-conditions response into an Observation
fn parse_current(response: CurrentResponse) -> Result<Observation, WeatherError> {
    let condition = response
        .weather
        .first()
        .ok_or_else(|| WeatherError::MissingField("weather".to_string()))?;

    Ok(Observation {
        place: response.name,
        conditions: CurrentConditions {
            temperature_c: response.main.temp,
            condition: condition.main.clone(),
            description: condition.description.clone(),
            humidity_percent: response.main.humidity.clamp(0.0, 100.0) as u8,
            visibility_km: response.visibility / 1000.0,
            wind_speed_ms: response.wind.speed,
        },
        fetched_at: Utc::now(),
    })
}

/// Converts the provider's forecast response into forecast entries
///
/// Entries with no condition block are skipped rather than failing the
/// whole forecast.
fn parse_forecast(response: ForecastResponse) -> Vec<ObservedForecast> {
    response
        .list
        .into_iter()
        .filter_map(|entry| {
            let condition = entry.weather.first()?;
            let time = Utc.timestamp_opt(entry.dt, 0).single()?;
            Some(ObservedForecast {
                time,
                temperature_c: entry.main.temp,
                condition: condition.main.clone(),
                precip_probability: (entry.pop * 100.0).round().clamp(0.0, 100.0) as u8,
            })
        })
        .collect()
}

/// Current-conditions response from the provider
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    name: String,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    /// Visibility in meters; the provider omits it above 10 km
    #[serde(default = "default_visibility")]
    visibility: f64,
    #[serde(default)]
    wind: WindBlock,
}

fn default_visibility() -> f64 {
    DEFAULT_VISIBILITY_METERS
}

/// Temperature and humidity block
#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    #[serde(default)]
    humidity: f64,
}

/// Condition label block
#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
    #[serde(default)]
    description: String,
}

/// Wind block
#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
}

/// Forecast response from the provider
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
}

/// A single 3-hourly forecast item
#[derive(Debug, Deserialize)]
struct ForecastItem {
    /// Forecast time as a unix timestamp
    dt: i64,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    /// Precipitation probability as a 0.0-1.0 fraction
    #[serde(default)]
    pop: f64,
}
