//! AI prediction gateway client
//!
//! Sends structured natural-language prompts to an external chat-completion
//! gateway and parses a JSON object out of the free-text reply. Two flavors
//! exist: trip predictions (delay/confidence/alternative route) and weather
//! impact predictions (conditions/forecast/traffic impact).
//!
//! The reply schema is enforced only by the prompt, so every parsed field is
//! treated as untrusted: after the JSON parse, explicit type and range checks
//! run at this boundary and any violation is a format error.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::weather::{Observation, ObservedForecast};
use super::{
    AlternativeRoute, CurrentConditions, ForecastEntry, ImpactSeverity, TrafficImpact,
    TrafficPrediction, WeatherSnapshot,
};

/// Chat-completions endpoint of the AI gateway
const GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// Model requested from the gateway
const GATEWAY_MODEL: &str = "google/gemini-2.5-flash";

/// Sampling temperature: varied-but-plausible phrasing over determinism
const GATEWAY_TEMPERATURE: f64 = 0.7;

/// Environment variable holding the gateway bearer credential
pub const GATEWAY_API_KEY_VAR: &str = "AI_GATEWAY_API_KEY";

/// Number of forecast entries included in the weather prompt (24h of 3-hour steps)
const FORECAST_PROMPT_ENTRIES: usize = 8;

/// Errors that can occur when requesting an AI prediction
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The gateway credential is not configured
    #[error("AI gateway credential is not configured (set {GATEWAY_API_KEY_VAR})")]
    MissingCredential,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Gateway responded with a non-success status
    #[error("AI gateway returned status {0}")]
    Upstream(u16),

    /// The reply did not contain parseable JSON matching the expected schema
    #[error("AI reply did not match the expected format: {0}")]
    ResponseFormat(String),
}

/// Client for the chat-completion gateway
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http_client: Client,
    api_key: Option<String>,
    gateway_url: String,
}

impl PredictionClient {
    /// Creates a new client with the given bearer credential
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            gateway_url: GATEWAY_URL.to_string(),
        }
    }

    /// Creates a client with the credential from the environment
    pub fn from_env() -> Self {
        Self::new(std::env::var(GATEWAY_API_KEY_VAR).ok())
    }

    /// Creates a client with a custom gateway URL (for testing)
    #[allow(dead_code)]
    pub fn with_gateway_url(api_key: Option<String>, gateway_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            gateway_url: gateway_url.into(),
        }
    }

    /// Requests a traffic prediction for a trip
    ///
    /// # Arguments
    /// * `origin` / `destination` - Place names as the user typed them
    /// * `traffic_hint` - Current traffic description fed to the model
    /// * `weather` - Last-known conditions, included as prompt context
    pub async fn predict_trip(
        &self,
        origin: &str,
        destination: &str,
        traffic_hint: &str,
        weather: &CurrentConditions,
    ) -> Result<TrafficPrediction, PredictionError> {
        let user_prompt = trip_user_prompt(origin, destination, traffic_hint, weather);
        let content = self.complete(TRIP_SYSTEM_PROMPT, &user_prompt).await?;
        parse_trip_prediction(&content)
    }

    /// Requests a weather analysis with traffic impact for observed conditions
    pub async fn predict_weather_impact(
        &self,
        observation: &Observation,
        forecast: &[ObservedForecast],
    ) -> Result<WeatherSnapshot, PredictionError> {
        let user_prompt = weather_user_prompt(observation, forecast);
        let content = self.complete(WEATHER_SYSTEM_PROMPT, &user_prompt).await?;
        parse_weather_snapshot(&content)
    }

    /// Sends one system+user exchange and returns the reply content
    async fn complete(&self, system: &str, user: &str) -> Result<String, PredictionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(PredictionError::MissingCredential)?;

        let request = ChatRequest {
            model: GATEWAY_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: GATEWAY_TEMPERATURE,
        };

        let response = self
            .http_client
            .post(&self.gateway_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "AI gateway request failed");
            return Err(PredictionError::Upstream(status.as_u16()));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(PredictionError::RequestFailed)?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PredictionError::ResponseFormat("reply contained no choices".into()))
    }
}

const TRIP_SYSTEM_PROMPT: &str = r#"You are an AI traffic prediction assistant. Analyze traffic patterns and provide predictions.

Your response must be a valid JSON object with this exact structure:
{
  "predictedDelay": number (in minutes),
  "confidence": number (0-100),
  "alternativeRoute": {
    "name": string,
    "savedTime": number (in minutes)
  } or null,
  "analysis": string (brief explanation)
}"#;

const WEATHER_SYSTEM_PROMPT: &str = r#"You are a weather analysis AI. Provide traffic-relevant weather insights and predictions.

Your response must be a valid JSON object with this exact structure:
{
  "current": {
    "temp": number,
    "condition": string,
    "description": string,
    "humidity": number,
    "visibility": number (in km),
    "windSpeed": number (in m/s)
  },
  "forecast": [
    {
      "time": string (ISO format),
      "temp": number,
      "condition": string,
      "precipProbability": number (0-100)
    }
  ],
  "trafficImpact": {
    "severity": string ("low" | "medium" | "high"),
    "expectedDelay": number (minutes),
    "advice": string
  },
  "analysis": string
}"#;

/// Builds the trip-scenario user prompt
fn trip_user_prompt(
    origin: &str,
    destination: &str,
    traffic_hint: &str,
    weather: &CurrentConditions,
) -> String {
    format!(
        "Analyze this traffic scenario:\n\
         - Origin: {origin}\n\
         - Destination: {destination}\n\
         - Current Traffic: {traffic_hint}\n\
         - Weather: {:.0}°C, {}\n\n\
         Provide traffic prediction with delay estimate, confidence level, and alternative route if beneficial.",
        weather.temperature_c, weather.description
    )
}

/// Builds the weather-scenario user prompt
fn weather_user_prompt(observation: &Observation, forecast: &[ObservedForecast]) -> String {
    let conditions = &observation.conditions;
    let forecast_lines = forecast
        .iter()
        .take(FORECAST_PROMPT_ENTRIES)
        .map(|entry| {
            format!(
                "- {}: {:.1}°C, {}, {}% rain probability",
                entry.time.format("%Y-%m-%d %H:%M"),
                entry.temperature_c,
                entry.condition,
                entry.precip_probability
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this weather data for traffic impact:\n\n\
         Current Weather:\n\
         - Location: {}\n\
         - Temperature: {:.1}°C\n\
         - Condition: {}\n\
         - Description: {}\n\
         - Humidity: {}%\n\
         - Visibility: {:.1} km\n\
         - Wind Speed: {:.1} m/s\n\n\
         Forecast (next 24 hours):\n{}\n\n\
         Provide comprehensive weather analysis with traffic impact assessment.",
        observation.place,
        conditions.temperature_c,
        conditions.condition,
        conditions.description,
        conditions.humidity_percent,
        conditions.visibility_km,
        conditions.wind_speed_ms,
        forecast_lines
    )
}

/// Strips markdown code-fence markers from around the reply content
fn strip_code_fences(content: &str) -> String {
    content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parses and validates a trip prediction out of reply content
fn parse_trip_prediction(content: &str) -> Result<TrafficPrediction, PredictionError> {
    let cleaned = strip_code_fences(content);
    let raw: RawTripPrediction = serde_json::from_str(&cleaned).map_err(|err| {
        warn!(raw = %content, "Failed to parse AI trip prediction: {err}");
        PredictionError::ResponseFormat(format!("invalid JSON: {err}"))
    })?;

    validate_trip_prediction(raw).map_err(|reason| {
        warn!(raw = %content, "AI trip prediction failed validation: {reason}");
        PredictionError::ResponseFormat(reason)
    })
}

/// Parses and validates a weather snapshot out of reply content
fn parse_weather_snapshot(content: &str) -> Result<WeatherSnapshot, PredictionError> {
    let cleaned = strip_code_fences(content);
    let raw: RawWeatherPrediction = serde_json::from_str(&cleaned).map_err(|err| {
        warn!(raw = %content, "Failed to parse AI weather prediction: {err}");
        PredictionError::ResponseFormat(format!("invalid JSON: {err}"))
    })?;

    validate_weather_snapshot(raw).map_err(|reason| {
        warn!(raw = %content, "AI weather prediction failed validation: {reason}");
        PredictionError::ResponseFormat(reason)
    })
}

/// Range/type checks for the trip schema
fn validate_trip_prediction(raw: RawTripPrediction) -> Result<TrafficPrediction, String> {
    if !raw.predicted_delay.is_finite() || raw.predicted_delay < 0.0 {
        return Err(format!("predictedDelay out of range: {}", raw.predicted_delay));
    }
    if !raw.confidence.is_finite() || !(0.0..=100.0).contains(&raw.confidence) {
        return Err(format!("confidence out of range: {}", raw.confidence));
    }
    if raw.analysis.trim().is_empty() {
        return Err("analysis is empty".to_string());
    }

    let alternative_route = match raw.alternative_route {
        Some(alternative) => {
            if alternative.name.trim().is_empty() {
                return Err("alternativeRoute.name is empty".to_string());
            }
            if !alternative.saved_time.is_finite() || alternative.saved_time < 0.0 {
                return Err(format!(
                    "alternativeRoute.savedTime out of range: {}",
                    alternative.saved_time
                ));
            }
            Some(AlternativeRoute {
                name: alternative.name,
                saved_time_minutes: alternative.saved_time,
            })
        }
        None => None,
    };

    Ok(TrafficPrediction {
        predicted_delay_minutes: raw.predicted_delay,
        confidence_percent: raw.confidence,
        alternative_route,
        analysis: raw.analysis,
    })
}

/// Range/type checks for the weather schema
fn validate_weather_snapshot(raw: RawWeatherPrediction) -> Result<WeatherSnapshot, String> {
    let current = raw.current;
    if !current.temp.is_finite() {
        return Err(format!("current.temp is not a number: {}", current.temp));
    }
    if current.condition.trim().is_empty() {
        return Err("current.condition is empty".to_string());
    }
    if !current.humidity.is_finite() || !(0.0..=100.0).contains(&current.humidity) {
        return Err(format!("current.humidity out of range: {}", current.humidity));
    }
    if !current.visibility.is_finite() || current.visibility < 0.0 {
        return Err(format!(
            "current.visibility out of range: {}",
            current.visibility
        ));
    }
    if !current.wind_speed.is_finite() || current.wind_speed < 0.0 {
        return Err(format!(
            "current.windSpeed out of range: {}",
            current.wind_speed
        ));
    }
    if raw.analysis.trim().is_empty() {
        return Err("analysis is empty".to_string());
    }

    let mut forecast = Vec::with_capacity(raw.forecast.len());
    for entry in raw.forecast {
        if entry.time.trim().is_empty() {
            return Err("forecast entry has an empty time".to_string());
        }
        if !entry.temp.is_finite() {
            return Err(format!("forecast temp is not a number: {}", entry.temp));
        }
        if !entry.precip_probability.is_finite()
            || !(0.0..=100.0).contains(&entry.precip_probability)
        {
            return Err(format!(
                "forecast precipProbability out of range: {}",
                entry.precip_probability
            ));
        }
        forecast.push(ForecastEntry {
            time: entry.time,
            temperature_c: entry.temp,
            condition: entry.condition,
            precip_probability: entry.precip_probability.round() as u8,
        });
    }

    let traffic_impact = match raw.traffic_impact {
        Some(impact) => {
            let severity = match impact.severity.as_str() {
                "low" => ImpactSeverity::Low,
                "medium" => ImpactSeverity::Medium,
                "high" => ImpactSeverity::High,
                other => return Err(format!("trafficImpact.severity unknown: {other}")),
            };
            if !impact.expected_delay.is_finite() || impact.expected_delay < 0.0 {
                return Err(format!(
                    "trafficImpact.expectedDelay out of range: {}",
                    impact.expected_delay
                ));
            }
            Some(TrafficImpact {
                severity,
                expected_delay_minutes: impact.expected_delay,
                advice: impact.advice,
            })
        }
        None => None,
    };

    Ok(WeatherSnapshot {
        current: CurrentConditions {
            temperature_c: current.temp,
            condition: current.condition,
            description: current.description,
            humidity_percent: current.humidity.round() as u8,
            visibility_km: current.visibility,
            wind_speed_ms: current.wind_speed,
        },
        forecast,
        traffic_impact,
        analysis: raw.analysis,
    })
}

/// Gateway request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

/// A single chat message
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Gateway reply body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Reply shape declared by the trip prompt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTripPrediction {
    predicted_delay: f64,
    confidence: f64,
    alternative_route: Option<RawAlternativeRoute>,
    #[serde(default)]
    analysis: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlternativeRoute {
    name: String,
    saved_time: f64,
}

/// Reply shape declared by the weather prompt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWeatherPrediction {
    current: RawCurrentBlock,
    #[serde(default)]
    forecast: Vec<RawForecastEntry>,
    traffic_impact: Option<RawTrafficImpact>,
    #[serde(default)]
    analysis: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentBlock {
    temp: f64,
    condition: String,
    #[serde(default)]
    description: String,
    humidity: f64,
    visibility: f64,
    wind_speed: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawForecastEntry {
    time: String,
    temp: f64,
    condition: String,
    precip_probability: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrafficImpact {
    severity: String,
    expected_delay: f64,
    #[serde(default)]
    advice: String,
}
