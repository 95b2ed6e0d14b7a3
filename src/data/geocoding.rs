//! Forward-geocoding client
//!
//! Converts free-text place names into coordinates using the map provider's
//! geocoding endpoint. Only the first (best-ranked) candidate is used.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::Coordinate;

/// Base URL for the forward-geocoding endpoint
const GEOCODING_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Maximum number of candidates requested from the provider
const CANDIDATE_LIMIT: u8 = 5;

/// Errors that can occur when geocoding a place name
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Service returned a non-success status
    #[error("Geocoding service returned status {0}")]
    ServiceStatus(u16),

    /// Failed to parse the provider response
    #[error("Failed to parse geocoding response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The provider returned zero candidates for the query
    #[error("No location found for \"{0}\"")]
    NotFound(String),
}

/// A resolved place: the provider's display name plus its coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMatch {
    /// Provider display name for the matched place
    pub name: String,
    /// Coordinate of the matched place
    pub coordinate: Coordinate,
}

/// Client for forward geocoding against the map provider
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    http_client: Client,
    access_token: String,
    base_url: String,
}

impl GeocodingClient {
    /// Creates a new client authenticated with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            access_token: access_token.into(),
            base_url: GEOCODING_BASE_URL.to_string(),
        }
    }

    /// Creates a client with a custom base URL (for testing)
    #[allow(dead_code)]
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            access_token: access_token.into(),
            base_url: base_url.into(),
        }
    }

    /// Resolves a free-text place name to its best-matching coordinate
    ///
    /// # Arguments
    /// * `place_text` - User-supplied place name, used as-is
    ///
    /// # Returns
    /// * `Ok(PlaceMatch)` - The first candidate returned by the provider
    /// * `Err(GeocodingError::NotFound)` - The provider had zero candidates
    /// * `Err(_)` - Transport or parse failure
    pub async fn geocode(&self, place_text: &str) -> Result<PlaceMatch, GeocodingError> {
        let url = format!(
            "{}/{}.json?access_token={}&limit={}",
            self.base_url,
            urlencoding::encode(place_text),
            self.access_token,
            CANDIDATE_LIMIT
        );

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodingError::ServiceStatus(response.status().as_u16()));
        }

        let text = response.text().await?;
        let api_response: GeocodingResponse = serde_json::from_str(&text)?;

        first_match(place_text, api_response)
    }
}

/// Picks the first candidate out of a provider response
fn first_match(
    query: &str,
    response: GeocodingResponse,
) -> Result<PlaceMatch, GeocodingError> {
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| GeocodingError::NotFound(query.to_string()))?;

    Ok(PlaceMatch {
        coordinate: Coordinate::new(feature.center[0], feature.center[1]),
        name: feature.place_name,
    })
}

/// Forward-geocoding response from the provider
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

/// A single candidate feature
#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    place_name: String,
    /// Candidate position as a `[lon, lat]` pair
    center: [f64; 2],
}
