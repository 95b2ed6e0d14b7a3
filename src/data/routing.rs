//! Driving-directions client
//!
//! Fetches a driving route between two coordinates from the map provider's
//! directions endpoint. The provider ranks candidates itself; only the first
//! route is used, with no local comparison logic.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Coordinate, RoutePlan};

/// Base URL for the driving-directions endpoint
const DIRECTIONS_BASE_URL: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";

/// Errors that can occur when requesting a route
#[derive(Debug, Error)]
pub enum RoutingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Service returned a non-success status
    #[error("Directions service returned status {0}")]
    ServiceStatus(u16),

    /// Failed to parse the provider response
    #[error("Failed to parse directions response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No route exists between the two points
    #[error("No route found between the requested points")]
    NoRoute,
}

/// Client for fetching driving routes from the map provider
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http_client: Client,
    access_token: String,
    base_url: String,
}

impl RoutingClient {
    /// Creates a new client authenticated with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            access_token: access_token.into(),
            base_url: DIRECTIONS_BASE_URL.to_string(),
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

    /// Fetches a driving route between the two coordinates
    ///
    /// # Returns
    /// * `Ok(RoutePlan)` - The provider's best route candidate
    /// * `Err(RoutingError::NoRoute)` - No route exists between the points
    /// * `Err(_)` - Transport or parse failure
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RoutePlan, RoutingError> {
        let url = format!(
            "{}/{},{};{},{}?geometries=geojson&access_token={}",
            self.base_url,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude,
            self.access_token
        );

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RoutingError::ServiceStatus(response.status().as_u16()));
        }

        let text = response.text().await?;
        let api_response: DirectionsResponse = serde_json::from_str(&text)?;

        first_route(api_response)
    }
}

/// Picks the first route candidate out of a provider response
fn first_route(response: DirectionsResponse) -> Result<RoutePlan, RoutingError> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingError::NoRoute)?;

    let geometry = route
        .geometry
        .coordinates
        .into_iter()
        .map(|pair| Coordinate::new(pair[0], pair[1]))
        .collect::<Vec<_>>();

    if geometry.is_empty() {
        return Err(RoutingError::NoRoute);
    }

    Ok(RoutePlan {
        geometry,
        distance_meters: route.distance,
        duration_seconds: route.duration,
    })
}

/// Directions response from the provider
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteCandidate>,
}

/// A single route candidate with GeoJSON geometry
#[derive(Debug, Deserialize)]
struct RouteCandidate {
    geometry: RouteGeometry,
    /// Duration in seconds
    duration: f64,
    /// Distance in meters
    distance: f64,
}

/// GeoJSON LineString geometry of a route candidate
#[derive(Debug, Deserialize)]
struct RouteGeometry {
    coordinates: Vec<[f64; 2]>,
}
