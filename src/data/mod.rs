//! Core data models for Roadcast
//!
//! This module contains all the data types used throughout the application
//! for representing coordinates, routes, traffic points, weather conditions,
//! and AI-generated predictions.

pub mod geocoding;
pub mod prediction;
pub mod routing;
pub mod traffic;
pub mod weather;

pub use geocoding::{GeocodingClient, GeocodingError, PlaceMatch};
pub use prediction::{PredictionClient, PredictionError};
pub use routing::{RoutingClient, RoutingError};
pub use traffic::{all_traffic_points, get_traffic_point_by_id};
#[allow(unused_imports)]
pub use weather::{ObservedForecast, WeatherClient, WeatherError};

use serde::{Deserialize, Serialize};

/// Fallback map center used when no device location is known: San Francisco.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    longitude: -122.4194,
    latitude: 37.7749,
};

/// A geographic position as (longitude, latitude) in decimal degrees
///
/// Field order matches the GeoJSON convention used by the geocoding and
/// directions providers, where positions are `[lon, lat]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude in decimal degrees (east positive)
    pub longitude: f64,
    /// Latitude in decimal degrees (north positive)
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Whether the coordinate is within the valid lon/lat ranges
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && self.longitude.abs() <= 180.0
            && self.latitude.abs() <= 90.0
    }
}

/// Geographic envelope of a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    /// Westernmost longitude
    pub west: f64,
    /// Easternmost longitude
    pub east: f64,
    /// Southernmost latitude
    pub south: f64,
    /// Northernmost latitude
    pub north: f64,
}

impl MapBounds {
    /// Computes the bounding envelope of a coordinate sequence
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_coordinates(coordinates: &[Coordinate]) -> Option<Self> {
        let first = coordinates.first()?;
        let mut bounds = Self {
            west: first.longitude,
            east: first.longitude,
            south: first.latitude,
            north: first.latitude,
        };
        for coordinate in &coordinates[1..] {
            bounds.extend(*coordinate);
        }
        Some(bounds)
    }

    /// Grows the envelope to include the given coordinate
    pub fn extend(&mut self, coordinate: Coordinate) {
        self.west = self.west.min(coordinate.longitude);
        self.east = self.east.max(coordinate.longitude);
        self.south = self.south.min(coordinate.latitude);
        self.north = self.north.max(coordinate.latitude);
    }

    /// Longitude span of the envelope
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span of the envelope
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point of the envelope
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }
}

/// A driving route between two points
///
/// Owned by the map view controller for the duration of one search and
/// replaced wholesale on each new search.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Ordered route geometry from origin to destination
    pub geometry: Vec<Coordinate>,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Total duration in seconds
    pub duration_seconds: f64,
}

impl RoutePlan {
    /// Bounding envelope of the route geometry, if the geometry is non-empty
    pub fn bounds(&self) -> Option<MapBounds> {
        MapBounds::from_coordinates(&self.geometry)
    }

    /// Route duration rounded to whole minutes for display
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_seconds / 60.0).round().max(0.0) as u64
    }

    /// Route distance in kilometers for display
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

/// AI-generated traffic prediction for a searched route
///
/// Produced once per user-initiated prediction request and replaced by the
/// next request; never aggregated across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficPrediction {
    /// Predicted delay along the route in minutes
    pub predicted_delay_minutes: f64,
    /// Model confidence in the prediction (0-100)
    pub confidence_percent: f64,
    /// Suggested alternative route, if the model found one worth taking
    pub alternative_route: Option<AlternativeRoute>,
    /// Brief free-text explanation of the prediction
    pub analysis: String,
}

/// A suggested alternative to the searched route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeRoute {
    /// Human-readable route name
    pub name: String,
    /// Estimated time saved by taking this route, in minutes
    pub saved_time_minutes: f64,
}

/// Current weather conditions shown on the dashboard and fed into prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Short condition label, e.g. "Rain"
    pub condition: String,
    /// Longer condition description, e.g. "light rain"
    pub description: String,
    /// Relative humidity percentage (0-100)
    pub humidity_percent: u8,
    /// Visibility in kilometers
    pub visibility_km: f64,
    /// Wind speed in meters per second
    pub wind_speed_ms: f64,
}

impl CurrentConditions {
    /// Placeholder conditions shown before the first successful fetch
    pub fn sample() -> Self {
        Self {
            temperature_c: 22.0,
            condition: "Rain".to_string(),
            description: "light rain".to_string(),
            humidity_percent: 78,
            visibility_km: 4.2,
            wind_speed_ms: 3.5,
        }
    }
}

/// AI-generated weather analysis with forecast and traffic impact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Current conditions as assessed by the model
    pub current: CurrentConditions,
    /// Short-term forecast entries
    pub forecast: Vec<ForecastEntry>,
    /// Expected impact of the weather on traffic, if any
    pub traffic_impact: Option<TrafficImpact>,
    /// Brief free-text weather analysis
    pub analysis: String,
}

/// A single forecast entry within a [`WeatherSnapshot`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Forecast time as reported by the model (display only)
    pub time: String,
    /// Forecast temperature in Celsius
    pub temperature_c: f64,
    /// Forecast condition label
    pub condition: String,
    /// Precipitation probability percentage (0-100)
    pub precip_probability: u8,
}

/// Weather-driven traffic impact assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficImpact {
    /// Impact severity
    pub severity: ImpactSeverity,
    /// Expected additional delay in minutes
    pub expected_delay_minutes: f64,
    /// Driving advice for the conditions
    pub advice: String,
}

/// Severity of weather-driven traffic impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactSeverity {
    Low,
    Medium,
    High,
}

impl ImpactSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            ImpactSeverity::Low => "low",
            ImpactSeverity::Medium => "medium",
            ImpactSeverity::High => "high",
        }
    }
}

/// Ordinal traffic-density label for a monitored point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
    Severe,
}

impl CongestionLevel {
    #[allow(dead_code)]
    pub fn label(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "low",
            CongestionLevel::Medium => "medium",
            CongestionLevel::High => "high",
            CongestionLevel::Severe => "severe",
        }
    }
}

/// A monitored traffic point shown on the map
///
/// Uses `&'static str` for string fields to allow static initialization
/// of the TRAFFIC_POINTS array. The point set is fixed for the session and
/// never mutated.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrafficPoint {
    /// Unique identifier for the point
    pub id: &'static str,
    /// Human-readable location name
    pub name: &'static str,
    /// Geographic position of the point
    pub coordinate: Coordinate,
    /// Current congestion level
    pub congestion: CongestionLevel,
}
