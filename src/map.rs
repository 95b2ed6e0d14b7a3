//! Map view state
//!
//! The controller-owned state of the map: the rendered route, its markers,
//! and the camera. The route and the markers belonging to a search are
//! replaced together as one unit, so repeated searches never accumulate
//! stale annotations.

use crate::data::{Coordinate, MapBounds, RoutePlan, DEFAULT_CENTER};

/// Virtual viewport the camera fits against, in abstract pixels
///
/// Camera padding is expressed in these units: fitting bounds with padding
/// `p` scales the geographic span so the geometry occupies the viewport
/// inset by `p` on each side. The terminal canvas then maps the resulting
/// bounds onto however many cells it actually has.
pub const VIRTUAL_VIEWPORT_WIDTH: f64 = 800.0;
pub const VIRTUAL_VIEWPORT_HEIGHT: f64 = 600.0;

/// Default camera span when nothing has been fitted yet (city scale)
const DEFAULT_LON_SPAN: f64 = 0.16;
const DEFAULT_LAT_SPAN: f64 = 0.12;

/// Smallest span the camera will display, to keep degenerate bounds visible
const MIN_SPAN_DEGREES: f64 = 0.01;

/// What a map marker annotates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Start of the searched route
    Origin,
    /// End of the searched route
    Destination,
    /// The user's own location
    UserLocation,
}

/// A labeled annotation on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position of the marker
    pub coordinate: Coordinate,
    /// What the marker annotates
    pub kind: MarkerKind,
    /// Label shown next to the marker
    pub label: String,
}

impl Marker {
    pub fn new(coordinate: Coordinate, kind: MarkerKind, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            kind,
            label: label.into(),
        }
    }
}

/// The map camera: the geographic window currently displayed
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    bounds: MapBounds,
    padding: f64,
}

impl Camera {
    /// Camera centered on the given point at the default city-scale span
    pub fn centered_on(center: Coordinate) -> Self {
        Self {
            bounds: MapBounds {
                west: center.longitude - DEFAULT_LON_SPAN / 2.0,
                east: center.longitude + DEFAULT_LON_SPAN / 2.0,
                south: center.latitude - DEFAULT_LAT_SPAN / 2.0,
                north: center.latitude + DEFAULT_LAT_SPAN / 2.0,
            },
            padding: 0.0,
        }
    }

    /// Fits the camera to the given bounds with the given padding
    ///
    /// Padding is in virtual-viewport units; see [`VIRTUAL_VIEWPORT_WIDTH`].
    pub fn fit_bounds(&mut self, bounds: MapBounds, padding: f64) {
        self.bounds = bounds;
        self.padding = padding.max(0.0);
    }

    /// Re-centers the camera on a point, keeping the current span
    pub fn center_on(&mut self, center: Coordinate) {
        let half_width = self.bounds.width() / 2.0;
        let half_height = self.bounds.height() / 2.0;
        self.bounds = MapBounds {
            west: center.longitude - half_width,
            east: center.longitude + half_width,
            south: center.latitude - half_height,
            north: center.latitude + half_height,
        };
    }

    /// The geographic window to render, with padding applied
    pub fn viewport(&self) -> MapBounds {
        let center = self.bounds.center();
        let half_width =
            padded_span(self.bounds.width(), self.padding, VIRTUAL_VIEWPORT_WIDTH) / 2.0;
        let half_height =
            padded_span(self.bounds.height(), self.padding, VIRTUAL_VIEWPORT_HEIGHT) / 2.0;
        MapBounds {
            west: center.longitude - half_width,
            east: center.longitude + half_width,
            south: center.latitude - half_height,
            north: center.latitude + half_height,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::centered_on(DEFAULT_CENTER)
    }
}

/// Expands a geographic span so the fitted content sits inside the viewport
/// inset by `padding` on each side
fn padded_span(span: f64, padding: f64, viewport_dimension: f64) -> f64 {
    let span = span.max(MIN_SPAN_DEGREES);
    // Padding beyond the viewport would invert the window; cap it below half.
    let padding = padding.min(viewport_dimension / 2.0 - 1.0);
    span * viewport_dimension / (viewport_dimension - 2.0 * padding)
}

/// Controller-owned view state for the map
#[derive(Debug, Clone, Default)]
pub struct MapViewState {
    route: Option<RoutePlan>,
    search_markers: Vec<Marker>,
    user_marker: Option<Marker>,
    /// The camera controlling the displayed window
    pub camera: Camera,
}

impl MapViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently rendered route, if any
    pub fn route(&self) -> Option<&RoutePlan> {
        self.route.as_ref()
    }

    /// All markers currently on the map (search markers plus user location)
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.search_markers.iter().chain(self.user_marker.iter())
    }

    /// Markers belonging to the active search
    pub fn search_markers(&self) -> &[Marker] {
        &self.search_markers
    }

    /// Replaces the rendered search: route plus both endpoint markers
    ///
    /// The previous search's route and markers are removed together, so at
    /// most one route and one marker pair exist at any time.
    pub fn set_search(&mut self, route: RoutePlan, origin: Marker, destination: Marker) {
        self.route = Some(route);
        self.search_markers = vec![origin, destination];
    }

    /// Places or moves the user-location marker
    pub fn set_user_location(&mut self, coordinate: Coordinate) {
        self.user_marker = Some(Marker::new(coordinate, MarkerKind::UserLocation, "You"));
    }
}
