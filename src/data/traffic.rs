//! Static traffic sample data
//!
//! This module contains the fixed set of monitored traffic points shown on
//! the map, with their geographic coordinates and congestion levels. The set
//! is fixed for the session; levels are simulated, not live.

use super::{CongestionLevel, Coordinate, TrafficPoint};

/// Static array of monitored San Francisco traffic points
pub static TRAFFIC_POINTS: [TrafficPoint; 6] = [
    TrafficPoint {
        id: "downtown-sf",
        name: "Downtown SF",
        coordinate: Coordinate {
            longitude: -122.4194,
            latitude: 37.7749,
        },
        congestion: CongestionLevel::High,
    },
    TrafficPoint {
        id: "mission-bay",
        name: "Mission Bay",
        coordinate: Coordinate {
            longitude: -122.4094,
            latitude: 37.7849,
        },
        congestion: CongestionLevel::Medium,
    },
    TrafficPoint {
        id: "soma",
        name: "SOMA District",
        coordinate: Coordinate {
            longitude: -122.3994,
            latitude: 37.7949,
        },
        congestion: CongestionLevel::Low,
    },
    TrafficPoint {
        id: "bay-bridge",
        name: "Bay Bridge Approach",
        coordinate: Coordinate {
            longitude: -122.3893,
            latitude: 37.7866,
        },
        congestion: CongestionLevel::Severe,
    },
    TrafficPoint {
        id: "hwy-101-north",
        name: "Highway 101 North",
        coordinate: Coordinate {
            longitude: -122.4050,
            latitude: 37.7575,
        },
        congestion: CongestionLevel::High,
    },
    TrafficPoint {
        id: "golden-gate-park",
        name: "Golden Gate Park",
        coordinate: Coordinate {
            longitude: -122.4862,
            latitude: 37.7694,
        },
        congestion: CongestionLevel::Low,
    },
];

/// Returns all monitored traffic points
pub fn all_traffic_points() -> &'static [TrafficPoint] {
    &TRAFFIC_POINTS
}

/// Looks up a traffic point by its ID
#[allow(dead_code)]
pub fn get_traffic_point_by_id(id: &str) -> Option<&'static TrafficPoint> {
    TRAFFIC_POINTS.iter().find(|point| point.id == id)
}
