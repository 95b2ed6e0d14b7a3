//! Command-line interface parsing for Roadcast
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --origin/--destination pair for an immediate route search and --location
//! as the stand-in for device geolocation.

use clap::Parser;
use thiserror::Error;

use crate::data::Coordinate;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// Only one of the two route endpoints was provided
    #[error("--origin and --destination must be provided together")]
    IncompleteRoute,

    /// A route endpoint was provided but empty
    #[error("Route endpoints cannot be empty")]
    EmptyRouteEndpoint,

    /// The location argument is not a valid coordinate pair
    #[error("Invalid location '{0}'. Expected LAT,LON in decimal degrees")]
    InvalidLocation(String),
}

/// Roadcast - traffic, weather, and AI route predictions on a terminal map
#[derive(Parser, Debug)]
#[command(name = "roadcast")]
#[command(about = "Traffic conditions, weather impact, and AI route predictions on a terminal map")]
#[command(version)]
pub struct Cli {
    /// Starting point for an immediate route search (requires --destination)
    ///
    /// Example:
    ///   roadcast --origin "San Francisco" --destination "Oakland"
    #[arg(long, value_name = "PLACE")]
    pub origin: Option<String>,

    /// Destination for an immediate route search (requires --origin)
    #[arg(long, value_name = "PLACE")]
    pub destination: Option<String>,

    /// Known device location as "LAT,LON", used for weather lookups and map centering
    #[arg(long, value_name = "LAT,LON")]
    pub location: Option<String>,

    /// Forget the stored map access token and prompt for a new one
    #[arg(long)]
    pub reset_token: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Route to search as soon as the map feature initializes
    pub initial_route: Option<(String, String)>,
    /// Known device location, if specified
    pub user_location: Option<Coordinate>,
    /// Whether to discard the stored map access token
    pub reset_token: bool,
}

/// Parses a "LAT,LON" argument into a Coordinate.
///
/// # Returns
/// * `Ok(Coordinate)` if the string is a valid in-range pair
/// * `Err(CliError::InvalidLocation)` otherwise
pub fn parse_location_arg(s: &str) -> Result<Coordinate, CliError> {
    let invalid = || CliError::InvalidLocation(s.to_string());

    let (lat_text, lon_text) = s.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat_text.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lon_text.trim().parse().map_err(|_| invalid())?;

    let coordinate = Coordinate::new(longitude, latitude);
    if !coordinate.is_valid() {
        return Err(invalid());
    }
    Ok(coordinate)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the argument combination is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_route = match (&cli.origin, &cli.destination) {
            (None, None) => None,
            (Some(origin), Some(destination)) => {
                if origin.trim().is_empty() || destination.trim().is_empty() {
                    return Err(CliError::EmptyRouteEndpoint);
                }
                Some((origin.clone(), destination.clone()))
            }
            _ => return Err(CliError::IncompleteRoute),
        };

        let user_location = match &cli.location {
            Some(location) => Some(parse_location_arg(location)?),
            None => None,
        };

        Ok(StartupConfig {
            initial_route,
            user_location,
            reset_token: cli.reset_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(origin: Option<&str>, destination: Option<&str>, location: Option<&str>) -> Cli {
        Cli {
            origin: origin.map(String::from),
            destination: destination.map(String::from),
            location: location.map(String::from),
            reset_token: false,
        }
    }

    #[test]
    fn test_no_args_gives_default_config() {
        let config = StartupConfig::from_cli(&cli(None, None, None)).expect("valid");
        assert!(config.initial_route.is_none());
        assert!(config.user_location.is_none());
        assert!(!config.reset_token);
    }

    #[test]
    fn test_full_route_pair_is_accepted() {
        let config = StartupConfig::from_cli(&cli(Some("San Francisco"), Some("Oakland"), None))
            .expect("valid");
        let (origin, destination) = config.initial_route.expect("route missing");
        assert_eq!(origin, "San Francisco");
        assert_eq!(destination, "Oakland");
    }

    #[test]
    fn test_origin_without_destination_is_rejected() {
        let result = StartupConfig::from_cli(&cli(Some("San Francisco"), None, None));
        assert!(matches!(result, Err(CliError::IncompleteRoute)));
    }

    #[test]
    fn test_destination_without_origin_is_rejected() {
        let result = StartupConfig::from_cli(&cli(None, Some("Oakland"), None));
        assert!(matches!(result, Err(CliError::IncompleteRoute)));
    }

    #[test]
    fn test_blank_endpoint_is_rejected() {
        let result = StartupConfig::from_cli(&cli(Some("  "), Some("Oakland"), None));
        assert!(matches!(result, Err(CliError::EmptyRouteEndpoint)));
    }

    #[test]
    fn test_parse_location_valid_pair() {
        let coordinate = parse_location_arg("37.7749,-122.4194").expect("valid");
        assert!((coordinate.latitude - 37.7749).abs() < 1e-9);
        assert!((coordinate.longitude - (-122.4194)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_location_allows_spaces() {
        let coordinate = parse_location_arg("37.7749, -122.4194").expect("valid");
        assert!((coordinate.longitude - (-122.4194)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_location_rejects_garbage() {
        assert!(matches!(
            parse_location_arg("somewhere nice"),
            Err(CliError::InvalidLocation(_))
        ));
        assert!(matches!(
            parse_location_arg("37.7749"),
            Err(CliError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_parse_location_rejects_out_of_range() {
        assert!(matches!(
            parse_location_arg("95.0,-122.0"),
            Err(CliError::InvalidLocation(_))
        ));
        assert!(matches!(
            parse_location_arg("37.0,-200.0"),
            Err(CliError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_location_flows_into_config() {
        let config = StartupConfig::from_cli(&cli(None, None, Some("37.7749,-122.4194")))
            .expect("valid");
        let location = config.user_location.expect("location missing");
        assert!((location.latitude - 37.7749).abs() < 1e-9);
    }
}
