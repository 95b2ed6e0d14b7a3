//! Integration tests for CLI argument handling
//!
//! Tests the route/location flags and error handling from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_roadcast"))
        .args(args)
        .output()
        .expect("Failed to execute roadcast")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roadcast"), "Help should mention roadcast");
    assert!(stdout.contains("origin"), "Help should mention --origin");
    assert!(
        stdout.contains("destination"),
        "Help should mention --destination"
    );
    assert!(stdout.contains("location"), "Help should mention --location");
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("roadcast"));
}

#[test]
fn test_origin_without_destination_fails() {
    let output = run_cli(&["--origin", "San Francisco"]);
    assert!(
        !output.status.success(),
        "Expected lone --origin to be rejected"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("together"),
        "Should explain the flags belong together: {}",
        stderr
    );
}

#[test]
fn test_invalid_location_fails() {
    let output = run_cli(&["--location", "somewhere nice"]);
    assert!(
        !output.status.success(),
        "Expected malformed --location to be rejected"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid location"),
        "Should print a location error: {}",
        stderr
    );
}

#[test]
fn test_out_of_range_location_fails() {
    let output = run_cli(&["--location", "95.0,-122.0"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use roadcast::cli::{parse_location_arg, Cli, StartupConfig};

    #[test]
    fn test_startup_config_from_route_pair() {
        let cli = Cli {
            origin: Some("San Francisco".to_string()),
            destination: Some("Oakland".to_string()),
            location: None,
            reset_token: false,
        };
        let config = StartupConfig::from_cli(&cli).expect("valid");
        assert!(config.initial_route.is_some());
    }

    #[test]
    fn test_parse_location_roundtrip() {
        let coordinate = parse_location_arg("37.7749,-122.4194").expect("valid");
        assert!((coordinate.latitude - 37.7749).abs() < 1e-9);
        assert!((coordinate.longitude - (-122.4194)).abs() < 1e-9);
    }
}
