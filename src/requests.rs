//! Background request flows
//!
//! Network work runs on spawned tokio tasks that report typed completion
//! messages back to the UI loop over an mpsc channel. Each message carries
//! the generation of the request that produced it, so the controller can
//! discard completions superseded by a newer request.

use futures::future::try_join;
use tokio::sync::mpsc;
use tracing::warn;

use crate::app::{Adapters, TripRequest, WeatherRequest};
use crate::data::{
    GeocodingError, PlaceMatch, PredictionError, RoutePlan, RoutingError, TrafficPrediction,
    WeatherError, WeatherSnapshot,
};

/// Messages sent from spawned requests to the main app
#[derive(Debug)]
pub enum AppMessage {
    /// Geocoding and routing succeeded; the route can be rendered
    RouteResolved {
        generation: u64,
        plan: RoutePlan,
        origin: PlaceMatch,
        destination: PlaceMatch,
    },
    /// Geocoding or routing failed; the whole trip flow is aborted
    RouteFailed { generation: u64, message: String },
    /// The AI trip prediction arrived
    TripPredictionReady {
        generation: u64,
        prediction: TrafficPrediction,
    },
    /// The AI trip prediction failed (after a successfully rendered route)
    TripPredictionFailed { generation: u64, message: String },
    /// The AI weather analysis arrived
    WeatherPredictionReady {
        generation: u64,
        snapshot: WeatherSnapshot,
    },
    /// The weather fetch or AI weather analysis failed
    WeatherPredictionFailed { generation: u64, message: String },
}

/// Spawns the composite trip-search flow
///
/// Sequentially geocodes both endpoints and requests a route; on success the
/// route is reported for rendering and the AI trip prediction follows as an
/// independent failure domain. A routing failure aborts the flow without
/// calling the AI gateway.
pub fn spawn_trip_search(
    adapters: Adapters,
    sender: mpsc::Sender<AppMessage>,
    request: TripRequest,
) {
    tokio::spawn(async move {
        let generation = request.generation;

        let resolved = resolve_route(&adapters, &request).await;
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(message) => {
                let _ = sender
                    .send(AppMessage::RouteFailed {
                        generation,
                        message,
                    })
                    .await;
                return;
            }
        };

        let _ = sender
            .send(AppMessage::RouteResolved {
                generation,
                plan: resolved.plan,
                origin: resolved.origin,
                destination: resolved.destination,
            })
            .await;

        let prediction = adapters
            .prediction
            .predict_trip(
                &request.origin_text,
                &request.destination_text,
                request.traffic_hint,
                &request.weather,
            )
            .await;

        let message = match prediction {
            Ok(prediction) => AppMessage::TripPredictionReady {
                generation,
                prediction,
            },
            Err(err) => {
                warn!("Trip prediction failed: {err}");
                AppMessage::TripPredictionFailed {
                    generation,
                    message: prediction_failure_message(&err),
                }
            }
        };
        let _ = sender.send(message).await;
    });
}

/// Spawns the composite weather-prediction flow
///
/// Fetches current conditions and the forecast concurrently, then asks the
/// AI gateway for the traffic-impact analysis.
pub fn spawn_weather_prediction(
    adapters: Adapters,
    sender: mpsc::Sender<AppMessage>,
    request: WeatherRequest,
) {
    tokio::spawn(async move {
        let generation = request.generation;

        let fetched = try_join(
            adapters.weather.fetch_current(request.coordinate),
            adapters.weather.fetch_forecast(request.coordinate),
        )
        .await;

        let (observation, forecast) = match fetched {
            Ok(parts) => parts,
            Err(err) => {
                warn!("Weather fetch failed: {err}");
                let _ = sender
                    .send(AppMessage::WeatherPredictionFailed {
                        generation,
                        message: weather_failure_message(&err),
                    })
                    .await;
                return;
            }
        };

        let message = match adapters
            .prediction
            .predict_weather_impact(&observation, &forecast)
            .await
        {
            Ok(snapshot) => AppMessage::WeatherPredictionReady {
                generation,
                snapshot,
            },
            Err(err) => {
                warn!("Weather prediction failed: {err}");
                AppMessage::WeatherPredictionFailed {
                    generation,
                    message: prediction_failure_message(&err),
                }
            }
        };
        let _ = sender.send(message).await;
    });
}

/// Route pieces produced by the geocode/route sequence
struct ResolvedRoute {
    origin: PlaceMatch,
    destination: PlaceMatch,
    plan: RoutePlan,
}

/// Geocodes both endpoints (origin first) and fetches the route
async fn resolve_route(
    adapters: &Adapters,
    request: &TripRequest,
) -> Result<ResolvedRoute, String> {
    let origin = adapters
        .geocoding
        .geocode(&request.origin_text)
        .await
        .map_err(|err| {
            warn!("Origin geocoding failed: {err}");
            geocoding_failure_message(&err)
        })?;

    let destination = adapters
        .geocoding
        .geocode(&request.destination_text)
        .await
        .map_err(|err| {
            warn!("Destination geocoding failed: {err}");
            geocoding_failure_message(&err)
        })?;

    let plan = adapters
        .routing
        .route(origin.coordinate, destination.coordinate)
        .await
        .map_err(|err| {
            warn!("Routing failed: {err}");
            routing_failure_message(&err)
        })?;

    Ok(ResolvedRoute {
        origin,
        destination,
        plan,
    })
}

/// User-facing message for a geocoding failure
///
/// "Not found" is specific enough to show as-is; transport details are not.
fn geocoding_failure_message(err: &GeocodingError) -> String {
    match err {
        GeocodingError::NotFound(_) => err.to_string(),
        _ => "Unable to display route".to_string(),
    }
}

/// User-facing message for a routing failure
fn routing_failure_message(err: &RoutingError) -> String {
    match err {
        RoutingError::NoRoute => err.to_string(),
        _ => "Unable to display route".to_string(),
    }
}

/// User-facing message for an AI prediction failure
fn prediction_failure_message(err: &PredictionError) -> String {
    match err {
        PredictionError::MissingCredential => err.to_string(),
        _ => "Unable to get AI prediction".to_string(),
    }
}

/// User-facing message for a weather provider failure
fn weather_failure_message(err: &WeatherError) -> String {
    match err {
        WeatherError::MissingApiKey => err.to_string(),
        _ => "Unable to get weather prediction".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CURRENT_TRAFFIC_HINT;
    use crate::data::{
        CurrentConditions, GeocodingClient, PredictionClient, RoutingClient, WeatherClient,
        DEFAULT_CENTER,
    };

    /// Adapter set whose every endpoint points at a closed local port
    fn unreachable_adapters() -> Adapters {
        Adapters {
            geocoding: GeocodingClient::with_base_url("pk.test", "http://127.0.0.1:9"),
            routing: RoutingClient::with_base_url("pk.test", "http://127.0.0.1:9"),
            weather: WeatherClient::new(None),
            prediction: PredictionClient::new(None),
        }
    }

    fn trip_request() -> TripRequest {
        TripRequest {
            generation: 1,
            origin_text: "San Francisco".to_string(),
            destination_text: "Oakland".to_string(),
            traffic_hint: CURRENT_TRAFFIC_HINT,
            weather: CurrentConditions::sample(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_geocoding_reports_route_failure_only() {
        let (sender, mut receiver) = mpsc::channel(8);
        spawn_trip_search(unreachable_adapters(), sender, trip_request());

        let message = receiver.recv().await.expect("message expected");
        match message {
            AppMessage::RouteFailed {
                generation,
                message,
            } => {
                assert_eq!(generation, 1);
                assert_eq!(message, "Unable to display route");
            }
            other => panic!("Expected RouteFailed, got {:?}", other),
        }

        // The flow aborts: no AI prediction message follows.
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_weather_key_reports_configuration_failure() {
        let (sender, mut receiver) = mpsc::channel(8);
        spawn_weather_prediction(
            unreachable_adapters(),
            sender,
            WeatherRequest {
                generation: 3,
                coordinate: DEFAULT_CENTER,
            },
        );

        let message = receiver.recv().await.expect("message expected");
        match message {
            AppMessage::WeatherPredictionFailed {
                generation,
                message,
            } => {
                assert_eq!(generation, 3);
                assert!(message.contains("OPENWEATHER_API_KEY"));
            }
            other => panic!("Expected WeatherPredictionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_geocoding_message_names_the_query() {
        let err = GeocodingError::NotFound("Atlantis".to_string());
        let message = geocoding_failure_message(&err);
        assert!(message.contains("Atlantis"));
    }

    #[test]
    fn test_no_route_message_is_specific() {
        let message = routing_failure_message(&RoutingError::NoRoute);
        assert!(message.contains("No route"));
    }

    #[test]
    fn test_upstream_prediction_failure_is_generic() {
        let message = prediction_failure_message(&PredictionError::Upstream(500));
        assert_eq!(message, "Unable to get AI prediction");
    }

    #[test]
    fn test_missing_credential_message_names_the_variable() {
        let message = prediction_failure_message(&PredictionError::MissingCredential);
        assert!(message.contains("AI_GATEWAY_API_KEY"));
    }
}
