//! Application state management for Roadcast
//!
//! This module contains the map view controller: screen and input state,
//! the per-kind request state machines, the map view state, and the toast
//! queue. Network work itself happens in spawned tasks (see `requests`);
//! the controller validates and hands out request descriptions, then applies
//! completion messages as they arrive.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::cli::StartupConfig;
use crate::credentials::TokenStore;
use crate::data::{
    Coordinate, CurrentConditions, GeocodingClient, PredictionClient, RoutingClient,
    TrafficPrediction, WeatherClient, WeatherSnapshot, DEFAULT_CENTER,
};
use crate::map::{MapViewState, Marker, MarkerKind};
use crate::requests::AppMessage;

/// Camera padding applied when fitting to a route, in virtual-viewport units
pub const ROUTE_FIT_PADDING: f64 = 100.0;

/// Traffic hint included in every trip-prediction prompt
pub const CURRENT_TRAFFIC_HINT: &str = "moderate";

/// How long a toast stays on screen
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Which screen is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Credential entry; shown while no map access token is stored
    TokenPrompt,
    /// The map dashboard
    Map,
}

/// Lifecycle of one prediction kind's request
///
/// `Requesting` may only be entered from the other three states; `Ready` and
/// `Failed` are terminal until the next user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Requesting,
    Ready,
    Failed,
}

impl RequestPhase {
    pub fn is_requesting(&self) -> bool {
        matches!(self, RequestPhase::Requesting)
    }
}

/// Which search input currently has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Origin,
    Destination,
}

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// A transient user-facing notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub kind: ToastKind,
    created_at: Instant,
}

impl Toast {
    fn new(kind: ToastKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    /// Whether the toast should be gone at the given instant
    pub fn is_expired(&self, at: Instant) -> bool {
        at.duration_since(self.created_at) >= TOAST_TTL
    }
}

/// A validated trip search, ready to be spawned by the runtime
#[derive(Debug, Clone)]
pub struct TripRequest {
    /// Generation this request belongs to; stale completions are discarded
    pub generation: u64,
    pub origin_text: String,
    pub destination_text: String,
    pub traffic_hint: &'static str,
    /// Last-known conditions, captured at submit time for prompt context
    pub weather: CurrentConditions,
}

/// A validated weather-prediction request, ready to be spawned
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub generation: u64,
    /// Coordinate to analyze: the user location, or the fixed default
    pub coordinate: Coordinate,
}

/// The adapter set used by spawned requests
///
/// Rebuilt whenever the stored map token changes, so a credential change
/// never requires a process restart.
#[derive(Debug, Clone)]
pub struct Adapters {
    pub geocoding: GeocodingClient,
    pub routing: RoutingClient,
    pub weather: WeatherClient,
    pub prediction: PredictionClient,
}

impl Adapters {
    /// Builds the adapter set from the map token plus environment keys
    pub fn from_environment(map_token: &str) -> Self {
        Self {
            geocoding: GeocodingClient::new(map_token),
            routing: RoutingClient::new(map_token),
            weather: WeatherClient::from_env(),
            prediction: PredictionClient::from_env(),
        }
    }
}

/// Main application struct managing state and input
pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Token entry buffer (TokenPrompt screen)
    pub token_input: String,
    /// Origin search input
    pub origin_input: String,
    /// Destination search input
    pub destination_input: String,
    /// Which search input has focus, if any
    pub input_focus: Option<SearchField>,
    /// Whether the routing side panel is open
    pub routing_panel_open: bool,
    /// Trip-prediction request lifecycle
    pub trip_phase: RequestPhase,
    /// Weather-prediction request lifecycle
    pub weather_phase: RequestPhase,
    /// Map view state: route, markers, camera
    pub view: MapViewState,
    /// Last-known current conditions (seeded with sample data at startup)
    pub current_weather: CurrentConditions,
    /// Latest AI weather snapshot, if any
    pub weather_snapshot: Option<WeatherSnapshot>,
    /// Latest AI trip prediction, if any
    pub trip_prediction: Option<TrafficPrediction>,
    /// Known device location, if any
    pub user_location: Option<Coordinate>,
    /// When the weather state was last replaced
    pub last_weather_update: Option<DateTime<Local>>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show the help overlay
    pub show_help: bool,
    /// Flag polled by the main loop: user asked for a trip search
    pub trip_search_requested: bool,
    /// Flag polled by the main loop: user asked for a weather forecast
    pub weather_forecast_requested: bool,
    /// Route from the CLI, searched once the map feature initializes
    pending_route: Option<(String, String)>,
    /// Request generation per prediction kind
    trip_generation: u64,
    weather_generation: u64,
    /// Active toasts, newest last
    toasts: Vec<Toast>,
    /// Adapter set; present once a map token is known
    adapters: Option<Adapters>,
    /// Persisted token store
    token_store: Option<TokenStore>,
}

impl App {
    /// Creates a new App instance with default state
    pub fn new() -> Self {
        Self::with_startup_config(StartupConfig::default())
    }

    /// Creates a new App instance with the given startup configuration
    pub fn with_startup_config(config: StartupConfig) -> Self {
        Self::with_token_store(TokenStore::new(), config)
    }

    /// Creates a new App instance backed by a specific token store
    ///
    /// Used directly by tests to avoid touching the real config directory.
    pub fn with_token_store(token_store: Option<TokenStore>, config: StartupConfig) -> Self {
        if config.reset_token {
            if let Some(store) = &token_store {
                let _ = store.clear();
            }
        }

        let mut app = Self {
            screen: Screen::TokenPrompt,
            token_input: String::new(),
            origin_input: String::new(),
            destination_input: String::new(),
            input_focus: None,
            routing_panel_open: false,
            trip_phase: RequestPhase::Idle,
            weather_phase: RequestPhase::Idle,
            view: MapViewState::new(),
            current_weather: CurrentConditions::sample(),
            weather_snapshot: None,
            trip_prediction: None,
            user_location: config.user_location,
            last_weather_update: None,
            should_quit: false,
            show_help: false,
            trip_search_requested: false,
            weather_forecast_requested: false,
            pending_route: config.initial_route,
            trip_generation: 0,
            weather_generation: 0,
            toasts: Vec::new(),
            adapters: None,
            token_store,
        };

        if let Some(location) = app.user_location {
            app.view.set_user_location(location);
            app.view.camera.center_on(location);
        }

        let stored_token = app.token_store.as_ref().and_then(|store| store.load());
        if let Some(token) = stored_token {
            app.initialize_map_feature(&token);
        }

        app
    }

    /// The adapter set, once the map feature is initialized
    pub fn adapters(&self) -> Option<&Adapters> {
        self.adapters.as_ref()
    }

    /// Active toasts, oldest first
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Builds the adapters for the given token and enters the map screen
    ///
    /// Called both at startup (stored token) and when the user saves a new
    /// token, replacing the previous adapter set in-process.
    pub fn initialize_map_feature(&mut self, token: &str) {
        self.adapters = Some(Adapters::from_environment(token));
        self.screen = Screen::Map;

        if let Some((origin, destination)) = self.pending_route.take() {
            self.origin_input = origin;
            self.destination_input = destination;
            self.routing_panel_open = true;
            self.trip_search_requested = true;
        }
    }

    /// Saves the entered token and initializes the map feature
    pub fn submit_token(&mut self) {
        let token = self.token_input.trim().to_string();
        if token.is_empty() {
            self.push_toast(ToastKind::Error, "Missing Token", "Please enter an access token");
            return;
        }

        if let Some(store) = &self.token_store {
            if let Err(err) = store.save(&token) {
                self.push_toast(
                    ToastKind::Error,
                    "Token Not Saved",
                    format!("Could not persist the token: {err}"),
                );
            }
        }

        self.initialize_map_feature(&token);
    }

    /// Validates the search inputs and opens a new trip request
    ///
    /// Returns `None` without any side effect on the request state when the
    /// triggering control is disabled (already requesting) or validation
    /// fails; validation failure surfaces a toast and performs zero network
    /// calls.
    pub fn begin_trip_search(&mut self) -> Option<TripRequest> {
        if self.trip_phase.is_requesting() {
            return None;
        }

        if self.origin_input.trim().is_empty() || self.destination_input.trim().is_empty() {
            self.push_toast(
                ToastKind::Error,
                "Missing Information",
                "Please enter both origin and destination",
            );
            return None;
        }

        self.trip_generation += 1;
        self.trip_phase = RequestPhase::Requesting;

        Some(TripRequest {
            generation: self.trip_generation,
            origin_text: self.origin_input.trim().to_string(),
            destination_text: self.destination_input.trim().to_string(),
            traffic_hint: CURRENT_TRAFFIC_HINT,
            weather: self.current_weather.clone(),
        })
    }

    /// Opens a new weather-prediction request
    ///
    /// Uses the known device location, falling back to the fixed default
    /// coordinate when none is known.
    pub fn begin_weather_forecast(&mut self) -> Option<WeatherRequest> {
        if self.weather_phase.is_requesting() {
            return None;
        }

        self.weather_generation += 1;
        self.weather_phase = RequestPhase::Requesting;

        Some(WeatherRequest {
            generation: self.weather_generation,
            coordinate: self.user_location.unwrap_or(DEFAULT_CENTER),
        })
    }

    /// Applies a completion message from a spawned request
    ///
    /// Messages carrying a generation other than the current one for their
    /// kind are stale (a newer request superseded them) and are discarded.
    pub fn apply_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::RouteResolved {
                generation,
                plan,
                origin,
                destination,
            } => {
                if generation != self.trip_generation {
                    debug!(generation, "Discarding stale route result");
                    return;
                }
                let bounds = plan.bounds();
                let origin_marker =
                    Marker::new(origin.coordinate, MarkerKind::Origin, origin.name);
                let destination_marker = Marker::new(
                    destination.coordinate,
                    MarkerKind::Destination,
                    destination.name,
                );
                self.view.set_search(plan, origin_marker, destination_marker);
                if let Some(bounds) = bounds {
                    self.view.camera.fit_bounds(bounds, ROUTE_FIT_PADDING);
                }
            }
            AppMessage::RouteFailed {
                generation,
                message,
            } => {
                if generation != self.trip_generation {
                    debug!(generation, "Discarding stale route failure");
                    return;
                }
                self.trip_phase = RequestPhase::Failed;
                self.push_toast(ToastKind::Error, "Route Error", message);
            }
            AppMessage::TripPredictionReady {
                generation,
                prediction,
            } => {
                if generation != self.trip_generation {
                    debug!(generation, "Discarding stale trip prediction");
                    return;
                }
                self.trip_phase = RequestPhase::Ready;
                self.push_toast(
                    ToastKind::Info,
                    "AI Prediction Ready",
                    prediction.analysis.clone(),
                );
                self.trip_prediction = Some(prediction);
            }
            AppMessage::TripPredictionFailed {
                generation,
                message,
            } => {
                if generation != self.trip_generation {
                    debug!(generation, "Discarding stale trip prediction failure");
                    return;
                }
                // The rendered route stays; only the prediction failed.
                self.trip_phase = RequestPhase::Failed;
                self.push_toast(ToastKind::Error, "Prediction Failed", message);
            }
            AppMessage::WeatherPredictionReady {
                generation,
                snapshot,
            } => {
                if generation != self.weather_generation {
                    debug!(generation, "Discarding stale weather prediction");
                    return;
                }
                self.weather_phase = RequestPhase::Ready;
                self.current_weather = snapshot.current.clone();
                self.last_weather_update = Some(Local::now());
                self.push_toast(
                    ToastKind::Info,
                    "Weather Prediction Ready",
                    snapshot.analysis.clone(),
                );
                self.weather_snapshot = Some(snapshot);
            }
            AppMessage::WeatherPredictionFailed {
                generation,
                message,
            } => {
                if generation != self.weather_generation {
                    debug!(generation, "Discarding stale weather prediction failure");
                    return;
                }
                self.weather_phase = RequestPhase::Failed;
                self.push_toast(ToastKind::Error, "Weather Prediction Failed", message);
            }
        }
    }

    /// Drops expired toasts; called once per frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    fn push_toast(&mut self, kind: ToastKind, title: impl Into<String>, body: impl Into<String>) {
        self.toasts.push(Toast::new(kind, title, body));
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings (map screen, no input focused)
    /// - `q`: Quit the application
    /// - `Esc`: Close the routing panel, or quit if it is closed
    /// - `d`: Toggle the routing panel (focuses the origin input)
    /// - `w`: Request an AI weather forecast
    /// - `c`: Center the map on the known device location
    /// - `?`: Toggle the help overlay
    ///
    /// While a search input is focused, characters edit the focused field,
    /// `Tab` switches fields, `Enter` submits the search, `Esc` unfocuses.
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown.
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.screen {
            Screen::TokenPrompt => self.handle_token_prompt_key(key_event),
            Screen::Map => self.handle_map_key(key_event),
        }
    }

    fn handle_token_prompt_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.token_input.push(c);
            }
            KeyCode::Backspace => {
                self.token_input.pop();
            }
            KeyCode::Enter => {
                self.submit_token();
            }
            KeyCode::Esc => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_map_key(&mut self, key_event: KeyEvent) {
        if let Some(focus) = self.input_focus {
            match key_event.code {
                KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.focused_input_mut(focus).push(c);
                }
                KeyCode::Backspace => {
                    self.focused_input_mut(focus).pop();
                }
                KeyCode::Tab => {
                    self.input_focus = Some(match focus {
                        SearchField::Origin => SearchField::Destination,
                        SearchField::Destination => SearchField::Origin,
                    });
                }
                KeyCode::Enter => {
                    self.input_focus = None;
                    self.trip_search_requested = true;
                }
                KeyCode::Esc => {
                    self.input_focus = None;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.routing_panel_open {
                    self.routing_panel_open = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('d') | KeyCode::Char('/') => {
                self.toggle_routing_panel();
            }
            KeyCode::Char('w') => {
                if !self.weather_phase.is_requesting() {
                    self.weather_forecast_requested = true;
                }
            }
            KeyCode::Char('c') => {
                if let Some(location) = self.user_location {
                    self.view.camera.center_on(location);
                }
            }
            KeyCode::Enter => {
                if self.routing_panel_open {
                    self.input_focus = Some(SearchField::Origin);
                }
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn toggle_routing_panel(&mut self) {
        if self.routing_panel_open {
            self.routing_panel_open = false;
            self.input_focus = None;
        } else {
            self.routing_panel_open = true;
            self.input_focus = Some(SearchField::Origin);
        }
    }

    fn focused_input_mut(&mut self, focus: SearchField) -> &mut String {
        match focus {
            SearchField::Origin => &mut self.origin_input,
            SearchField::Destination => &mut self.destination_input,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PlaceMatch, RoutePlan};
    use crate::map::VIRTUAL_VIEWPORT_HEIGHT;
    use crate::map::VIRTUAL_VIEWPORT_WIDTH;
    use tempfile::TempDir;

    /// Helper to create a KeyEvent for testing
    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// App with no stored token: starts on the token prompt
    fn app_without_token() -> (TempDir, App) {
        let dir = TempDir::new().expect("temp dir");
        let store = TokenStore::with_dir(dir.path().join("roadcast"));
        let app = App::with_token_store(Some(store), StartupConfig::default());
        (dir, app)
    }

    /// App with a stored token: starts on the map screen
    fn app_with_token() -> (TempDir, App) {
        app_with_token_and_config(StartupConfig::default())
    }

    fn app_with_token_and_config(config: StartupConfig) -> (TempDir, App) {
        let dir = TempDir::new().expect("temp dir");
        let store = TokenStore::with_dir(dir.path().join("roadcast"));
        store.save("pk.test").expect("save token");
        let app = App::with_token_store(Some(store), config);
        (dir, app)
    }

    fn sample_plan() -> RoutePlan {
        RoutePlan {
            geometry: vec![
                Coordinate::new(-122.4194, 37.7749),
                Coordinate::new(-122.2712, 37.8044),
            ],
            distance_meters: 13400.0,
            duration_seconds: 1080.0,
        }
    }

    fn sample_endpoints() -> (PlaceMatch, PlaceMatch) {
        (
            PlaceMatch {
                name: "San Francisco, California, United States".to_string(),
                coordinate: Coordinate::new(-122.4194, 37.7749),
            },
            PlaceMatch {
                name: "Oakland, California, United States".to_string(),
                coordinate: Coordinate::new(-122.2712, 37.8044),
            },
        )
    }

    /// Drives a trip search to the point where a request is open
    fn open_trip_request(app: &mut App) -> TripRequest {
        app.origin_input = "San Francisco".to_string();
        app.destination_input = "Oakland".to_string();
        app.begin_trip_search().expect("request should open")
    }

    // ========================================================================
    // Screen / credential lifecycle
    // ========================================================================

    #[test]
    fn test_starts_on_token_prompt_without_stored_token() {
        let (_dir, app) = app_without_token();
        assert_eq!(app.screen, Screen::TokenPrompt);
        assert!(app.adapters().is_none());
    }

    #[test]
    fn test_starts_on_map_with_stored_token() {
        let (_dir, app) = app_with_token();
        assert_eq!(app.screen, Screen::Map);
        assert!(app.adapters().is_some());
    }

    #[test]
    fn test_submit_token_enters_map_without_restart() {
        let (_dir, mut app) = app_without_token();
        app.token_input = "pk.fresh".to_string();
        app.submit_token();
        assert_eq!(app.screen, Screen::Map);
        assert!(app.adapters().is_some());
    }

    #[test]
    fn test_submit_empty_token_stays_on_prompt() {
        let (_dir, mut app) = app_without_token();
        app.token_input = "   ".to_string();
        app.submit_token();
        assert_eq!(app.screen, Screen::TokenPrompt);
        assert!(app.adapters().is_none());
        assert_eq!(app.toasts().len(), 1);
        assert_eq!(app.toasts()[0].kind, ToastKind::Error);
    }

    #[test]
    fn test_token_prompt_typing_and_submit() {
        let (_dir, mut app) = app_without_token();
        for c in "pk.abc".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.token_input, "pk.ab");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Map);
    }

    #[test]
    fn test_reset_token_flag_clears_stored_token() {
        let dir = TempDir::new().expect("temp dir");
        let store = TokenStore::with_dir(dir.path().join("roadcast"));
        store.save("pk.stale").expect("save token");

        let config = StartupConfig {
            reset_token: true,
            ..Default::default()
        };
        let app = App::with_token_store(Some(store.clone()), config);
        assert_eq!(app.screen, Screen::TokenPrompt);
        assert!(store.load().is_none());
    }

    // ========================================================================
    // Trip search validation and state machine
    // ========================================================================

    #[test]
    fn test_empty_inputs_surface_validation_error_and_no_request() {
        let (_dir, mut app) = app_with_token();
        assert!(app.begin_trip_search().is_none());
        assert_eq!(app.trip_phase, RequestPhase::Idle);
        assert_eq!(app.toasts().len(), 1);
        assert_eq!(app.toasts()[0].title, "Missing Information");
    }

    #[test]
    fn test_empty_destination_alone_is_rejected() {
        let (_dir, mut app) = app_with_token();
        app.origin_input = "San Francisco".to_string();
        assert!(app.begin_trip_search().is_none());
        assert_eq!(app.trip_phase, RequestPhase::Idle);
    }

    #[test]
    fn test_valid_search_opens_request_and_enters_requesting() {
        let (_dir, mut app) = app_with_token();
        let request = open_trip_request(&mut app);
        assert_eq!(app.trip_phase, RequestPhase::Requesting);
        assert_eq!(request.generation, 1);
        assert_eq!(request.origin_text, "San Francisco");
        assert_eq!(request.destination_text, "Oakland");
        assert_eq!(request.traffic_hint, "moderate");
        // Prompt context carries the last-known weather.
        assert_eq!(request.weather, CurrentConditions::sample());
    }

    #[test]
    fn test_search_disabled_while_requesting() {
        let (_dir, mut app) = app_with_token();
        let _request = open_trip_request(&mut app);
        assert!(app.begin_trip_search().is_none());
    }

    #[test]
    fn test_new_search_allowed_from_ready_and_failed() {
        let (_dir, mut app) = app_with_token();
        let request = open_trip_request(&mut app);
        app.apply_message(AppMessage::TripPredictionFailed {
            generation: request.generation,
            message: "Unable to get AI prediction".to_string(),
        });
        assert_eq!(app.trip_phase, RequestPhase::Failed);

        let second = app.begin_trip_search().expect("retry should open");
        assert_eq!(second.generation, 2);
        assert_eq!(app.trip_phase, RequestPhase::Requesting);
    }

    // ========================================================================
    // Message application
    // ========================================================================

    #[test]
    fn test_route_resolved_renders_route_markers_and_fits_camera() {
        let (_dir, mut app) = app_with_token();
        let request = open_trip_request(&mut app);
        let (origin, destination) = sample_endpoints();
        let plan = sample_plan();
        let bounds = plan.bounds().unwrap();

        app.apply_message(AppMessage::RouteResolved {
            generation: request.generation,
            plan: plan.clone(),
            origin,
            destination,
        });

        assert_eq!(app.view.route(), Some(&plan));
        assert_eq!(app.view.search_markers().len(), 2);
        assert_eq!(app.view.search_markers()[0].kind, MarkerKind::Origin);
        assert_eq!(app.view.search_markers()[1].kind, MarkerKind::Destination);

        // Camera fitted to the route bounds with the fixed 100-unit padding.
        let viewport = app.view.camera.viewport();
        let expected_width = bounds.width() * VIRTUAL_VIEWPORT_WIDTH
            / (VIRTUAL_VIEWPORT_WIDTH - 2.0 * ROUTE_FIT_PADDING);
        let expected_height = bounds.height() * VIRTUAL_VIEWPORT_HEIGHT
            / (VIRTUAL_VIEWPORT_HEIGHT - 2.0 * ROUTE_FIT_PADDING);
        assert!((viewport.width() - expected_width).abs() < 1e-9);
        assert!((viewport.height() - expected_height).abs() < 1e-9);
        // Still requesting: the AI prediction has not resolved yet.
        assert_eq!(app.trip_phase, RequestPhase::Requesting);
    }

    #[test]
    fn test_repeated_searches_leave_single_route_layer() {
        let (_dir, mut app) = app_with_token();
        for _ in 0..3 {
            let request = open_trip_request(&mut app);
            let (origin, destination) = sample_endpoints();
            app.apply_message(AppMessage::RouteResolved {
                generation: request.generation,
                plan: sample_plan(),
                origin,
                destination,
            });
            app.apply_message(AppMessage::TripPredictionReady {
                generation: request.generation,
                prediction: TrafficPrediction {
                    predicted_delay_minutes: 10.0,
                    confidence_percent: 80.0,
                    alternative_route: None,
                    analysis: "steady".to_string(),
                },
            });
        }
        assert!(app.view.route().is_some());
        assert_eq!(app.view.search_markers().len(), 2);
    }

    #[test]
    fn test_route_failure_surfaces_route_error_toast() {
        let (_dir, mut app) = app_with_token();
        let request = open_trip_request(&mut app);
        app.apply_message(AppMessage::RouteFailed {
            generation: request.generation,
            message: "Unable to display route".to_string(),
        });
        assert_eq!(app.trip_phase, RequestPhase::Failed);
        assert!(app.view.route().is_none());
        assert!(app
            .toasts()
            .iter()
            .any(|toast| toast.title == "Route Error"));
    }

    #[test]
    fn test_prediction_ready_stores_prediction_and_toasts_analysis() {
        let (_dir, mut app) = app_with_token();
        let request = open_trip_request(&mut app);
        app.apply_message(AppMessage::TripPredictionReady {
            generation: request.generation,
            prediction: TrafficPrediction {
                predicted_delay_minutes: 18.0,
                confidence_percent: 87.0,
                alternative_route: None,
                analysis: "Expect delays near the bridge".to_string(),
            },
        });
        assert_eq!(app.trip_phase, RequestPhase::Ready);
        let prediction = app.trip_prediction.as_ref().expect("prediction missing");
        assert!((prediction.predicted_delay_minutes - 18.0).abs() < 0.01);
        let toast = app.toasts().last().expect("toast missing");
        assert_eq!(toast.title, "AI Prediction Ready");
        assert_eq!(toast.body, "Expect delays near the bridge");
    }

    #[test]
    fn test_prediction_failure_keeps_rendered_route() {
        let (_dir, mut app) = app_with_token();
        let request = open_trip_request(&mut app);
        let (origin, destination) = sample_endpoints();
        app.apply_message(AppMessage::RouteResolved {
            generation: request.generation,
            plan: sample_plan(),
            origin,
            destination,
        });
        app.apply_message(AppMessage::TripPredictionFailed {
            generation: request.generation,
            message: "Unable to get AI prediction".to_string(),
        });

        // Independent failure domains: the route stays, no prediction state.
        assert_eq!(app.trip_phase, RequestPhase::Failed);
        assert!(app.view.route().is_some());
        assert!(app.trip_prediction.is_none());
        assert!(app
            .toasts()
            .iter()
            .any(|toast| toast.title == "Prediction Failed"));
    }

    #[test]
    fn test_stale_trip_messages_are_discarded() {
        let (_dir, mut app) = app_with_token();
        let first = open_trip_request(&mut app);
        // The first request fails, then the user retries.
        app.apply_message(AppMessage::TripPredictionFailed {
            generation: first.generation,
            message: "boom".to_string(),
        });
        let second = app.begin_trip_search().expect("retry");

        // A late completion from the first request must not clobber state.
        app.apply_message(AppMessage::TripPredictionReady {
            generation: first.generation,
            prediction: TrafficPrediction {
                predicted_delay_minutes: 99.0,
                confidence_percent: 1.0,
                alternative_route: None,
                analysis: "stale".to_string(),
            },
        });
        assert_eq!(app.trip_phase, RequestPhase::Requesting);
        assert!(app.trip_prediction.is_none());

        // The current request's completion still applies.
        app.apply_message(AppMessage::TripPredictionReady {
            generation: second.generation,
            prediction: TrafficPrediction {
                predicted_delay_minutes: 7.0,
                confidence_percent: 90.0,
                alternative_route: None,
                analysis: "fresh".to_string(),
            },
        });
        assert_eq!(app.trip_phase, RequestPhase::Ready);
        assert_eq!(app.trip_prediction.as_ref().unwrap().analysis, "fresh");
    }

    #[test]
    fn test_stale_route_result_is_discarded() {
        let (_dir, mut app) = app_with_token();
        let first = open_trip_request(&mut app);
        app.apply_message(AppMessage::RouteFailed {
            generation: first.generation,
            message: "no route".to_string(),
        });
        let _second = app.begin_trip_search().expect("retry");

        let (origin, destination) = sample_endpoints();
        app.apply_message(AppMessage::RouteResolved {
            generation: first.generation,
            plan: sample_plan(),
            origin,
            destination,
        });
        assert!(app.view.route().is_none(), "stale route must not render");
    }

    // ========================================================================
    // Weather flow
    // ========================================================================

    #[test]
    fn test_weather_request_uses_default_center_without_location() {
        let (_dir, mut app) = app_with_token();
        let request = app.begin_weather_forecast().expect("request");
        assert_eq!(request.coordinate, DEFAULT_CENTER);
        assert_eq!(app.weather_phase, RequestPhase::Requesting);
    }

    #[test]
    fn test_weather_request_uses_known_location() {
        let config = StartupConfig {
            user_location: Some(Coordinate::new(-123.1207, 49.2827)),
            ..Default::default()
        };
        let (_dir, mut app) = app_with_token_and_config(config);
        let request = app.begin_weather_forecast().expect("request");
        assert!((request.coordinate.latitude - 49.2827).abs() < 1e-9);
    }

    #[test]
    fn test_weather_ready_replaces_current_conditions() {
        let (_dir, mut app) = app_with_token();
        let request = app.begin_weather_forecast().expect("request");
        let snapshot = WeatherSnapshot {
            current: CurrentConditions {
                temperature_c: 16.4,
                condition: "Rain".to_string(),
                description: "light rain".to_string(),
                humidity_percent: 82,
                visibility_km: 4.2,
                wind_speed_ms: 5.7,
            },
            forecast: vec![],
            traffic_impact: None,
            analysis: "Wet evening commute".to_string(),
        };
        app.apply_message(AppMessage::WeatherPredictionReady {
            generation: request.generation,
            snapshot,
        });

        assert_eq!(app.weather_phase, RequestPhase::Ready);
        assert!((app.current_weather.temperature_c - 16.4).abs() < 0.01);
        assert!(app.weather_snapshot.is_some());
        assert!(app.last_weather_update.is_some());
        assert!(app
            .toasts()
            .iter()
            .any(|toast| toast.title == "Weather Prediction Ready"));
    }

    #[test]
    fn test_weather_failure_keeps_previous_conditions() {
        let (_dir, mut app) = app_with_token();
        let request = app.begin_weather_forecast().expect("request");
        app.apply_message(AppMessage::WeatherPredictionFailed {
            generation: request.generation,
            message: "Unable to get weather prediction".to_string(),
        });
        assert_eq!(app.weather_phase, RequestPhase::Failed);
        assert_eq!(app.current_weather, CurrentConditions::sample());
        assert!(app.weather_snapshot.is_none());
    }

    #[test]
    fn test_trip_and_weather_requests_are_independent() {
        let (_dir, mut app) = app_with_token();
        let _trip = open_trip_request(&mut app);
        let weather = app.begin_weather_forecast();
        assert!(weather.is_some(), "weather must not be blocked by trip");
        assert_eq!(app.trip_phase, RequestPhase::Requesting);
        assert_eq!(app.weather_phase, RequestPhase::Requesting);
    }

    // ========================================================================
    // Key handling
    // ========================================================================

    #[test]
    fn test_d_opens_routing_panel_and_focuses_origin() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('d')));
        assert!(app.routing_panel_open);
        assert_eq!(app.input_focus, Some(SearchField::Origin));
    }

    #[test]
    fn test_typing_fills_focused_field_and_tab_switches() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('d')));
        for c in "SF".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.origin_input, "SF");

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.input_focus, Some(SearchField::Destination));
        for c in "Oakland".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.destination_input, "Oakland");
    }

    #[test]
    fn test_enter_while_editing_requests_search() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.trip_search_requested);
        assert!(app.input_focus.is_none());
    }

    #[test]
    fn test_q_while_editing_types_not_quits() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.origin_input, "q");
    }

    #[test]
    fn test_w_requests_weather_forecast() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('w')));
        assert!(app.weather_forecast_requested);
    }

    #[test]
    fn test_w_ignored_while_weather_requesting() {
        let (_dir, mut app) = app_with_token();
        let _request = app.begin_weather_forecast().expect("request");
        app.handle_key(key(KeyCode::Char('w')));
        assert!(!app.weather_forecast_requested);
    }

    #[test]
    fn test_esc_closes_panel_then_quits() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Esc)); // unfocus input
        app.handle_key(key(KeyCode::Esc)); // close panel
        assert!(!app.routing_panel_open);
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc)); // now quit
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_toggles_and_intercepts() {
        let (_dir, mut app) = app_with_token();
        app.handle_key(key(KeyCode::Char('?')));
        assert!(app.show_help);
        // Keys other than close are swallowed.
        app.handle_key(key(KeyCode::Char('d')));
        assert!(!app.routing_panel_open);
        app.handle_key(key(KeyCode::Char('?')));
        assert!(!app.show_help);
    }

    #[test]
    fn test_c_centers_camera_on_user_location() {
        let config = StartupConfig {
            user_location: Some(Coordinate::new(-122.5, 37.9)),
            ..Default::default()
        };
        let (_dir, mut app) = app_with_token_and_config(config);
        // Move the camera away, then recenter.
        app.view.camera.center_on(Coordinate::new(0.0, 0.0));
        app.handle_key(key(KeyCode::Char('c')));
        let center = app.view.camera.viewport().center();
        assert!((center.longitude - (-122.5)).abs() < 1e-9);
        assert!((center.latitude - 37.9).abs() < 1e-9);
    }

    // ========================================================================
    // Startup config
    // ========================================================================

    #[test]
    fn test_initial_route_prefills_and_requests_search() {
        let config = StartupConfig {
            initial_route: Some(("San Francisco".to_string(), "Oakland".to_string())),
            ..Default::default()
        };
        let (_dir, app) = app_with_token_and_config(config);
        assert_eq!(app.origin_input, "San Francisco");
        assert_eq!(app.destination_input, "Oakland");
        assert!(app.routing_panel_open);
        assert!(app.trip_search_requested);
    }

    #[test]
    fn test_initial_route_waits_for_token() {
        let dir = TempDir::new().expect("temp dir");
        let store = TokenStore::with_dir(dir.path().join("roadcast"));
        let config = StartupConfig {
            initial_route: Some(("A".to_string(), "B".to_string())),
            ..Default::default()
        };
        let mut app = App::with_token_store(Some(store), config);
        assert_eq!(app.screen, Screen::TokenPrompt);
        assert!(!app.trip_search_requested);

        app.token_input = "pk.now".to_string();
        app.submit_token();
        assert!(app.trip_search_requested);
        assert_eq!(app.origin_input, "A");
    }

    #[test]
    fn test_startup_location_places_user_marker() {
        let config = StartupConfig {
            user_location: Some(Coordinate::new(-122.44, 37.77)),
            ..Default::default()
        };
        let (_dir, app) = app_with_token_and_config(config);
        assert_eq!(app.view.markers().count(), 1);
    }

    // ========================================================================
    // Toasts
    // ========================================================================

    #[test]
    fn test_toast_expiry() {
        let toast = Toast::new(ToastKind::Info, "t", "b");
        assert!(!toast.is_expired(Instant::now()));
        assert!(toast.is_expired(Instant::now() + TOAST_TTL));
    }

    #[test]
    fn test_tick_keeps_fresh_toasts() {
        let (_dir, mut app) = app_with_token();
        app.push_toast(ToastKind::Info, "fresh", "body");
        app.tick();
        assert_eq!(app.toasts().len(), 1);
    }
}
