//! Roadcast - traffic conditions, weather, and AI route predictions
//!
//! A terminal UI application that renders an interactive map with simulated
//! traffic congestion points, live weather conditions, and AI-generated
//! route and weather predictions.

mod app;
mod cli;
mod credentials;
mod data;
mod map;
mod requests;
mod ui;

use std::io;
use std::panic;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use app::{App, Screen};
use cli::{Cli, StartupConfig};
use requests::AppMessage;

/// Sets up a panic hook that restores the terminal before printing the panic
/// message. This ensures the terminal is usable even if the application
/// panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Initializes tracing with a log file under the cache directory
///
/// The TUI owns the terminal, so diagnostics must never go to stdout/stderr.
/// Logging is skipped silently if no cache directory is available.
fn init_logging() {
    let Some(project_dirs) = ProjectDirs::from("", "", "roadcast") else {
        return;
    };
    let log_dir = project_dirs.cache_dir().to_path_buf();
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(log_dir.join("roadcast.log")) else {
        return;
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roadcast=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    match app.screen {
        Screen::TokenPrompt => {
            ui::render_token_prompt(frame, app);
        }
        Screen::Map => {
            render_map_screen(frame, app);
        }
    }

    ui::render_toasts(frame, app);

    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Renders the map screen: side panel on the left, map canvas on the right
fn render_map_screen(frame: &mut ratatui::Frame, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(42), Constraint::Min(20)])
        .split(frame.area());

    if app.routing_panel_open {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(16),
                Constraint::Length(12),
                Constraint::Length(10),
            ])
            .split(columns[0]);
        ui::render_search_panel(frame, app, rows[0]);
        ui::render_weather_card(frame, app, rows[1]);
        ui::render_traffic_card(frame, app, rows[2]);
    } else {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(0),
            ])
            .split(columns[0]);
        ui::render_weather_card(frame, app, rows[0]);
        ui::render_traffic_card(frame, app, rows[1]);
        let hint = Paragraph::new("d directions  w weather  ? help")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, rows[2]);
    }

    ui::render_map_view(frame, app, columns[1]);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments before touching the terminal
    let cli_args = Cli::parse();
    let config = match StartupConfig::from_cli(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };

    init_logging();

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app instance and the channel request tasks report back on
    let mut app = App::with_startup_config(config);
    let (sender, mut receiver) = mpsc::channel::<AppMessage>(32);

    // Main event loop
    loop {
        app.tick();

        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Spawn any user-requested network work
        if app.trip_search_requested {
            app.trip_search_requested = false;
            if let Some(adapters) = app.adapters().cloned() {
                if let Some(request) = app.begin_trip_search() {
                    requests::spawn_trip_search(adapters, sender.clone(), request);
                }
            }
        }
        if app.weather_forecast_requested {
            app.weather_forecast_requested = false;
            if let Some(adapters) = app.adapters().cloned() {
                if let Some(request) = app.begin_weather_forecast() {
                    requests::spawn_weather_prediction(adapters, sender.clone(), request);
                }
            }
        }

        // Apply completed request messages without blocking
        while let Ok(message) = receiver.try_recv() {
            app.apply_message(message);
        }

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
