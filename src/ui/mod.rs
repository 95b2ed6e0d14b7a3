//! UI rendering module for Roadcast
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components. Everything here
//! is stateless presentation: it reads the App and draws, nothing more.

pub mod help_overlay;
pub mod map_view;
pub mod search_panel;
pub mod toast;
pub mod token_prompt;
pub mod traffic_card;
pub mod weather_card;

pub use help_overlay::render as render_help_overlay;
pub use map_view::render as render_map_view;
pub use search_panel::render as render_search_panel;
pub use toast::render as render_toasts;
pub use token_prompt::render as render_token_prompt;
pub use traffic_card::render as render_traffic_card;
pub use weather_card::render as render_weather_card;
