//! Weather card rendering
//!
//! Shows the last-known current conditions, the AI weather forecast preview,
//! and the weather-driven traffic impact badge.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, RequestPhase};
use crate::data::ImpactSeverity;

/// Number of forecast entries previewed on the card
const FORECAST_PREVIEW_ENTRIES: usize = 4;

/// Weather condition label to icon mapping
fn weather_icon(condition: &str) -> &'static str {
    match condition {
        "Clear" => "\u{2600}",                  // ☀
        "Clouds" => "\u{2601}",                 // ☁
        "Rain" | "Drizzle" => "\u{1F327}",      // 🌧
        "Thunderstorm" => "\u{26C8}",           // ⛈
        "Snow" => "\u{2744}",                   // ❄
        "Mist" | "Fog" | "Haze" => "\u{1F32B}", // 🌫
        _ => "\u{26C5}",                        // ⛅
    }
}

/// Color for an impact severity badge
fn severity_color(severity: ImpactSeverity) -> Color {
    match severity {
        ImpactSeverity::Low => Color::Green,
        ImpactSeverity::Medium => Color::Yellow,
        ImpactSeverity::High => Color::Red,
    }
}

/// Renders the weather card into the given area
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let weather = &app.current_weather;
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{:.0}\u{B0}C ", weather.temperature_c),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "{} {}",
                weather_icon(&weather.condition),
                weather.condition
            )),
        ]),
        Line::from(Span::raw(format!(
            "Humidity {}%  Vis {:.1} km  Wind {:.1} m/s",
            weather.humidity_percent, weather.visibility_km, weather.wind_speed_ms
        ))),
    ];

    match app.weather_phase {
        RequestPhase::Requesting => {
            lines.push(Line::from(Span::styled(
                "Analyzing...",
                Style::default().fg(Color::Yellow),
            )));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "\u{2728} AI Weather Forecast (w)",
                Style::default().fg(Color::Cyan),
            )));
        }
    }

    if let Some(snapshot) = &app.weather_snapshot {
        if let Some(impact) = &snapshot.traffic_impact {
            lines.push(Line::from(Span::styled(
                format!(
                    "Traffic impact: +{:.0} min ({})",
                    impact.expected_delay_minutes.max(0.0),
                    impact.severity.label()
                ),
                Style::default()
                    .fg(severity_color(impact.severity))
                    .add_modifier(Modifier::BOLD),
            )));
            if !impact.advice.is_empty() {
                lines.push(Line::from(Span::styled(
                    impact.advice.clone(),
                    Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }

        for entry in snapshot.forecast.iter().take(FORECAST_PREVIEW_ENTRIES) {
            lines.push(Line::from(Span::raw(format!(
                "{} {} {:.0}\u{B0}C {}%",
                entry.time,
                weather_icon(&entry.condition),
                entry.temperature_c,
                entry.precip_probability
            ))));
        }
    }

    if let Some(updated) = app.last_weather_update {
        lines.push(Line::from(Span::styled(
            format!("updated {}", updated.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default().title(" Weather ").borders(Borders::ALL);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_condition_icons() {
        assert_eq!(weather_icon("Clear"), "\u{2600}");
        assert_eq!(weather_icon("Rain"), "\u{1F327}");
        assert_eq!(weather_icon("Thunderstorm"), "\u{26C8}");
    }

    #[test]
    fn test_unknown_condition_falls_back() {
        assert_eq!(weather_icon("Sandstorm"), "\u{26C5}");
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(severity_color(ImpactSeverity::Low), Color::Green);
        assert_eq!(severity_color(ImpactSeverity::Medium), Color::Yellow);
        assert_eq!(severity_color(ImpactSeverity::High), Color::Red);
    }
}
