//! Map canvas rendering
//!
//! Draws the interactive map: the active route polyline, endpoint and
//! user-location markers, and the congestion-colored traffic points. The
//! displayed window comes from the controller's camera.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Borders,
    },
    Frame,
};

use crate::app::App;
use crate::data::{all_traffic_points, CongestionLevel};
use crate::map::MarkerKind;

/// Color for a congestion level
pub fn congestion_color(level: CongestionLevel) -> Color {
    match level {
        CongestionLevel::Low => Color::Green,
        CongestionLevel::Medium => Color::Yellow,
        CongestionLevel::High => Color::LightRed,
        CongestionLevel::Severe => Color::Red,
    }
}

/// Color for a marker kind
fn marker_color(kind: MarkerKind) -> Color {
    match kind {
        MarkerKind::Origin => Color::Green,
        MarkerKind::Destination => Color::Red,
        MarkerKind::UserLocation => Color::Blue,
    }
}

/// Shortens a geocoder place name to its leading segment for map labels
fn short_label(label: &str) -> &str {
    label.split(',').next().unwrap_or(label).trim()
}

/// Renders the map canvas into the given area
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let viewport = app.view.camera.viewport();

    // Group traffic points by color so each group renders as one Points shape.
    let mut point_groups: Vec<(Color, Vec<(f64, f64)>)> = Vec::new();
    for level in [
        CongestionLevel::Low,
        CongestionLevel::Medium,
        CongestionLevel::High,
        CongestionLevel::Severe,
    ] {
        let coords: Vec<(f64, f64)> = all_traffic_points()
            .iter()
            .filter(|point| point.congestion == level)
            .map(|point| (point.coordinate.longitude, point.coordinate.latitude))
            .collect();
        if !coords.is_empty() {
            point_groups.push((congestion_color(level), coords));
        }
    }

    let canvas = Canvas::default()
        .block(Block::default().title(" Traffic Map ").borders(Borders::ALL))
        .marker(symbols::Marker::Braille)
        .x_bounds([viewport.west, viewport.east])
        .y_bounds([viewport.south, viewport.north])
        .paint(|ctx| {
            // Route polyline under everything else.
            if let Some(route) = app.view.route() {
                for segment in route.geometry.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: segment[0].longitude,
                        y1: segment[0].latitude,
                        x2: segment[1].longitude,
                        y2: segment[1].latitude,
                        color: Color::Blue,
                    });
                }
            }

            ctx.layer();

            for (color, coords) in &point_groups {
                ctx.draw(&Points {
                    coords: coords.as_slice(),
                    color: *color,
                });
            }

            ctx.layer();

            for marker in app.view.markers() {
                let label = format!("\u{25CF} {}", short_label(&marker.label));
                ctx.print(
                    marker.coordinate.longitude,
                    marker.coordinate.latitude,
                    Line::styled(label, Style::default().fg(marker_color(marker.kind))),
                );
            }
        });

    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_congestion_colors_are_distinct() {
        let colors = [
            congestion_color(CongestionLevel::Low),
            congestion_color(CongestionLevel::Medium),
            congestion_color(CongestionLevel::High),
            congestion_color(CongestionLevel::Severe),
        ];
        for (i, a) in colors.iter().enumerate() {
            for (j, b) in colors.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_short_label_takes_leading_segment() {
        assert_eq!(
            short_label("San Francisco, California, United States"),
            "San Francisco"
        );
        assert_eq!(short_label("Oakland"), "Oakland");
    }
}
