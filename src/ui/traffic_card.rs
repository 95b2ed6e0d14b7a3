//! Traffic conditions card rendering
//!
//! Stateless list of the monitored traffic points with their congestion
//! levels, plus the severity legend.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{all_traffic_points, CongestionLevel};
use crate::ui::map_view::congestion_color;

/// Human label shown for a congestion level
fn congestion_description(level: CongestionLevel) -> &'static str {
    match level {
        CongestionLevel::Low => "light",
        CongestionLevel::Medium => "moderate",
        CongestionLevel::High => "heavy",
        CongestionLevel::Severe => "severe",
    }
}

/// Renders the traffic conditions card into the given area
pub fn render(frame: &mut Frame, _app: &App, area: Rect) {
    let mut lines: Vec<Line> = all_traffic_points()
        .iter()
        .map(|point| {
            Line::from(vec![
                Span::styled(
                    "\u{25CF} ",
                    Style::default().fg(congestion_color(point.congestion)),
                ),
                Span::raw(format!("{:<20}", point.name)),
                Span::styled(
                    congestion_description(point.congestion),
                    Style::default().fg(congestion_color(point.congestion)),
                ),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(
        [
            CongestionLevel::Low,
            CongestionLevel::Medium,
            CongestionLevel::High,
            CongestionLevel::Severe,
        ]
        .iter()
        .flat_map(|level| {
            [
                Span::styled("\u{25CF}", Style::default().fg(congestion_color(*level))),
                Span::raw(format!("{} ", congestion_description(*level))),
            ]
        })
        .collect::<Vec<_>>(),
    ));

    let block = Block::default()
        .title(" Traffic Conditions ")
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
