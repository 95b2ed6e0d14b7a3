//! Routing panel rendering
//!
//! Renders the directions side panel: origin/destination inputs, the
//! request status, the summary of the active route, and the AI prediction
//! card.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, RequestPhase, SearchField};
use crate::data::TrafficPrediction;

/// Renders the routing panel into the given area
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // search inputs
            Constraint::Length(2), // status line
            Constraint::Length(4), // route summary
            Constraint::Min(0),    // prediction card
        ])
        .split(area);

    render_inputs(frame, app, chunks[0]);
    render_status(frame, app, chunks[1]);
    render_route_summary(frame, app, chunks[2]);
    render_prediction(frame, app, chunks[3]);
}

fn input_line(label: &str, value: &str, marker_color: Color, focused: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled("\u{25CF} ", Style::default().fg(marker_color)),
        Span::raw(format!("{label}: ")),
    ];
    if value.is_empty() && !focused {
        spans.push(Span::styled(
            "choose a place...",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(value.to_string()));
    }
    if focused {
        spans.push(Span::styled("\u{2588}", Style::default().fg(Color::White)));
    }
    Line::from(spans)
}

fn render_inputs(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        input_line(
            "From",
            &app.origin_input,
            Color::Green,
            app.input_focus == Some(SearchField::Origin),
        ),
        input_line(
            "To",
            &app.destination_input,
            Color::Red,
            app.input_focus == Some(SearchField::Destination),
        ),
        Line::from(Span::styled(
            "Tab switches field, Enter searches",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().title(" Directions ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = match app.trip_phase {
        RequestPhase::Requesting => {
            Span::styled("Analyzing with AI...", Style::default().fg(Color::Yellow))
        }
        RequestPhase::Failed => {
            Span::styled("Last prediction failed", Style::default().fg(Color::Red))
        }
        RequestPhase::Ready => {
            Span::styled("Prediction ready", Style::default().fg(Color::Green))
        }
        RequestPhase::Idle => Span::styled(
            "\u{2728} Get AI Prediction (Enter)",
            Style::default().fg(Color::Cyan),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(status)), area);
}

fn render_route_summary(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.view.route() {
        Some(route) => vec![
            Line::from(vec![
                Span::styled("Fastest  ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{} min", route.duration_minutes()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::raw(format!("{:.1} km driving", route.distance_km()))),
        ],
        None => vec![Line::from(Span::styled(
            "No route yet",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let block = Block::default().title(" Route ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_prediction(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" AI Prediction ")
        .borders(Borders::ALL);

    let lines = match &app.trip_prediction {
        Some(prediction) => prediction_lines(prediction),
        None => vec![Line::from(Span::styled(
            "Search a route to get a prediction",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Color for a predicted delay magnitude
fn delay_color(minutes: f64) -> Color {
    if minutes >= 15.0 {
        Color::Red
    } else if minutes >= 5.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn prediction_lines(prediction: &TrafficPrediction) -> Vec<Line<'static>> {
    // Display defensively even though parsing validated ranges.
    let delay = prediction.predicted_delay_minutes.max(0.0);
    let confidence = prediction.confidence_percent.clamp(0.0, 100.0);

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Predicted delay: "),
            Span::styled(
                format!("+{delay:.0} min"),
                Style::default()
                    .fg(delay_color(delay))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::raw(format!("Confidence: {confidence:.0}%"))),
    ];

    if let Some(alternative) = &prediction.alternative_route {
        lines.push(Line::from(vec![
            Span::styled("Alternative: ", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                "{} (saves {:.0} min)",
                alternative.name,
                alternative.saved_time_minutes.max(0.0)
            )),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        prediction.analysis.clone(),
        Style::default().fg(Color::Gray),
    )));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AlternativeRoute;

    #[test]
    fn test_delay_color_thresholds() {
        assert_eq!(delay_color(2.0), Color::Green);
        assert_eq!(delay_color(8.0), Color::Yellow);
        assert_eq!(delay_color(20.0), Color::Red);
    }

    #[test]
    fn test_prediction_lines_include_alternative() {
        let prediction = TrafficPrediction {
            predicted_delay_minutes: 18.0,
            confidence_percent: 87.0,
            alternative_route: Some(AlternativeRoute {
                name: "Riverside Route".to_string(),
                saved_time_minutes: 12.0,
            }),
            analysis: "busy".to_string(),
        };
        let lines = prediction_lines(&prediction);
        let text: String = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|span| span.content.clone().into_owned())
            .collect();
        assert!(text.contains("+18 min"));
        assert!(text.contains("87%"));
        assert!(text.contains("Riverside Route"));
    }

    #[test]
    fn test_prediction_lines_clamp_out_of_range_display() {
        let prediction = TrafficPrediction {
            predicted_delay_minutes: -3.0,
            confidence_percent: 250.0,
            alternative_route: None,
            analysis: "odd".to_string(),
        };
        let lines = prediction_lines(&prediction);
        let text: String = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .map(|span| span.content.clone().into_owned())
            .collect();
        assert!(text.contains("+0 min"));
        assert!(text.contains("100%"));
    }
}
