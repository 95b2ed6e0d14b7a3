//! Map access token entry screen
//!
//! Shown while no token is stored. Saving a token initializes the map
//! feature in place; no restart is involved.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Renders the token entry prompt centered on the screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let prompt_area = centered_rect(56, 9, area);

    frame.render_widget(Clear, prompt_area);

    let lines = vec![
        Line::from(Span::styled(
            "Enter Map Access Token",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::raw(
            "A map provider token is required for geocoding and routing.",
        )),
        Line::from(Span::styled(
            "Get a free token from your map provider account page.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Token: "),
            Span::raw(app.token_input.clone()),
            Span::styled("\u{2588}", Style::default().fg(Color::White)),
        ]),
        Line::from(Span::styled(
            "Enter saves and loads the map, Esc quits",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Roadcast ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, prompt_area);
}

/// Creates a centered rectangle of the given size within the area
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}
