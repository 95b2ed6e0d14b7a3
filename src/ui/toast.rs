//! Toast notification overlay
//!
//! Renders the transient notification stack in the bottom-right corner of
//! the screen. Toasts expire after a fixed TTL; the controller prunes them.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Toast, ToastKind};

/// Width of a toast box
const TOAST_WIDTH: u16 = 44;

/// Height of a toast box
const TOAST_HEIGHT: u16 = 4;

/// Maximum number of toasts stacked on screen at once
const MAX_VISIBLE_TOASTS: usize = 3;

fn toast_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Info => Color::Cyan,
        ToastKind::Error => Color::Red,
    }
}

/// Renders the toast stack over the current view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.width < TOAST_WIDTH + 2 || area.height < TOAST_HEIGHT + 1 {
        return;
    }

    // Newest toast sits closest to the bottom edge.
    for (index, toast) in app
        .toasts()
        .iter()
        .rev()
        .take(MAX_VISIBLE_TOASTS)
        .enumerate()
    {
        let y_offset = (index as u16 + 1) * TOAST_HEIGHT;
        if y_offset + 1 > area.height {
            break;
        }
        let toast_area = Rect::new(
            area.right().saturating_sub(TOAST_WIDTH + 1),
            area.bottom().saturating_sub(y_offset + 1),
            TOAST_WIDTH,
            TOAST_HEIGHT,
        );
        render_toast(frame, toast, toast_area);
    }
}

fn render_toast(frame: &mut Frame, toast: &Toast, area: Rect) {
    frame.render_widget(Clear, area);

    let color = toast_color(toast.kind);
    let lines = vec![
        Line::from(Span::styled(
            toast.title.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw(toast.body.clone())),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
