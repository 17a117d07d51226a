//! Common UI components.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Clock;

/// Render the header bar.
///
/// Displays: freshness indicator, fee unit, base fee time frame, source.
pub fn render_header<C: Clock>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let phase = app.freshness().phase();

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.freshness_style(phase)),
        Span::styled("LATEST BLOCKS ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ fees in "),
        Span::styled(app.unit.label(), Style::default().fg(app.theme.highlight)),
        Span::raw(" │ base fee "),
        Span::styled(
            app.time_frame.label(),
            app.theme.urgency_style(app.fee_urgency()),
        ),
        Span::raw(" │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows time since last update and available controls, or a temporary
/// status message or source error when there is one.
pub fn render_status_bar<C: Clock>(frame: &mut Frame, app: &App<C>, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "u:unit t:time frame r:reload ?:help q:quit";
    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | {}", err, controls)
    } else if let Some(updated) = app.last_updated {
        format!(
            " Updated {:.1}s ago | {}",
            updated.elapsed().as_secs_f64(),
            controls
        )
    } else {
        format!(" Waiting for data... | {}", controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help<C: Clock>(frame: &mut Frame, app: &App<C>, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Display",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  u         Toggle ETH / USD fees"),
        Line::from("  t         Cycle base fee time frame"),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Resyncing after {} without a block", app.stale_after_label()),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Reload data"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 16u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
