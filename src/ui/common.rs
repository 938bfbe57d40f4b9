//! Chrome around the dashboard: header bar, status bar and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar: title, item count, broken count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.len();
    let broken = app.broken_count();

    let line = Line::from(vec![
        Span::styled(" ● ", Style::default().fg(if broken > 0 {
            app.theme.broken
        } else {
            app.theme.healthy
        })),
        Span::styled("TINYDASH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" items "),
        Span::styled(format!("{}", broken), app.theme.broken_style(broken)),
        Span::raw(" broken │ "),
        Span::raw(format!("{}", app.window)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar: hover text while the pointer is over an item,
/// otherwise the key hints.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = match app.status_text {
        Some(ref text) => Paragraph::new(format!(" {} ", text)).style(app.theme.hover),
        None => Paragraph::new(" ?:help q:quit")
            .style(Style::default().add_modifier(Modifier::DIM)),
    };
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  q Esc     Quit"),
        Line::from("  Ctrl-q    Quit"),
        Line::from("  ?         Toggle this help"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Mouse",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Hover an item to see its name"),
        Line::from("  or why it is broken"),
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

    let help_width = 36u16.min(area.width.saturating_sub(4));
    let help_height = 13u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
