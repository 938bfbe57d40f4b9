//! Theme configuration for the dashboard chrome.
//!
//! Indicators paint in their configured colours; the theme only styles the
//! header, status bar and help overlay. Light and dark variants are chosen
//! by terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the chrome.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for the title and help border.
    pub highlight: Color,
    /// Color for the count of working items.
    pub healthy: Color,
    /// Color for the count of broken items.
    pub broken: Color,
    /// Style for hover text in the status bar.
    pub hover: Style,
    pub header: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            healthy: Color::Green,
            broken: Color::Red,
            hover: Style::default().fg(Color::White),
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            healthy: Color::Green,
            broken: Color::Red,
            hover: Style::default().fg(Color::Black),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a count of broken items: loud when non-zero.
    pub fn broken_style(&self, broken: usize) -> Style {
        if broken == 0 {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(self.broken).add_modifier(Modifier::BOLD)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_style() {
        let theme = Theme::dark();
        assert_eq!(theme.broken_style(2).fg, Some(Color::Red));
        assert_eq!(theme.broken_style(0).fg, None);
    }
}
