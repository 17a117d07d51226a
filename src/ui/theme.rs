//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{FeeUrgency, FreshnessPhase};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Base fee color when the average sits above the barrier.
    pub warm: Color,
    /// Base fee color at or below the barrier.
    pub cool: Color,
    /// Color for a stalled feed.
    pub stalled: Color,
    /// Color for a feed that is keeping up.
    pub fresh: Color,
    /// Color for skeleton placeholders.
    pub placeholder: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warm: Color::LightRed,
            cool: Color::LightBlue,
            stalled: Color::Red,
            fresh: Color::Green,
            placeholder: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warm: Color::Red,
            cool: Color::Blue,
            stalled: Color::Red,
            fresh: Color::Green,
            placeholder: Color::Gray,
            border: Color::DarkGray,
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

    /// Style for the base fee column.
    pub fn urgency_style(&self, urgency: FeeUrgency) -> Style {
        match urgency {
            FeeUrgency::Normal => Style::default().fg(self.cool),
            FeeUrgency::Elevated => Style::default().fg(self.warm).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for the freshness indicator.
    pub fn freshness_style(&self, phase: FreshnessPhase) -> Style {
        match phase {
            FreshnessPhase::Uninitialized => Style::default().fg(self.placeholder),
            FreshnessPhase::Tracking { .. } => Style::default().fg(self.fresh),
            FreshnessPhase::Stalled { .. } => {
                Style::default().fg(self.stalled).add_modifier(Modifier::BOLD)
            }
        }
    }

    pub fn placeholder_style(&self) -> Style {
        Style::default().fg(self.placeholder)
    }
}
