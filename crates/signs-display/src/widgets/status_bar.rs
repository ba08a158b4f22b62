//! Status bar — bottom line with fetch state, active view and keybindings.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::View;
use crate::theme::{C_ERROR, C_IN_PROGRESS, C_MUTED, C_SECONDARY, C_STARTING_SOON};

/// Condition of the schedule feed, shown as a colored bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedHealth {
    Loading,
    Fresh,
    Stale,
    Failed,
}

impl FeedHealth {
    pub fn color(self) -> Color {
        match self {
            FeedHealth::Loading => C_SECONDARY,
            FeedHealth::Fresh => C_IN_PROGRESS,
            FeedHealth::Stale => C_STARTING_SOON,
            FeedHealth::Failed => C_ERROR,
        }
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, view: View, health: FeedHealth) {
    let spans = vec![
        Span::styled(
            format!(" {} ", view.label().to_uppercase()),
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "●",
            Style::default()
                .fg(health.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            "1-4 views  Tab/Shift-Tab cycle  r refresh  K keys  ? help  q quit",
            Style::default().fg(C_MUTED),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
