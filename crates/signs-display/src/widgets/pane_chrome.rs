//! PaneChrome — standardized bordered pane with badges.

use crate::theme::{style_border, style_live_border, C_MUTED, C_NUMBER_HINT, C_PRIMARY};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

/// A badge shown in the top-right of the pane header (e.g. "LIVE", "STALE").
pub struct Badge<'a> {
    pub text: &'a str,
    pub color: Color,
}

/// A bordered pane titled `"[N] title"`. `live` switches to the
/// highlighted border used for in-progress sessions.
pub fn pane_chrome<'a>(
    title: &'a str,
    number_key: Option<char>,
    live: bool,
    badge: Option<Badge<'a>>,
) -> Block<'a> {
    let border_style = if live {
        style_live_border()
    } else {
        style_border()
    };

    let title_style = if live {
        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_MUTED)
    };

    let mut title_spans = Vec::new();
    if let Some(key) = number_key {
        title_spans.push(Span::styled(
            format!("[{}] ", key),
            Style::default().fg(C_NUMBER_HINT),
        ));
    }
    title_spans.push(Span::styled(title, title_style));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(title_spans));

    if let Some(b) = badge {
        block.title_top(
            Line::from(Span::styled(
                format!(" {} ", b.text),
                Style::default().fg(b.color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        )
    } else {
        block
    }
}

/// Centered one-line message inside a bordered pane, for loading, error
/// and empty states.
pub fn draw_placeholder(
    frame: &mut ratatui::Frame,
    area: ratatui::layout::Rect,
    block: Block<'_>,
    message: &str,
    color: Color,
) {
    use ratatui::layout::Alignment;
    use ratatui::widgets::Paragraph;

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }
    let mid = ratatui::layout::Rect {
        y: inner.y + inner.height / 2,
        height: 1,
        ..inner
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            crate::widgets::text::truncate(message, inner.width as usize),
            Style::default().fg(color),
        ))
        .alignment(Alignment::Center),
        mid,
    );
}
