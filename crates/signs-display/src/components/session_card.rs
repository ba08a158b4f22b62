//! One bordered card per session.
//!
//! ```text
//! ┌ Room 101 ─────────────────────── In Progress (35 min) ┐
//! │ Writing a Tokio Runtime From Scratch                  │
//! │ 10:00 - 11:00                                         │
//! │ Ada Lovelace, Grace Hopper · Developer                │
//! └───────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use signs_proto::protocol::Presentation;
use signs_proto::session::SessionWithStatus;

use crate::theme::{status_color, style_title, C_SECONDARY, C_SPEAKER, C_TOPIC};
use crate::widgets::pane_chrome::{pane_chrome, Badge};
use crate::widgets::text::truncate;

pub const CARD_HEIGHT: u16 = 5;

/// `"HH:MM - HH:MM"`, with `" (next day)"` when the session ends on a later
/// local calendar day than it starts.
pub fn time_range(p: &Presentation) -> String {
    let start: DateTime<Local> = p.start_time.with_timezone(&Local);
    let end: DateTime<Local> = p.end_time.with_timezone(&Local);
    let mut s = format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"));
    if p.ends_next_day(&Local) {
        s.push_str(" (next day)");
    }
    s
}

/// Speakers and topic on one line; `None` when both are missing.
pub fn detail_line(p: &Presentation) -> Option<String> {
    let topic = p.topic.trim();
    match (p.speaker_line(), topic.is_empty()) {
        (Some(speakers), false) => Some(format!("{speakers} · {topic}")),
        (Some(speakers), true) => Some(speakers),
        (None, false) => Some(topic.to_string()),
        (None, true) => None,
    }
}

fn body_lines(s: &SessionWithStatus, width: usize) -> Vec<Line<'static>> {
    let p = &s.presentation;
    let mut lines = vec![
        Line::from(Span::styled(truncate(&p.name, width), style_title())),
        Line::from(Span::styled(
            time_range(p),
            Style::default().fg(C_SECONDARY),
        )),
    ];
    if let Some(detail) = detail_line(p) {
        let color = if p.speaker_line().is_some() {
            C_SPEAKER
        } else {
            C_TOPIC
        };
        lines.push(Line::from(Span::styled(
            truncate(&detail, width),
            Style::default().fg(color),
        )));
    }
    lines
}

pub fn draw_card(frame: &mut Frame, area: Rect, s: &SessionWithStatus) {
    let location = truncate(s.presentation.location.trim(), area.width.saturating_sub(30) as usize);
    let pill = s.status.label();
    let block = pane_chrome(
        &location,
        None,
        s.status.is_in_progress,
        Some(Badge {
            text: &pill,
            color: status_color(&s.status),
        }),
    );

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(body_lines(s, inner.width as usize)),
        inner,
    );
}

/// Stack cards top to bottom, as many as fit in `area`.
pub fn draw_stack(frame: &mut Frame, area: Rect, sessions: &[SessionWithStatus]) {
    let fit = (area.height / CARD_HEIGHT) as usize;
    let shown = sessions.len().min(fit);
    if shown == 0 {
        return;
    }
    let mut constraints = vec![Constraint::Length(CARD_HEIGHT); shown];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    for (s, row) in sessions.iter().take(shown).zip(rows.iter()) {
        draw_card(frame, *row, s);
    }
}
