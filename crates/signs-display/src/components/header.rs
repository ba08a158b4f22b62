//! Header component — 2-row top bar.
//!
//! Row 1: display title, badges, clock and long date.
//! Row 2: view tabs.

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{ComponentId, View},
    app_state::AppState,
    component::Component,
    theme::{
        style_title, C_ACCENT, C_BADGE_DEMO, C_BADGE_ERR, C_BADGE_STALE, C_MUTED, C_NUMBER_HINT,
        C_PRIMARY, C_SECONDARY,
    },
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

/// `"HH:MM"`
pub fn clock_text(now: &DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

/// `"Saturday, March 8, 2025"`
pub fn date_text(now: &DateTime<Local>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

/// Badges shown next to the title, in display order.
pub fn badges(state: &AppState) -> Vec<(&'static str, ratatui::style::Color)> {
    let mut out = Vec::new();
    if state.clock_overridden {
        out.push(("DEMO TIME", C_BADGE_DEMO));
    }
    if state.stale {
        out.push(("STALE", C_BADGE_STALE));
    }
    if state.store.error().is_some() {
        out.push(("OFFLINE", C_BADGE_ERR));
    }
    out
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let clock = format!("{}  {} ", date_text(&state.now), clock_text(&state.now));
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(clock.chars().count() as u16),
            ])
            .split(rows[0]);

        let mut left = vec![
            Span::raw(" "),
            Span::styled(state.title.clone(), style_title()),
        ];
        for (text, color) in badges(state) {
            left.push(Span::raw("  "));
            left.push(Span::styled(
                format!("[{text}]"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(left)), cols[0]);

        let date = date_text(&state.now);
        let right = Line::from(vec![
            Span::styled(date, Style::default().fg(C_SECONDARY)),
            Span::raw("  "),
            Span::styled(
                clock_text(&state.now),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ]);
        frame.render_widget(Paragraph::new(right), cols[1]);

        if rows.len() > 1 && rows[1].height > 0 {
            frame.render_widget(Paragraph::new(tabs_line(state.view)), rows[1]);
        }
    }
}

fn tabs_line(active: View) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for view in View::ALL {
        let style = if view == active {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(C_MUTED)
        };
        spans.push(Span::styled(
            format!("[{}] ", view.key()),
            Style::default().fg(C_NUMBER_HINT),
        ));
        spans.push(Span::styled(view.label(), style));
        spans.push(Span::raw("   "));
    }
    Line::from(spans)
}
