//! Sponsor strip under the carousel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::Paragraph,
    Frame,
};

use signs_proto::sponsors::display_name;

use crate::{
    action::ComponentId,
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::{draw_placeholder, pane_chrome},
    widgets::text::center,
};

/// Shown in place of a logo whose image could not be loaded.
pub const FALLBACK_TILE: &str = "◇ sponsor ◇";

pub struct SponsorBanner;

impl SponsorBanner {
    pub fn new() -> Self {
        Self
    }
}

/// Text for one banner tile.
pub fn tile_text(state: &AppState, file: &str) -> String {
    if state.image_ok(file) {
        display_name(file)
    } else {
        FALLBACK_TILE.to_string()
    }
}

impl Component for SponsorBanner {
    fn id(&self) -> ComponentId {
        ComponentId::SponsorBanner
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = pane_chrome("Thank you to our sponsors", None, false, None);
        if state.banner.is_empty() {
            let msg = if state.sponsors_loaded || state.sponsor_error.is_some() {
                ""
            } else {
                "Loading sponsors…"
            };
            draw_placeholder(frame, area, block, msg, C_MUTED);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        let n = state.banner.len() as u32;
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, n); state.banner.len()])
            .split(inner);
        for (file, col) in state.banner.iter().zip(cols.iter()) {
            let text = tile_text(state, file);
            let style = if state.image_ok(file) {
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_SECONDARY)
            };
            frame.render_widget(
                Paragraph::new(Span::styled(center(&text, col.width as usize), style)),
                *col,
            );
        }
    }
}
