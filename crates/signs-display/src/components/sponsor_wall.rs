//! Full-screen grid of every sponsor.

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
    theme::{C_ERROR, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::{draw_placeholder, pane_chrome},
    widgets::text::center,
};

use super::sponsor_banner::tile_text;

const TILE_WIDTH: u16 = 24;

pub struct SponsorWall;

impl SponsorWall {
    pub fn new() -> Self {
        Self
    }
}

/// Columns that fit in `width`, at least one.
pub fn columns_for(width: u16) -> usize {
    (width / TILE_WIDTH).max(1) as usize
}

impl Component for SponsorWall {
    fn id(&self) -> ComponentId {
        ComponentId::SponsorWall
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = pane_chrome("Our Sponsors", Some(View::Sponsors.key()), false, None);
        if let Some(err) = &state.sponsor_error {
            draw_placeholder(frame, area, block, &format!("Unable to load sponsors: {err}"), C_ERROR);
            return;
        }
        if !state.sponsors_loaded {
            draw_placeholder(frame, area, block, "Loading sponsors…", C_SECONDARY);
            return;
        }
        if state.sponsors.is_empty() {
            draw_placeholder(frame, area, block, "No sponsors listed", C_SECONDARY);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cols = columns_for(inner.width);
        let rows_fit = (inner.height / 2) as usize;
        let images = state.sponsors.images();
        let capacity = cols * rows_fit;
        let overflow = images.len().saturating_sub(capacity);
        let shown = if overflow > 0 {
            capacity.saturating_sub(1)
        } else {
            images.len()
        };

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(2); rows_fit])
            .split(inner);
        let col_width = inner.width as usize / cols;

        let mut tiles: Vec<(String, Style)> = images[..shown]
            .iter()
            .map(|f| {
                let style = if state.image_ok(f) {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                (tile_text(state, f), style)
            })
            .collect();
        if overflow > 0 {
            tiles.push((
                format!("+{} more", images.len() - shown),
                Style::default().fg(C_MUTED),
            ));
        }

        for (chunk, row) in tiles.chunks(cols).zip(row_areas.iter()) {
            let spans: Vec<Span> = chunk
                .iter()
                .map(|(text, style)| Span::styled(center(text, col_width), *style))
                .collect();
            frame.render_widget(Paragraph::new(Line::from(spans)), *row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_always_has_a_column() {
        assert_eq!(columns_for(0), 1);
        assert_eq!(columns_for(23), 1);
        assert_eq!(columns_for(100), 4);
    }
}
