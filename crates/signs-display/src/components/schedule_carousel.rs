//! Now/next carousel: the selected sessions, one page at a time.

use ratatui::{layout::Rect, Frame};

use crate::{
    action::{ComponentId, View},
    app_state::AppState,
    component::Component,
    theme::{C_ERROR, C_SECONDARY, C_UPCOMING},
    widgets::pane_chrome::{draw_placeholder, pane_chrome, Badge},
};

use super::session_card::draw_stack;

pub struct ScheduleCarousel;

impl ScheduleCarousel {
    pub fn new() -> Self {
        Self
    }
}

/// Placeholder text for the carousel, or `None` when there are cards to show.
pub fn placeholder(state: &AppState) -> Option<(String, ratatui::style::Color)> {
    if state.store.is_loading() {
        Some(("Loading schedule…".to_string(), C_SECONDARY))
    } else if let Some(err) = state.store.error() {
        Some((format!("Unable to load schedule: {err}"), C_ERROR))
    } else if state.selected.is_empty() {
        Some(("No upcoming sessions".to_string(), C_SECONDARY))
    } else {
        None
    }
}

impl Component for ScheduleCarousel {
    fn id(&self) -> ComponentId {
        ComponentId::ScheduleCarousel
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let page = state.carousel.page_label();
        let badge = page.as_deref().map(|text| Badge {
            text,
            color: C_UPCOMING,
        });
        let block = pane_chrome("Now & Next", Some(View::Schedule.key()), false, badge);

        if let Some((msg, color)) = placeholder(state) {
            draw_placeholder(frame, area, block, &msg, color);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        draw_stack(frame, inner, state.visible_sessions());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone, Utc};
    use signs_proto::config::Config;
    use signs_proto::protocol::ScheduleData;

    #[test]
    fn placeholders_cover_loading_error_and_empty() {
        let t = Local.with_ymd_and_hms(2025, 3, 8, 9, 0, 0).earliest().unwrap();
        let mut state = AppState::new(&Config::default(), t, false);
        assert_eq!(placeholder(&state).unwrap().0, "Loading schedule…");

        state.apply_schedule::<String>(Err("connection refused".into()), Utc::now());
        assert_eq!(
            placeholder(&state).unwrap().0,
            "Unable to load schedule: connection refused"
        );

        state.apply_schedule::<String>(Ok(ScheduleData::default()), Utc::now());
        assert_eq!(placeholder(&state).unwrap().0, "No upcoming sessions");
    }
}
