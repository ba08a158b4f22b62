//! Keynote and co-located event views. Both page through a filtered list
//! of sessions that have not ended yet.

use ratatui::{layout::Rect, Frame};

use signs_proto::rotator::Rotator;
use signs_proto::session::SessionWithStatus;

use crate::{
    action::{ComponentId, View},
    app_state::AppState,
    component::Component,
    theme::{C_ERROR, C_SECONDARY, C_UPCOMING},
    widgets::pane_chrome::{draw_placeholder, pane_chrome, Badge},
};

use super::session_card::draw_stack;

pub struct SessionList {
    view: View,
}

impl SessionList {
    pub fn keynotes() -> Self {
        Self {
            view: View::Keynotes,
        }
    }

    pub fn colocated() -> Self {
        Self {
            view: View::Colocated,
        }
    }

    fn source<'a>(&self, state: &'a AppState) -> (&'a [SessionWithStatus], &'a Rotator) {
        match self.view {
            View::Keynotes => (&state.keynotes, &state.keynote_pager),
            _ => (&state.colocated, &state.colocated_pager),
        }
    }

    fn empty_message(&self) -> &'static str {
        match self.view {
            View::Keynotes => "No upcoming keynotes",
            _ => "No upcoming co-located events",
        }
    }
}

impl Component for SessionList {
    fn id(&self) -> ComponentId {
        ComponentId::SessionList
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let (sessions, pager) = self.source(state);
        let page = pager.page_label();
        let badge = page.as_deref().map(|text| Badge {
            text,
            color: C_UPCOMING,
        });
        let block = pane_chrome(self.view.label(), Some(self.view.key()), false, badge);

        if state.store.is_loading() {
            draw_placeholder(frame, area, block, "Loading schedule…", C_SECONDARY);
            return;
        }
        if let Some(err) = state.store.error() {
            draw_placeholder(frame, area, block, &format!("Unable to load schedule: {err}"), C_ERROR);
            return;
        }
        if sessions.is_empty() {
            draw_placeholder(frame, area, block, self.empty_message(), C_SECONDARY);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        draw_stack(frame, inner, pager.slice(sessions));
    }
}
