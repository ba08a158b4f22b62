//! ViewManager — screen layout and the keys-bar toggle.
//!
//! The active view itself lives in `AppState` (the status API reports it);
//! this tracks the chrome around it and splits the screen.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::action::View;

pub const HEADER_HEIGHT: u16 = 2;
pub const BANNER_HEIGHT: u16 = 3;

/// Screen regions for one frame. Zero-sized when hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub header: Rect,
    pub body: Rect,
    pub banner: Rect,
    pub status: Rect,
}

pub struct ViewManager {
    pub show_keys_bar: bool,
}

impl ViewManager {
    pub fn new() -> Self {
        Self {
            show_keys_bar: true,
        }
    }

    /// Header | body | sponsor banner (schedule view only) | keys bar.
    pub fn regions(&self, area: Rect, view: View) -> Regions {
        let status_h = if self.show_keys_bar { 1 } else { 0 };
        let banner_h = if view == View::Schedule && area.height >= 16 {
            BANNER_HEIGHT
        } else {
            0
        };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(banner_h),
                Constraint::Length(status_h),
            ])
            .split(area);
        Regions {
            header: rows[0],
            body: rows[1],
            banner: rows[2],
            status: rows[3],
        }
    }
}
