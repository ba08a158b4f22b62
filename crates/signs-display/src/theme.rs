//! Color palette and style constants for the kiosk display.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(14, 16, 24);
pub const C_ACCENT: Color = Color::Rgb(255, 140, 60);
pub const C_IN_PROGRESS: Color = Color::Rgb(80, 200, 120);
pub const C_STARTING_SOON: Color = Color::Rgb(255, 184, 80);
pub const C_UPCOMING: Color = Color::Rgb(90, 150, 230);
pub const C_ERROR: Color = Color::Rgb(255, 80, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SECONDARY: Color = Color::Rgb(125, 125, 148);
pub const C_PRIMARY: Color = Color::Rgb(220, 220, 232);
pub const C_PANEL_BORDER: Color = Color::Rgb(48, 48, 64);
pub const C_PANEL_BORDER_LIVE: Color = Color::Rgb(60, 140, 90);
pub const C_NUMBER_HINT: Color = Color::Rgb(90, 90, 115);
pub const C_TOPIC: Color = Color::Rgb(80, 140, 200);
pub const C_SPEAKER: Color = Color::Rgb(180, 150, 220);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_BADGE_DEMO: Color = Color::Rgb(200, 120, 255);
pub const C_BADGE_STALE: Color = Color::Rgb(255, 184, 80);
pub const C_BADGE_ERR: Color = Color::Rgb(255, 95, 95);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_title() -> Style {
    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn style_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_live_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_LIVE)
}

/// Pill color for a session status.
pub fn status_color(status: &signs_proto::session::SessionStatus) -> Color {
    if status.is_in_progress {
        C_IN_PROGRESS
    } else if status.is_starting_soon {
        C_STARTING_SOON
    } else if status.is_past {
        C_MUTED
    } else {
        C_UPCOMING
    }
}
