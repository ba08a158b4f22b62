//! Action enum — user intents and internal events.

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Header,
    ScheduleCarousel,
    SessionList,
    SponsorBanner,
    SponsorWall,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Views ────────────────────────────────────────────────────────────────
    SwitchView(View),
    NextView,
    PrevView,

    // ── Data ─────────────────────────────────────────────────────────────────
    /// Fetch schedule and sponsors right now.
    Refresh,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}

/// Which full-screen view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Schedule,
    Keynotes,
    Colocated,
    Sponsors,
}

impl View {
    pub const ALL: [View; 4] = [View::Schedule, View::Keynotes, View::Colocated, View::Sponsors];

    pub fn label(self) -> &'static str {
        match self {
            View::Schedule => "Schedule",
            View::Keynotes => "Keynotes",
            View::Colocated => "Co-located Events",
            View::Sponsors => "Sponsors",
        }
    }

    /// Config / API name.
    pub fn name(self) -> &'static str {
        match self {
            View::Schedule => "schedule",
            View::Keynotes => "keynotes",
            View::Colocated => "colocated",
            View::Sponsors => "sponsors",
        }
    }

    pub fn from_name(name: &str) -> Option<View> {
        let name = name.trim();
        View::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }

    /// Number key that selects this view.
    pub fn key(self) -> char {
        match self {
            View::Schedule => '1',
            View::Keynotes => '2',
            View::Colocated => '3',
            View::Sponsors => '4',
        }
    }

    pub fn from_key(c: char) -> Option<View> {
        View::ALL.into_iter().find(|v| v.key() == c)
    }

    pub fn next(self) -> View {
        let idx = View::ALL.iter().position(|v| *v == self).unwrap_or(0);
        View::ALL[(idx + 1) % View::ALL.len()]
    }

    pub fn prev(self) -> View {
        let idx = View::ALL.iter().position(|v| *v == self).unwrap_or(0);
        View::ALL[(idx + View::ALL.len() - 1) % View::ALL.len()]
    }
}
