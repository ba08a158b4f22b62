//! Session classification relative to a reference time.
//!
//! Everything here is a pure function of `(presentation, now)`; callers
//! re-run it on every tick instead of caching results.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::protocol::Presentation;

/// Sessions starting within this many minutes are flagged "starting soon".
pub const STARTING_SOON_MINUTES: i64 = 10;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Derived status of one session at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStatus {
    pub is_in_progress: bool,
    pub is_starting_soon: bool,
    pub is_past: bool,
    pub minutes_until_start: i64,
    pub minutes_remaining: i64,
}

impl SessionStatus {
    pub fn is_upcoming(&self) -> bool {
        !self.is_in_progress && !self.is_past
    }

    /// Short pill text used by the session cards.
    pub fn label(&self) -> String {
        if self.is_in_progress {
            format!("In Progress ({} min)", self.minutes_remaining)
        } else if self.is_past {
            "Ended".to_string()
        } else if self.is_starting_soon {
            format!("Starting Soon ({} min)", self.minutes_until_start)
        } else {
            format!("Upcoming ({} min)", self.minutes_until_start)
        }
    }
}

/// A presentation paired with its status at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionWithStatus {
    pub presentation: Presentation,
    pub status: SessionStatus,
}

/// Classify `p` against `now`.
///
/// In progress means `now ∈ [start, end)`; a session is past from the
/// instant it ends.
pub fn classify<Tz: TimeZone>(p: &Presentation, now: &DateTime<Tz>) -> SessionStatus {
    classify_with(p, now, STARTING_SOON_MINUTES)
}

/// Like [`classify`] with a configurable "starting soon" threshold.
pub fn classify_with<Tz: TimeZone>(
    p: &Presentation,
    now: &DateTime<Tz>,
    starting_soon_minutes: i64,
) -> SessionStatus {
    let now_ms = now.timestamp_millis();
    let start_ms = p.start_time.timestamp_millis();
    let end_ms = p.end_time.timestamp_millis();

    let is_in_progress = now_ms >= start_ms && now_ms < end_ms;
    let is_past = now_ms >= end_ms;

    let minutes_until_start = if is_in_progress {
        0
    } else {
        ceil_minutes(start_ms - now_ms)
    };
    let minutes_remaining = if is_in_progress {
        ceil_minutes(end_ms - now_ms)
    } else {
        0
    };

    SessionStatus {
        is_in_progress,
        is_starting_soon: !is_in_progress && !is_past && minutes_until_start <= starting_soon_minutes,
        is_past,
        minutes_until_start,
        minutes_remaining,
    }
}

/// `max(0, ceil(millis / 60s))`
fn ceil_minutes(millis: i64) -> i64 {
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE
    }
}

/// Keynotes that have not ended yet, sorted by start time.
pub fn keynotes<Tz: TimeZone>(
    presentations: &[Presentation],
    now: &DateTime<Tz>,
    keyword: &str,
) -> Vec<SessionWithStatus> {
    let keyword = keyword.to_lowercase();
    not_past_where(presentations, now, |p| {
        p.topic.to_lowercase().contains(&keyword)
    })
}

/// Co-located events (topic equal to one of `topics`, ignoring case) that
/// have not ended yet, sorted by start time.
pub fn colocated<Tz: TimeZone>(
    presentations: &[Presentation],
    now: &DateTime<Tz>,
    topics: &[String],
) -> Vec<SessionWithStatus> {
    not_past_where(presentations, now, |p| {
        topics.iter().any(|t| t.eq_ignore_ascii_case(p.topic.trim()))
    })
}

fn not_past_where<Tz, F>(
    presentations: &[Presentation],
    now: &DateTime<Tz>,
    mut keep: F,
) -> Vec<SessionWithStatus>
where
    Tz: TimeZone,
    F: FnMut(&Presentation) -> bool,
{
    let mut out: Vec<SessionWithStatus> = presentations
        .iter()
        .filter(|&p| keep(p))
        .map(|p| SessionWithStatus {
            presentation: p.clone(),
            status: classify(p, now),
        })
        .filter(|s| !s.status.is_past)
        .collect();
    out.sort_by_key(|s| s.presentation.start_time);
    out
}
