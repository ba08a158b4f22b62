//! Picks the "interesting" sessions for the now/next carousel.
//!
//! Policy, in order:
//! 1. classify everything against `now` and drop past sessions;
//! 2. split into today / tomorrow by `now`'s calendar day;
//! 3. nothing left today → take tomorrow's earliest start-time groups;
//! 4. otherwise drop talks about to finish, keep everything running or
//!    starting inside the look-ahead window;
//! 5. top up with later groups from today, then from tomorrow, until the
//!    minimum count is reached.
//!
//! Sessions that share a start timestamp are always taken as one group so a
//! block of parallel tracks is never shown half-populated.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::protocol::Presentation;
use crate::session::{classify_with, SessionStatus, SessionWithStatus, STARTING_SOON_MINUTES};

/// Thresholds for [`select_sessions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Keep adding start-time groups until at least this many sessions.
    pub min_sessions: usize,
    /// Upcoming sessions starting within this many minutes are always shown.
    pub lookahead_minutes: i64,
    /// Running sessions with this many minutes (or fewer) left are dropped.
    pub ending_cutoff_minutes: i64,
    pub starting_soon_minutes: i64,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_sessions: 6,
            lookahead_minutes: 45,
            ending_cutoff_minutes: 5,
            starting_soon_minutes: STARTING_SOON_MINUTES,
        }
    }
}

struct Candidate<'a> {
    presentation: &'a Presentation,
    status: SessionStatus,
    day: NaiveDate,
}

impl Candidate<'_> {
    fn start_ms(&self) -> i64 {
        self.presentation.start_time.timestamp_millis()
    }
}

/// Choose the sessions to display at `now`. The result is ordered today
/// before tomorrow, running sessions first within a day, then by start time.
pub fn select_sessions<Tz: TimeZone>(
    presentations: &[Presentation],
    now: &DateTime<Tz>,
    policy: &SelectionPolicy,
) -> Vec<SessionWithStatus> {
    if presentations.is_empty() {
        return Vec::new();
    }

    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today.succ_opt();

    let live: Vec<Candidate> = presentations
        .iter()
        .map(|p| Candidate {
            presentation: p,
            status: classify_with(p, now, policy.starting_soon_minutes),
            day: p.start_time.with_timezone(&tz).date_naive(),
        })
        .filter(|c| !c.status.is_past)
        .collect();

    let today_all: Vec<&Candidate> = live.iter().filter(|c| c.day == today).collect();
    let tomorrow_all: Vec<&Candidate> = live
        .iter()
        .filter(|c| Some(c.day) == tomorrow)
        .collect();

    debug!(
        today = today_all.len(),
        tomorrow = tomorrow_all.len(),
        "selecting sessions"
    );

    if today_all.is_empty() {
        let mut picked = Vec::new();
        fill_from_groups(&mut picked, &group_by_start(&tomorrow_all), policy.min_sessions, &HashSet::new());
        picked.sort_by_key(|c| c.start_ms());
        debug!(count = picked.len(), "nothing left today, showing tomorrow");
        return finish(picked);
    }

    let today_eligible: Vec<&Candidate> = today_all
        .into_iter()
        .filter(|c| !c.status.is_in_progress || c.status.minutes_remaining > policy.ending_cutoff_minutes)
        .collect();
    let today_groups = group_by_start(&today_eligible);

    let mut picked: Vec<&Candidate> = Vec::new();
    let mut included: HashSet<i64> = HashSet::new();
    for (ts, group) in &today_groups {
        let sample = &group[0].status;
        let in_window = if sample.is_in_progress {
            sample.minutes_remaining > policy.ending_cutoff_minutes
        } else {
            sample.minutes_until_start <= policy.lookahead_minutes
        };
        if in_window {
            picked.extend(group.iter().copied());
            included.insert(*ts);
        }
    }
    debug!(count = picked.len(), window = policy.lookahead_minutes, "look-ahead window");

    if picked.len() < policy.min_sessions {
        fill_from_groups(&mut picked, &today_groups, policy.min_sessions, &included);
    }
    if picked.len() < policy.min_sessions {
        fill_from_groups(
            &mut picked,
            &group_by_start(&tomorrow_all),
            policy.min_sessions,
            &HashSet::new(),
        );
    }

    picked.sort_by_key(|c| (c.day != today, !c.status.is_in_progress, c.start_ms()));
    debug!(count = picked.len(), "selection complete");
    finish(picked)
}

/// Group candidates by exact start timestamp, ordered by that timestamp.
fn group_by_start<'a, 'b>(candidates: &[&'b Candidate<'a>]) -> Vec<(i64, Vec<&'b Candidate<'a>>)> {
    let mut groups: BTreeMap<i64, Vec<&'b Candidate<'a>>> = BTreeMap::new();
    for c in candidates {
        groups.entry(c.start_ms()).or_default().push(*c);
    }
    groups.into_iter().collect()
}

/// Append whole groups (skipping `skip`) until `picked` reaches `min`.
fn fill_from_groups<'a, 'b>(
    picked: &mut Vec<&'b Candidate<'a>>,
    groups: &[(i64, Vec<&'b Candidate<'a>>)],
    min: usize,
    skip: &HashSet<i64>,
) {
    for (ts, group) in groups {
        if picked.len() >= min {
            break;
        }
        if skip.contains(ts) {
            continue;
        }
        picked.extend(group.iter().copied());
    }
}

fn finish(picked: Vec<&Candidate>) -> Vec<SessionWithStatus> {
    picked
        .into_iter()
        .map(|c| SessionWithStatus {
            presentation: c.presentation.clone(),
            status: c.status,
        })
        .collect()
}
