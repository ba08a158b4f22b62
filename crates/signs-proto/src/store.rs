//! In-memory schedule snapshot with content-hash de-duplication.
//!
//! The store is the single place fetch results land. It never drops a good
//! snapshot because of a failed poll, and it only reports an error while no
//! snapshot has ever been adopted.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::protocol::{Presentation, ScheduleData};

/// Data older than this (since the last successful poll) is flagged stale.
pub const DEFAULT_STALE_AFTER_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSnapshot {
    pub presentations: Vec<Presentation>,
    pub content_hash: String,
    pub last_update_time: String,
    pub adopted_at: DateTime<Utc>,
}

/// What applying a fetch result did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A new snapshot replaced the previous one.
    Adopted { sessions: usize },
    /// Same hash as the adopted snapshot; nothing changed.
    Unchanged,
    /// Fetch failed; the previous snapshot is still being served.
    KeptStale { error: String },
    /// Fetch failed and there is nothing to fall back on.
    Failed { error: String },
}

impl FetchOutcome {
    /// Whether the display has anything new to show.
    pub fn changes_display(&self) -> bool {
        matches!(self, FetchOutcome::Adopted { .. } | FetchOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleStore {
    snapshot: Option<ScheduleSnapshot>,
    last_refresh: Option<DateTime<Utc>>,
    error: Option<String>,
    in_flight: bool,
    stale_after: Duration,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_STALE_AFTER_SECS))
    }
}

impl ScheduleStore {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            snapshot: None,
            last_refresh: None,
            error: None,
            in_flight: false,
            stale_after,
        }
    }

    pub fn snapshot(&self) -> Option<&ScheduleSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn presentations(&self) -> &[Presentation] {
        self.snapshot
            .as_ref()
            .map(|s| s.presentations.as_slice())
            .unwrap_or(&[])
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.content_hash.as_str())
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Error to show the user. Only set while nothing has ever loaded.
    pub fn error(&self) -> Option<&str> {
        if self.snapshot.is_some() {
            None
        } else {
            self.error.as_deref()
        }
    }

    /// Still waiting for the very first response.
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none() && self.error.is_none()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// Claim the fetch slot. Returns `false` if a fetch is already pending,
    /// in which case the caller must skip this poll.
    pub fn begin_fetch(&mut self) -> bool {
        if self.in_flight {
            debug!("schedule fetch already in flight, skipping");
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Apply the result of a fetch started with [`begin_fetch`](Self::begin_fetch).
    pub fn apply<E: std::fmt::Display>(
        &mut self,
        result: Result<ScheduleData, E>,
        at: DateTime<Utc>,
    ) -> FetchOutcome {
        self.in_flight = false;
        match result {
            Ok(data) => self.adopt(data, at),
            Err(e) => {
                let error = e.to_string();
                if self.snapshot.is_some() {
                    warn!(%error, "schedule fetch failed, keeping cached schedule");
                    FetchOutcome::KeptStale { error }
                } else {
                    warn!(%error, "schedule fetch failed with no schedule loaded");
                    self.error = Some(error.clone());
                    FetchOutcome::Failed { error }
                }
            }
        }
    }

    fn adopt(&mut self, data: ScheduleData, at: DateTime<Utc>) -> FetchOutcome {
        self.error = None;
        self.last_refresh = Some(at);

        let unchanged = !data.content_hash.is_empty()
            && self.content_hash() == Some(data.content_hash.as_str());
        if unchanged {
            debug!(hash = %data.content_hash, "schedule hash matches, no update needed");
            return FetchOutcome::Unchanged;
        }

        let sessions = data.presentations.len();
        info!(sessions, hash = %data.content_hash, "adopting new schedule");
        self.snapshot = Some(ScheduleSnapshot {
            presentations: data.presentations,
            content_hash: data.content_hash,
            last_update_time: data.last_update_time,
            adopted_at: at,
        });
        FetchOutcome::Adopted { sessions }
    }

    /// More than `stale_after` since the last successful poll.
    pub fn is_stale(&self, at: DateTime<Utc>) -> bool {
        match self.last_refresh {
            Some(t) => at - t > self.stale_after,
            None => false,
        }
    }
}
