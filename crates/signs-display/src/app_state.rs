//! AppState — shared read-only data passed to all components during render.
//!
//! Components read this but never mutate it. The App event-loop is the only
//! writer; every transition goes through one of the methods below so it can
//! be exercised without a terminal.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use signs_proto::config::Config;
use signs_proto::protocol::ScheduleData;
use signs_proto::rotator::Rotator;
use signs_proto::selector::{select_sessions, SelectionPolicy};
use signs_proto::session::{colocated, keynotes, SessionWithStatus};
use signs_proto::sponsors::{RotationPolicy, SponsorSet};
use signs_proto::store::{FetchOutcome, ScheduleStore};

use crate::action::View;

pub struct AppState {
    // ── Clock ────────────────────────────────────────────────────────────────
    pub now: DateTime<Local>,
    pub clock_overridden: bool,

    // ── Schedule ─────────────────────────────────────────────────────────────
    pub store: ScheduleStore,
    pub stale: bool,
    pub selected: Vec<SessionWithStatus>,
    pub carousel: Rotator,
    pub keynotes: Vec<SessionWithStatus>,
    pub keynote_pager: Rotator,
    pub colocated: Vec<SessionWithStatus>,
    pub colocated_pager: Rotator,

    // ── Sponsors ─────────────────────────────────────────────────────────────
    pub sponsors: SponsorSet,
    pub sponsors_loaded: bool,
    pub sponsor_error: Option<String>,
    /// Logos currently in the banner.
    pub banner: Vec<String>,
    pub sponsor_pager: Rotator,
    /// Result of the last `HEAD` probe per image; missing means not probed yet.
    pub image_available: HashMap<String, bool>,

    // ── UI ───────────────────────────────────────────────────────────────────
    pub view: View,
    pub title: String,

    // ── Settings ─────────────────────────────────────────────────────────────
    policy: SelectionPolicy,
    keynote_keyword: String,
    colocated_topics: Vec<String>,
    banner_size: usize,
    banner_policy: RotationPolicy,
}

impl AppState {
    pub fn new(config: &Config, now: DateTime<Local>, clock_overridden: bool) -> Self {
        let max_display = config.display.max_display;
        let banner_size = config.sponsors.display_count;
        Self {
            now,
            clock_overridden,
            store: ScheduleStore::new(Duration::seconds(
                config.schedule.stale_after_secs as i64,
            )),
            stale: false,
            selected: Vec::new(),
            carousel: Rotator::new(max_display),
            keynotes: Vec::new(),
            keynote_pager: Rotator::new(max_display),
            colocated: Vec::new(),
            colocated_pager: Rotator::new(max_display),
            sponsors: SponsorSet::new(),
            sponsors_loaded: false,
            sponsor_error: None,
            banner: Vec::new(),
            sponsor_pager: Rotator::new(banner_size),
            image_available: HashMap::new(),
            view: View::from_name(&config.display.view).unwrap_or(View::Schedule),
            title: config.display.title.clone(),
            policy: config.schedule.policy(),
            keynote_keyword: config.display.keynote_keyword.clone(),
            colocated_topics: config.display.colocated_topics.clone(),
            banner_size,
            banner_policy: config.sponsors.policy,
        }
    }

    /// Advance the reference time; refreshes the staleness flag.
    pub fn set_now(&mut self, now: DateTime<Local>) {
        self.now = now;
        self.stale = self.store.is_stale(now.with_timezone(&Utc));
    }

    /// Land a schedule fetch result. Re-runs selection when the data changed.
    pub fn apply_schedule<E: std::fmt::Display>(
        &mut self,
        result: Result<ScheduleData, E>,
        at: DateTime<Utc>,
    ) -> FetchOutcome {
        let outcome = self.store.apply(result, at);
        self.stale = self.store.is_stale(self.now.with_timezone(&Utc));
        if matches!(outcome, FetchOutcome::Adopted { .. }) {
            self.refresh_selection();
        }
        outcome
    }

    /// Recompute every derived session list against `now`.
    pub fn refresh_selection(&mut self) {
        let presentations = self.store.presentations();
        self.selected = select_sessions(presentations, &self.now, &self.policy);
        self.keynotes = keynotes(presentations, &self.now, &self.keynote_keyword);
        self.colocated = colocated(presentations, &self.now, &self.colocated_topics);

        if self.carousel.set_len(self.selected.len()) {
            debug!(len = self.selected.len(), "carousel reset");
        }
        self.keynote_pager.set_len(self.keynotes.len());
        self.colocated_pager.set_len(self.colocated.len());
    }

    /// One rotation step of whichever list the active view pages through.
    pub fn rotate_sessions(&mut self) -> bool {
        match self.view {
            View::Schedule => self.carousel.advance(),
            View::Keynotes => self.keynote_pager.advance(),
            View::Colocated => self.colocated_pager.advance(),
            View::Sponsors => false,
        }
    }

    pub fn visible_sessions(&self) -> &[SessionWithStatus] {
        self.carousel.slice(&self.selected)
    }

    /// Install a fetched sponsor list. Returns `true` if the list changed.
    pub fn apply_sponsors(&mut self, images: Vec<String>) -> bool {
        self.sponsors_loaded = true;
        self.sponsor_error = None;
        let changed = self.sponsors.replace(images);
        if changed {
            info!(count = self.sponsors.len(), "sponsor list updated");
            self.image_available
                .retain(|file, _| self.sponsors.images().contains(file));
            self.sponsor_pager.set_len(self.sponsors.len());
            self.sponsor_pager.reset();
            self.banner.clear();
        }
        changed
    }

    pub fn sponsor_fetch_failed(&mut self, error: String) {
        if !self.sponsors_loaded {
            self.sponsor_error = Some(error);
        }
    }

    /// Choose the next banner logos. A banner already showing every logo
    /// stays as it is.
    pub fn rotate_banner<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.banner.is_empty() && self.sponsors.len() <= self.banner_size {
            return;
        }
        self.banner = match self.banner_policy {
            RotationPolicy::Random => {
                let current = std::mem::take(&mut self.banner);
                self.sponsors.pick_many(rng, self.banner_size, &current)
            }
            RotationPolicy::Window => {
                if !self.banner.is_empty() {
                    self.sponsor_pager.advance();
                }
                self.sponsors.window(&self.sponsor_pager)
            }
        };
    }

    pub fn record_probes(&mut self, probes: Vec<(String, bool)>) {
        let missing = probes.iter().filter(|(_, ok)| !ok).count();
        if missing > 0 {
            info!(missing, "some sponsor images are unavailable");
        }
        self.image_available.extend(probes);
    }

    /// `false` only for images a probe said are missing.
    pub fn image_ok(&self, file: &str) -> bool {
        self.image_available.get(file).copied().unwrap_or(true)
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            view: self.view.name().to_string(),
            now: self.now.to_rfc3339(),
            clock_overridden: self.clock_overridden,
            loading: self.store.is_loading(),
            error: self.store.error().map(str::to_string),
            stale: self.stale,
            content_hash: self.store.content_hash().map(str::to_string),
            last_refresh: self.store.last_refresh().map(|t| t.to_rfc3339()),
            page: self.carousel.page_label(),
            selected: self.selected.clone(),
            visible: self.visible_sessions().to_vec(),
            sponsors: self.banner.clone(),
        }
    }
}

/// What `GET /api/state` returns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    pub view: String,
    pub now: String,
    pub clock_overridden: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub stale: bool,
    pub content_hash: Option<String>,
    pub last_refresh: Option<String>,
    pub page: Option<String>,
    pub selected: Vec<SessionWithStatus>,
    pub visible: Vec<SessionWithStatus>,
    pub sponsors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use signs_proto::protocol::Presentation;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).earliest().unwrap()
    }

    fn talk(name: &str, topic: &str, start: DateTime<Local>, minutes: i64) -> Presentation {
        let start = start.with_timezone(&FixedOffset::east_opt(0).unwrap());
        Presentation {
            name: name.into(),
            description: String::new(),
            location: "Ballroom".into(),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            speakers: vec![],
            topic: topic.into(),
        }
    }

    fn schedule(hash: &str, presentations: Vec<Presentation>) -> ScheduleData {
        ScheduleData {
            presentations,
            content_hash: hash.into(),
            ..ScheduleData::default()
        }
    }

    #[test]
    fn adopted_schedule_populates_every_view() {
        let now = local(2025, 3, 8, 10, 0);
        let mut state = AppState::new(&Config::default(), now, false);
        let data = schedule(
            "h1",
            vec![
                talk("Opening", "Keynote", now + Duration::minutes(15), 60),
                talk("Nix intro", "NixCon", now + Duration::minutes(30), 45),
                talk("Rust", "Developer", now - Duration::minutes(10), 60),
            ],
        );
        let outcome = state.apply_schedule::<String>(Ok(data), Utc::now());
        assert_eq!(outcome, FetchOutcome::Adopted { sessions: 3 });
        assert_eq!(state.selected.len(), 3);
        assert_eq!(state.selected[0].presentation.name, "Rust");
        assert_eq!(state.keynotes.len(), 1);
        assert_eq!(state.colocated.len(), 1);
        assert!(!state.store.is_loading());
    }

    #[test]
    fn carousel_position_survives_same_length_refresh() {
        let now = local(2025, 3, 8, 9, 0);
        let mut config = Config::default();
        config.display.max_display = 2;
        let mut state = AppState::new(&config, now, false);
        let talks = (0..6)
            .map(|i| talk(&format!("t{i}"), "", now + Duration::minutes(5 * i), 30))
            .collect();
        state.apply_schedule::<String>(Ok(schedule("h1", talks)), Utc::now());
        assert_eq!(state.carousel.len(), 6);

        assert!(state.rotate_sessions());
        assert_eq!(state.carousel.start(), 2);
        state.refresh_selection();
        assert_eq!(state.carousel.start(), 2);
        assert_eq!(state.status_snapshot().page.as_deref(), Some("Showing 3-4 of 6"));
    }

    #[test]
    fn banner_rotates_without_repeating_on_screen_logos() {
        let mut state = AppState::new(&Config::default(), local(2025, 3, 8, 9, 0), false);
        let logos: Vec<String> = (0..7).map(|i| format!("logo{i}.png")).collect();
        assert!(state.apply_sponsors(logos.clone()));
        assert!(!state.apply_sponsors(logos));

        let mut rng = StdRng::seed_from_u64(9);
        state.rotate_banner(&mut rng);
        for _ in 0..20 {
            let before = state.banner.clone();
            state.rotate_banner(&mut rng);
            assert_eq!(state.banner.len(), 3);
            assert!(state.banner.iter().all(|l| !before.contains(l)));
        }
    }

    #[test]
    fn window_banner_pages_in_server_order() {
        let mut config = Config::default();
        config.sponsors.policy = RotationPolicy::Window;
        config.sponsors.display_count = 2;
        let mut state = AppState::new(&config, local(2025, 3, 8, 9, 0), false);
        state.apply_sponsors(vec!["a".into(), "b".into(), "c".into()]);
        let mut rng = StdRng::seed_from_u64(1);
        state.rotate_banner(&mut rng);
        assert_eq!(state.banner, vec!["a", "b"]);
        state.rotate_banner(&mut rng);
        assert_eq!(state.banner, vec!["c"]);
        state.rotate_banner(&mut rng);
        assert_eq!(state.banner, vec!["a", "b"]);
    }

    #[test]
    fn new_sponsor_list_starts_from_the_first_page() {
        let mut config = Config::default();
        config.sponsors.policy = RotationPolicy::Window;
        config.sponsors.display_count = 2;
        let mut state = AppState::new(&config, local(2025, 3, 8, 9, 0), false);
        let mut rng = StdRng::seed_from_u64(3);

        state.apply_sponsors(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        state.rotate_banner(&mut rng);
        state.rotate_banner(&mut rng);
        assert_eq!(state.banner, vec!["c", "d"]);

        // same length, different logos
        assert!(state.apply_sponsors(vec!["w".into(), "x".into(), "y".into(), "z".into()]));
        state.rotate_banner(&mut rng);
        assert_eq!(state.banner, vec!["w", "x"]);
        assert_eq!(state.sponsor_pager.start(), 0);
    }

    #[test]
    fn banner_holding_every_logo_does_not_reshuffle() {
        let mut state = AppState::new(&Config::default(), local(2025, 3, 8, 9, 0), false);
        state.apply_sponsors(vec!["a".into(), "b".into(), "c".into()]);
        let mut rng = StdRng::seed_from_u64(5);
        state.rotate_banner(&mut rng);
        let first = state.banner.clone();
        assert_eq!(first.len(), 3);
        for _ in 0..10 {
            state.rotate_banner(&mut rng);
            assert_eq!(state.banner, first);
        }
    }

    #[test]
    fn sponsor_errors_only_show_before_first_load() {
        let mut state = AppState::new(&Config::default(), local(2025, 3, 8, 9, 0), false);
        state.sponsor_fetch_failed("boom".into());
        assert_eq!(state.sponsor_error.as_deref(), Some("boom"));
        state.apply_sponsors(vec!["a".into()]);
        state.sponsor_fetch_failed("again".into());
        assert_eq!(state.sponsor_error, None);
    }

    #[test]
    fn failed_probes_mark_images_missing() {
        let mut state = AppState::new(&Config::default(), local(2025, 3, 8, 9, 0), false);
        state.apply_sponsors(vec!["a.png".into(), "b.png".into()]);
        state.record_probes(vec![("a.png".into(), true), ("b.png".into(), false)]);
        assert!(state.image_ok("a.png"));
        assert!(!state.image_ok("b.png"));
        assert!(state.image_ok("never-probed.png"));
    }

    #[test]
    fn staleness_follows_the_clock() {
        let now = local(2025, 3, 8, 9, 0);
        let mut state = AppState::new(&Config::default(), now, true);
        state.apply_schedule::<String>(Ok(schedule("h1", vec![])), now.with_timezone(&Utc));
        state.set_now(now + Duration::minutes(4));
        assert!(!state.stale);
        state.set_now(now + Duration::minutes(6));
        assert!(state.stale);
        let snap = state.status_snapshot();
        assert!(snap.stale);
        assert!(snap.clock_overridden);
        assert_eq!(snap.content_hash.as_deref(), Some("h1"));
    }
}
