//! App — the kiosk event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks,
//!   the keyboard reader and the status API.
//! - Recurring timers drive polling, the clock and both rotations.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Every spawned task hangs off one `CancellationToken` that is cancelled
//!   when the loop exits.

use std::io;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, style::Style, widgets::Block, Frame, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use signs_proto::clock::Clock;
use signs_proto::config::Config;
use signs_proto::fetch::{FetchError, ScheduleClient};
use signs_proto::protocol::ScheduleData;
use signs_proto::store::FetchOutcome;

use crate::{
    action::{Action, View},
    app_state::{AppState, StatusSnapshot},
    component::Component,
    components::{
        header::Header, help_overlay::HelpOverlay, schedule_carousel::ScheduleCarousel,
        session_list::SessionList, sponsor_banner::SponsorBanner, sponsor_wall::SponsorWall,
    },
    theme::C_BG,
    widgets::{
        status_bar::{self, FeedHealth},
        toast::{Severity, ToastManager},
    },
    workspace::ViewManager,
};

// ── Internal event bus ────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    ScheduleFetched(Result<ScheduleData, FetchError>),
    SponsorsFetched(Result<Vec<String>, FetchError>),
    /// `(filename, available)` for every probed sponsor image.
    ImagesProbed(Vec<(String, bool)>),
    /// From the status API.
    RefreshRequested,
}

const TOAST_TICK_MS: u64 = 100;

pub struct App {
    config: Config,
    clock: Box<dyn Clock>,
    client: ScheduleClient,
    state: AppState,
    vm: ViewManager,

    // ── Components ───────────────────────────────────────────────────────────
    header: Header,
    carousel: ScheduleCarousel,
    keynote_list: SessionList,
    colocated_list: SessionList,
    banner: SponsorBanner,
    wall: SponsorWall,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    rng: StdRng,
    tx: mpsc::Sender<AppMessage>,
    cancel: CancellationToken,
    status_tx: watch::Sender<StatusSnapshot>,
    sponsors_in_flight: bool,
    /// A refresh the user asked for is pending; its result gets a toast.
    manual_refresh: bool,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        clock: Box<dyn Clock>,
        tx: mpsc::Sender<AppMessage>,
    ) -> anyhow::Result<Self> {
        let client = ScheduleClient::new(config.server.clone())?;
        let state = AppState::new(&config, clock.now(), clock.is_overridden());
        let (status_tx, _) = watch::channel(state.status_snapshot());
        Ok(Self {
            config,
            clock,
            client,
            state,
            vm: ViewManager::new(),
            header: Header::new(),
            carousel: ScheduleCarousel::new(),
            keynote_list: SessionList::keynotes(),
            colocated_list: SessionList::colocated(),
            banner: SponsorBanner::new(),
            wall: SponsorWall::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            rng: StdRng::from_entropy(),
            tx,
            cancel: CancellationToken::new(),
            status_tx,
            sponsors_in_flight: false,
            manual_refresh: false,
            should_quit: false,
        })
    }

    /// Latest [`StatusSnapshot`], republished after every state change.
    pub fn status(&self) -> watch::Receiver<StatusSnapshot> {
        self.status_tx.subscribe()
    }

    /// Parent of every background task the app spawns.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(mut self, mut rx: mpsc::Receiver<AppMessage>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Periodic timers ───────────────────────────────────────────────────
        // Polls fire immediately; rotations wait one full period first.
        let schedule_cfg = &self.config.schedule;
        let mut schedule_refresh = skipping(interval(secs(schedule_cfg.refresh_interval_secs)));
        let mut selection_refresh = skipping(delayed(secs(schedule_cfg.selection_refresh_secs)));
        let mut sponsor_refresh =
            skipping(interval(secs(self.config.sponsors.refresh_interval_secs)));
        let mut session_rotation =
            skipping(delayed(secs(self.config.display.rotation_interval_secs)));
        let mut sponsor_rotation =
            skipping(delayed(secs(self.config.sponsors.rotation_interval_secs)));
        let mut clock_tick = skipping(interval(Duration::from_millis(
            self.config.display.clock_tick_ms,
        )));
        let mut toast_tick = skipping(interval(Duration::from_millis(TOAST_TICK_MS)));

        let cancel = self.cancel.clone();
        info!(view = self.state.view.name(), "display started");
        if self.state.clock_overridden {
            self.toast.info(format!(
                "Demo time: {}",
                self.state.now.format("%a %b %-d %H:%M")
            ));
        }

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
                self.publish_status();
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                }

                _ = schedule_refresh.tick() => {
                    self.spawn_schedule_fetch();
                }

                _ = sponsor_refresh.tick() => {
                    self.spawn_sponsor_fetch();
                }

                _ = clock_tick.tick() => {
                    self.state.set_now(self.clock.now());
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.header.tick(s));
                        all.extend(self.carousel.tick(s));
                        all.extend(self.help_overlay.tick(s));
                        all
                    };
                    for action in tick_actions {
                        self.dispatch(action);
                    }
                    needs_redraw = true;
                }

                _ = selection_refresh.tick() => {
                    self.state.set_now(self.clock.now());
                    self.state.refresh_selection();
                    needs_redraw = true;
                }

                _ = session_rotation.tick() => {
                    needs_redraw = self.state.rotate_sessions();
                }

                _ = sponsor_rotation.tick() => {
                    self.state.rotate_banner(&mut self.rng);
                    needs_redraw = true;
                }

                _ = toast_tick.tick() => {
                    if !self.toast.is_empty() || self.toast.has_spinner() {
                        self.toast.tick();
                        needs_redraw = true;
                    }
                }

                _ = cancel.cancelled() => {
                    break;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.cancel.cancel();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("display stopped");

        Ok(())
    }

    /// Apply one message. Returns `true` if the screen needs redrawing.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a);
                    }
                    true
                }
                Event::Resize(..) => true,
                _ => false,
            },

            AppMessage::ScheduleFetched(result) => {
                let at = self.clock.now().with_timezone(&Utc);
                let outcome = self.state.apply_schedule(result, at);
                if std::mem::take(&mut self.manual_refresh) {
                    self.report_refresh(&outcome);
                }
                true
            }

            AppMessage::SponsorsFetched(result) => {
                self.sponsors_in_flight = false;
                match result {
                    Ok(images) => {
                        if self.state.apply_sponsors(images) {
                            self.state.rotate_banner(&mut self.rng);
                            self.spawn_image_probes(self.state.sponsors.images().to_vec());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "sponsor fetch failed");
                        if !self.state.sponsors_loaded {
                            self.toast.warning("Sponsor list unavailable");
                        }
                        self.state.sponsor_fetch_failed(e.to_string());
                    }
                }
                true
            }

            AppMessage::ImagesProbed(probes) => {
                self.state.record_probes(probes);
                true
            }

            AppMessage::RefreshRequested => {
                info!("refresh requested over HTTP");
                self.dispatch(Action::Refresh);
                true
            }
        }
    }

    fn report_refresh(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Adopted { sessions } => self
                .toast
                .resolve_spinner(Severity::Success, format!("Schedule updated ({sessions} sessions)")),
            FetchOutcome::Unchanged => self
                .toast
                .resolve_spinner(Severity::Info, "Schedule already up to date"),
            FetchOutcome::KeptStale { error } | FetchOutcome::Failed { error } => self
                .toast
                .resolve_spinner(Severity::Error, format!("Refresh failed: {error}")),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            let actions = self.help_overlay.handle_key(key, &self.state);
            if !actions.is_empty() {
                return actions;
            }
            return vec![Action::ToggleHelp];
        }

        match key.code {
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Char('?') => vec![Action::ToggleHelp],
            KeyCode::Char('K') => vec![Action::ToggleKeys],
            KeyCode::Char('r') => vec![Action::Refresh],
            KeyCode::Tab | KeyCode::Right => vec![Action::NextView],
            KeyCode::BackTab | KeyCode::Left => vec![Action::PrevView],
            KeyCode::Char(c) => View::from_key(c)
                .map(|v| vec![Action::SwitchView(v)])
                .unwrap_or_default(),
            _ => vec![],
        }
    }

    fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.header.on_action(&action, s));
            out.extend(self.carousel.on_action(&action, s));
            out.extend(self.keynote_list.on_action(&action, s));
            out.extend(self.colocated_list.on_action(&action, s));
            out.extend(self.banner.on_action(&action, s));
            out.extend(self.wall.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Depth-limited to 1 level
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            Action::SwitchView(view) => self.switch_view(view),
            Action::NextView => self.switch_view(self.state.view.next()),
            Action::PrevView => self.switch_view(self.state.view.prev()),
            Action::Refresh => {
                self.manual_refresh = true;
                self.toast.spinner("Refreshing schedule…");
                self.spawn_schedule_fetch();
                self.spawn_sponsor_fetch();
            }
            Action::ToggleHelp => {}
            Action::ToggleKeys => self.vm.show_keys_bar = !self.vm.show_keys_bar,
            Action::Quit => self.should_quit = true,
        }
    }

    fn switch_view(&mut self, view: View) {
        if view != self.state.view {
            info!(from = self.state.view.name(), to = view.name(), "switching view");
            self.state.view = view;
        }
    }

    // ── Background work ───────────────────────────────────────────────────────

    fn spawn_schedule_fetch(&mut self) {
        if !self.state.store.begin_fetch() {
            return;
        }
        let client = self.client.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = client.fetch_schedule() => {
                    let _ = tx.send(AppMessage::ScheduleFetched(result)).await;
                }
            }
        });
    }

    fn spawn_sponsor_fetch(&mut self) {
        if self.sponsors_in_flight {
            debug!("sponsor fetch already in flight, skipping");
            return;
        }
        self.sponsors_in_flight = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = client.fetch_sponsors() => {
                    let _ = tx.send(AppMessage::SponsorsFetched(result)).await;
                }
            }
        });
    }

    fn spawn_image_probes(&self, files: Vec<String>) {
        if files.is_empty() {
            return;
        }
        let client = self.client.clone();
        let tx = self.tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let probes = join_all(files.into_iter().map(|file| {
                let client = client.clone();
                async move {
                    let ok = client.probe_image(&file).await;
                    (file, ok)
                }
            }));
            tokio::select! {
                _ = cancel.cancelled() => {}
                results = probes => {
                    let _ = tx.send(AppMessage::ImagesProbed(results)).await;
                }
            }
        });
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.state.status_snapshot());
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let regions = self.vm.regions(area, self.state.view);
        self.header.draw(frame, regions.header, &self.state);

        match self.state.view {
            View::Schedule => self.carousel.draw(frame, regions.body, &self.state),
            View::Keynotes => self.keynote_list.draw(frame, regions.body, &self.state),
            View::Colocated => self.colocated_list.draw(frame, regions.body, &self.state),
            View::Sponsors => self.wall.draw(frame, regions.body, &self.state),
        }
        if regions.banner.height > 0 {
            self.banner.draw(frame, regions.banner, &self.state);
        }

        if self.vm.show_keys_bar {
            status_bar::draw_keys_bar(frame, regions.status, self.state.view, feed_health(&self.state));
        }

        // ── Overlays ─────────────────────────────────────────────────────────
        self.help_overlay.draw(frame, area, &self.state);
        self.toast.draw(frame, area);
    }
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn delayed(period: Duration) -> Interval {
    interval_at(Instant::now() + period, period)
}

fn skipping(mut timer: Interval) -> Interval {
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

pub fn feed_health(state: &AppState) -> FeedHealth {
    if state.store.is_loading() {
        FeedHealth::Loading
    } else if state.store.error().is_some() {
        FeedHealth::Failed
    } else if state.stale {
        FeedHealth::Stale
    } else {
        FeedHealth::Fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Local, TimeZone};
    use signs_proto::clock::FixedClock;
    use signs_proto::protocol::Presentation;

    fn app() -> (App, mpsc::Receiver<AppMessage>) {
        let (tx, rx) = mpsc::channel(16);
        let now = Local.with_ymd_and_hms(2025, 3, 8, 10, 0, 0).earliest().unwrap();
        let app = App::new(Config::default(), Box::new(FixedClock(now)), tx).unwrap();
        (app, rx)
    }

    fn key(code: KeyCode) -> AppMessage {
        AppMessage::Event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn number_keys_and_tab_switch_views() {
        let (mut app, _rx) = app();
        assert_eq!(app.state.view, View::Schedule);

        app.handle_message(key(KeyCode::Char('4')));
        assert_eq!(app.state.view, View::Sponsors);
        app.handle_message(key(KeyCode::Tab));
        assert_eq!(app.state.view, View::Schedule);
        app.handle_message(key(KeyCode::BackTab));
        assert_eq!(app.state.view, View::Sponsors);
        app.handle_message(key(KeyCode::Char('2')));
        assert_eq!(app.state.status_snapshot().view, "keynotes");
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let (mut app, _rx) = app();
        app.handle_message(key(KeyCode::Char('?')));
        assert!(app.help_overlay.visible);

        app.handle_message(key(KeyCode::Char('3')));
        assert!(!app.help_overlay.visible);
        assert_eq!(app.state.view, View::Schedule);

        app.handle_message(key(KeyCode::Char('?')));
        app.handle_message(key(KeyCode::Char('q')));
        assert!(!app.help_overlay.visible);
        assert!(!app.should_quit);

        app.handle_message(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn keys_bar_toggles() {
        let (mut app, _rx) = app();
        assert!(app.vm.show_keys_bar);
        app.handle_message(key(KeyCode::Char('K')));
        assert!(!app.vm.show_keys_bar);
    }

    #[test]
    fn fetched_schedule_lands_in_state_and_status() {
        let (mut app, _rx) = app();
        let status = app.status();
        assert_eq!(feed_health(&app.state), FeedHealth::Loading);

        let start = app.state.now.fixed_offset() + ChronoDuration::minutes(10);
        let data = ScheduleData {
            presentations: vec![Presentation {
                name: "Opening".into(),
                description: String::new(),
                location: "Ballroom A".into(),
                start_time: start,
                end_time: start + ChronoDuration::minutes(50),
                speakers: vec![],
                topic: String::new(),
            }],
            content_hash: "abc".into(),
            ..ScheduleData::default()
        };
        assert!(app.handle_message(AppMessage::ScheduleFetched(Ok(data))));
        app.publish_status();

        assert_eq!(feed_health(&app.state), FeedHealth::Fresh);
        let snap = status.borrow().clone();
        assert_eq!(snap.content_hash.as_deref(), Some("abc"));
        assert_eq!(snap.visible.len(), 1);
        assert!(snap.clock_overridden);
    }

    #[test]
    fn probe_results_mark_missing_images() {
        let (mut app, _rx) = app();
        app.handle_message(AppMessage::ImagesProbed(vec![("gone.png".into(), false)]));
        assert!(!app.state.image_ok("gone.png"));
    }

    #[tokio::test]
    async fn refresh_is_not_issued_twice_while_pending() {
        let (mut app, _rx) = app();
        app.dispatch(Action::Refresh);
        assert!(app.state.store.is_fetching());
        assert!(app.sponsors_in_flight);
        assert!(app.toast.has_spinner());

        // second request while the first is outstanding does not stack
        app.dispatch(Action::Refresh);
        assert!(app.state.store.is_fetching());
        app.cancel.cancel();
    }
}
