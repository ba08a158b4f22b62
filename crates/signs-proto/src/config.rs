use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use super::platform;
use super::selector::SelectionPolicy;
use super::sponsors::RotationPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub sponsors: SponsorsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

/// Where the schedule and sponsor data come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_schedule_path")]
    pub schedule_path: String,
    /// Tried when `schedule_path` answers 404.
    #[serde(default = "default_legacy_schedule_path")]
    pub legacy_schedule_path: String,
    #[serde(default = "default_sponsors_path")]
    pub sponsors_path: String,
    #[serde(default = "default_legacy_sponsors_path")]
    pub legacy_sponsors_path: String,
    #[serde(default = "default_sponsor_images_path")]
    pub sponsor_images_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_schedule_refresh_secs")]
    pub refresh_interval_secs: u64,
    /// How often the selection is recomputed against the clock.
    #[serde(default = "default_selection_refresh_secs")]
    pub selection_refresh_secs: u64,
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_min_sessions")]
    pub min_sessions: usize,
    #[serde(default = "default_lookahead_minutes")]
    pub lookahead_minutes: i64,
    #[serde(default = "default_ending_cutoff_minutes")]
    pub ending_cutoff_minutes: i64,
    #[serde(default = "default_starting_soon_minutes")]
    pub starting_soon_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// View shown at startup: `schedule`, `keynotes`, `colocated` or `sponsors`.
    #[serde(default = "default_view")]
    pub view: String,
    /// Session cards visible at once.
    #[serde(default = "default_max_display")]
    pub max_display: usize,
    #[serde(default = "default_rotation_interval_secs")]
    pub rotation_interval_secs: u64,
    #[serde(default = "default_clock_tick_ms")]
    pub clock_tick_ms: u64,
    #[serde(default = "default_keynote_keyword")]
    pub keynote_keyword: String,
    #[serde(default = "default_colocated_topics")]
    pub colocated_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsorsConfig {
    #[serde(default = "default_sponsor_display_count")]
    pub display_count: usize,
    #[serde(default = "default_sponsor_rotation_secs")]
    pub rotation_interval_secs: u64,
    #[serde(default = "default_sponsor_refresh_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub policy: RotationPolicy,
}

/// Local status API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// `year=…&month=…&day=…&hour=…&minute=…`; the `SIGNS_TIME`
    /// environment variable takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_override: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            schedule_path: default_schedule_path(),
            legacy_schedule_path: default_legacy_schedule_path(),
            sponsors_path: default_sponsors_path(),
            legacy_sponsors_path: default_legacy_sponsors_path(),
            sponsor_images_path: default_sponsor_images_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_schedule_refresh_secs(),
            selection_refresh_secs: default_selection_refresh_secs(),
            stale_after_secs: default_stale_after_secs(),
            min_sessions: default_min_sessions(),
            lookahead_minutes: default_lookahead_minutes(),
            ending_cutoff_minutes: default_ending_cutoff_minutes(),
            starting_soon_minutes: default_starting_soon_minutes(),
        }
    }
}

impl ScheduleConfig {
    pub fn policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            min_sessions: self.min_sessions,
            lookahead_minutes: self.lookahead_minutes,
            ending_cutoff_minutes: self.ending_cutoff_minutes,
            starting_soon_minutes: self.starting_soon_minutes,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            view: default_view(),
            max_display: default_max_display(),
            rotation_interval_secs: default_rotation_interval_secs(),
            clock_tick_ms: default_clock_tick_ms(),
            keynote_keyword: default_keynote_keyword(),
            colocated_topics: default_colocated_topics(),
        }
    }
}

impl Default for SponsorsConfig {
    fn default() -> Self {
        Self {
            display_count: default_sponsor_display_count(),
            rotation_interval_secs: default_sponsor_rotation_secs(),
            refresh_interval_secs: default_sponsor_refresh_secs(),
            policy: RotationPolicy::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:2017".to_string()
}

fn default_schedule_path() -> String {
    "/schedule".to_string()
}

fn default_legacy_schedule_path() -> String {
    "/api/schedule".to_string()
}

fn default_sponsors_path() -> String {
    "/sponsors/all".to_string()
}

fn default_legacy_sponsors_path() -> String {
    "/api/sponsors".to_string()
}

fn default_sponsor_images_path() -> String {
    "/sponsors/images".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_schedule_refresh_secs() -> u64 {
    60
}

fn default_selection_refresh_secs() -> u64 {
    30
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_min_sessions() -> usize {
    SelectionPolicy::default().min_sessions
}

fn default_lookahead_minutes() -> i64 {
    SelectionPolicy::default().lookahead_minutes
}

fn default_ending_cutoff_minutes() -> i64 {
    SelectionPolicy::default().ending_cutoff_minutes
}

fn default_starting_soon_minutes() -> i64 {
    SelectionPolicy::default().starting_soon_minutes
}

fn default_title() -> String {
    "Now & Next".to_string()
}

fn default_view() -> String {
    "schedule".to_string()
}

fn default_max_display() -> usize {
    5
}

fn default_rotation_interval_secs() -> u64 {
    10
}

fn default_clock_tick_ms() -> u64 {
    1000
}

fn default_keynote_keyword() -> String {
    "keynote".to_string()
}

fn default_colocated_topics() -> Vec<String> {
    [
        "DevOpsDay LA",
        "OpenInfra Days",
        "Kubernetes Community Day",
        "NixCon",
        "PlanetNix",
        "Ubucon",
        "SunSecCon",
        "Puppet",
        "MySQL",
        "PostgreSQL",
        "openSUSE",
        "GLADCamp",
        "Kwaai Summit",
        "Data on Kubernetes",
        "Kubeflow",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_sponsor_display_count() -> usize {
    3
}

fn default_sponsor_rotation_secs() -> u64 {
    30
}

fn default_sponsor_refresh_secs() -> u64 {
    600
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8990
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let raw = self.server.base_url.trim();
        let url = Url::parse(raw)
            .map_err(|e| anyhow::anyhow!("server.base_url is not a valid URL ({raw:?}): {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("server.base_url must be an http(s) URL: {raw:?}");
        }
        if url.host_str().map_or(true, str::is_empty) {
            anyhow::bail!("server.base_url has no host: {raw:?}");
        }

        let intervals = [
            ("schedule.refresh_interval_secs", self.schedule.refresh_interval_secs),
            ("schedule.selection_refresh_secs", self.schedule.selection_refresh_secs),
            ("display.rotation_interval_secs", self.display.rotation_interval_secs),
            ("sponsors.rotation_interval_secs", self.sponsors.rotation_interval_secs),
            ("sponsors.refresh_interval_secs", self.sponsors.refresh_interval_secs),
            ("server.request_timeout_secs", self.server.request_timeout_secs),
        ];
        for (name, secs) in intervals {
            if secs < 1 {
                anyhow::bail!("{name} must be at least 1 second");
            }
        }
        if self.display.clock_tick_ms < 100 {
            anyhow::bail!("display.clock_tick_ms must be at least 100");
        }
        if self.display.max_display < 1 {
            anyhow::bail!("display.max_display must be at least 1");
        }
        if self.sponsors.display_count < 1 {
            anyhow::bail!("sponsors.display_count must be at least 1");
        }
        Ok(())
    }
}
