//! HTTP client for the schedule and sponsor endpoints.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use url::Url;

use crate::config::ServerConfig;
use crate::protocol::ScheduleData;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} did not return a JSON array")]
    NotAnArray { url: String },
}

#[derive(Debug, Clone)]
pub struct ScheduleClient {
    client: Client,
    server: ServerConfig,
    /// `server.base_url`, always ending in `/` so paths join beneath it.
    base: Url,
}

impl ScheduleClient {
    pub fn new(server: ServerConfig) -> Result<Self, FetchError> {
        let mut base = Url::parse(server.base_url.trim()).map_err(|source| {
            FetchError::InvalidUrl {
                url: server.base_url.clone(),
                source,
            }
        })?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(server.request_timeout_secs))
            .build()
            .map_err(|source| FetchError::Http {
                url: server.base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            server,
            base,
        })
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Endpoint URL for `path`, relative to the base URL's own path.
    pub fn url(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| FetchError::InvalidUrl {
                url: path.to_string(),
                source,
            })
    }

    pub async fn fetch_schedule(&self) -> Result<ScheduleData, FetchError> {
        let data: ScheduleData = self
            .get_json_with_fallback(&self.server.schedule_path, &self.server.legacy_schedule_path)
            .await?;
        debug!(
            sessions = data.presentations.len(),
            hash = %data.content_hash,
            "fetched schedule"
        );
        Ok(data)
    }

    /// Sponsor image filenames. Anything in the array that is not a string
    /// is dropped.
    pub async fn fetch_sponsors(&self) -> Result<Vec<String>, FetchError> {
        let value: serde_json::Value = self
            .get_json_with_fallback(&self.server.sponsors_path, &self.server.legacy_sponsors_path)
            .await?;
        let serde_json::Value::Array(items) = value else {
            return Err(FetchError::NotAnArray {
                url: self.url(&self.server.sponsors_path)?.to_string(),
            });
        };
        let total = items.len();
        let images: Vec<String> = items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect();
        if images.len() != total {
            warn!(dropped = total - images.len(), "ignoring non-string sponsor entries");
        }
        debug!(count = images.len(), "fetched sponsor list");
        Ok(images)
    }

    /// Sponsor image URL. The filename is percent-encoded as needed.
    pub fn image_url(&self, file: &str) -> Result<Url, FetchError> {
        let dir = format!("{}/", self.server.sponsor_images_path.trim_matches('/'));
        self.url(&dir)?
            .join(file.trim_start_matches('/'))
            .map_err(|source| FetchError::InvalidUrl {
                url: file.to_string(),
                source,
            })
    }

    /// `HEAD` a sponsor image. Any failure counts as unavailable.
    pub async fn probe_image(&self, file: &str) -> bool {
        let url = match self.image_url(file) {
            Ok(url) => url,
            Err(e) => {
                debug!(file, error = %e, "sponsor image has no usable URL");
                return false;
            }
        };
        match self.client.head(url.clone()).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!(%url, status = %resp.status(), "sponsor image unavailable");
                false
            }
            Err(e) => {
                debug!(%url, error = %e, "sponsor image probe failed");
                false
            }
        }
    }

    async fn get_json_with_fallback<T: DeserializeOwned>(
        &self,
        primary: &str,
        legacy: &str,
    ) -> Result<T, FetchError> {
        match self.get_json(primary).await {
            Err(FetchError::Status { status, .. })
                if status == StatusCode::NOT_FOUND && !legacy.is_empty() && legacy != primary =>
            {
                info!(primary, legacy, "primary path not found, trying legacy path");
                self.get_json(legacy).await
            }
            other => other,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let endpoint = self.url(path)?;
        let url = endpoint.to_string();
        let response = self
            .client
            .get(endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_cleanly() {
        let server = ServerConfig {
            base_url: "http://signs.local:2017/".into(),
            ..ServerConfig::default()
        };
        let client = ScheduleClient::new(server).unwrap();
        assert_eq!(
            client.url("/schedule").unwrap().as_str(),
            "http://signs.local:2017/schedule"
        );
        assert_eq!(
            client.image_url("acme.png").unwrap().as_str(),
            "http://signs.local:2017/sponsors/images/acme.png"
        );
    }

    #[test]
    fn base_path_is_kept_and_filenames_are_encoded() {
        let server = ServerConfig {
            base_url: "https://conf.example.org/kiosk".into(),
            ..ServerConfig::default()
        };
        let client = ScheduleClient::new(server).unwrap();
        assert_eq!(
            client.url("/api/schedule").unwrap().as_str(),
            "https://conf.example.org/kiosk/api/schedule"
        );
        assert_eq!(
            client.image_url("big corp.png").unwrap().as_str(),
            "https://conf.example.org/kiosk/sponsors/images/big%20corp.png"
        );
    }

    #[test]
    fn malformed_base_url_is_rejected_up_front() {
        for base_url in ["http://bad host", "http://example.com:99999"] {
            let server = ServerConfig {
                base_url: base_url.into(),
                ..ServerConfig::default()
            };
            assert!(matches!(
                ScheduleClient::new(server),
                Err(FetchError::InvalidUrl { .. })
            ));
        }
    }
}
