use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// A scheduled talk as served by the schedule endpoint.
///
/// Field names follow the upstream JSON exactly (`Name`, `StartTime`, …).
/// Everything except the name and the two timestamps is optional on the
/// wire; absent values decode to empty strings / an empty speaker list so
/// the display can simply omit those sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Presentation {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub speakers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
}

impl Presentation {
    /// True when the session ends on a later calendar day than it starts,
    /// as seen from `tz`.
    pub fn ends_next_day<Tz: TimeZone>(&self, tz: &Tz) -> bool {
        let start = self.start_time.with_timezone(tz).date_naive();
        let end = self.end_time.with_timezone(tz).date_naive();
        end > start
    }

    /// Speakers joined for a single display line (`None` when there are none).
    pub fn speaker_line(&self) -> Option<String> {
        let names: Vec<&str> = self
            .speakers
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join(", "))
        }
    }
}

/// Payload of `GET /schedule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleData {
    #[serde(rename = "Presentations", default, deserialize_with = "null_as_default")]
    pub presentations: Vec<Presentation>,
    #[serde(rename = "lastUpdateTime", default, deserialize_with = "null_as_default")]
    pub last_update_time: String,
    #[serde(rename = "lastRefreshTime", default, deserialize_with = "null_as_default")]
    pub last_refresh_time: String,
    #[serde(rename = "contentHash", default, deserialize_with = "null_as_default")]
    pub content_hash: String,
    #[serde(rename = "sessionCount", default)]
    pub session_count: usize,
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_upstream_schedule_payload() {
        let raw = r#"{
            "Presentations": [
                {
                    "Name": "Opening Keynote",
                    "Description": "Welcome",
                    "Location": "Ballroom A",
                    "StartTime": "2025-03-07T09:00:00-08:00",
                    "EndTime": "2025-03-07T10:00:00-08:00",
                    "Speakers": ["Ada", "Grace"],
                    "Topic": "Keynote"
                }
            ],
            "lastUpdateTime": "2025-03-07T08:00:00-08:00",
            "lastRefreshTime": "2025-03-07T08:05:00-08:00",
            "contentHash": "abc123",
            "sessionCount": 1
        }"#;
        let data: ScheduleData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.content_hash, "abc123");
        assert_eq!(data.session_count, 1);
        let p = &data.presentations[0];
        assert_eq!(p.name, "Opening Keynote");
        assert_eq!(p.speaker_line().as_deref(), Some("Ada, Grace"));
        assert_eq!((p.end_time - p.start_time).num_minutes(), 60);
    }

    #[test]
    fn missing_and_null_optional_fields_become_empty() {
        let raw = r#"{
            "Presentations": [
                {
                    "Name": "Lightning Talks",
                    "StartTime": "2025-03-07T13:00:00Z",
                    "EndTime": "2025-03-07T13:30:00Z",
                    "Speakers": null
                }
            ]
        }"#;
        let data: ScheduleData = serde_json::from_str(raw).unwrap();
        let p = &data.presentations[0];
        assert!(p.topic.is_empty());
        assert!(p.location.is_empty());
        assert!(p.speakers.is_empty());
        assert_eq!(p.speaker_line(), None);
        assert!(data.content_hash.is_empty());
    }

    #[test]
    fn null_presentations_decode_as_empty_schedule() {
        let data: ScheduleData =
            serde_json::from_str(r#"{"Presentations": null, "contentHash": "x"}"#).unwrap();
        assert!(data.presentations.is_empty());
    }

    #[test]
    fn ends_next_day_respects_time_zone() {
        let raw = r#"{
            "Name": "Late Night Hack",
            "StartTime": "2025-03-07T23:30:00-08:00",
            "EndTime": "2025-03-08T00:30:00-08:00"
        }"#;
        let p: Presentation = serde_json::from_str(raw).unwrap();
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let utc = chrono::Utc;
        assert!(p.ends_next_day(&pacific));
        // 07:30Z .. 08:30Z on the same UTC day
        assert!(!p.ends_next_day(&utc));
    }
}
