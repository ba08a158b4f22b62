#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset};
use serde_json::{json, Value};
use signs_proto::protocol::Presentation;

pub fn at(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

pub fn talk(name: &str, start: DateTime<FixedOffset>, minutes: i64) -> Presentation {
    Presentation {
        name: name.to_string(),
        description: String::new(),
        location: format!("Room {}", name.len()),
        start_time: start,
        end_time: start + Duration::minutes(minutes),
        speakers: vec![],
        topic: String::new(),
    }
}

pub fn schedule_json(hash: &str, names: &[&str]) -> Value {
    let presentations: Vec<Value> = names
        .iter()
        .map(|n| {
            json!({
                "Name": n,
                "Location": "Ballroom",
                "StartTime": "2025-03-08T10:00:00-08:00",
                "EndTime": "2025-03-08T11:00:00-08:00",
                "Speakers": ["Ada"],
                "Topic": "Open Source"
            })
        })
        .collect();
    json!({
        "Presentations": presentations,
        "contentHash": hash,
        "lastUpdateTime": "2025-03-08T08:00:00-08:00",
        "sessionCount": names.len()
    })
}
