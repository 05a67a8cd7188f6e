use std::collections::HashMap;

use serde::Deserialize;

use dockwatch_core_types::{DockerEvent, EventCategory, EventId};

use crate::errors::{StreamError, StreamErrorKind};

/// Wire shape of one event body as the backend pushes it.
#[derive(Debug, Deserialize)]
struct RawEventRecord {
    host: String,
    #[serde(rename = "type")]
    category: EventCategory,
    action: String,
    actor_id: String,
    #[serde(default)]
    actor_name: String,
    timestamp: i64,
    #[serde(default)]
    attrs: HashMap<String, String>,
}

/// Validates and shapes raw push payloads into [`DockerEvent`]s.
///
/// Owns the id counter explicitly: ids are strictly increasing for the
/// lifetime of one engine instance and advance only for payloads that
/// parse, so a dropped message leaves no visible gap. The normalizer never
/// touches the log; it stays separately testable.
#[derive(Debug, Default)]
pub struct EventNormalizer {
    next_id: u64,
}

impl EventNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, data: &str) -> Result<DockerEvent, StreamError> {
        let raw: RawEventRecord = serde_json::from_str(data)
            .map_err(|err| StreamError::from(StreamErrorKind::MalformedPayload(err.to_string())))?;

        let id = EventId(self.next_id);
        self.next_id += 1;

        Ok(DockerEvent {
            id,
            host: raw.host,
            category: raw.category,
            action: raw.action,
            actor_id: raw.actor_id,
            actor_name: raw.actor_name,
            timestamp: raw.timestamp,
            attrs: raw.attrs,
        })
    }
}
