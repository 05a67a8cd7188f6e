//! Shared primitives for the dockwatch event pipeline.
//!
//! These types describe one normalized Docker lifecycle event and the
//! closed category set the dashboard filters on. They carry no behavior
//! beyond classification helpers so both the stream engine and the UI
//! shell can depend on them without pulling in each other.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Process-local identity assigned at normalization time.
///
/// Monotonically increasing for the lifetime of one engine instance; the
/// upstream feed supplies no usable identity (actor ids repeat and arrive
/// out of order), so this exists purely for stable display keying.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// Closed classification of an event's subject.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Container,
    Network,
    Image,
    Volume,
    Daemon,
}

impl EventCategory {
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Container,
        EventCategory::Network,
        EventCategory::Image,
        EventCategory::Volume,
        EventCategory::Daemon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Container => "container",
            EventCategory::Network => "network",
            EventCategory::Image => "image",
            EventCategory::Volume => "volume",
            EventCategory::Daemon => "daemon",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category restriction applied by the view projection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl CategoryFilter {
    pub fn matches(self, category: EventCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(expect) => expect == category,
        }
    }

    pub fn is_all(self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl From<EventCategory> for CategoryFilter {
    fn from(category: EventCategory) -> Self {
        CategoryFilter::Only(category)
    }
}

/// Display severity derived from a container action.
///
/// Non-container categories carry no lifecycle semantics the dashboard
/// color-codes, so they always classify as `Info`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSeverity {
    Success,
    Warning,
    Error,
    Info,
}

/// One normalized lifecycle event from a monitored host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DockerEvent {
    pub id: EventId,
    pub host: String,
    #[serde(rename = "type")]
    pub category: EventCategory,
    /// Free-form upstream action name; the daemon's action vocabulary
    /// evolves independently of this client, so it is not validated.
    pub action: String,
    pub actor_id: String,
    pub actor_name: String,
    /// Origin-reported seconds since epoch. Display only; the log orders
    /// by arrival, never by this value.
    pub timestamp: i64,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

impl DockerEvent {
    /// Origin-reported event time, if it is a representable instant.
    pub fn wall_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.timestamp, 0).single()
    }

    /// Actor id truncated to the 12-character short form used in tables.
    pub fn short_actor_id(&self) -> &str {
        self.actor_id.get(..12).unwrap_or(&self.actor_id)
    }

    pub fn severity(&self) -> ActionSeverity {
        if self.category != EventCategory::Container {
            return ActionSeverity::Info;
        }
        match self.action.as_str() {
            "start" | "create" | "unpause" => ActionSeverity::Success,
            "stop" | "die" | "kill" | "destroy" => ActionSeverity::Error,
            "pause" | "restart" => ActionSeverity::Warning,
            _ => ActionSeverity::Info,
        }
    }
}

/// Per-category totals over the full live log, independent of the active
/// filter or pause state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventCounts {
    pub all: usize,
    pub container: usize,
    pub network: usize,
    pub image: usize,
    pub volume: usize,
    pub daemon: usize,
}

impl EventCounts {
    pub fn record(&mut self, category: EventCategory) {
        self.all += 1;
        match category {
            EventCategory::Container => self.container += 1,
            EventCategory::Network => self.network += 1,
            EventCategory::Image => self.image += 1,
            EventCategory::Volume => self.volume += 1,
            EventCategory::Daemon => self.daemon += 1,
        }
    }

    pub fn of(&self, filter: CategoryFilter) -> usize {
        match filter {
            CategoryFilter::All => self.all,
            CategoryFilter::Only(EventCategory::Container) => self.container,
            CategoryFilter::Only(EventCategory::Network) => self.network,
            CategoryFilter::Only(EventCategory::Image) => self.image,
            CategoryFilter::Only(EventCategory::Volume) => self.volume,
            CategoryFilter::Only(EventCategory::Daemon) => self.daemon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(category: EventCategory, action: &str) -> DockerEvent {
        DockerEvent {
            id: EventId(0),
            host: "h1".into(),
            category,
            action: action.into(),
            actor_id: "0123456789abcdef".into(),
            actor_name: "web".into(),
            timestamp: 1_700_000_000,
            attrs: HashMap::new(),
        }
    }

    #[test]
    fn container_actions_classify_by_severity() {
        let cases = [
            ("start", ActionSeverity::Success),
            ("create", ActionSeverity::Success),
            ("unpause", ActionSeverity::Success),
            ("stop", ActionSeverity::Error),
            ("die", ActionSeverity::Error),
            ("kill", ActionSeverity::Error),
            ("destroy", ActionSeverity::Error),
            ("pause", ActionSeverity::Warning),
            ("restart", ActionSeverity::Warning),
            ("exec_create", ActionSeverity::Info),
        ];
        for (action, expect) in cases {
            assert_eq!(event(EventCategory::Container, action).severity(), expect);
        }
    }

    #[test]
    fn non_container_categories_are_info() {
        assert_eq!(
            event(EventCategory::Network, "destroy").severity(),
            ActionSeverity::Info
        );
        assert_eq!(
            event(EventCategory::Daemon, "start").severity(),
            ActionSeverity::Info
        );
    }

    #[test]
    fn short_actor_id_truncates_to_twelve() {
        let ev = event(EventCategory::Container, "start");
        assert_eq!(ev.short_actor_id(), "0123456789ab");

        let mut short = ev.clone();
        short.actor_id = "c1".into();
        assert_eq!(short.short_actor_id(), "c1");
    }

    #[test]
    fn counts_accumulate_per_category() {
        let mut counts = EventCounts::default();
        counts.record(EventCategory::Container);
        counts.record(EventCategory::Container);
        counts.record(EventCategory::Network);
        assert_eq!(counts.all, 3);
        assert_eq!(counts.of(CategoryFilter::All), 3);
        assert_eq!(counts.of(EventCategory::Container.into()), 2);
        assert_eq!(counts.of(EventCategory::Network.into()), 1);
        assert_eq!(counts.of(EventCategory::Volume.into()), 0);
    }

    #[test]
    fn filter_matches_only_its_category() {
        assert!(CategoryFilter::All.matches(EventCategory::Image));
        let only = CategoryFilter::Only(EventCategory::Network);
        assert!(only.matches(EventCategory::Network));
        assert!(!only.matches(EventCategory::Container));
    }

    #[test]
    fn event_id_renders_display_key() {
        assert_eq!(EventId(7).to_string(), "event-7");
    }

    #[test]
    fn wire_category_names_are_lowercase() {
        let json = serde_json::to_string(&EventCategory::Container).unwrap();
        assert_eq!(json, "\"container\"");
        let parsed: EventCategory = serde_json::from_str("\"volume\"").unwrap();
        assert_eq!(parsed, EventCategory::Volume);
    }
}
