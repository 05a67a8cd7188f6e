use serde::{Deserialize, Serialize};

/// Default retention of the in-memory event log.
pub const MAX_EVENTS: usize = 500;

/// Tuning knobs for one stream engine instance.
///
/// The endpoint and channel name are fixed at construction; reconnecting
/// always targets the same stream. There is no retry/backoff knob:
/// reconnection is an explicit user action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamCfg {
    /// URL of the server-push event endpoint.
    pub endpoint: String,
    /// Channel tag of messages this engine ingests; everything else on the
    /// same connection is ignored.
    pub channel: String,
    /// Capacity of the bounded event log.
    pub max_events: usize,
    /// Buffer size of the transport signal channel.
    pub signal_buffer: usize,
}

impl Default for StreamCfg {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/docker-sse/events".to_string(),
            channel: "container-event".to_string(),
            max_events: MAX_EVENTS,
            signal_buffer: 256,
        }
    }
}
