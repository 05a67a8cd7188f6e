//! Live event stream synchronization engine for the dockwatch dashboard.
//!
//! Maintains one long-lived server-push connection to the event endpoint,
//! normalizes the heterogeneous feed into [`DockerEvent`]s, retains a
//! bounded arrival-ordered history, and projects it through a pausable,
//! filterable view. Container/host CRUD, auth, and rendering live
//! elsewhere; this crate is the only piece with a connection state machine
//! and a bounded-resource policy.
//!
//! Pipeline: transport → [`StreamConnection`] → [`EventNormalizer`] →
//! [`EventLog`] → [`EventView`] → consumer. The consumer holds a single
//! [`EventStreamEngine`] and drives everything through it.

pub mod config;
pub mod engine;
pub mod errors;
pub mod log;
pub mod manager;
pub mod metrics;
pub mod normalize;
pub mod sse;
pub mod transport;
pub mod view;

pub use config::{StreamCfg, MAX_EVENTS};
pub use engine::EventStreamEngine;
pub use errors::{StreamError, StreamErrorKind};
pub use log::EventLog;
pub use manager::{ConnectionState, StreamConnection};
pub use metrics::{StreamMetricSnapshot, StreamMetrics, TransitionHook};
pub use normalize::EventNormalizer;
pub use sse::SseTransport;
pub use transport::{StreamTransport, TransportConn, TransportMessage, TransportSignal};
pub use view::EventView;

pub use dockwatch_core_types::{
    ActionSeverity, CategoryFilter, DockerEvent, EventCategory, EventCounts, EventId,
};
