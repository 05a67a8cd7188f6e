use std::sync::Arc;

use dockwatch_core_types::{CategoryFilter, DockerEvent, EventCounts};

use crate::config::StreamCfg;
use crate::log::EventLog;
use crate::manager::{ConnectionState, StreamConnection};
use crate::metrics::{StreamMetricSnapshot, StreamMetrics, TransitionHook};
use crate::sse::SseTransport;
use crate::transport::StreamTransport;
use crate::view::EventView;

/// One owned instance of the live event stream engine.
///
/// The UI shell holds exactly one of these and passes it explicitly to the
/// components that need it; there is no ambient global state, so tests can
/// construct isolated engines with a scripted transport.
pub struct EventStreamEngine {
    connection: StreamConnection,
    view: EventView,
    metrics: StreamMetrics,
}

impl EventStreamEngine {
    /// Engine wired to the real SSE transport.
    pub fn new(cfg: StreamCfg) -> Self {
        Self::with_transport(cfg, Arc::new(SseTransport::new()))
    }

    pub fn with_transport(cfg: StreamCfg, transport: Arc<dyn StreamTransport>) -> Self {
        let log = Arc::new(EventLog::new(cfg.max_events));
        let metrics = StreamMetrics::default();
        let connection =
            StreamConnection::new(cfg, transport, Arc::clone(&log), metrics.clone());
        let view = EventView::new(log);
        Self {
            connection,
            view,
            metrics,
        }
    }

    pub async fn connect(&self) {
        self.connection.connect().await;
    }

    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn pause(&self) {
        self.view.pause();
    }

    pub fn resume(&self) {
        self.view.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.view.is_paused()
    }

    pub fn set_filter(&self, filter: CategoryFilter) {
        self.view.set_filter(filter);
    }

    pub fn filter(&self) -> CategoryFilter {
        self.view.filter()
    }

    pub fn clear(&self) {
        self.view.clear();
    }

    /// The currently projected sequence, newest first.
    pub fn events(&self) -> Vec<DockerEvent> {
        self.view.events()
    }

    /// Totals over the full live log, independent of filter and pause.
    pub fn counts(&self) -> EventCounts {
        self.view.counts()
    }

    pub fn metrics(&self) -> StreamMetricSnapshot {
        self.metrics.snapshot()
    }

    pub fn set_transition_hook(&self, hook: TransitionHook) {
        self.metrics.set_transition_hook(hook);
    }
}
