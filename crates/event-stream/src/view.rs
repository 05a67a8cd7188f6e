use std::sync::Arc;

use parking_lot::Mutex;

use dockwatch_core_types::{CategoryFilter, DockerEvent, EventCounts};

use crate::log::EventLog;

/// Derives what a viewer currently sees from the log.
///
/// Live mode mirrors the log; Paused mode mirrors a snapshot frozen at the
/// moment pause was entered. Pausing affects what is displayed, never what
/// is retained: ingestion keeps appending underneath. All operations are
/// idempotent no-ops when they do not apply.
pub struct EventView {
    log: Arc<EventLog>,
    inner: Mutex<ViewInner>,
}

#[derive(Default)]
struct ViewInner {
    frozen: Option<Vec<DockerEvent>>,
    filter: CategoryFilter,
}

impl EventView {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            inner: Mutex::new(ViewInner::default()),
        }
    }

    pub fn pause(&self) {
        let mut inner = self.inner.lock();
        if inner.frozen.is_none() {
            inner.frozen = Some(self.log.snapshot());
        }
    }

    pub fn resume(&self) {
        self.inner.lock().frozen = None;
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().frozen.is_some()
    }

    pub fn set_filter(&self, filter: CategoryFilter) {
        self.inner.lock().filter = filter;
    }

    pub fn filter(&self) -> CategoryFilter {
        self.inner.lock().filter
    }

    /// Clears the log and, when paused, the frozen snapshot too, so no
    /// stale paused view of now-cleared data survives. Pause state itself
    /// is preserved.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        self.log.clear();
        if let Some(frozen) = inner.frozen.as_mut() {
            frozen.clear();
        }
    }

    /// The projected sequence: frozen-or-live contents, newest first,
    /// reduced by the category filter.
    pub fn events(&self) -> Vec<DockerEvent> {
        let inner = self.inner.lock();
        let base = match &inner.frozen {
            Some(frozen) => frozen.clone(),
            None => self.log.snapshot(),
        };
        if inner.filter.is_all() {
            return base;
        }
        base.into_iter()
            .filter(|event| inner.filter.matches(event.category))
            .collect()
    }

    /// Per-category totals over the full unfiltered live log, regardless of
    /// the active filter or pause state.
    pub fn counts(&self) -> EventCounts {
        self.log.counts()
    }
}
