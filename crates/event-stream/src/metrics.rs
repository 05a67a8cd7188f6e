use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::manager::ConnectionState;

/// Hook invoked on every connection-state transition.
pub type TransitionHook = Arc<dyn Fn(ConnectionState) + Send + Sync + 'static>;

/// Shared counters for the ingestion pipeline.
///
/// Cheap to clone; all handles observe the same totals. The engine never
/// fails hard, so these counters plus the state hook are the whole
/// observable surface for transport and parse trouble.
#[derive(Clone, Default)]
pub struct StreamMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    ingested: AtomicU64,
    malformed: AtomicU64,
    ignored_channel: AtomicU64,
    dropped_after_teardown: AtomicU64,
    connects: AtomicU64,
    transport_errors: AtomicU64,
    malformed_reasons: Mutex<HashMap<String, u64>>,
    transitions: Mutex<HashMap<&'static str, u64>>,
    transition_hook: Mutex<Option<TransitionHook>>,
}

impl StreamMetrics {
    pub fn set_transition_hook(&self, hook: TransitionHook) {
        *self.inner.transition_hook.lock() = Some(hook);
    }

    pub fn record_ingested(&self) {
        self.inner.ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self, reason: &str) {
        self.inner.malformed.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.inner.malformed_reasons.lock();
        *guard.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn record_ignored_channel(&self) {
        self.inner.ignored_channel.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_after_teardown(&self) {
        self.inner.dropped_after_teardown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connect(&self) {
        self.inner.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.inner.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition(&self, next: ConnectionState) {
        {
            let mut guard = self.inner.transitions.lock();
            *guard.entry(next.as_str()).or_insert(0) += 1;
        }
        let hook = self.inner.transition_hook.lock().clone();
        if let Some(hook) = hook {
            (hook)(next);
        }
    }

    pub fn snapshot(&self) -> StreamMetricSnapshot {
        StreamMetricSnapshot {
            ingested: self.inner.ingested.load(Ordering::Relaxed),
            malformed: self.inner.malformed.load(Ordering::Relaxed),
            ignored_channel: self.inner.ignored_channel.load(Ordering::Relaxed),
            dropped_after_teardown: self.inner.dropped_after_teardown.load(Ordering::Relaxed),
            connects: self.inner.connects.load(Ordering::Relaxed),
            transport_errors: self.inner.transport_errors.load(Ordering::Relaxed),
            malformed_reasons: self.inner.malformed_reasons.lock().clone(),
            transitions: self.inner.transitions.lock().clone(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct StreamMetricSnapshot {
    pub ingested: u64,
    pub malformed: u64,
    pub ignored_channel: u64,
    pub dropped_after_teardown: u64,
    pub connects: u64,
    pub transport_errors: u64,
    pub malformed_reasons: HashMap<String, u64>,
    pub transitions: HashMap<&'static str, u64>,
}
