use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::StreamCfg;
use crate::errors::StreamError;
use crate::log::EventLog;
use crate::metrics::StreamMetrics;
use crate::normalize::EventNormalizer;
use crate::transport::{StreamTransport, TransportConn, TransportSignal};

/// Lifecycle of the push connection.
///
/// `Errored` and `Disconnected` permit the same next step: an explicit
/// `connect()`. The engine never retries on its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Errored,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Errored => "errored",
        }
    }
}

struct ActiveConn {
    /// Cancelled first on teardown so in-flight messages are dropped, not
    /// appended, before the transport resource is released. A cancelled
    /// token also marks a still-pending connect attempt as displaced.
    teardown: CancellationToken,
    /// Absent while the transport open is still in flight.
    live: Option<LiveConn>,
}

struct LiveConn {
    transport_cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the push-connection lifecycle and the receive path into the log.
///
/// Exactly one connection is live at a time; `connect()` while one exists
/// tears the old one down first, so a single upstream event is never
/// delivered twice. The receive task is the log's only writer.
pub struct StreamConnection {
    cfg: StreamCfg,
    transport: Arc<dyn StreamTransport>,
    log: Arc<EventLog>,
    normalizer: Arc<Mutex<EventNormalizer>>,
    metrics: StreamMetrics,
    state: Arc<RwLock<ConnectionState>>,
    active: Mutex<Option<ActiveConn>>,
}

impl StreamConnection {
    pub fn new(
        cfg: StreamCfg,
        transport: Arc<dyn StreamTransport>,
        log: Arc<EventLog>,
        metrics: StreamMetrics,
    ) -> Self {
        Self {
            cfg,
            transport,
            log,
            // Seeded once per engine instance; ids keep increasing across
            // reconnects and reset only with the process.
            normalizer: Arc::new(Mutex::new(EventNormalizer::new())),
            metrics,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            active: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Establishes the single push connection to the configured endpoint.
    ///
    /// An existing connection is torn down first. Failure never propagates;
    /// it surfaces as the `Errored` state so the consumer can invite the
    /// user to reconnect.
    pub async fn connect(&self) {
        self.teardown();
        transition(&self.state, &self.metrics, ConnectionState::Connecting);
        self.metrics.record_connect();

        // Reserve the slot before awaiting the open, so an overlapping
        // connect or disconnect displaces this attempt by cancelling the
        // token instead of racing it. Exactly one connection stays live.
        let teardown = CancellationToken::new();
        *self.active.lock() = Some(ActiveConn {
            teardown: teardown.clone(),
            live: None,
        });

        let conn = match self.transport.open(&self.cfg).await {
            Ok(conn) => conn,
            Err(err) => {
                let mut active = self.active.lock();
                if !teardown.is_cancelled() {
                    *active = None;
                    drop(active);
                    self.fail_connect(err);
                }
                return;
            }
        };

        let mut active = self.active.lock();
        if teardown.is_cancelled() {
            // Displaced while the transport was opening; dropping the
            // handle cancels the producer side.
            debug!(target: "event-stream", "connect attempt superseded");
            return;
        }
        let transport_cancel = conn.cancel_token();
        let task = tokio::spawn(run_receive_loop(
            conn,
            teardown.clone(),
            self.cfg.channel.clone(),
            Arc::clone(&self.log),
            Arc::clone(&self.normalizer),
            self.metrics.clone(),
            Arc::clone(&self.state),
        ));
        *active = Some(ActiveConn {
            teardown,
            live: Some(LiveConn {
                transport_cancel,
                task,
            }),
        });
    }

    /// Releases the connection deterministically; a no-op when already
    /// disconnected.
    pub fn disconnect(&self) {
        self.teardown();
        transition(&self.state, &self.metrics, ConnectionState::Disconnected);
    }

    fn teardown(&self) {
        let previous = self.active.lock().take();
        if let Some(conn) = previous {
            conn.teardown.cancel();
            if let Some(live) = conn.live {
                live.transport_cancel.cancel();
                live.task.abort();
            }
            debug!(target: "event-stream", "previous connection torn down");
        }
    }

    fn fail_connect(&self, err: StreamError) {
        warn!(target: "event-stream", %err, "transport open failed");
        self.metrics.record_transport_error();
        transition(&self.state, &self.metrics, ConnectionState::Errored);
    }
}

fn transition(
    state: &RwLock<ConnectionState>,
    metrics: &StreamMetrics,
    next: ConnectionState,
) {
    {
        let mut guard = state.write();
        if *guard == next {
            return;
        }
        debug!(
            target: "event-stream",
            from = guard.as_str(),
            to = next.as_str(),
            "connection state changed"
        );
        *guard = next;
    }
    metrics.record_transition(next);
}

async fn run_receive_loop(
    mut conn: TransportConn,
    teardown: CancellationToken,
    channel: String,
    log: Arc<EventLog>,
    normalizer: Arc<Mutex<EventNormalizer>>,
    metrics: StreamMetrics,
    state: Arc<RwLock<ConnectionState>>,
) {
    loop {
        let signal = tokio::select! {
            _ = teardown.cancelled() => return,
            signal = conn.recv() => signal,
        };
        // Teardown wins any race with an in-flight delivery.
        if teardown.is_cancelled() {
            if matches!(signal, Some(TransportSignal::Message(_))) {
                metrics.record_dropped_after_teardown();
            }
            return;
        }

        match signal {
            Some(TransportSignal::Opened) => {
                transition(&state, &metrics, ConnectionState::Open);
            }
            Some(TransportSignal::Message(msg)) => {
                if msg.channel != channel {
                    metrics.record_ignored_channel();
                    continue;
                }
                let normalized = normalizer.lock().normalize(&msg.data);
                match normalized {
                    Ok(event) => {
                        log.append(event);
                        metrics.record_ingested();
                    }
                    Err(err) => {
                        warn!(target: "event-stream", %err, "dropping malformed event payload");
                        metrics.record_malformed("json_parse");
                    }
                }
            }
            Some(TransportSignal::Failed(reason)) => {
                warn!(target: "event-stream", %reason, "transport reported failure");
                metrics.record_transport_error();
                transition(&state, &metrics, ConnectionState::Errored);
                return;
            }
            None => {
                metrics.record_transport_error();
                transition(&state, &metrics, ConnectionState::Errored);
                return;
            }
        }
    }
}
