use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::StreamCfg;
use crate::errors::{StreamError, StreamErrorKind};
use crate::transport::{StreamTransport, TransportConn, TransportMessage, TransportSignal};

/// Server-sent-events transport over a streaming HTTP GET.
///
/// Mirrors browser `EventSource` semantics minus auto-reconnect: one GET
/// with `Accept: text/event-stream`, frames split on blank lines, `event:`
/// naming the channel and `data:` lines carrying the body.
#[derive(Clone, Debug, Default)]
pub struct SseTransport {
    client: reqwest::Client,
}

impl SseTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamTransport for SseTransport {
    async fn open(&self, cfg: &StreamCfg) -> Result<TransportConn, StreamError> {
        let endpoint = reqwest::Url::parse(&cfg.endpoint)
            .map_err(|err| StreamError::from(StreamErrorKind::ConnectFailed(err.to_string())))?;
        let (tx, rx) = mpsc::channel(cfg.signal_buffer.max(1));
        let cancel = CancellationToken::new();

        let client = self.client.clone();
        let producer_cancel = cancel.clone();
        tokio::spawn(async move {
            run_stream(client, endpoint, tx, producer_cancel).await;
        });

        Ok(TransportConn::new(rx, cancel))
    }
}

async fn run_stream(
    client: reqwest::Client,
    endpoint: reqwest::Url,
    tx: mpsc::Sender<TransportSignal>,
    cancel: CancellationToken,
) {
    let request = client
        .get(endpoint.clone())
        .header("accept", "text/event-stream")
        .send();

    let response = tokio::select! {
        _ = cancel.cancelled() => return,
        response = request => response,
    };

    let response = match response {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            let _ = tx
                .send(TransportSignal::Failed(format!(
                    "unexpected status {}",
                    response.status()
                )))
                .await;
            return;
        }
        Err(err) => {
            let _ = tx.send(TransportSignal::Failed(err.to_string())).await;
            return;
        }
    };

    if tx.send(TransportSignal::Opened).await.is_err() {
        return;
    }
    debug!(target: "event-stream", url = %endpoint, "sse stream opened");

    let mut body = response.bytes_stream();
    let mut parser = FrameParser::default();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(target: "event-stream", "sse stream closed by consumer");
                return;
            }
            chunk = body.next() => match chunk {
                Some(Ok(bytes)) => {
                    for frame in parser.feed(&bytes) {
                        if tx.send(TransportSignal::Message(frame)).await.is_err() {
                            return;
                        }
                    }
                }
                Some(Err(err)) => {
                    let _ = tx.send(TransportSignal::Failed(err.to_string())).await;
                    return;
                }
                None => {
                    let _ = tx
                        .send(TransportSignal::Failed("server closed the stream".into()))
                        .await;
                    return;
                }
            }
        }
    }
}

/// Incremental SSE frame parser; chunk boundaries may fall anywhere.
#[derive(Debug, Default)]
struct FrameParser {
    buffer: String,
    event_name: String,
    data: Vec<String>,
}

impl FrameParser {
    fn feed(&mut self, bytes: &[u8]) -> Vec<TransportMessage> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            if let Some(frame) = self.take_line(line.trim_end_matches(['\r', '\n'])) {
                out.push(frame);
            }
        }
        out
    }

    fn take_line(&mut self, line: &str) -> Option<TransportMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event_name = value.to_string(),
            "data" => self.data.push(value.to_string()),
            // id/retry are part of the wire format but unused here.
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<TransportMessage> {
        if self.data.is_empty() {
            self.event_name.clear();
            return None;
        }
        let channel = if self.event_name.is_empty() {
            "message".to_string()
        } else {
            std::mem::take(&mut self.event_name)
        };
        let data = self.data.join("\n");
        self.data.clear();
        self.event_name.clear();
        Some(TransportMessage { channel, data })
    }
}
