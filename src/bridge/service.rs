use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{
    io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::{
    infrastructure::shutdown::ShutdownListener,
    monitor::PageMonitor,
    status::StatusReader,
    ui::{Alert, BadgeState, UiSink},
};

use super::protocol::{parse_line, Inbound, Outbound};

/// Longest inbound line accepted, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

pub type OutboundSender = mpsc::UnboundedSender<Outbound>;
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Forwards derived UI state to the extension over the outbound channel.
#[derive(Clone)]
pub struct BridgeSink {
    tx: OutboundSender,
}

pub fn outbound_channel() -> (BridgeSink, OutboundReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeSink { tx }, rx)
}

impl BridgeSink {
    pub fn sender(&self) -> OutboundSender {
        self.tx.clone()
    }

    fn send(&self, message: Outbound) {
        if self.tx.send(message).is_err() {
            tracing::warn!(target: "bridge", "outbound writer is gone; dropping message");
        }
    }
}

impl UiSink for BridgeSink {
    fn set_badge(&self, badge: &BadgeState) {
        tracing::debug!(target: "ui", text = badge.text, color = badge.color, "badge updated");
        self.send(Outbound::Badge(badge.clone()));
    }

    fn notify(&self, alert: &Alert) {
        tracing::warn!(target: "ui", url = %alert.url, "phishing website detected");
        self.send(Outbound::Alert(alert.clone()));
    }
}

/// Reads extension messages line by line and routes them to the monitor or
/// the status reader.
pub struct BridgeService {
    monitor: Arc<PageMonitor>,
    status: StatusReader,
    tx: OutboundSender,
}

impl BridgeService {
    pub fn new(monitor: Arc<PageMonitor>, status: StatusReader, tx: OutboundSender) -> Self {
        Self {
            monitor,
            status,
            tx,
        }
    }

    /// Runs until the input reaches EOF or shutdown is requested. Only I/O
    /// errors end the loop; bad lines are logged and skipped.
    pub async fn run<R>(&self, mut reader: R, mut shutdown: ShutdownListener) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            let read = tokio::select! {
                read = read_line_capped(&mut reader, &mut buf, MAX_LINE_BYTES) => {
                    read.context("failed to read bridge input")?
                }
                _ = shutdown.notified() => {
                    tracing::info!(target: "bridge", "shutdown requested; closing bridge");
                    break;
                }
            };

            match read {
                LineRead::Line => match std::str::from_utf8(&buf) {
                    Ok(line) => self.dispatch(line),
                    Err(err) => {
                        tracing::warn!(
                            target: "bridge",
                            error = %err,
                            "skipping bridge message that is not valid UTF-8"
                        );
                    }
                },
                LineRead::TooLong => {
                    tracing::warn!(
                        target: "bridge",
                        limit = MAX_LINE_BYTES,
                        "skipping oversized bridge message"
                    );
                }
                LineRead::Eof => {
                    tracing::info!(target: "bridge", "bridge input closed");
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn dispatch(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let message = match parse_line(line) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(target: "bridge", error = %err, "skipping bridge message");
                return;
            }
        };

        match message {
            Inbound::GetResult { url } => {
                let report = self.status.query(&url);
                if self.tx.send(Outbound::Result(report)).is_err() {
                    tracing::warn!(target: "bridge", url = %url, "outbound writer is gone");
                }
            }
            other => {
                if let Some(event) = other.into_event() {
                    // Classification runs detached; the handle is not needed.
                    let _ = self.monitor.handle(&event);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRead {
    Line,
    TooLong,
    Eof,
}

/// Reads one `\n`-terminated line into `buf`. Bytes past `max` are consumed
/// and discarded up to the next newline, so the buffer never grows beyond
/// `max + 1`.
async fn read_line_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut overflowed = false;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if overflowed {
                LineRead::TooLong
            } else if buf.is_empty() {
                LineRead::Eof
            } else {
                LineRead::Line
            });
        }

        let newline = available.iter().position(|b| *b == b'\n');
        let used = newline.map_or(available.len(), |idx| idx + 1);
        if !overflowed {
            let content = newline.map_or(used, |idx| idx);
            if buf.len() + content > max {
                overflowed = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..used]);
            }
        }
        reader.consume(used);

        if newline.is_some() {
            return Ok(if overflowed {
                LineRead::TooLong
            } else {
                LineRead::Line
            });
        }
    }
}

/// Serialises outbound messages as JSON lines until every sender is dropped.
pub async fn write_outbound<W>(mut rx: OutboundReceiver, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let mut line = serde_json::to_vec(&message).context("failed to encode bridge message")?;
        line.push(b'\n');
        writer
            .write_all(&line)
            .await
            .context("failed to write bridge output")?;
        writer.flush().await.context("failed to flush bridge output")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Client;
    use serde_json::Value;
    use tokio::io::BufReader;
    use url::Url;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{
        cache::ClassificationCache,
        classifier::PredictionClient,
        config::{ClassifierConfig, MonitorConfig},
        domain::{ClassificationLabel, PageEvent},
        infrastructure::shutdown::Shutdown,
    };

    struct Fixture {
        cache: Arc<ClassificationCache>,
        service: BridgeService,
        monitor: Arc<PageMonitor>,
        rx: OutboundReceiver,
    }

    fn fixture(server: &MockServer) -> Fixture {
        let endpoint = Url::parse(&format!("{}/predict", server.uri())).unwrap();
        let classifier = Arc::new(PredictionClient::new(
            Client::new(),
            ClassifierConfig {
                endpoint,
                timeout: Duration::from_secs(5),
            },
        ));
        let cache = Arc::new(ClassificationCache::new());
        let (sink, rx) = outbound_channel();
        let tx = sink.sender();
        let monitor = Arc::new(PageMonitor::new(
            cache.clone(),
            classifier,
            Arc::new(sink),
            &MonitorConfig::default(),
        ));
        let service = BridgeService::new(monitor.clone(), StatusReader::new(cache.clone()), tx);
        Fixture {
            cache,
            service,
            monitor,
            rx,
        }
    }

    async fn drain(fixture: Fixture) -> Vec<Value> {
        let Fixture {
            service,
            monitor,
            rx,
            ..
        } = fixture;
        drop(service);
        drop(monitor);

        let mut out = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), write_outbound(rx, &mut out))
            .await
            .expect("pending classifications should finish")
            .unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn completed_phishing_load_emits_badge_and_alert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({ "url": "https://bank-example.com" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "label": "phishing" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fixture = fixture(&server);
        let input = [
            r#"{"type":"page_loaded","url":"https://bank-example.com","status":"loading"}"#,
            "this is not json",
            r#"{"type":"tab_activated","url":"chrome://newtab"}"#,
            r#"{"type":"page_loaded","url":"https://bank-example.com","status":"complete"}"#,
            "",
        ]
        .join("\n");
        fixture
            .service
            .run(BufReader::new(input.as_bytes()), Shutdown::new().subscribe())
            .await
            .unwrap();
        let cache = fixture.cache.clone();

        let messages = drain(fixture).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            serde_json::json!({ "type": "badge", "text": "!", "color": "#d93025" })
        );
        assert_eq!(messages[1]["type"], "alert");
        assert_eq!(messages[1]["url"], "https://bank-example.com");
        assert!(messages[1]["message"]
            .as_str()
            .unwrap()
            .ends_with("https://bank-example.com"));
        assert_eq!(cache.get("https://bank-example.com"), ClassificationLabel::Phishing);
        assert!(!cache.has("chrome://newtab"));
    }

    #[tokio::test]
    async fn unreachable_service_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fixture = fixture(&server);
        fixture
            .service
            .dispatch(r#"{"type":"tab_activated","url":"https://foo.com"}"#);
        let cache = fixture.cache.clone();

        let messages = drain(fixture).await;
        assert!(messages.is_empty());
        assert!(!cache.has("https://foo.com"));
    }

    #[tokio::test]
    async fn status_query_reads_cache_without_classifying() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "label": "legitimate" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fixture = fixture(&server);
        fixture
            .monitor
            .handle(&PageEvent::ActivePageSwitched {
                url: Some("https://known.example".to_string()),
            })
            .unwrap()
            .await
            .unwrap();
        fixture
            .service
            .dispatch(r#"{"type":"get_result","url":"https://known.example"}"#);
        fixture
            .service
            .dispatch(r#"{"type":"get_result","url":"https://never-seen.example"}"#);
        let cache = fixture.cache.clone();

        let messages = drain(fixture).await;
        let results: Vec<_> = messages.iter().filter(|m| m["type"] == "result").collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["label"], "legitimate");
        assert_eq!(results[0]["view"]["class"], "safe");
        assert_eq!(results[1]["label"], "unknown");
        assert_eq!(results[1]["view"]["text"], "⏳ Checking...");
        assert!(!cache.has("https://never-seen.example"));
    }

    #[tokio::test]
    async fn shutdown_stops_an_idle_bridge() {
        let server = MockServer::start().await;
        let fixture = fixture(&server);
        let shutdown = Shutdown::new();
        let (_keep_open, reader) = tokio::io::duplex(64);
        shutdown.trigger("test");

        tokio::time::timeout(
            Duration::from_secs(1),
            fixture
                .service
                .run(BufReader::new(reader), shutdown.subscribe()),
        )
        .await
        .expect("bridge should stop")
        .unwrap();
    }

    async fn run_bytes(fixture: &Fixture, input: Vec<u8>) {
        fixture
            .service
            .run(BufReader::new(input.as_slice()), Shutdown::new().subscribe())
            .await
            .expect("bad input must not end the bridge");
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "label": "phishing" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fixture = fixture(&server);
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"type":"tab_activated","url":"https://after.example"}"#);
        input.push(b'\n');
        run_bytes(&fixture, input).await;
        let cache = fixture.cache.clone();

        let messages = drain(fixture).await;
        assert_eq!(messages.len(), 2);
        assert_eq!(cache.get("https://after.example"), ClassificationLabel::Phishing);
    }

    #[tokio::test]
    async fn oversized_line_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({ "url": "https://after.example" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "label": "legitimate" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fixture = fixture(&server);
        let padding = "a".repeat(MAX_LINE_BYTES + 10);
        let oversized = format!(r#"{{"type":"tab_activated","url":"https://{padding}.example"}}"#);
        let mut input = oversized.into_bytes();
        input.push(b'\n');
        input.extend_from_slice(br#"{"type":"tab_activated","url":"https://after.example"}"#);
        run_bytes(&fixture, input).await;
        let cache = fixture.cache.clone();

        drain(fixture).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("https://after.example"), ClassificationLabel::Legitimate);
    }

    #[tokio::test]
    async fn capped_reader_splits_lines_across_small_chunks() {
        let input: &[u8] = b"short\nthis line is too long\nok\nlast";
        let mut reader = BufReader::with_capacity(4, input);
        let mut buf = Vec::new();

        let mut seen = Vec::new();
        loop {
            let read = read_line_capped(&mut reader, &mut buf, 8).await.unwrap();
            if read == LineRead::Eof {
                break;
            }
            seen.push((read, String::from_utf8(buf.clone()).unwrap()));
            assert!(buf.len() <= 9);
        }

        assert_eq!(
            seen,
            vec![
                (LineRead::Line, "short\n".to_string()),
                (LineRead::TooLong, String::new()),
                (LineRead::Line, "ok\n".to_string()),
                (LineRead::Line, "last".to_string()),
            ]
        );
    }
}
