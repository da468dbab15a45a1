//! In-memory stand-ins for the bus and push capabilities, plus log capture.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{AppError, AppResult};
use crate::external::bus::{BusConnection, BusMessage, ChannelSubscription, PullSubscription};
use crate::external::ntfy::{PushClient, PushResponse};
use crate::models::Envelope;

// ============================================================================
// Bus
// ============================================================================

#[derive(Default)]
pub struct FakeBus {
    published: Mutex<Vec<(String, Bytes)>>,
    subscriptions: Mutex<Vec<String>>,
    fail_publish: bool,
    pull: Mutex<Option<ScriptedPull>>,
    channel: Mutex<Option<ChannelScript>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_publish(mut self) -> Self {
        self.fail_publish = true;
        self
    }

    pub fn with_pull(self, subscription: ScriptedPull) -> Self {
        *self.pull.lock().unwrap() = Some(subscription);
        self
    }

    pub fn with_channel(self, script: ChannelScript) -> Self {
        *self.channel.lock().unwrap() = Some(script);
        self
    }

    pub fn published(&self) -> Vec<(String, Bytes)> {
        self.published.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BusConnection for FakeBus {
    async fn publish(&self, subject: &str, payload: Bytes) -> AppResult<()> {
        if self.fail_publish {
            return Err(AppError::transport(
                "nats publish",
                anyhow::anyhow!("connection closed"),
            ));
        }
        self.published
            .lock()
            .unwrap()
            .push((subject.to_string(), payload));
        Ok(())
    }

    async fn subscribe_sync(&self, subject: &str) -> AppResult<Box<dyn PullSubscription>> {
        self.subscriptions.lock().unwrap().push(subject.to_string());
        let subscription = self.pull.lock().unwrap().take().unwrap_or_default();
        Ok(Box::new(subscription))
    }

    async fn subscribe_channel(
        &self,
        subject: &str,
        capacity: usize,
    ) -> AppResult<(mpsc::Receiver<BusMessage>, Box<dyn ChannelSubscription>)> {
        self.subscriptions.lock().unwrap().push(subject.to_string());
        let script = self.channel.lock().unwrap().take().unwrap_or_default();
        let (rx, subscription) = script.start(capacity);
        Ok((rx, Box::new(subscription)))
    }
}

/// Pull subscription replaying a fixed script, then waiting forever
#[derive(Default)]
pub struct ScriptedPull {
    script: VecDeque<AppResult<BusMessage>>,
}

impl ScriptedPull {
    pub fn new(script: impl IntoIterator<Item = AppResult<BusMessage>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PullSubscription for ScriptedPull {
    async fn next_message(&mut self) -> AppResult<BusMessage> {
        match self.script.pop_front() {
            Some(next) => next,
            None => std::future::pending().await,
        }
    }
}

/// Messages preloaded into a channel subscription
#[derive(Default)]
pub struct ChannelScript {
    messages: Vec<BusMessage>,
    close_after_messages: bool,
    fail_release: bool,
    probe: ChannelProbe,
}

impl ChannelScript {
    pub fn new(messages: impl IntoIterator<Item = BusMessage>) -> Self {
        Self {
            messages: messages.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Drop the sender once the messages are queued
    pub fn closed_after_messages(mut self) -> Self {
        self.close_after_messages = true;
        self
    }

    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    pub fn probe(&self) -> ChannelProbe {
        self.probe.clone()
    }

    fn start(self, capacity: usize) -> (mpsc::Receiver<BusMessage>, FakeChannelSubscription) {
        let (tx, rx) = mpsc::channel(capacity.max(self.messages.len()).max(1));
        for message in self.messages {
            tx.try_send(message).unwrap();
        }
        if !self.close_after_messages {
            *self.probe.sender.lock().unwrap() = Some(tx);
        }
        let subscription = FakeChannelSubscription {
            probe: self.probe,
            fail: self.fail_release,
        };
        (rx, subscription)
    }
}

/// Observes what a forwarder did with its channel subscription
#[derive(Clone, Default)]
pub struct ChannelProbe {
    events: Arc<Mutex<Vec<String>>>,
    sender: Arc<Mutex<Option<mpsc::Sender<BusMessage>>>>,
}

impl ChannelProbe {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Whether the receiving side has been closed
    pub fn channel_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap()
            .as_ref()
            .is_none_or(|tx| tx.is_closed())
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct FakeChannelSubscription {
    probe: ChannelProbe,
    fail: bool,
}

impl FakeChannelSubscription {
    fn result(&self, operation: &str) -> AppResult<()> {
        if self.fail {
            Err(AppError::transport(
                operation,
                anyhow::anyhow!("connection closed"),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChannelSubscription for FakeChannelSubscription {
    async fn drain(&mut self) -> AppResult<()> {
        let closed = self.probe.channel_closed();
        self.probe.record(format!("drain(closed={closed})"));
        self.result("nats drain")
    }

    async fn unsubscribe(&mut self) -> AppResult<()> {
        self.probe.record("unsubscribe".to_string());
        self.result("nats unsubscribe")
    }
}

// ============================================================================
// Push
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushBehaviour {
    Ok,
    /// Reply with this non-success status
    Fail(u16),
    /// Never answer
    Hang,
}

/// Push client following a script; behaves as `Ok` once the script runs out
#[derive(Default)]
pub struct FakePush {
    script: Mutex<VecDeque<PushBehaviour>>,
    sent: Mutex<Vec<Envelope>>,
}

impl FakePush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: impl IntoIterator<Item = PushBehaviour>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            sent: Mutex::default(),
        }
    }

    /// Every envelope handed to the client, including failed ones
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushClient for FakePush {
    async fn send_message(&self, envelope: &Envelope) -> AppResult<PushResponse> {
        self.sent.lock().unwrap().push(envelope.clone());
        let behaviour = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PushBehaviour::Ok);

        match behaviour {
            PushBehaviour::Ok => Ok(PushResponse {
                status: 200,
                id: Some("fake".to_string()),
                time: None,
                topic: Some(envelope.topic().to_string()),
                body: String::new(),
            }),
            PushBehaviour::Fail(status) => Err(AppError::Delivery {
                status,
                response: format!(r#"{{"http":{status},"error":"rejected"}}"#),
            }),
            PushBehaviour::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

// ============================================================================
// Logs
// ============================================================================

/// Buffer receiving formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Capture debug-level logs on the current thread until the guard drops
pub fn capture_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (guard, buffer)
}
