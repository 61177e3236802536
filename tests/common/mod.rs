#![allow(dead_code)]

use std::{
    collections::HashSet,
    path::Path,
    sync::Arc,
};

use agent_responder::{
    error::SendError,
    tmux::{BackendError, TerminalBackend},
    transport::{FetchedBatch, InboundMessage, MessagingTransport, SentMessage},
};
use parking_lot::Mutex;
use telegram_lite::{ParseMode, TelegramError};
use tokio::sync::watch;

pub fn message(id: i64, text: &str) -> InboundMessage {
    InboundMessage {
        id,
        message_id: id * 10,
        text: text.to_string(),
        sender_name: "Ada".to_string(),
        sender_id: Some(5),
        origin_chat_id: 42,
        timestamp: 1_700_000_000 + id,
    }
}

/// In-memory stand-in for the chat provider. Holds every update ever posted
/// and answers `fetch_updates(since)` with those at or after `since`.
#[derive(Default)]
pub struct FakeTransport {
    inner: Mutex<FakeTransportState>,
}

#[derive(Default)]
struct FakeTransportState {
    updates: Vec<InboundMessage>,
    failing_fetches: usize,
    fail_sends: bool,
    fetches: Vec<Option<i64>>,
    sent: Vec<(String, Option<ParseMode>)>,
    stop_after: Option<(usize, watch::Sender<bool>)>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: InboundMessage) {
        self.inner.lock().updates.push(message);
    }

    /// The next `n` fetches behave like a network failure.
    pub fn fail_next_fetches(&self, n: usize) {
        self.inner.lock().failing_fetches = n;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.inner.lock().fail_sends = fail;
    }

    /// Flip `shutdown` once `fetches` fetches have been served.
    pub fn stop_after(&self, fetches: usize, shutdown: watch::Sender<bool>) {
        self.inner.lock().stop_after = Some((fetches, shutdown));
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.inner.lock().sent.iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn sent(&self) -> Vec<(String, Option<ParseMode>)> {
        self.inner.lock().sent.clone()
    }

    pub fn fetches(&self) -> Vec<Option<i64>> {
        self.inner.lock().fetches.clone()
    }
}

impl MessagingTransport for FakeTransport {
    async fn send(&self, text: &str, hint: Option<ParseMode>) -> Result<SentMessage, SendError> {
        let mut state = self.inner.lock();
        if state.fail_sends {
            return Err(SendError::Transport(TelegramError::api(502, "Bad Gateway")));
        }
        state.sent.push((text.to_string(), hint));
        Ok(SentMessage {
            id: state.sent.len() as i64,
        })
    }

    async fn fetch_updates(&self, since: Option<i64>, limit: u32) -> FetchedBatch {
        let mut state = self.inner.lock();
        state.fetches.push(since);
        let served = state.fetches.len();
        if let Some((after, shutdown)) = &state.stop_after {
            if served >= *after {
                let _ = shutdown.send(true);
            }
        }

        if state.failing_fetches > 0 {
            state.failing_fetches -= 1;
            return FetchedBatch::default();
        }

        let messages: Vec<InboundMessage> = state
            .updates
            .iter()
            .filter(|m| since.map_or(true, |since| m.id >= since))
            .take(limit as usize)
            .cloned()
            .collect();
        FetchedBatch::from_messages(messages)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keys {
    Text(String, String),
    Cancel(String),
}

/// Terminal backend with a mutable set of live sessions.
#[derive(Default)]
pub struct FakeBackend {
    live: Mutex<HashSet<String>>,
    broken: Mutex<HashSet<String>>,
    kill_after_delivery: Mutex<HashSet<String>>,
    keys: Mutex<Vec<Keys>>,
}

impl FakeBackend {
    pub fn with_live(sessions: &[&str]) -> Arc<Self> {
        let backend = Self::default();
        backend
            .live
            .lock()
            .extend(sessions.iter().map(|s| s.to_string()));
        Arc::new(backend)
    }

    /// Session stays live but every send to it errors.
    pub fn break_session(&self, name: &str) {
        self.broken.lock().insert(name.to_string());
    }

    /// Session disappears right after its next successful delivery.
    pub fn kill_after_delivery(&self, name: &str) {
        self.kill_after_delivery.lock().insert(name.to_string());
    }

    pub fn keys(&self) -> Vec<Keys> {
        self.keys.lock().clone()
    }

    fn after_send(&self, name: &str) {
        if self.kill_after_delivery.lock().remove(name) {
            self.live.lock().remove(name);
        }
    }

    fn check_broken(&self, name: &str) -> Result<(), BackendError> {
        if self.broken.lock().contains(name) {
            return Err(BackendError::CommandFailed {
                command: "tmux send-keys".to_string(),
                stderr: format!("can't find pane: {name}"),
            });
        }
        Ok(())
    }
}

impl TerminalBackend for FakeBackend {
    fn session_exists(&self, name: &str) -> bool {
        self.live.lock().contains(name)
    }

    fn send_text(&self, name: &str, text: &str) -> Result<(), BackendError> {
        self.check_broken(name)?;
        self.keys
            .lock()
            .push(Keys::Text(name.to_string(), text.to_string()));
        self.after_send(name);
        Ok(())
    }

    fn send_cancel(&self, name: &str) -> Result<(), BackendError> {
        self.check_broken(name)?;
        self.keys.lock().push(Keys::Cancel(name.to_string()));
        self.after_send(name);
        Ok(())
    }
}

pub fn write_agent(dir: &Path, port: u32, name: &str) {
    std::fs::write(
        dir.join(format!("{port}.json")),
        format!(
            r#"{{"port": {port}, "name": "{name}", "session_name": "agent-{port}", "workdir": "/work/{name}", "ttyd_pid": null}}"#
        ),
    )
    .unwrap();
}
