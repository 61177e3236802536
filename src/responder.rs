//! The responder loop: poll replies, route `@target payload` commands to
//! agent terminals, and acknowledge each outcome back in the chat.

use std::time::Duration;

use telegram_lite::ParseMode;
use tokio::sync::watch;

use crate::{
    cursor::{poll, CursorStore, UpdateCursor},
    dispatch::Dispatcher,
    parser::{parse_command, RoutedCommand, Target},
    registry::SessionRegistry,
    tmux::TerminalBackend,
    transport::{InboundMessage, MessagingTransport, SentMessage},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

pub const STARTED_ANNOUNCEMENT: &str = "🟢 *Telegram Responder Started*\n\nReply with `@<port> <response>` to send input to agents.";
pub const STOPPED_ANNOUNCEMENT: &str = "🔴 Telegram Responder stopped";

#[derive(Debug, Clone, Copy)]
pub struct ResponderSettings {
    pub poll_interval: Duration,
    pub fetch_limit: u32,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    EmptyText,
    NotACommand,
    NoAgents {
        payload: String,
    },
    Broadcast {
        payload: String,
        attempted: usize,
        delivered: usize,
    },
    Delivered {
        identifier: String,
        display_name: String,
        payload: String,
    },
    DeliveryFailed {
        identifier: String,
    },
    UnknownTarget {
        identifier: String,
        available: Vec<String>,
    },
}

impl Outcome {
    /// Chat text reporting this outcome, if it warrants one.
    pub fn acknowledgement(&self) -> Option<(String, Option<ParseMode>)> {
        match self {
            Outcome::EmptyText | Outcome::NotACommand => None,
            Outcome::NoAgents { .. } => Some(("⚠️ No agents running".to_string(), None)),
            Outcome::Broadcast {
                payload, delivered, ..
            } => Some((
                format!("✅ Sent `{payload}` to {delivered} agent(s)"),
                Some(ParseMode::Markdown),
            )),
            Outcome::Delivered {
                identifier,
                display_name,
                payload,
            } => Some((
                format!("✅ Sent to Agent {identifier} ({display_name}): `{payload}`"),
                Some(ParseMode::Markdown),
            )),
            Outcome::DeliveryFailed { identifier } => {
                Some((format!("❌ Failed to send to Agent {identifier}"), None))
            }
            Outcome::UnknownTarget {
                identifier,
                available,
            } => {
                let available = if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                };
                Some((
                    format!("⚠️ Agent {identifier} not found\n\nAvailable: {available}"),
                    None,
                ))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cursor: UpdateCursor,
    pub outcomes: Vec<Outcome>,
}

pub struct Responder<T, B, S> {
    transport: T,
    registry: SessionRegistry<B>,
    dispatcher: Dispatcher<B>,
    store: S,
    settings: ResponderSettings,
}

impl<T, B, S> Responder<T, B, S>
where
    T: MessagingTransport,
    B: TerminalBackend + Clone,
    S: CursorStore,
{
    pub fn new(
        transport: T,
        registry: SessionRegistry<B>,
        dispatcher: Dispatcher<B>,
        store: S,
        settings: ResponderSettings,
    ) -> Self {
        Self {
            transport,
            registry,
            dispatcher,
            store,
            settings,
        }
    }

    /// Wire a registry and dispatcher over one backend.
    pub fn with_backend(
        transport: T,
        state_dir: impl Into<std::path::PathBuf>,
        backend: B,
        store: S,
        settings: ResponderSettings,
    ) -> Self {
        let registry = SessionRegistry::new(state_dir, backend.clone());
        Self::new(
            transport,
            registry,
            Dispatcher::new(backend),
            store,
            settings,
        )
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until `shutdown` flips to true (or its sender is dropped).
    /// Returns the final cursor.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> UpdateCursor {
        let mut cursor = self.store.load();
        tracing::info!(target = "agent_responder::loop", last_seen_id = cursor.last_seen_id, "entering poll loop");
        self.send_non_critical(STARTED_ANNOUNCEMENT, Some(ParseMode::Markdown))
            .await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            cursor = self.run_cycle(cursor).await.cursor;

            tokio::select! {
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(target = "agent_responder::loop", "shutting down");
        self.send_non_critical(STOPPED_ANNOUNCEMENT, None).await;
        tracing::info!(target = "agent_responder::loop", "responder stopped");
        cursor
    }

    /// One fetch-and-process pass. The advanced cursor is persisted after the
    /// batch has been handled; a fetch failure leaves it unchanged.
    pub async fn run_cycle(&self, cursor: UpdateCursor) -> CycleReport {
        let polled = poll(&self.transport, cursor, true, self.settings.fetch_limit).await;

        let mut outcomes = Vec::with_capacity(polled.messages.len());
        for message in &polled.messages {
            outcomes.push(self.handle_message(message).await);
        }

        if polled.cursor != cursor {
            if let Err(error) = self.store.save(&polled.cursor) {
                tracing::error!(target = "agent_responder::loop", error = %error, "failed to persist update cursor");
            }
        }

        CycleReport {
            cursor: polled.cursor,
            outcomes,
        }
    }

    /// Route one message and acknowledge the result in the chat.
    pub async fn handle_message(&self, message: &InboundMessage) -> Outcome {
        let text = message.text.trim();
        if text.is_empty() {
            tracing::debug!(target = "agent_responder::loop", update_id = message.id, "skipping message without text");
            return Outcome::EmptyText;
        }

        tracing::info!(target = "agent_responder::loop", from = %message.sender_name, text = %text, "received");

        let Some(command) = parse_command(text) else {
            tracing::info!(target = "agent_responder::loop", update_id = message.id, "not a valid command, ignoring");
            return Outcome::NotACommand;
        };

        let outcome = self.route(command);
        if let Some((ack, hint)) = outcome.acknowledgement() {
            self.send_non_critical(&ack, hint).await;
        }
        outcome
    }

    fn route(&self, command: RoutedCommand) -> Outcome {
        let RoutedCommand { target, payload } = command;
        // Resolved per message so sessions started or killed mid-batch count.
        let agents = self.registry.list_running_agents();
        tracing::debug!(
            target = "agent_responder::loop",
            command_target = target.as_str(),
            running = agents.len(),
            state_dir = %self.registry.state_dir().display(),
            "routing command"
        );

        match target {
            Target::All => {
                if agents.is_empty() {
                    return Outcome::NoAgents { payload };
                }
                let delivered = agents
                    .keys()
                    .filter(|identifier| self.dispatcher.deliver(identifier, &payload).is_ok())
                    .count();
                Outcome::Broadcast {
                    payload,
                    attempted: agents.len(),
                    delivered,
                }
            }
            Target::Agent(identifier) => match agents.get(&identifier) {
                Some(record) => match self.dispatcher.deliver(&identifier, &payload) {
                    Ok(_) => Outcome::Delivered {
                        display_name: record.display_name.clone(),
                        identifier,
                        payload,
                    },
                    Err(_) => Outcome::DeliveryFailed { identifier },
                },
                None => Outcome::UnknownTarget {
                    identifier,
                    available: agents.into_keys().collect(),
                },
            },
        }
    }

    /// Announcements and acknowledgements. A failure here is logged and
    /// dropped; the returned value exists for callers that want to inspect it.
    pub async fn send_non_critical(&self, text: &str, hint: Option<ParseMode>) -> Option<SentMessage> {
        match self.transport.send(text, hint).await {
            Ok(sent) => Some(sent),
            Err(error) => {
                tracing::warn!(target = "agent_responder::loop", error = %error, "chat notification failed");
                None
            }
        }
    }
}
