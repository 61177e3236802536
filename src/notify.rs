//! The `agent-notify` command: push one message or read pending replies.

use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use telegram_lite::ParseMode;

use crate::{
    config::{default_cursor_file, default_usage_log},
    cursor::{poll, CursorStore},
    error::SendError,
    responder::DEFAULT_FETCH_LIMIT,
    transport::{InboundMessage, MessagingTransport, SentMessage},
};

const EXAMPLES: &str = "Examples:
  agent-notify \"Build complete!\"
  agent-notify \"*Bold* and _italic_\" --markdown
  agent-notify --replies
  agent-notify --replies --all";

#[derive(Debug, Parser, Clone)]
#[command(name = "agent-notify")]
#[command(about = "Send Telegram notifications and check replies")]
#[command(after_help = EXAMPLES)]
pub struct NotifyArgs {
    /// Message to send
    pub message: Option<String>,

    /// Check for replies instead of sending
    #[arg(short = 'r', long)]
    pub replies: bool,

    /// Show all messages, not just new ones
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Parse message as Markdown
    #[arg(short = 'm', long)]
    pub markdown: bool,

    /// Minimal output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,

    #[arg(long, env = "TELEGRAM_STATE_FILE", hide = true)]
    pub cursor_file: Option<PathBuf>,

    #[arg(long, env = "TELEGRAM_USAGE_LOG", hide = true)]
    pub usage_log: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send { text: String, hint: Option<ParseMode> },
    Replies { only_new: bool },
}

impl NotifyArgs {
    /// `--replies` wins over a positional message. `None` means print usage.
    pub fn action(&self) -> Option<Action> {
        if self.replies {
            return Some(Action::Replies {
                only_new: !self.all,
            });
        }
        self.message
            .as_ref()
            .filter(|text| !text.is_empty())
            .map(|text| Action::Send {
                text: text.clone(),
                hint: self.markdown.then_some(ParseMode::Markdown),
            })
    }

    pub fn cursor_file(&self) -> PathBuf {
        self.cursor_file.clone().unwrap_or_else(default_cursor_file)
    }

    pub fn usage_log(&self) -> PathBuf {
        self.usage_log.clone().unwrap_or_else(default_usage_log)
    }
}

/// Fetch replies. In `only_new` mode the advanced cursor is saved so the
/// same replies are not shown twice.
pub async fn fetch_replies<T, S>(transport: &T, store: &S, only_new: bool) -> Vec<InboundMessage>
where
    T: MessagingTransport,
    S: CursorStore,
{
    let before = store.load();
    let polled = poll(transport, before, only_new, DEFAULT_FETCH_LIMIT).await;
    if polled.cursor != before {
        if let Err(error) = store.save(&polled.cursor) {
            tracing::warn!(target = "agent_notify", error = %error, "failed to persist update cursor");
        }
    }
    polled.messages
}

pub async fn send_message<T: MessagingTransport>(
    transport: &T,
    text: &str,
    hint: Option<ParseMode>,
) -> Result<SentMessage, SendError> {
    transport.send(text, hint).await
}

pub fn render_sent(text: &str, sent: SentMessage, as_json: bool, quiet: bool) -> Option<String> {
    if as_json {
        let value = json!({ "sent": true, "message_id": sent.id });
        return Some(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
    }
    (!quiet).then(|| format!("Sent: {text}"))
}

pub fn render_replies(messages: &[InboundMessage], as_json: bool, quiet: bool) -> Option<String> {
    if as_json {
        let value = json!({ "replies": messages });
        return Some(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
    }
    if messages.is_empty() {
        return (!quiet).then(|| "No new replies.".to_string());
    }

    let mut out = String::new();
    if !quiet {
        out.push_str(&format!("{} reply(ies):\n\n", messages.len()));
    }
    let lines: Vec<String> = messages
        .iter()
        .map(|m| format!("{}: {}", m.sender_name, m.text))
        .collect();
    out.push_str(&lines.join("\n"));
    Some(out)
}
