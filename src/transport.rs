//! Messaging transport contract and its Telegram implementation.

use serde::Serialize;
use telegram_lite::{
    Bot, ClientOptions, GetUpdatesQuery, ParseMode, SendMessageRequest, TelegramError, Update,
    User,
};

use crate::{
    error::{ConfigError, SendError, CHAT_ID_ENV, TOKEN_ENV},
    usage_log::{Direction, UsageLog},
};

pub const API_BASE_ENV: &str = "TELEGRAM_API_BASE";

/// A reply read from the chat. Field names follow the notifier's JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundMessage {
    #[serde(rename = "update_id")]
    pub id: i64,
    pub message_id: i64,
    pub text: String,
    #[serde(rename = "from")]
    pub sender_name: String,
    #[serde(rename = "from_id")]
    pub sender_id: Option<i64>,
    #[serde(rename = "chat_id")]
    pub origin_chat_id: i64,
    #[serde(rename = "date")]
    pub timestamp: i64,
}

impl InboundMessage {
    fn from_update(update: &Update) -> Option<Self> {
        let message = update.message.as_ref()?;
        let sender = message.from.as_ref();
        Some(Self {
            id: update.update_id,
            message_id: message.message_id,
            text: message.text.clone().unwrap_or_default(),
            sender_name: sender
                .and_then(|user| user.first_name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            sender_id: sender.map(|user| user.id),
            origin_chat_id: message.chat.id,
            timestamp: message.date,
        })
    }
}

/// One fetch worth of updates.
///
/// `highest_update_id` spans every update returned, including ones that carry
/// no message, so the cursor moves past them as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedBatch {
    pub highest_update_id: Option<i64>,
    pub messages: Vec<InboundMessage>,
}

impl FetchedBatch {
    pub fn from_messages(messages: Vec<InboundMessage>) -> Self {
        Self {
            highest_update_id: messages.iter().map(|m| m.id).max(),
            messages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.highest_update_id.is_none() && self.messages.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    pub id: i64,
}

/// Outbound and inbound halves of the chat channel.
///
/// `fetch_updates` is fail-soft: any failure is logged by the implementation
/// and surfaces as an empty batch.
#[allow(async_fn_in_trait)]
pub trait MessagingTransport {
    async fn send(&self, text: &str, hint: Option<ParseMode>) -> Result<SentMessage, SendError>;

    async fn fetch_updates(&self, since: Option<i64>, limit: u32) -> FetchedBatch;
}

/// Raw credential values, usually read from the environment.
#[derive(Clone, Default)]
pub struct TransportOptions {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub base_url: Option<String>,
}

impl TransportOptions {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            token: non_empty(TOKEN_ENV),
            chat_id: non_empty(CHAT_ID_ENV),
            base_url: non_empty(API_BASE_ENV),
        }
    }
}

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    chat_id: Option<i64>,
    usage: UsageLog,
}

impl TelegramTransport {
    /// Fails when the token is missing or the chat id is not an integer. A
    /// missing chat id is only reported when something is sent.
    pub fn new(options: TransportOptions, usage: UsageLog) -> Result<Self, ConfigError> {
        let token = options.token.ok_or(ConfigError::MissingToken)?;
        let chat_id = options
            .chat_id
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| ConfigError::InvalidChatId(raw))
            })
            .transpose()?;

        let mut client_options = ClientOptions::new(token);
        if let Some(base_url) = options.base_url {
            client_options = client_options.with_base_url(base_url);
        }
        let bot = Bot::new(client_options).map_err(ConfigError::Client)?;

        Ok(Self {
            bot,
            chat_id,
            usage,
        })
    }

    pub fn from_env(usage: UsageLog) -> Result<Self, ConfigError> {
        Self::new(TransportOptions::from_env(), usage)
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.chat_id
    }

    pub async fn describe_bot(&self) -> Result<User, TelegramError> {
        self.bot.get_me().await
    }

    /// Send to `chat_id`, or to the configured chat when `None`.
    pub async fn send_to(
        &self,
        chat_id: Option<i64>,
        text: &str,
        hint: Option<ParseMode>,
    ) -> Result<SentMessage, SendError> {
        let chat_id = chat_id
            .or(self.chat_id)
            .ok_or(ConfigError::MissingChatId)?;
        let request = SendMessageRequest::new(chat_id, text).with_parse_mode(hint);
        let message = self.bot.send_message(&request).await?;
        self.usage.record(Direction::Sent, text, Some(chat_id));
        Ok(SentMessage {
            id: message.message_id,
        })
    }
}

impl MessagingTransport for TelegramTransport {
    async fn send(&self, text: &str, hint: Option<ParseMode>) -> Result<SentMessage, SendError> {
        self.send_to(None, text, hint).await
    }

    async fn fetch_updates(&self, since: Option<i64>, limit: u32) -> FetchedBatch {
        let query = GetUpdatesQuery {
            offset: since,
            limit: Some(limit),
        };
        let updates = match self.bot.get_updates(query).await {
            Ok(updates) => updates,
            Err(error) => {
                tracing::warn!(target = "agent_responder::transport", error = %error, "fetching updates failed");
                return FetchedBatch::default();
            }
        };

        let messages: Vec<InboundMessage> =
            updates.iter().filter_map(InboundMessage::from_update).collect();
        for message in messages.iter().filter(|m| !m.text.is_empty()) {
            self.usage.record(
                Direction::Received,
                &message.text,
                Some(message.origin_chat_id),
            );
        }

        FetchedBatch {
            highest_update_id: updates.iter().map(|u| u.update_id).max(),
            messages,
        }
    }
}
