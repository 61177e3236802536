use telegram_lite::TelegramError;
use thiserror::Error;

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Missing or unusable credentials. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN not set. Get one from @BotFather on Telegram.")]
    MissingToken,

    #[error("No chat_id specified. Set TELEGRAM_CHAT_ID or pass a chat id.")]
    MissingChatId,

    #[error("TELEGRAM_CHAT_ID must be an integer, got '{0}'")]
    InvalidChatId(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] TelegramError),
}

/// Why an outbound message could not be sent.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TelegramError),
}
