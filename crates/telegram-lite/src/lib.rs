//! # telegram-lite
//!
//! A small client for the parts of the Telegram Bot API needed to push
//! notifications and poll replies: `sendMessage`, `getUpdates` and `getMe`.
//!
//! ```rust,no_run
//! use telegram_lite::{Bot, ClientOptions, GetUpdatesQuery, SendMessageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bot = Bot::new(ClientOptions::new("123456:token"))?;
//!     bot.send_message(&SendMessageRequest::new(42, "Build complete!")).await?;
//!
//!     let updates = bot
//!         .get_updates(GetUpdatesQuery { offset: None, limit: Some(100) })
//!         .await?;
//!     for update in updates {
//!         println!("{}: {:?}", update.update_id, update.message.and_then(|m| m.text));
//!     }
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod client;
pub mod error;
pub mod types;

pub use bot::Bot;
pub use client::{ClientOptions, HttpClient};
pub use error::{Result, TelegramError};
pub use types::{
    Chat, GetUpdatesQuery, Message, ParseMode, SendMessageRequest, Update, User,
};
