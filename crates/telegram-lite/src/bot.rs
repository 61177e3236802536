//! Bot-level operations.

use crate::client::{ClientOptions, HttpClient};
use crate::error::Result;
use crate::types::{GetUpdatesQuery, Message, SendMessageRequest, Update, User};

/// A Telegram bot identified by its token.
#[derive(Clone)]
pub struct Bot {
    client: HttpClient,
}

impl Bot {
    /// Create a new bot client.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(options)?,
        })
    }

    /// Access the underlying HTTP client.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Describe the bot behind the token.
    pub async fn get_me(&self) -> Result<User> {
        self.client.get("getMe", None).await
    }

    /// Send a text message to a chat.
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<Message> {
        self.client.post("sendMessage", request).await
    }

    /// Fetch pending updates. Passing an `offset` acknowledges every update
    /// with a lower id on the server side.
    pub async fn get_updates(&self, query: GetUpdatesQuery) -> Result<Vec<Update>> {
        let params = query.to_query();
        self.client.get("getUpdates", Some(params.as_slice())).await
    }
}
