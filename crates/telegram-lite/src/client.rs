//! HTTP client for the Telegram Bot API.

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::{Result, TelegramError};
use crate::types::ApiResponse;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for creating an HTTP client.
#[derive(Clone)]
pub struct ClientOptions {
    /// The bot token issued by BotFather.
    pub token: String,
    /// The base URL for the API (defaults to https://api.telegram.org).
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ClientOptions {
    /// Create new client options with the given bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: None,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// HTTP client for making Bot API calls. Requests are never retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    token: String,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client with the given options.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            token: options.token,
            base_url: options
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn method_url(&self, api_method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, api_method)
    }

    /// Call a Bot API method and unwrap the `{ok, result}` envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        api_method: &str,
        body: Option<impl Serialize>,
        query: Option<&[(&str, String)]>,
    ) -> Result<T> {
        let mut request = self.client.request(method, self.method_url(api_method));

        if let Some(q) = query {
            request = request.query(q);
        }

        if let Some(ref b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes).map_err(|error| {
            if (200..300).contains(&status) {
                TelegramError::Json(error)
            } else {
                TelegramError::api(status, String::from_utf8_lossy(&bytes).into_owned())
            }
        })?;

        if !envelope.ok {
            tracing::debug!(
                target = "telegram_lite::client",
                api_method,
                status,
                "api call rejected"
            );
            return Err(TelegramError::api(
                envelope.error_code.unwrap_or(status),
                envelope
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        envelope.result.ok_or_else(|| {
            TelegramError::InvalidResponse("Response missing result field".to_string())
        })
    }

    /// Make a GET call.
    pub async fn get<T: DeserializeOwned>(
        &self,
        api_method: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<T> {
        self.call::<T>(Method::GET, api_method, None::<()>, query)
            .await
    }

    /// Make a POST call with a JSON body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        api_method: &str,
        body: impl Serialize,
    ) -> Result<T> {
        self.call(Method::POST, api_method, Some(body), None).await
    }
}
