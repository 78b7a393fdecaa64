//! Delivery of notifications to a single Telegram chat.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Recipient};
use teloxide::{ApiError, RequestError};
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Sends text notifications to one fixed destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `text` as a single message.
    async fn send_message(&self, text: &str) -> Result<(), SendError>;
}

/// Errors that can occur while sending a notification.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Bot is not allowed to post to chat {chat}: {source}")]
    Forbidden {
        chat: String,
        #[source]
        source: RequestError,
    },

    #[error("Telegram rejected the bot token: {source}")]
    InvalidToken {
        #[source]
        source: RequestError,
    },

    #[error("Network error while sending to chat {chat}: {source}")]
    Network {
        chat: String,
        #[source]
        source: RequestError,
    },

    #[error("Telegram refused the message for chat {chat}: {source}")]
    Other {
        chat: String,
        #[source]
        source: RequestError,
    },
}

impl SendError {
    fn from_request(chat: &str, source: RequestError) -> Self {
        let chat = chat.to_owned();
        match &source {
            RequestError::Api(ApiError::InvalidToken) => Self::InvalidToken { source },
            RequestError::Api(
                ApiError::BotBlocked
                | ApiError::BotKicked
                | ApiError::NotEnoughRightsToPostMessages
                | ApiError::ChatNotFound,
            ) => Self::Forbidden { chat, source },
            RequestError::Api(api) if is_forbidden(api) => Self::Forbidden { chat, source },
            RequestError::Network(_) | RequestError::Io(_) => Self::Network { chat, source },
            _ => Self::Other { chat, source },
        }
    }
}

/// [`Notifier`] backed by the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
    chat: Recipient,
    chat_label: String,
}

impl TelegramNotifier {
    /// Creates a notifier posting to `chat_id` with the given bot token.
    ///
    /// A numeric `chat_id` is treated as a chat id, anything else as a
    /// channel username such as `@my_channel`.
    #[must_use]
    pub fn new(token: impl Into<String>, chat_id: &str) -> Self {
        Self::with_bot(Bot::new(token), chat_id)
    }

    /// Creates a notifier from an already configured bot.
    #[must_use]
    pub fn with_bot(bot: Bot, chat_id: &str) -> Self {
        Self {
            bot,
            chat: parse_recipient(chat_id),
            chat_label: chat_id.trim().to_owned(),
        }
    }

    /// Points the bot at a different Bot API server.
    #[must_use]
    pub fn with_api_url(mut self, url: reqwest::Url) -> Self {
        self.bot = self.bot.set_api_url(url);
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all)]
    async fn send_message(&self, text: &str) -> Result<(), SendError> {
        debug!("Sending message to Telegram chat {}", self.chat_label);

        if let Err(e) = self.bot.send_message(self.chat.clone(), text).await {
            let err = SendError::from_request(&self.chat_label, e);
            error!("Failed to send message to Telegram chat: {}", err);
            return Err(err);
        }

        debug!("Sent message to Telegram: \"{}\"", text);
        Ok(())
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat", &self.chat_label)
            .finish_non_exhaustive()
    }
}

/// Telegram prefixes every 403 description with `Forbidden:`, including
/// the ones teloxide has no dedicated variant for.
fn is_forbidden(err: &ApiError) -> bool {
    const PREFIX: &str = "Forbidden:";
    match err {
        ApiError::Unknown(description) => description.starts_with(PREFIX),
        other => other.to_string().starts_with(PREFIX),
    }
}

fn parse_recipient(chat_id: &str) -> Recipient {
    let chat_id = chat_id.trim();
    chat_id.parse::<i64>().map_or_else(
        |_| Recipient::ChannelUsername(chat_id.to_owned()),
        |id| Recipient::Id(ChatId(id)),
    )
}
