//! Poller state carried from one cycle to the next.

use chrono::DateTime;

/// State of the polling loop.
///
/// Owned by the loop and moved through every cycle. Nothing is persisted:
/// a restart begins from [`LoopState::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Last status sentence sent to the chat.
    pub last_status: Option<String>,

    /// Last failure message sent to the chat.
    pub last_error: Option<String>,

    /// Unix timestamp sent as `from_date` on the next fetch.
    pub cursor: i64,
}

impl LoopState {
    /// Creates an empty state with the cursor at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty state with the cursor at `cursor`.
    #[must_use]
    pub fn starting_at(cursor: i64) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }

    /// Checks if `status` differs from the last status sent.
    #[must_use]
    pub fn is_new_status(&self, status: &str) -> bool {
        self.last_status.as_deref() != Some(status)
    }

    /// Checks if `message` differs from the last failure sent.
    #[must_use]
    pub fn is_new_error(&self, message: &str) -> bool {
        self.last_error.as_deref() != Some(message)
    }

    /// Returns the cursor as an RFC 3339 date for logging.
    #[must_use]
    pub fn cursor_display(&self) -> String {
        DateTime::from_timestamp(self.cursor, 0)
            .map_or_else(|| self.cursor.to_string(), |date| date.to_rfc3339())
    }
}
