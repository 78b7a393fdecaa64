//! Telegram notification module.
//!
//! Provides the [`Notifier`] seam used by the poller and its
//! Bot API implementation.

mod notifier;

pub use notifier::{Notifier, SendError, TelegramNotifier};
