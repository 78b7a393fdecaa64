//! Status poller runner.
//!
//! Every cycle follows the same steps:
//! 1. Fetch the statuses changed since the cursor
//! 2. Check the shape of the answer and move the cursor (per [`CursorPolicy`])
//! 3. Format the first homework, or [`NO_UPDATES_MESSAGE`] if there is none
//! 4. Send the sentence only if it differs from the last one sent
//!
//! A failure in steps 1-3 is logged and sent once per distinct message.
//! A failure to send ends the loop.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, error, info, instrument};

use super::LoopState;
use crate::config::{CursorPolicy, PollerSettings};
use crate::error::{CycleError, ErrorKind};
use crate::homework::{HomeworkSource, NO_UPDATES_MESSAGE, check_response, parse_status};
use crate::telegram::{Notifier, SendError};

/// Prefix of every failure message relayed to the chat.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы: ";

/// Polls a [`HomeworkSource`] and relays status changes through a [`Notifier`].
pub struct StatusPoller<S, N> {
    source: S,
    notifier: N,
    retry_period: Duration,
    cursor_policy: CursorPolicy,
    local_only: BTreeSet<ErrorKind>,
}

impl<S: HomeworkSource, N: Notifier> StatusPoller<S, N> {
    /// Creates a poller using the given settings.
    #[must_use]
    pub fn new(source: S, notifier: N, settings: &PollerSettings) -> Self {
        Self {
            source,
            notifier,
            retry_period: settings.retry_period(),
            cursor_policy: settings.cursor_policy,
            local_only: settings.local_only.clone(),
        }
    }

    /// Sets the pause between cycles.
    #[must_use]
    pub const fn with_retry_period(mut self, period: Duration) -> Self {
        self.retry_period = period;
        self
    }

    /// Sets the cursor policy.
    #[must_use]
    pub const fn with_cursor_policy(mut self, policy: CursorPolicy) -> Self {
        self.cursor_policy = policy;
        self
    }

    /// Sets the failure kinds that are only logged.
    #[must_use]
    pub fn with_local_only(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.local_only = kinds.into_iter().collect();
        self
    }

    /// Runs cycles forever, sleeping between them.
    ///
    /// Returns only when a notification cannot be delivered.
    pub async fn run(&self) -> Result<(), SendError> {
        info!(
            "Status poller started (retry period: {:?}, cursor policy: {:?})",
            self.retry_period, self.cursor_policy
        );

        let mut state = LoopState::new();
        loop {
            state = self.run_cycle(state).await?;
            debug!(
                "Next request from {}, sleeping {:?}",
                state.cursor_display(),
                self.retry_period
            );
            tokio::time::sleep(self.retry_period).await;
        }
    }

    /// Runs a single cycle without sleeping and returns the updated state.
    #[instrument(skip_all, fields(cursor = state.cursor))]
    pub async fn run_cycle(&self, mut state: LoopState) -> Result<LoopState, SendError> {
        let outcome = self.current_status(&mut state).await;
        match outcome {
            Ok(status) => {
                if state.is_new_status(&status) {
                    self.notifier.send_message(&status).await?;
                    state.last_status = Some(status);
                } else {
                    debug!("No new homework statuses in API answer");
                }
            }
            Err(err) => self.report_failure(&mut state, &err).await?,
        }
        Ok(state)
    }

    /// Fetches, checks and formats the status sentence.
    ///
    /// The cursor moves as soon as the answer passes the shape check.
    async fn current_status(&self, state: &mut LoopState) -> Result<String, CycleError> {
        let raw = self.source.fetch(state.cursor).await?;
        let checked = check_response(&raw)?;

        if self.cursor_policy == CursorPolicy::Advance {
            state.cursor = checked.current_date;
        }

        let status = match checked.homeworks.first() {
            Some(homework) => parse_status(homework)?,
            None => NO_UPDATES_MESSAGE.to_owned(),
        };

        Ok(status)
    }

    async fn report_failure(&self, state: &mut LoopState, err: &CycleError) -> Result<(), SendError> {
        let kind = err.kind();
        let message = format!("{FAILURE_PREFIX}{err}");
        error!(%kind, "{}", message);

        if self.local_only.contains(&kind) {
            debug!("Failure kind {} is local-only, not relaying", kind);
            return Ok(());
        }

        if state.is_new_error(&message) {
            self.notifier.send_message(&message).await?;
            state.last_error = Some(message);
        } else {
            debug!("Failure already reported, not relaying again");
        }
        Ok(())
    }

    /// Gets a reference to the homework source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Gets a reference to the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<S, N> std::fmt::Debug for StatusPoller<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("retry_period", &self.retry_period)
            .field("cursor_policy", &self.cursor_policy)
            .field("local_only", &self.local_only)
            .finish_non_exhaustive()
    }
}
