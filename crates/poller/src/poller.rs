use std::time::Duration;

use herald_common::HeraldError;
use herald_common::types::PollState;
use herald_notifier::{MessageSender, Notifier};

use crate::client::StatusSource;
use crate::formatter::format_status;
use crate::validator::validate_response;

/// What a successful poll iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new status message was delivered to the chat.
    Notified(String),
    /// The newest review still renders to the last delivered message.
    Unchanged,
    /// The API reported no reviews since the cursor.
    NoNewReviews,
}

/// Review poller that periodically asks the status API for changes and
/// announces new verdicts in the configured chat.
pub struct ReviewPoller<S, M> {
    source: S,
    notifier: Notifier<M>,
    retry_period: Duration,
    state: PollState,
}

impl<S: StatusSource, M: MessageSender> ReviewPoller<S, M> {
    pub fn new(source: S, notifier: Notifier<M>, retry_period: Duration, state: PollState) -> Self {
        Self {
            source,
            notifier,
            retry_period,
            state,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Start the polling loop. Runs indefinitely until the task is cancelled.
    pub async fn run(&mut self) {
        tracing::info!(
            chat_id = %self.notifier.chat_id(),
            from_date = self.state.cursor,
            retry_period_secs = self.retry_period.as_secs(),
            "Review poller started"
        );

        loop {
            self.cycle().await;
        }
    }

    /// Run exactly `iterations` poll + sleep cycles.
    pub async fn run_iterations(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.cycle().await;
        }
    }

    /// Poll once, then sleep the retry period whatever the outcome.
    async fn cycle(&mut self) -> Option<PollOutcome> {
        let outcome = self.tick().await;
        tokio::time::sleep(self.retry_period).await;
        outcome
    }

    /// One iteration with every error caught and logged.
    ///
    /// Returns `None` when the iteration failed; the poller state is left as
    /// it was at the point of failure and the next tick proceeds normally.
    pub async fn tick(&mut self) -> Option<PollOutcome> {
        match self.poll_once().await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(
                    kind = e.kind(),
                    retriable = e.is_retriable(),
                    from_date = self.state.cursor,
                    error = %e,
                    "Poll iteration failed"
                );
                None
            }
        }
    }

    /// Fetch, validate, announce a changed verdict and advance the cursor.
    ///
    /// An error aborts the rest of the iteration, so a failed delivery keeps
    /// both the last message and the cursor unchanged.
    pub async fn poll_once(&mut self) -> Result<PollOutcome, HeraldError> {
        let payload = self.source.fetch_status(self.state.cursor).await?;
        let response = validate_response(payload)?;

        // Only the newest review (index 0) is looked at.
        let outcome = match response.homeworks.first() {
            Some(newest) => {
                let message = format_status(newest)?;
                if self.state.last_message.as_deref() == Some(message.as_str()) {
                    tracing::debug!(text = %message, "Review status unchanged, not notifying");
                    PollOutcome::Unchanged
                } else {
                    self.notifier.notify(&message).await?;
                    self.state.last_message = Some(message.clone());
                    PollOutcome::Notified(message)
                }
            }
            None => {
                tracing::debug!(from_date = self.state.cursor, "No new reviews in response");
                PollOutcome::NoNewReviews
            }
        };

        if let Some(current_date) = response.current_date {
            self.state.cursor = current_date;
        }

        Ok(outcome)
    }
}
