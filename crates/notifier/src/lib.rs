//! Notification delivery.
//!
//! The poller only talks to a [`Notifier`], which owns the target chat and a
//! [`MessageSender`] transport. Delivery failures never escape as panics:
//! they come back as [`HeraldError::Delivery`] for the caller to log.

pub mod telegram;

use std::future::Future;

use herald_common::HeraldError;
use thiserror::Error;

pub use telegram::TelegramSender;

/// Why a transport could not deliver a message.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rejected with status {status}: {description}")]
    Rejected { status: u16, description: String },
}

/// A messaging transport with a single send primitive.
pub trait MessageSender: Send + Sync {
    fn send(&self, chat_id: &str, text: &str) -> impl Future<Output = Result<(), SendError>> + Send;
}

/// Sends status messages to the one configured chat.
pub struct Notifier<S> {
    sender: S,
    chat_id: String,
}

impl<S: MessageSender> Notifier<S> {
    pub fn new(sender: S, chat_id: impl Into<String>) -> Self {
        Self {
            sender,
            chat_id: chat_id.into(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Deliver `message` to the chat.
    pub async fn notify(&self, message: &str) -> Result<(), HeraldError> {
        match self.sender.send(&self.chat_id, message).await {
            Ok(()) => {
                tracing::debug!(chat_id = %self.chat_id, text = message, "Message sent");
                Ok(())
            }
            Err(e) => Err(HeraldError::Delivery {
                chat_id: self.chat_id.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl MessageSender for RecordingSender {
        async fn send(&self, chat_id: &str, text: &str) -> Result<(), SendError> {
            if self.fail {
                return Err(SendError::Rejected {
                    status: 403,
                    description: "Forbidden: bot was blocked by the user".to_string(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notify_delegates_to_sender() {
        let notifier = Notifier::new(RecordingSender::default(), "42");
        notifier.notify("hello").await.unwrap();

        let sent = notifier.sender.sent.lock().unwrap();
        assert_eq!(sent.as_slice(), &[("42".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_notify_converts_failure_to_delivery_error() {
        let sender = RecordingSender {
            fail: true,
            ..Default::default()
        };
        let notifier = Notifier::new(sender, "42");

        let err = notifier.notify("hello").await.unwrap_err();
        match &err {
            HeraldError::Delivery { chat_id, reason } => {
                assert_eq!(chat_id, "42");
                assert!(reason.contains("blocked"));
            }
            other => panic!("expected Delivery, got {other:?}"),
        }
        assert!(!err.is_fatal());
    }
}
