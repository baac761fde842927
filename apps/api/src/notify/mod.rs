//! Invitation hand-off — pluggable, trait-based notification sender.
//!
//! Default: `LogNotifier` (records the invitation as a structured log event).
//! Delivery transports plug in behind the same trait.
//!
//! `AppState` holds an `Arc<dyn Notifier>`, chosen at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::extraction::email::is_email;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Raised by delivery backends; `LogNotifier` never fails this way.
    #[allow(dead_code)]
    #[error("Notification transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub recipient: String,
    pub candidate_name: String,
    pub role_title: String,
}

/// Implement this to swap delivery backends without touching handlers.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), NotifyError>;

    /// Short backend label reported back to callers.
    fn backend(&self) -> &'static str;
}

/// Logs the invitation instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), NotifyError> {
        if !is_email(&invitation.recipient) {
            return Err(NotifyError::InvalidRecipient(invitation.recipient.clone()));
        }
        info!(
            recipient = %invitation.recipient,
            candidate = %invitation.candidate_name,
            role = %invitation.role_title,
            "Interview invitation issued"
        );
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(recipient: &str) -> Invitation {
        Invitation {
            recipient: recipient.to_string(),
            candidate_name: "Jane Doe".to_string(),
            role_title: "Backend Engineer".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_valid_recipient() {
        assert!(LogNotifier
            .send_invitation(&invitation("jane@example.com"))
            .await
            .is_ok());
        assert_eq!(LogNotifier.backend(), "log");
    }

    #[tokio::test]
    async fn test_log_notifier_rejects_invalid_recipient() {
        let err = LogNotifier
            .send_invitation(&invitation("jane at example"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::InvalidRecipient(_)));
    }
}
