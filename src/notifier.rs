//! Progress notification seam between the orchestrator and the front end.
//!
//! The front end posts the initial acknowledgment itself before handing the
//! session off; the orchestrator only ever rewrites that message or posts a
//! follow-up. Chat integrations implement [`Notifier`] around their own
//! message handle; the shipped binary uses [`ConsoleNotifier`].

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to deliver notification: {0}")]
    Delivery(String),
}

/// Outbound messaging surface the orchestrator drives.
///
/// Implementations hold whatever handle their platform needs to edit the
/// acknowledgment message (a Discord interaction token, a Slack ts, a
/// terminal). Delivery failures are reported but never abort a session;
/// the orchestrator logs and keeps going.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Replace the content of the acknowledgment message.
    async fn update(&self, text: &str) -> Result<(), NotifyError>;

    /// Post a new, separate message. `mention` is an addressable handle for
    /// the requester, already formatted by the front end; implementations
    /// prepend it when present.
    async fn follow_up(&self, text: &str, mention: Option<&str>) -> Result<(), NotifyError>;
}

/// Notifier for the CLI front end: progress goes to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn update(&self, text: &str) -> Result<(), NotifyError> {
        println!("{text}");
        Ok(())
    }

    async fn follow_up(&self, text: &str, mention: Option<&str>) -> Result<(), NotifyError> {
        match mention {
            Some(who) => println!("{who} {text}"),
            None => println!("{text}"),
        }
        Ok(())
    }
}
