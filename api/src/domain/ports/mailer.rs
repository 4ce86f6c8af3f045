//! Mail transport port
//!
//! Delivery itself is delegated; the application only composes messages.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::MailError;

/// A plain-text message ready to send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand a message to the transport
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}
