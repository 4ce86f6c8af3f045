//! Mail transports
//!
//! `LogMailer` writes messages to the log and is used when no relay is
//! configured. `HttpMailer` posts messages as JSON to an HTTP mail relay.

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::ports::{Mailer, OutgoingMail};
use crate::error::MailError;

fn check_recipients(mail: &OutgoingMail) -> Result<(), MailError> {
    if mail.to.is_empty() {
        return Err(MailError::InvalidRecipient("no recipients".to_string()));
    }
    if let Some(bad) = mail.to.iter().find(|to| !to.contains('@')) {
        return Err(MailError::InvalidRecipient(bad.clone()));
    }
    Ok(())
}

/// Mail transport that only logs
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        check_recipients(mail)?;

        tracing::info!(
            from = %mail.from,
            to = ?mail.to,
            subject = %mail.subject,
            "Mail relay not configured, logging message"
        );
        tracing::debug!(body = %mail.body, "Mail body");
        Ok(())
    }
}

/// HTTP mail relay client
pub struct HttpMailer {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        check_recipients(mail)?;

        let mut request = self.http.post(&self.endpoint).json(mail);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(to = ?mail.to, subject = %mail.subject, "Mail handed to relay");
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Transport selected at startup
pub enum MailTransport {
    Log(LogMailer),
    Http(HttpMailer),
}

impl MailTransport {
    /// Relay when an endpoint is configured, log otherwise
    pub fn from_relay(endpoint: Option<String>, token: Option<String>) -> Self {
        match endpoint {
            Some(url) => MailTransport::Http(HttpMailer::new(url, token)),
            None => MailTransport::Log(LogMailer),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MailTransport::Log(_) => "log",
            MailTransport::Http(_) => "http",
        }
    }
}

#[async_trait]
impl Mailer for MailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            MailTransport::Log(m) => m.send(mail).await,
            MailTransport::Http(m) => m.send(mail).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &[&str]) -> OutgoingMail {
        OutgoingMail {
            from: "noreply@budgenus.local".to_string(),
            to: to.iter().map(|s| s.to_string()).collect(),
            subject: "Invitation to join Acme".to_string(),
            body: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn log_mailer_accepts_valid_mail() {
        assert!(LogMailer.send(&mail(&["bob@example.com"])).await.is_ok());
    }

    #[tokio::test]
    async fn log_mailer_rejects_missing_recipients() {
        let err = LogMailer.send(&mail(&[])).await.unwrap_err();
        assert!(matches!(err, MailError::InvalidRecipient(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_recipient() {
        let err = LogMailer
            .send(&mail(&["bob@example.com", "nobody"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nobody"));
    }

    #[test]
    fn transport_selection() {
        assert_eq!(MailTransport::from_relay(None, None).name(), "log");
        assert_eq!(
            MailTransport::from_relay(Some("http://relay.test/send/".into()), None).name(),
            "http"
        );
    }

    #[test]
    fn http_mailer_trims_endpoint() {
        let mailer = HttpMailer::new("http://relay.test/send/".into(), None);
        assert_eq!(mailer.endpoint, "http://relay.test/send");
    }
}
