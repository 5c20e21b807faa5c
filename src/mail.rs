//! Inquiry dispatch over SMTP.
//!
//! The transport is a single long-lived [`AsyncSmtpTransport`] built at
//! startup and reused for every request, behind a small trait so tests
//! can inject a recording mock.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{self, Configuration};
use crate::error::{Result, ServerError};
use crate::inquiry::Inquiry;
use crate::template;

/// Mail transport seam. Errors are plain strings: they are only ever
/// logged, never surfaced to callers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, message: Message) -> std::result::Result<(), String>;
    async fn verify(&self) -> std::result::Result<(), String>;
}

/// Production transport over implicit-TLS SMTP.
struct SmtpRelay {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl Transport for SmtpRelay {
    async fn send(&self, message: Message) -> std::result::Result<(), String> {
        self.inner
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| err.to_string())
    }

    async fn verify(&self) -> std::result::Result<(), String> {
        match self.inner.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("SMTP connection test failed".to_owned()),
            Err(err) => Err(err.to_string()),
        }
    }
}

/// SMTP relay manager.
#[derive(Clone)]
pub struct MailManager {
    transport: Arc<dyn Transport>,
    from: Mailbox,
    to: Mailbox,
    auto_reply: bool,
}

impl MailManager {
    /// Create a new [`MailManager`] from the `mail` configuration section
    /// and the account credentials.
    pub fn new(
        config: &config::Mail,
        display_name: &str,
        account: &str,
        password: &str,
    ) -> Result<Self> {
        let from = Mailbox::new(
            Some(display_name.to_owned()),
            account.parse().map_err(|err| ServerError::Internal {
                details: format!("invalid mail account address: {err}"),
            })?,
        );
        // inquiries land on the account inbox unless a recipient is set.
        let to = config
            .to
            .as_deref()
            .unwrap_or(account)
            .parse::<Mailbox>()
            .map_err(|err| ServerError::Internal {
                details: format!("invalid recipient address: {err}"),
            })?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|err| ServerError::Internal {
                    details: format!("cannot build SMTP relay: {err}"),
                })?
                .credentials(Credentials::new(
                    account.to_owned(),
                    password.to_owned(),
                ));
        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        tracing::info!(host = config.host, to = %to, "smtp relay configured");

        Ok(Self {
            transport: Arc::new(SmtpRelay {
                inner: builder.build(),
            }),
            from,
            to,
            auto_reply: config.auto_reply,
        })
    }

    /// Build a manager over an arbitrary transport.
    #[cfg(test)]
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        from: Mailbox,
        to: Mailbox,
        auto_reply: bool,
    ) -> Self {
        Self {
            transport,
            from,
            to,
            auto_reply,
        }
    }

    /// Relay an inquiry to the configured inbox, then optionally confirm
    /// back to the sender.
    ///
    /// Success is reported as soon as the owner notification went out. An
    /// auto-reply failure is logged and swallowed: the inquiry itself has
    /// already been delivered.
    pub async fn relay(
        &self,
        inquiry: &Inquiry,
        config: &Configuration,
    ) -> Result<()> {
        let reply_to: Mailbox = inquiry
            .sender_email
            .parse()
            .map_err(|err| ServerError::Delivery(format!("reply-to: {err}")))?;

        let rendered = template::owner_notification(inquiry, config);
        let notification = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .reply_to(reply_to.clone())
            .subject(rendered.subject)
            .multipart(MultiPart::alternative_plain_html(
                rendered.text,
                rendered.html,
            ))
            .map_err(|err| ServerError::Delivery(err.to_string()))?;

        self.transport
            .send(notification)
            .await
            .map_err(ServerError::Delivery)?;

        tracing::info!(to = %self.to, "inquiry relayed");

        if self.auto_reply {
            let rendered = template::auto_reply(inquiry, config);
            let confirmation = Message::builder()
                .from(self.from.clone())
                .to(reply_to)
                .subject(rendered.subject)
                .multipart(MultiPart::alternative_plain_html(
                    rendered.text,
                    rendered.html,
                ));

            let outcome = match confirmation {
                Ok(message) => self.transport.send(message).await,
                Err(err) => Err(err.to_string()),
            };
            if let Err(details) = outcome {
                // the notification already went out, still report success.
                tracing::warn!(%details, "auto-reply could not be sent");
            }
        }

        Ok(())
    }

    /// Probe the SMTP connection, for the health endpoint.
    pub async fn verify(&self) -> Result<()> {
        self.transport.verify().await.map_err(ServerError::Unhealthy)
    }
}
