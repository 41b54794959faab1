use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::{
    fmt::{self, Debug},
    time::Duration,
};

use crate::{Config, model::Report};

#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    async fn send(&self, report: &Report) -> Result<()>;
}

/// Sends reports over SMTP with implicit TLS, authenticating as the sender.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
}

impl fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("sender", &self.sender)
            .field("recipients", &self.recipients)
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    pub fn new(
        host: &str,
        port: u16,
        timeout: Duration,
        sender: Mailbox,
        password: String,
        recipients: Vec<Mailbox>,
    ) -> Result<Self> {
        let credentials = Credentials::new(sender.email.to_string(), password);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .with_context(|| format!("Failed to set up TLS for SMTP host {host}"))?
            .port(port)
            .credentials(credentials)
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport, sender, recipients })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.settings.smtp_host,
            config.settings.smtp_port,
            config.settings.timeout(),
            config.email_origin.clone(),
            config.mailbox_password.clone(),
            config.email_destinations.clone(),
        )
    }
}

/// Build a plain-text message addressed to every recipient.
pub fn build_message(sender: &Mailbox, recipients: &[Mailbox], report: &Report) -> Result<Message> {
    let builder = recipients.iter().cloned().fold(
        Message::builder()
            .from(sender.clone())
            .subject(report.subject.as_str())
            .header(ContentType::TEXT_PLAIN),
        |builder, to| builder.to(to),
    );

    builder
        .body(report.body.clone())
        .context("Failed to build email message")
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, report: &Report) -> Result<()> {
        let message = build_message(&self.sender, &self.recipients, report)?;

        let response = self
            .transport
            .send(message)
            .await
            .context("Failed to send email")?;

        tracing::info!(
            message = "email sent",
            code = %response.code(),
            recipients = self.recipients.len(),
        );

        Ok(())
    }
}
