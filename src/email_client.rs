use crate::configuration::EmailClientSettings;
use crate::domain::{LeadEmail, LeadName};
use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::PathBuf;
use std::sync::Arc;

pub const LEAD_MAGNET_SUBJECT: &str = "📥 Seu Guia NR-1 - DNF Ocupacional";

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("Failed to read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a valid recipient address")]
    InvalidRecipient(String),
    #[error("Failed to build the email message: {0}")]
    Build(String),
    /// Anything the relay side reports: connection, TLS upgrade, authentication or rejection.
    #[error("{0}")]
    Relay(String),
}

/// Hands a fully built message to a mail relay.
///
/// The production implementation is [`SmtpMailer`]; alternative backends only have to accept a
/// `lettre::Message`.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, message: Message) -> Result<(), NotifyError>;
}

/// SMTP relay client. A transport is built for every message and dropped once the message has been
/// handed over, so no connection outlives the request that opened it.
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpMailer {
    pub fn new(settings: &EmailClientSettings) -> Self {
        Self {
            host: settings.smtp_host.clone(),
            port: settings.smtp_port,
            credentials: settings.credentials(),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[tracing::instrument(
        name = "Relaying email over SMTP",
        skip(self, message),
        fields(relay = %self.host, port = self.port)
    )]
    async fn send(&self, message: Message) -> Result<(), NotifyError> {
        // STARTTLS on the submission port, then AUTH with the configured credentials.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| NotifyError::Relay(e.to_string()))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Relay(e.to_string()))?;

        Ok(())
    }
}

/// Composes the lead magnet email and hands it to a [`Mailer`].
///
/// The message is a `multipart/mixed` with an HTML greeting and the PDF guide as a base64
/// attachment. The attachment is read from disk on every send, so replacing the file takes effect
/// without a restart. A missing file or an unparseable recipient fails before the relay is
/// contacted.
pub struct EmailClient {
    mailer: Arc<dyn Mailer>,
    sender: Mailbox,
    attachment_path: PathBuf,
    attachment_filename: String,
}

impl EmailClient {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        sender: Mailbox,
        attachment_path: PathBuf,
        attachment_filename: String,
    ) -> Self {
        Self {
            mailer,
            sender,
            attachment_path,
            attachment_filename,
        }
    }

    /// Emails the lead magnet to a freshly captured lead.
    ///
    /// Success means the relay accepted the message, not that it reached the mailbox. Nothing is
    /// retried: a failure here is reported to the caller as-is.
    #[tracing::instrument(
        name = "Sending the lead magnet",
        skip(self, name, email),
        fields(recipient = %email)
    )]
    pub async fn send_lead_magnet(
        &self,
        name: &LeadName,
        email: &LeadEmail,
    ) -> Result<(), NotifyError> {
        let message = self.build_message(name, email).await?;
        self.mailer.send(message).await
    }

    async fn build_message(
        &self,
        name: &LeadName,
        email: &LeadEmail,
    ) -> Result<Message, NotifyError> {
        let recipient: Mailbox = email
            .as_ref()
            .trim()
            .parse()
            .map_err(|_| NotifyError::InvalidRecipient(email.to_string()))?;
        let attachment = self.read_attachment().await?;

        Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(LEAD_MAGNET_SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(lead_magnet_html(name)))
                    .singlepart(attachment),
            )
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    async fn read_attachment(&self) -> Result<SinglePart, NotifyError> {
        let content = tokio::fs::read(&self.attachment_path)
            .await
            .map_err(|source| NotifyError::Attachment {
                path: self.attachment_path.clone(),
                source,
            })?;
        let body = Body::new_with_encoding(content, ContentTransferEncoding::Base64)
            .map_err(|_| NotifyError::Build("attachment could not be base64 encoded".into()))?;
        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        Ok(Attachment::new(self.attachment_filename.clone()).body(body, content_type))
    }
}

/// The name is user input: escape it before it lands in markup.
fn lead_magnet_html(name: &LeadName) -> String {
    let name = htmlescape::encode_minimal(name.as_ref());
    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; color: #333;">
    <h2 style="color: #0052CC;">Olá, {name}!</h2>
    <p>Obrigado pelo seu interesse no nosso material sobre <strong>NR-1</strong>.</p>
    <p>Segue em anexo o Guia Completo da NR-1 que você solicitou.</p>
    <p>Se tiver dúvidas ou precisar de consultoria especializada, estamos à disposição!</p>
    <br>
    <p>Atenciosamente,<br><strong>Equipe DNF Ocupacional</strong></p>
</body>
</html>"#
    )
}
