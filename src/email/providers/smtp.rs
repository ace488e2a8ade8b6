use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::email::{EmailConfig, EmailError, EmailMessage, Encryption, Mail, SendResponse};

/// Port used when the configured one is not a valid port number.
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub encryption: Encryption,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("encryption", &self.encryption)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmtpSettings {
    pub fn from_config(config: &EmailConfig) -> Self {
        let port = config.port.parse::<u16>().unwrap_or_else(|_| {
            warn!(
                "Invalid SMTP port {:?}, falling back to {}",
                config.port, DEFAULT_SMTP_PORT
            );
            DEFAULT_SMTP_PORT
        });

        Self {
            host: config.host.clone(),
            port,
            username: config.username.clone(),
            password: config.password.clone(),
            encryption: config
                .encryption
                .unwrap_or_else(|| Encryption::for_port(port)),
            timeout: config.timeout(),
        }
    }

    // Built per send and never pooled, so the connection lives exactly as
    // long as one `send` call.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let tls = match self.encryption {
            Encryption::None => Tls::None,
            Encryption::Ssl => Tls::Wrapper(TlsParameters::new(self.host.clone())?),
            Encryption::Tls => Tls::Opportunistic(TlsParameters::new(self.host.clone())?),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            .port(self.port)
            .tls(tls)
            .timeout(Some(self.timeout));

        if !self.username.is_empty() || !self.password.is_empty() {
            builder = builder
                .credentials(Credentials::new(
                    self.username.clone(),
                    self.password.clone(),
                ))
                .authentication(vec![Mechanism::Plain]);
        }

        Ok(builder.build())
    }
}

#[derive(Debug, Clone)]
pub struct SmtpMail {
    settings: SmtpSettings,
    message: EmailMessage,
}

impl SmtpMail {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            settings: SmtpSettings::from_config(config),
            message: EmailMessage::new(),
        }
    }

    pub fn settings(&self) -> &SmtpSettings {
        &self.settings
    }
}

fn parse_address(address: &str) -> Result<Address, EmailError> {
    address
        .parse::<Address>()
        .map_err(|e| EmailError::InvalidEmail(format!("{}: {}", address, e)))
}

fn parse_mailbox(mailbox: &str) -> Result<Mailbox, EmailError> {
    mailbox
        .parse::<Mailbox>()
        .map_err(|e| EmailError::InvalidEmail(format!("{}: {}", mailbox, e)))
}

/// Turns the accumulated fields into an RFC 5322 message with an HTML body.
pub fn build_message(message: &EmailMessage) -> Result<Message, EmailError> {
    let sender = message.from.as_ref().ok_or(EmailError::MissingSender)?;
    let from = Mailbox::new(
        (!sender.name.is_empty()).then(|| sender.name.clone()),
        parse_address(&sender.address)?,
    );

    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML);

    for to in &message.to {
        builder = builder.to(parse_mailbox(to)?);
    }

    for cc in &message.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }

    Ok(builder.body(message.body.clone())?)
}

#[async_trait]
impl Mail for SmtpMail {
    fn message(&self) -> &EmailMessage {
        &self.message
    }

    fn message_mut(&mut self) -> &mut EmailMessage {
        &mut self.message
    }

    async fn send(&self) -> Result<SendResponse, EmailError> {
        let email = build_message(&self.message)?;
        let transport = self.settings.transport().inspect_err(|e| {
            error!("Failed to set up SMTP transport: {}", e);
        })?;

        debug!(
            "Sending email via SMTP {}:{} ({:?}) to: {:?}",
            self.settings.host, self.settings.port, self.settings.encryption, self.message.to
        );

        match transport.send(email).await {
            Ok(response) => {
                debug!("Email sent successfully. SMTP reply: {}", response.code());
                Ok(SendResponse::Smtp(response))
            }
            Err(e) => {
                error!("Failed to send email via SMTP: {}", e);
                Err(e.into())
            }
        }
    }

    fn name(&self) -> &str {
        "SMTP"
    }
}
