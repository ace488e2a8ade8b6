use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sesv2::{
    Client,
    config::{Credentials, Region},
    types::{Body, Content, Destination, EmailContent, Message},
};
use tracing::{debug, error};

use crate::email::{EmailConfig, EmailError, EmailMessage, Mail, SendResponse};

/// Character set declared for the subject and both body parts.
pub const CHARSET: &str = "UTF-8";

#[derive(Debug, Clone)]
pub struct SesMail {
    client: Client,
    message: EmailMessage,
}

impl SesMail {
    /// Resolves a client for `config.region`. Static credentials are used
    /// when both keys are configured, otherwise the default provider chain.
    pub async fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut aws_config_builder = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials =
                Credentials::new(access_key, secret_key, None, None, "mailer-ses-engine");
            aws_config_builder = aws_config_builder.credentials_provider(credentials);
        }

        let aws_config = aws_config_builder.load().await;

        Ok(Self::with_client(Client::new(&aws_config)))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            message: EmailMessage::new(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn utf8_content(data: &str) -> Result<Content, EmailError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| EmailError::ProviderError(e.to_string()))
}

pub fn build_destination(message: &EmailMessage) -> Destination {
    Destination::builder()
        .set_to_addresses(Some(message.to.clone()))
        .set_cc_addresses(Some(message.cc.clone()))
        .build()
}

/// Simple content carrying the body as both the HTML and the text part.
pub fn build_content(message: &EmailMessage) -> Result<EmailContent, EmailError> {
    let body = Body::builder()
        .html(utf8_content(&message.body)?)
        .text(utf8_content(&message.body)?)
        .build();

    let email_message = Message::builder()
        .subject(utf8_content(&message.subject)?)
        .body(body)
        .build();

    Ok(EmailContent::builder().simple(email_message).build())
}

#[async_trait]
impl Mail for SesMail {
    fn message(&self) -> &EmailMessage {
        &self.message
    }

    fn message_mut(&mut self) -> &mut EmailMessage {
        &mut self.message
    }

    async fn send(&self) -> Result<SendResponse, EmailError> {
        let source = self
            .message
            .format_from()
            .ok_or(EmailError::MissingSender)?;

        debug!("Sending email via SES to: {:?}", self.message.to);

        let result = self
            .client
            .send_email()
            .from_email_address(source)
            .destination(build_destination(&self.message))
            .content(build_content(&self.message)?)
            .send()
            .await;

        match result {
            Ok(output) => {
                debug!(
                    "Email sent successfully. Message ID: {:?}",
                    output.message_id()
                );
                Ok(SendResponse::Ses(output))
            }
            Err(e) => {
                error!("Failed to send email via SES: {}", e);
                Err(aws_sdk_sesv2::Error::from(e).into())
            }
        }
    }

    fn name(&self) -> &str {
        "Amazon SES"
    }
}
