pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use providers::{ses::SesMail, smtp::SmtpMail};
pub use types::*;

use async_trait::async_trait;
use std::sync::RwLock;
use tracing::{debug, error};

/// Fluent message builder shared by every backend.
///
/// Builder methods consume the value and hand it back, so a message is
/// assembled with a single chain and then sent:
///
/// ```rust,ignore
/// let engine = mailer::email::new_engine(&config).await?;
/// engine
///     .from("John Doe", "john@example.com")
///     .to(["jane@example.com"])
///     .subject("Hello")
///     .body("<h1>Hi</h1>")
///     .send()
///     .await?;
/// ```
#[async_trait]
pub trait Mail: Send + Sync {
    fn message(&self) -> &EmailMessage;

    fn message_mut(&mut self) -> &mut EmailMessage;

    /// Transmits the accumulated message. Errors from the transport are
    /// returned unchanged.
    async fn send(&self) -> Result<SendResponse, EmailError>;

    fn name(&self) -> &str;

    fn from(mut self, name: &str, address: &str) -> Self
    where
        Self: Sized,
    {
        let message = std::mem::take(self.message_mut());
        *self.message_mut() = message.with_from(name, address);
        self
    }

    fn to<I, S>(mut self, addresses: I) -> Self
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = std::mem::take(self.message_mut());
        *self.message_mut() = message.with_to(addresses);
        self
    }

    fn cc<I, S>(mut self, addresses: I) -> Self
    where
        Self: Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = std::mem::take(self.message_mut());
        *self.message_mut() = message.with_cc(addresses);
        self
    }

    fn subject(mut self, subject: &str) -> Self
    where
        Self: Sized,
    {
        let message = std::mem::take(self.message_mut());
        *self.message_mut() = message.with_subject(subject);
        self
    }

    fn body(mut self, body: &str) -> Self
    where
        Self: Sized,
    {
        let message = std::mem::take(self.message_mut());
        *self.message_mut() = message.with_body(body);
        self
    }
}

/// Backend selected by [`new_engine`].
#[derive(Debug, Clone)]
pub enum Engine {
    Smtp(SmtpMail),
    Ses(SesMail),
}

#[async_trait]
impl Mail for Engine {
    fn message(&self) -> &EmailMessage {
        match self {
            Engine::Smtp(smtp) => smtp.message(),
            Engine::Ses(ses) => ses.message(),
        }
    }

    fn message_mut(&mut self) -> &mut EmailMessage {
        match self {
            Engine::Smtp(smtp) => smtp.message_mut(),
            Engine::Ses(ses) => ses.message_mut(),
        }
    }

    async fn send(&self) -> Result<SendResponse, EmailError> {
        match self {
            Engine::Smtp(smtp) => smtp.send().await,
            Engine::Ses(ses) => ses.send().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Engine::Smtp(smtp) => smtp.name(),
            Engine::Ses(ses) => ses.name(),
        }
    }
}

// Last engine built by `new_engine`. Callers should prefer holding the
// returned value; this exists for code that cannot have it passed in.
static CURRENT_CLIENT: RwLock<Option<Engine>> = RwLock::new(None);

/// Validates `config` and builds the backend named by `config.driver`.
/// On success the engine is also published as the current client.
pub async fn new_engine(config: &EmailConfig) -> Result<Engine, EmailError> {
    if config.driver.is_empty() {
        return Err(EmailError::MissingDriver);
    }

    let engine = match config.driver.as_str() {
        DRIVER_SMTP => {
            if config.host.is_empty() || config.port.is_empty() {
                return Err(EmailError::MissingSmtpHostAndPort);
            }
            Engine::Smtp(SmtpMail::new(config))
        }
        DRIVER_SES => {
            if config.region.is_empty() {
                return Err(EmailError::MissingSesRegion);
            }
            Engine::Ses(SesMail::new(config).await?)
        }
        other => {
            error!(driver = %other, "Unknown email driver");
            return Err(EmailError::UnsupportedDriver(other.to_string()));
        }
    };

    debug!("Created {} email engine", engine.name());
    set_current_client(engine.clone());
    Ok(engine)
}

/// Clone of the engine most recently returned by [`new_engine`].
pub fn current_client() -> Option<Engine> {
    CURRENT_CLIENT
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

fn set_current_client(engine: Engine) {
    *CURRENT_CLIENT
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(engine);
}
