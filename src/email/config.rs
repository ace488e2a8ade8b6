use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::email::EmailError;

pub const DRIVER_SMTP: &str = "smtp";
pub const DRIVER_SES: &str = "ses";

/// Connect and command timeout applied to SMTP sessions unless overridden.
pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Flat mailer configuration. Empty strings mean "not set"; which fields
/// are required depends on `driver`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub host: String,
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,
    pub username: String,
    pub password: String,
    pub driver: String,
    pub region: String,
    /// Overrides the port based encryption policy for SMTP.
    pub encryption: Option<Encryption>,
    pub timeout_secs: Option<u64>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("driver", &self.driver)
            .field("region", &self.region)
            .field("encryption", &self.encryption)
            .field("timeout_secs", &self.timeout_secs)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Transport security used for an SMTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    /// Plain text session.
    None,
    /// TLS from the first byte (SMTPS).
    Ssl,
    /// Upgrade with STARTTLS when the server offers it.
    Tls,
}

impl Encryption {
    /// 25 is plain, 465 is implicit TLS, everything else uses STARTTLS.
    pub fn for_port(port: u16) -> Self {
        match port {
            25 => Encryption::None,
            465 => Encryption::Ssl,
            _ => Encryption::Tls,
        }
    }
}

#[derive(Deserialize)]
struct EmailSection {
    email: Option<EmailConfig>,
}

impl EmailConfig {
    pub fn smtp(
        host: impl Into<String>,
        port: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            driver: DRIVER_SMTP.to_string(),
            host: host.into(),
            port: port.into(),
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn ses(region: impl Into<String>) -> Self {
        Self {
            driver: DRIVER_SES.to_string(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SMTP_TIMEOUT)
    }

    /// Parses either a bare configuration or one nested under `[email]`.
    pub fn from_toml_str(content: &str) -> Result<Self, EmailError> {
        match toml_edit::de::from_str::<EmailSection>(content)?.email {
            Some(config) => Ok(config),
            None => Ok(toml_edit::de::from_str::<EmailConfig>(content)?),
        }
    }

    pub async fn load_from_file(path: &Path) -> Result<Self, EmailError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(text) => text,
        Port::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encryption_for_port() {
        assert_eq!(Encryption::for_port(25), Encryption::None);
        assert_eq!(Encryption::for_port(465), Encryption::Ssl);
        assert_eq!(Encryption::for_port(587), Encryption::Tls);
        assert_eq!(Encryption::for_port(2525), Encryption::Tls);
    }

    #[test]
    fn test_smtp_constructor() {
        let config = EmailConfig::smtp("smtp.gmail.com", "587", "test@example.com", "password123");
        assert_eq!(config.driver, "smtp");
        assert_eq!(config.host, "smtp.gmail.com");
        assert_eq!(config.port, "587");
        assert_eq!(config.username, "test@example.com");
        assert_eq!(config.password, "password123");
        assert!(config.region.is_empty());
    }

    #[test]
    fn test_timeout_defaults_to_ten_seconds() {
        let mut config = EmailConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));

        config.timeout_secs = Some(30);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_bare_config_with_numeric_port() {
        let config = EmailConfig::from_toml_str(
            r#"
driver = "smtp"
host = "mail.example.com"
port = 465
username = "u"
password = "p"
encryption = "tls"
"#,
        )
        .unwrap();

        assert_eq!(config.driver, "smtp");
        assert_eq!(config.port, "465");
        assert_eq!(config.encryption, Some(Encryption::Tls));
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_parse_email_section() {
        let config = EmailConfig::from_toml_str(
            r#"
[email]
driver = "ses"
region = "eu-west-1"
access_key_id = "AKIDEXAMPLE"
secret_access_key = "secret"
"#,
        )
        .unwrap();

        assert_eq!(config, EmailConfig {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..EmailConfig::ses("eu-west-1")
        });
    }

    #[test]
    fn test_parse_reports_errors_inside_email_section() {
        let result = EmailConfig::from_toml_str(
            r#"
[email]
driver = "smtp"
timeout_secs = "soon"
"#,
        );
        assert!(matches!(result, Err(EmailError::Toml(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = EmailConfig {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("wJalrXUtnFEMI".to_string()),
            ..EmailConfig::smtp("smtp.gmail.com", "587", "u", "hunter2")
        };

        let output = format!("{:?}", config);
        assert!(!output.contains("hunter2"));
        assert!(!output.contains("wJalrXUtnFEMI"));
        assert!(output.contains("AKIDEXAMPLE"));
        assert!(output.contains("smtp.gmail.com"));
        assert!(output.contains("<redacted>"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = EmailConfig::from_toml_str("").unwrap();
        assert_eq!(config, EmailConfig::default());
    }

    #[test]
    fn test_parse_rejects_unknown_encryption() {
        let result = EmailConfig::from_toml_str(r#"encryption = "quantum""#);
        assert!(matches!(result, Err(EmailError::Toml(_))));
    }
}
