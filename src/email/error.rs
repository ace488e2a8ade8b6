use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("driver is required")]
    MissingDriver,

    #[error("SMTP host and port are required")]
    MissingSmtpHostAndPort,

    #[error("SES region is required")]
    MissingSesRegion,

    #[error("unsupported email driver: {0}")]
    UnsupportedDriver(String),

    #[error("sender is required")]
    MissingSender,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Email provider error: {0}")]
    ProviderError(String),

    #[error(transparent)]
    Message(#[from] lettre::error::Error),

    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error(transparent)]
    Ses(#[from] aws_sdk_sesv2::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml_edit::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
