use thiserror::Error;

/// Errors raised by the collaborators around the extraction core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("text source returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("delivery endpoint returned {status}: {body}")]
    Delivery { status: u16, body: String },

    #[error("text source returned no report text")]
    EmptyResponse,

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build email: {0}")]
    MailBuild(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Mail(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
