//! Runtime settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `ci_digest.toml`, then `CI_*` environment variables (`CI_REPORTS_DIR`,
//! `CI_SMTP__PORT`, `CI_COMPETITORS=Kayak,Agoda`). The conventional
//! unprefixed variables below win over everything else when set.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::parser::DEFAULT_COMPETITORS;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// Implicit TLS.
pub const DEFAULT_SMTP_PORT: u16 = 465;

const DEFAULT_CONFIG_FILE: &str = "ci_digest";

/// (environment variable, settings key)
const WELL_KNOWN_VARS: &[(&str, &str)] = &[
    ("ANTHROPIC_API_KEY", "api_key"),
    ("GMAIL_USER", "smtp.username"),
    ("GMAIL_APP_PASSWORD", "smtp.password"),
    ("RECIPIENT_EMAIL", "smtp.recipient"),
    ("DIGEST_WEBHOOK_URL", "webhook_url"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub competitors: Vec<String>,
    pub reports_dir: PathBuf,
    pub model: String,
    pub max_tokens: u32,
    pub api_base: String,
    pub api_key: Option<String>,
    pub smtp: SmtpSettings,
    pub webhook_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            competitors: DEFAULT_COMPETITORS.iter().map(|c| c.to_string()).collect(),
            reports_dir: PathBuf::from("reports"),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            smtp: SmtpSettings::default(),
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            recipient: None,
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix("CI")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("competitors")
                .try_parsing(true),
        );

        for (var, key) in WELL_KNOWN_VARS {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingSetting("api_key (ANTHROPIC_API_KEY)"))
    }
}
