//! Digest delivery.
//!
//! Sinks own transport and the subject line; they receive the rendered
//! [`Payload`] untouched.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpSettings;
use crate::delta::DeltaCounts;
use crate::error::{Error, Result};
use crate::render::Payload;

pub fn subject(counts: &DeltaCounts) -> String {
    format!("CI Delta Report: {} Updates", counts.changes())
}

#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, subject: &str, payload: &Payload) -> Result<()>;
}

/// SMTP delivery with implicit TLS (Gmail on 465 by default).
pub struct EmailSink {
    host: String,
    port: u16,
    username: String,
    password: String,
    recipient: String,
}

impl EmailSink {
    pub fn from_settings(smtp: &SmtpSettings) -> Result<Self> {
        let username = smtp
            .username
            .clone()
            .ok_or(Error::MissingSetting("smtp.username (GMAIL_USER)"))?;
        let password = smtp
            .password
            .clone()
            .ok_or(Error::MissingSetting("smtp.password (GMAIL_APP_PASSWORD)"))?;
        let recipient = smtp
            .recipient
            .clone()
            .ok_or(Error::MissingSetting("smtp.recipient (RECIPIENT_EMAIL)"))?;

        Ok(Self {
            host: smtp.host.clone(),
            port: smtp.port,
            username,
            password,
            recipient,
        })
    }

    fn message(&self, subject: &str, payload: &Payload) -> Result<Message> {
        let from: Mailbox = self.username.parse()?;
        let to: Mailbox = self.recipient.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(payload.text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(payload.html.clone()),
                    ),
            )?;
        Ok(message)
    }
}

#[async_trait]
impl Sink for EmailSink {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, subject: &str, payload: &Payload) -> Result<()> {
        let message = self.message(subject, payload)?;
        let creds = Credentials::new(self.username.clone(), self.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
                .port(self.port)
                .credentials(creds)
                .build();

        mailer.send(message).await?;
        info!(to = %self.recipient, subject, "email sent");
        Ok(())
    }
}

/// JSON POST of subject, bodies and counts.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Sink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, subject: &str, payload: &Payload) -> Result<()> {
        let body = serde_json::json!({
            "subject": subject,
            "text": payload.text,
            "html": payload.html,
            "counts": payload.counts,
        });

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        info!(url = %self.url, subject, "webhook delivered");
        Ok(())
    }
}

/// Prints the plain-text body; used for dry runs.
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn deliver(&self, subject: &str, payload: &Payload) -> Result<()> {
        println!("Subject: {}\n\n{}", subject, payload.text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::classify;
    use crate::parser::{extract, ReportSnapshot};
    use crate::render::render;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> Payload {
        let snap = extract("## Kayak\n**New Feature:** [X]\nBody");
        render(&classify(&snap, &ReportSnapshot::default()), "October 16, 2026")
    }

    fn smtp() -> SmtpSettings {
        SmtpSettings {
            username: Some("sender@example.com".into()),
            password: Some("secret".into()),
            recipient: Some("team@example.com".into()),
            ..SmtpSettings::default()
        }
    }

    #[test]
    fn subject_counts_new_and_updated() {
        let counts = DeltaCounts {
            new: 2,
            updated: 1,
            unchanged: 5,
        };
        assert_eq!(subject(&counts), "CI Delta Report: 3 Updates");
    }

    #[test]
    fn email_requires_credentials() {
        let settings = SmtpSettings {
            password: None,
            ..smtp()
        };
        assert!(matches!(
            EmailSink::from_settings(&settings),
            Err(Error::MissingSetting(_))
        ));
    }

    #[test]
    fn email_message_is_multipart() {
        let sink = EmailSink::from_settings(&smtp()).unwrap();
        let message = sink.message("CI Delta Report: 1 Updates", &payload()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: CI Delta Report: 1 Updates"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn bad_recipient_is_address_error() {
        let settings = SmtpSettings {
            recipient: Some("not an address".into()),
            ..smtp()
        };
        let sink = EmailSink::from_settings(&settings).unwrap();
        assert!(matches!(sink.message("s", &payload()), Err(Error::Address(_))));
    }

    #[tokio::test]
    async fn webhook_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(serde_json::json!({
                "subject": "CI Delta Report: 1 Updates",
                "counts": { "new": 1, "updated": 0, "unchanged": 0 },
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.uri()));
        sink.deliver("CI Delta Report: 1 Updates", &payload())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn webhook_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri());
        let err = sink.deliver("s", &payload()).await.unwrap_err();
        assert!(matches!(err, Error::Delivery { status: 500, .. }));
    }
}
