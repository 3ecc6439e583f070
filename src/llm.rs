//! Report sources.
//!
//! The extraction core only ever sees the markdown string a source returns.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Produce this period's report markdown.
    async fn generate(&self) -> Result<String>;
}

/// Build the research prompt for the given competitors.
pub fn build_prompt(competitors: &[String]) -> String {
    let targets = competitors.join(", ");
    format!(
        "You are an elite Competitive Intelligence AI Agent specialized in the Travel and Online Travel Agency (OTA) industry.

Your task is to conduct a weekly deep-dive web search to monitor, extract, and analyze the latest AI-driven product features and UX changes released by top competitors.

TARGET COMPETITORS: {targets}

Generate a comprehensive markdown report analyzing recent AI/ML product launches, focusing on:
- New AI features and product launches
- UX changes and user journey impacts
- Strategic business hypotheses behind competitor moves
- Planning, itinerary generation, and inspiration features

Use web search to find the latest information (past 12-18 months). Include links to primary sources.

Output must be in markdown format following this structure:
# Weekly AI Competitor Intelligence Report
## [Competitor Name]
**New Feature:** [description]
**UX Impact:** [impact]
**Business Hypothesis:** [analysis]

Include a special section on Planning & Inspiration if relevant updates are found."
    )
}

/// Report generated by Anthropic's Messages API.
pub struct ClaudeSource {
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
    prompt: String,
    client: reqwest::Client,
}

impl ClaudeSource {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        api_base: &str,
        competitors: &[String],
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            endpoint: format!("{}/v1/messages", api_base.trim_end_matches('/')),
            prompt: build_prompt(competitors),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReportSource for ClaudeSource {
    async fn generate(&self) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [{ "role": "user", "content": self.prompt }],
        });

        info!(model = %self.model, "requesting report");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = response.json().await?;
        let text = value["content"][0]["text"]
            .as_str()
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::EmptyResponse)?;

        debug!(chars = text.len(), stop_reason = ?value["stop_reason"].as_str(), "report received");
        Ok(text.to_string())
    }
}

/// Report read from a markdown file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReportSource for FileSource {
    async fn generate(&self) -> Result<String> {
        info!(path = %self.path.display(), "reading report from file");
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn competitors() -> Vec<String> {
        vec!["Kayak".into(), "Agoda".into()]
    }

    #[test]
    fn prompt_lists_competitors_and_template() {
        let prompt = build_prompt(&competitors());
        assert!(prompt.contains("TARGET COMPETITORS: Kayak, Agoda"));
        assert!(prompt.contains("**New Feature:** [description]"));
    }

    #[tokio::test]
    async fn returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{ "type": "text", "text": "## Kayak\n**New Feature:** [X]" }],
                "stop_reason": "end_turn",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = ClaudeSource::new("test-key", "m", 100, &server.uri(), &competitors());
        let text = source.generate().await.unwrap();
        assert_eq!(text, "## Kayak\n**New Feature:** [X]");
    }

    #[tokio::test]
    async fn api_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let source = ClaudeSource::new("k", "m", 100, &server.uri(), &competitors());
        let err = source.generate().await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 529, ref body } if body == "overloaded"));
    }

    #[tokio::test]
    async fn blank_text_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "content": [{ "type": "text", "text": "  " }] })),
            )
            .mount(&server)
            .await;

        let source = ClaudeSource::new("k", "m", 100, &server.uri(), &competitors());
        assert!(matches!(source.generate().await, Err(Error::EmptyResponse)));
    }

    #[tokio::test]
    async fn file_source_reads_fixture() {
        let source = FileSource::new("tests/fixtures/report_week1.md");
        let text = source.generate().await.unwrap();
        assert!(text.starts_with("# Weekly AI Competitor Intelligence Report"));
    }
}
