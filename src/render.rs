//! Digest rendering.
//!
//! Builds the HTML and plain-text bodies handed to a notification sink.
//! Rendering is pure: the same delta and period label always give the same
//! bytes.

use std::fmt::Write;

use crate::delta::{DeltaCounts, DeltaResult};
use crate::parser::fields::truncate_chars;

/// Characters of the excerpt shown in each entity block.
pub const PREVIEW_CHARS: usize = 300;

const TITLE: &str = "Weekly AI Competitive Intelligence: Delta Report";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub html: String,
    pub text: String,
    pub counts: DeltaCounts,
}

pub fn render(delta: &DeltaResult, period_label: &str) -> Payload {
    render_with_footer(delta, period_label, &[])
}

/// Like [`render`], with a "Monitored:" footer when `monitored` is non-empty.
pub fn render_with_footer(delta: &DeltaResult, period_label: &str, monitored: &[String]) -> Payload {
    Payload {
        html: render_html(delta, period_label, monitored),
        text: render_text(delta, period_label, monitored),
        counts: delta.counts(),
    }
}

fn preview(excerpt: &str) -> String {
    format!("{}...", truncate_chars(excerpt, PREVIEW_CHARS))
}

fn render_html(delta: &DeltaResult, period_label: &str, monitored: &[String]) -> String {
    let counts = delta.counts();
    let mut body = String::new();

    let _ = write!(
        body,
        r#"
    <div class="summary">
        <strong>This Week's Summary</strong>
        <p>New Updates: {new}<br>
        Feature Changes: {updated}<br>
        Unchanged: {unchanged}</p>
    </div>
"#,
        new = counts.new,
        updated = counts.updated,
        unchanged = counts.unchanged,
    );

    if counts.has_changes() {
        for record in delta.new_entities() {
            let _ = write!(
                body,
                r#"
    <div class="competitor">
        <div class="competitor-header">
            {name}
            <span class="badge">NEW</span>
        </div>
        <div class="competitor-content">
            <strong>Feature:</strong> {feature}<br><br>
            {preview}
        </div>
    </div>
"#,
                name = html_escape(&record.name),
                feature = html_escape(&record.feature_summary),
                preview = html_escape(&preview(&record.excerpt)),
            );
        }

        for item in delta.updated_entities() {
            let _ = write!(
                body,
                r#"
    <div class="competitor">
        <div class="competitor-header">
            {name}
            <span class="badge badge-updated">UPDATED</span>
        </div>
        <div class="competitor-content">
            <strong>New Feature:</strong> {feature}<br>
            <strong>Previous:</strong> {previous}<br><br>
            {preview}
        </div>
    </div>
"#,
                name = html_escape(&item.record.name),
                feature = html_escape(&item.record.feature_summary),
                previous = html_escape(&item.previous_feature_summary),
                preview = html_escape(&preview(&item.record.excerpt)),
            );
        }
    } else {
        body.push_str(
            r#"
    <div class="no-changes">
        <h2>No New Intelligence This Week</h2>
        <p>All monitored competitors remain unchanged from last week.</p>
    </div>
"#,
        );
    }

    if !monitored.is_empty() {
        let names: Vec<String> = monitored.iter().map(|m| html_escape(m)).collect();
        let _ = write!(
            body,
            r#"
    <div class="footer">
        <p><strong>Monitored:</strong> {}</p>
    </div>
"#,
            names.join(" &bull; "),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto; padding: 20px; }}
        .header {{ background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 8px; margin-bottom: 30px; }}
        .header h1 {{ margin: 0; font-size: 24px; }}
        .summary {{ background: #f7fafc; border-left: 4px solid #667eea; padding: 20px; margin-bottom: 30px; }}
        .competitor {{ margin-bottom: 30px; border: 1px solid #e2e8f0; border-radius: 8px; overflow: hidden; }}
        .competitor-header {{ background: #2d3748; color: white; padding: 15px; font-weight: 600; }}
        .competitor-content {{ padding: 20px; }}
        .badge {{ background: #48bb78; color: white; padding: 4px 12px; border-radius: 12px; font-size: 11px; margin-left: 10px; }}
        .badge-updated {{ background: #ed8936; }}
        .no-changes {{ text-align: center; padding: 60px; background: #f7fafc; border-radius: 8px; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 2px solid #e2e8f0; text-align: center; color: #718096; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>{TITLE}</h1>
        <p>Week of {period}</p>
    </div>
{body}</body>
</html>
"#,
        period = html_escape(period_label),
    )
}

fn render_text(delta: &DeltaResult, period_label: &str, monitored: &[String]) -> String {
    let counts = delta.counts();
    let mut text = format!(
        "{TITLE}
Week of {period_label}

New Updates: {new}
Feature Changes: {updated}
Unchanged: {unchanged}
{rule}

",
        new = counts.new,
        updated = counts.updated,
        unchanged = counts.unchanged,
        rule = "=".repeat(60),
    );

    if counts.has_changes() {
        for record in delta.new_entities() {
            let _ = write!(
                text,
                "[NEW] {name}\nFeature: {feature}\n{preview}\n\n",
                name = record.name,
                feature = record.feature_summary,
                preview = preview(&record.excerpt),
            );
        }
        for item in delta.updated_entities() {
            let _ = write!(
                text,
                "[UPDATED] {name}\nNew Feature: {feature}\nPrevious: {previous}\n{preview}\n\n",
                name = item.record.name,
                feature = item.record.feature_summary,
                previous = item.previous_feature_summary,
                preview = preview(&item.record.excerpt),
            );
        }
    } else {
        text.push_str(
            "No New Intelligence This Week\nAll monitored competitors remain unchanged from last week.\n\n",
        );
    }

    if !monitored.is_empty() {
        let _ = writeln!(text, "---\nMonitored: {}", monitored.join(" • "));
    }

    text
}

/// Simple HTML escaping for model-generated content.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
