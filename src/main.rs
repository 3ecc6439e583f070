use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use ci_digest::config::Settings;
use ci_digest::llm::{ClaudeSource, FileSource, ReportSource};
use ci_digest::notify::{EmailSink, Sink, StdoutSink, WebhookSink};
use ci_digest::parser::Extractor;
use ci_digest::pipeline::{self, RunOptions};
use ci_digest::render::render_with_footer;
use ci_digest::store::ReportStore;
use ci_digest::{classify, ReportSnapshot};

#[derive(Parser)]
#[command(name = "ci_digest", about = "Weekly AI competitive-intelligence delta digest")]
struct Cli {
    /// Settings file (default: ./ci_digest.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate this week's report, diff it against last week's and notify
    Run {
        /// Print the digest instead of sending it, and do not save the report
        #[arg(long)]
        dry_run: bool,
        /// Read the report from a file instead of calling the API
        #[arg(long)]
        from_file: Option<PathBuf>,
        /// Delivery channel
        #[arg(long, value_enum, default_value = "email")]
        sink: SinkKind,
    },
    /// Compare two report files offline
    Diff {
        current: PathBuf,
        /// Previous report (default: no previous report)
        previous: Option<PathBuf>,
        /// Print the HTML body instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Show the entity records extracted from a report
    Extract {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkKind {
    Email,
    Webhook,
    Stdout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Commands::Run {
            dry_run,
            from_file,
            sink,
        } => {
            let source = build_source(&settings, from_file)?;
            let sink: Box<dyn Sink> = if dry_run {
                Box::new(StdoutSink)
            } else {
                build_sink(&settings, sink)?
            };
            let store = ReportStore::new(&settings.reports_dir);
            let now = chrono::Local::now();

            let outcome = pipeline::run(
                source.as_ref(),
                &store,
                sink.as_ref(),
                RunOptions {
                    monitored: &settings.competitors,
                    period_label: now.format("%B %d, %Y").to_string(),
                    date: now.date_naive(),
                    dry_run,
                },
            )
            .await?;

            println!("Report generated");
            println!("{}", "=".repeat(50));
            println!("New Updates:      {}", outcome.counts.new);
            println!("Updated Features: {}", outcome.counts.updated);
            println!("Unchanged:        {}", outcome.counts.unchanged);
            if outcome.saved {
                println!("\nReport saved to: {}", store.latest_path().display());
                println!("Archive saved to: {}", store.dir().join("archive").display());
            }
        }
        Commands::Diff {
            current,
            previous,
            html,
        } => {
            let extractor = Extractor::new(settings.competitors.iter().cloned());
            let current = extractor.extract(&read(&current)?);
            let previous = match previous {
                Some(p) => extractor.extract(&read(&p)?),
                None => ReportSnapshot::default(),
            };
            let delta = classify(&current, &previous);
            let label = chrono::Local::now().format("%B %d, %Y").to_string();
            let payload = render_with_footer(&delta, &label, &settings.competitors);
            println!("{}", if html { payload.html } else { payload.text });
        }
        Commands::Extract { file, json } => {
            let extractor = Extractor::new(settings.competitors.iter().cloned());
            let snapshot = extractor.extract(&read(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else if snapshot.is_empty() {
                println!("No entity sections found.");
            } else {
                println!("{:>3} | {:<20} | {:<40} | {:>7}", "#", "Entity", "New Feature", "Excerpt");
                println!("{}", "-".repeat(80));
                for (i, r) in snapshot.iter().enumerate() {
                    println!(
                        "{:>3} | {:<20} | {:<40} | {:>7}",
                        i + 1,
                        truncate(&r.name, 20),
                        truncate(&r.feature_summary, 40),
                        r.excerpt.chars().count()
                    );
                }
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    Ok(())
}

fn build_source(
    settings: &Settings,
    from_file: Option<PathBuf>,
) -> anyhow::Result<Box<dyn ReportSource>> {
    Ok(match from_file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(ClaudeSource::new(
            settings.require_api_key()?,
            settings.model.clone(),
            settings.max_tokens,
            &settings.api_base,
            &settings.competitors,
        )),
    })
}

fn build_sink(settings: &Settings, kind: SinkKind) -> anyhow::Result<Box<dyn Sink>> {
    Ok(match kind {
        SinkKind::Email => Box::new(EmailSink::from_settings(&settings.smtp)?),
        SinkKind::Webhook => {
            let url = settings
                .webhook_url
                .clone()
                .context("webhook_url (DIGEST_WEBHOOK_URL) is not set")?;
            Box::new(WebhookSink::new(url))
        }
        SinkKind::Stdout => Box::new(StdoutSink),
    })
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
