use chrono::NaiveDate;
use tracing::info;

use crate::delta::{classify, DeltaCounts};
use crate::error::Result;
use crate::llm::ReportSource;
use crate::notify::{subject, Sink};
use crate::parser::Extractor;
use crate::render::render_with_footer;
use crate::store::ReportStore;

pub struct RunOptions<'a> {
    pub monitored: &'a [String],
    pub period_label: String,
    pub date: NaiveDate,
    /// Leave the stored report untouched.
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub counts: DeltaCounts,
    pub subject: String,
    pub saved: bool,
}

/// generate → load previous → classify → save → render → deliver.
///
/// Nothing is written if the source fails. The report is saved before the
/// sink is called.
pub async fn run(
    source: &dyn ReportSource,
    store: &ReportStore,
    sink: &dyn Sink,
    opts: RunOptions<'_>,
) -> Result<RunOutcome> {
    info!("generating report");
    let current_text = source.generate().await?;

    info!("loading previous report");
    let previous_text = store.load_previous()?;

    let extractor = Extractor::new(opts.monitored.iter().cloned());
    let current = extractor.extract(&current_text);
    let previous = extractor.extract(&previous_text);
    let delta = classify(&current, &previous);
    let counts = delta.counts();
    info!(
        entities = current.len(),
        new = counts.new,
        updated = counts.updated,
        unchanged = counts.unchanged,
        "deltas detected"
    );

    let saved = if opts.dry_run {
        info!("dry run, not saving report");
        false
    } else {
        store.save(&current_text, opts.date)?;
        true
    };

    let payload = render_with_footer(&delta, &opts.period_label, opts.monitored);
    let subject = subject(&counts);
    info!(sink = sink.name(), %subject, "delivering digest");
    sink.deliver(&subject, &payload).await?;

    Ok(RunOutcome {
        counts,
        subject,
        saved,
    })
}
