//! Raw report persistence.
//!
//! Only the unparsed markdown is kept; snapshots are rebuilt from it on the
//! next run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::Result;

const LATEST_FILE: &str = "latest_report.md";
const ARCHIVE_DIR: &str = "archive";

pub struct SavedPaths {
    pub latest: PathBuf,
    pub archive: PathBuf,
}

pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    /// Last saved report, or an empty string on the first run.
    pub fn load_previous(&self) -> Result<String> {
        match std::fs::read_to_string(self.latest_path()) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(dir = %self.dir.display(), "no previous report, treating as first run");
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write `text` as the latest report and as a dated archive copy.
    pub fn save(&self, text: &str, date: NaiveDate) -> Result<SavedPaths> {
        let archive_dir = self.dir.join(ARCHIVE_DIR);
        std::fs::create_dir_all(&archive_dir)?;

        let latest = self.latest_path();
        std::fs::write(&latest, text)?;

        let archive = archive_dir.join(format!("report_{}.md", date.format("%Y-%m-%d")));
        std::fs::write(&archive, text)?;

        info!(latest = %latest.display(), archive = %archive.display(), "report saved");
        Ok(SavedPaths { latest, archive })
    }
}
