pub mod fields;
pub mod sections;

use std::collections::{HashMap, HashSet};

use serde::{Serialize, Serializer};
use tracing::debug;

pub use fields::{EXCERPT_MAX_CHARS, SENTINEL};

/// Competitors tracked when no list is configured.
pub const DEFAULT_COMPETITORS: &[&str] = &[
    "Booking.com",
    "Expedia",
    "Trip.com",
    "Trivago",
    "Airbnb",
    "Agoda",
    "eDreams ODIGEO",
    "Kayak",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    pub name: String,
    pub feature_summary: String,
    pub excerpt: String,
}

/// Records of one report, keyed by entity name, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSnapshot {
    records: Vec<EntityRecord>,
    index: HashMap<String, usize>,
}

impl ReportSnapshot {
    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityRecord> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    // A repeated name overwrites the record but keeps its first position.
    fn insert(&mut self, record: EntityRecord) {
        match self.index.get(&record.name) {
            Some(&i) => {
                debug!(entity = %record.name, "duplicate heading, keeping last occurrence");
                self.records[i] = record;
            }
            None => {
                self.index.insert(record.name.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}

impl FromIterator<EntityRecord> for ReportSnapshot {
    fn from_iter<I: IntoIterator<Item = EntityRecord>>(iter: I) -> Self {
        let mut snapshot = ReportSnapshot::default();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a ReportSnapshot {
    type Item = &'a EntityRecord;
    type IntoIter = std::slice::Iter<'a, EntityRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for ReportSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}

/// Turns report markdown into a [`ReportSnapshot`].
///
/// A section survives when it carries a `New Feature:` field or its heading
/// names a tracked entity. Everything else (report titles, "Planning &
/// Inspiration" asides) is dropped without error.
#[derive(Debug, Clone)]
pub struct Extractor {
    tracked: HashSet<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPETITORS.iter().copied())
    }
}

impl Extractor {
    pub fn new<I, S>(tracked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracked: tracked.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extract(&self, document: &str) -> ReportSnapshot {
        sections::split_sections(document)
            .into_iter()
            .filter_map(|section| {
                let name = sections::entity_name(&section.heading);
                if name.is_empty() {
                    debug!(heading = %section.heading, "dropping section with empty heading");
                    return None;
                }

                let feature = fields::feature(&section.body);
                if feature.is_none() && !self.tracked.contains(&name) {
                    debug!(heading = %name, "dropping untracked section");
                    return None;
                }

                let excerpt = fields::excerpt(&section.body, feature.as_ref());
                let feature_summary = feature.map_or_else(|| SENTINEL.to_string(), |f| f.summary);

                Some(EntityRecord {
                    name,
                    feature_summary,
                    excerpt,
                })
            })
            .collect()
    }
}

/// Extract with the default competitor allowlist.
pub fn extract(document: &str) -> ReportSnapshot {
    Extractor::default().extract(document)
}

// ── Tests ──
