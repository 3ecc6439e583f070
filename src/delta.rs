use serde::Serialize;

use crate::parser::{EntityRecord, ReportSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedEntity {
    pub record: EntityRecord,
    pub previous_feature_summary: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeltaCounts {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl DeltaCounts {
    /// New plus updated; unchanged entities are not changes.
    pub fn changes(&self) -> usize {
        self.new + self.updated
    }

    pub fn has_changes(&self) -> bool {
        self.changes() > 0
    }
}

/// How each current entity relates to the previous report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaResult {
    new_entities: Vec<EntityRecord>,
    updated_entities: Vec<UpdatedEntity>,
    unchanged_names: Vec<String>,
}

impl DeltaResult {
    pub fn new_entities(&self) -> &[EntityRecord] {
        &self.new_entities
    }

    pub fn updated_entities(&self) -> &[UpdatedEntity] {
        &self.updated_entities
    }

    pub fn unchanged_names(&self) -> &[String] {
        &self.unchanged_names
    }

    pub fn counts(&self) -> DeltaCounts {
        DeltaCounts {
            new: self.new_entities.len(),
            updated: self.updated_entities.len(),
            unchanged: self.unchanged_names.len(),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.counts().has_changes()
    }
}

/// Bucket every entity of `current` against `previous`.
///
/// Only the feature headline is compared, so an edited body with the same
/// headline stays unchanged. Entities that disappeared from `current` are not
/// reported. Pass an empty snapshot for a first run.
pub fn classify(current: &ReportSnapshot, previous: &ReportSnapshot) -> DeltaResult {
    let mut delta = DeltaResult::default();

    for record in current {
        match previous.get(&record.name) {
            None => delta.new_entities.push(record.clone()),
            Some(prev) if prev.feature_summary != record.feature_summary => {
                delta.updated_entities.push(UpdatedEntity {
                    record: record.clone(),
                    previous_feature_summary: prev.feature_summary.clone(),
                });
            }
            Some(_) => delta.unchanged_names.push(record.name.clone()),
        }
    }

    delta
}
