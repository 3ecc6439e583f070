//! Weekly competitive-intelligence digest.
//!
//! Three-stage core: report markdown → [`parser::ReportSnapshot`] →
//! [`delta::DeltaResult`] → [`render::Payload`]. The remaining modules are the
//! collaborators around it: a text source, raw report storage and delivery.

pub mod config;
pub mod delta;
pub mod error;
pub mod llm;
pub mod notify;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod store;

pub use delta::{classify, DeltaCounts, DeltaResult, UpdatedEntity};
pub use error::{Error, Result};
pub use parser::{extract, EntityRecord, Extractor, ReportSnapshot};
pub use render::{render, Payload};
