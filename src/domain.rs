//! Domain models for the review table.
//!
//! This module contains the requirement records produced by the classifier,
//! the reviewer's classification labels, the canonical dataset and the
//! configuration.

mod classification;
pub use classification::{Classification, UnknownClassification};

mod config;
pub use config::Config;

/// The canonical dataset store.
pub mod dataset;
pub use dataset::Dataset;

mod record;
pub use record::{RecordKey, RequirementRecord};
