//! Review of classified requirements
//!
//! Requirements extracted from a document and classified by a model are shown
//! in a table the reviewer can sort, annotate and prune. The reviewed result
//! is exported for saving or as CSV.

pub mod domain;
pub use domain::{Classification, Config, Dataset, RecordKey, RequirementRecord};

pub mod table;
pub use table::{Container, ExportRecord, ReviewTable, TableEvent};

pub mod storage;
pub use storage::{ClassificationResponse, CsvExporter, FileSaveSink, SaveSink};
