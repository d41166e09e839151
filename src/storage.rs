//! The collaborators around the table: loading classification results,
//! saving reviewed requirements and exporting CSV.

/// CSV export.
pub mod csv;
pub use csv::{CsvExport, CsvExporter, download_base_name};

mod results;
pub use results::{ClassificationResponse, ClassificationResult, LoadError};

mod save;
pub use save::{
    FileSaveSink, HIGHLIGHTS_FILE, PersistedRequirement, REQUIREMENTS_FILE, SaveError,
    SaveResponse, SaveSink, group_by_page,
};
